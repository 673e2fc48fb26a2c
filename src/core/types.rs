use std::time::Duration;

use serde::{Serialize, Deserialize};

/// X10 house code (group address A-P)
///
/// The wire encoding is a fixed permutation of the 16 codes, not a linear
/// sequence. Decoding goes through [`HouseCode::from_wire`]; anything outside
/// the table maps to `NotSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HouseCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    /// House code missing or not decodable
    NotSet,
}

impl HouseCode {
    /// Returns the 4-bit wire value for this house code (0xFF for `NotSet`)
    pub fn wire_value(self) -> u8 {
        match self {
            HouseCode::A => 6,
            HouseCode::B => 14,
            HouseCode::C => 2,
            HouseCode::D => 10,
            HouseCode::E => 1,
            HouseCode::F => 9,
            HouseCode::G => 5,
            HouseCode::H => 13,
            HouseCode::I => 7,
            HouseCode::J => 15,
            HouseCode::K => 3,
            HouseCode::L => 11,
            HouseCode::M => 0,
            HouseCode::N => 8,
            HouseCode::O => 4,
            HouseCode::P => 12,
            HouseCode::NotSet => 0xFF,
        }
    }

    /// Decodes a 4-bit wire value into a house code
    pub fn from_wire(value: u8) -> Self {
        match value {
            6 => HouseCode::A,
            14 => HouseCode::B,
            2 => HouseCode::C,
            10 => HouseCode::D,
            1 => HouseCode::E,
            9 => HouseCode::F,
            5 => HouseCode::G,
            13 => HouseCode::H,
            7 => HouseCode::I,
            15 => HouseCode::J,
            3 => HouseCode::K,
            11 => HouseCode::L,
            0 => HouseCode::M,
            8 => HouseCode::N,
            4 => HouseCode::O,
            12 => HouseCode::P,
            _ => HouseCode::NotSet,
        }
    }
}

/// X10 unit code (device index 1-16 within a house)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitCode {
    Unit1,
    Unit2,
    Unit3,
    Unit4,
    Unit5,
    Unit6,
    Unit7,
    Unit8,
    Unit9,
    Unit10,
    Unit11,
    Unit12,
    Unit13,
    Unit14,
    Unit15,
    Unit16,
    /// Unit code missing or not decodable
    NotSet,
}

impl UnitCode {
    /// Returns the 4-bit wire value for this unit code (0xFF for `NotSet`)
    ///
    /// The permutation is the same one the house codes use.
    pub fn wire_value(self) -> u8 {
        match self {
            UnitCode::Unit1 => 6,
            UnitCode::Unit2 => 14,
            UnitCode::Unit3 => 2,
            UnitCode::Unit4 => 10,
            UnitCode::Unit5 => 1,
            UnitCode::Unit6 => 9,
            UnitCode::Unit7 => 5,
            UnitCode::Unit8 => 13,
            UnitCode::Unit9 => 7,
            UnitCode::Unit10 => 15,
            UnitCode::Unit11 => 3,
            UnitCode::Unit12 => 11,
            UnitCode::Unit13 => 0,
            UnitCode::Unit14 => 8,
            UnitCode::Unit15 => 4,
            UnitCode::Unit16 => 12,
            UnitCode::NotSet => 0xFF,
        }
    }

    /// Decodes a 4-bit wire value into a unit code
    pub fn from_wire(value: u8) -> Self {
        match value {
            6 => UnitCode::Unit1,
            14 => UnitCode::Unit2,
            2 => UnitCode::Unit3,
            10 => UnitCode::Unit4,
            1 => UnitCode::Unit5,
            9 => UnitCode::Unit6,
            5 => UnitCode::Unit7,
            13 => UnitCode::Unit8,
            7 => UnitCode::Unit9,
            15 => UnitCode::Unit10,
            3 => UnitCode::Unit11,
            11 => UnitCode::Unit12,
            0 => UnitCode::Unit13,
            8 => UnitCode::Unit14,
            4 => UnitCode::Unit15,
            12 => UnitCode::Unit16,
            _ => UnitCode::NotSet,
        }
    }

    /// Builds a unit code from its 1-based unit number
    pub fn from_number(number: u8) -> Self {
        match number {
            1 => UnitCode::Unit1,
            2 => UnitCode::Unit2,
            3 => UnitCode::Unit3,
            4 => UnitCode::Unit4,
            5 => UnitCode::Unit5,
            6 => UnitCode::Unit6,
            7 => UnitCode::Unit7,
            8 => UnitCode::Unit8,
            9 => UnitCode::Unit9,
            10 => UnitCode::Unit10,
            11 => UnitCode::Unit11,
            12 => UnitCode::Unit12,
            13 => UnitCode::Unit13,
            14 => UnitCode::Unit14,
            15 => UnitCode::Unit15,
            16 => UnitCode::Unit16,
            _ => UnitCode::NotSet,
        }
    }

    /// Returns the 1-based unit number (0 for `NotSet`)
    pub fn number(self) -> u8 {
        match self {
            UnitCode::Unit1 => 1,
            UnitCode::Unit2 => 2,
            UnitCode::Unit3 => 3,
            UnitCode::Unit4 => 4,
            UnitCode::Unit5 => 5,
            UnitCode::Unit6 => 6,
            UnitCode::Unit7 => 7,
            UnitCode::Unit8 => 8,
            UnitCode::Unit9 => 9,
            UnitCode::Unit10 => 10,
            UnitCode::Unit11 => 11,
            UnitCode::Unit12 => 12,
            UnitCode::Unit13 => 13,
            UnitCode::Unit14 => 14,
            UnitCode::Unit15 => 15,
            UnitCode::Unit16 => 16,
            UnitCode::NotSet => 0,
        }
    }
}

/// X10 RF command function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    On,
    Off,
    Dim,
    Bright,
    AllLightsOn,
    AllLightsOff,
    /// Function byte not decodable
    NotSet,
}

impl Function {
    /// Returns the wire byte for this function (0xFF for `NotSet`)
    pub fn wire_value(self) -> u8 {
        match self {
            Function::On => 0x00,
            Function::Off => 0x01,
            Function::AllLightsOff => 0x80,
            Function::AllLightsOn => 0x90,
            Function::Dim => 0x98,
            Function::Bright => 0x88,
            Function::NotSet => 0xFF,
        }
    }

    /// Decodes a wire byte into a function
    pub fn from_wire(value: u8) -> Self {
        match value {
            0x00 => Function::On,
            0x01 => Function::Off,
            0x80 => Function::AllLightsOff,
            0x90 => Function::AllLightsOn,
            0x98 => Function::Dim,
            0x88 => Function::Bright,
            _ => Function::NotSet,
        }
    }
}

/// X10 security sensor / remote event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityEvent {
    MotionAlert,
    MotionNormal,
    DoorSensor1Alert,
    DoorSensor1Normal,
    DoorSensor2Alert,
    DoorSensor2Normal,
    DoorSensor1BatteryLow,
    DoorSensor1BatteryOk,
    DoorSensor2BatteryLow,
    DoorSensor2BatteryOk,
    RemoteArm,
    RemoteDisarm,
    RemoteLightOn,
    RemoteLightOff,
    RemotePanic,
    /// Event byte not decodable
    NotSet,
}

impl SecurityEvent {
    /// Returns the wire byte for this event (0xFF for `NotSet`)
    pub fn wire_value(self) -> u8 {
        match self {
            SecurityEvent::MotionAlert => 0x0C,
            SecurityEvent::MotionNormal => 0x8C,
            SecurityEvent::DoorSensor1Alert => 0x04,
            SecurityEvent::DoorSensor1Normal => 0x84,
            SecurityEvent::DoorSensor2Alert => 0x00,
            SecurityEvent::DoorSensor2Normal => 0x80,
            SecurityEvent::DoorSensor1BatteryLow => 0x01,
            SecurityEvent::DoorSensor1BatteryOk => 0x81,
            SecurityEvent::DoorSensor2BatteryLow => 0x05,
            SecurityEvent::DoorSensor2BatteryOk => 0x85,
            SecurityEvent::RemoteArm => 0x06,
            SecurityEvent::RemoteDisarm => 0x86,
            SecurityEvent::RemoteLightOn => 0x46,
            SecurityEvent::RemoteLightOff => 0xC6,
            SecurityEvent::RemotePanic => 0x26,
            SecurityEvent::NotSet => 0xFF,
        }
    }

    /// Decodes a wire byte into a security event
    pub fn from_wire(value: u8) -> Self {
        match value {
            0x0C => SecurityEvent::MotionAlert,
            0x8C => SecurityEvent::MotionNormal,
            0x04 => SecurityEvent::DoorSensor1Alert,
            0x84 => SecurityEvent::DoorSensor1Normal,
            0x00 => SecurityEvent::DoorSensor2Alert,
            0x80 => SecurityEvent::DoorSensor2Normal,
            0x01 => SecurityEvent::DoorSensor1BatteryLow,
            0x81 => SecurityEvent::DoorSensor1BatteryOk,
            0x05 => SecurityEvent::DoorSensor2BatteryLow,
            0x85 => SecurityEvent::DoorSensor2BatteryOk,
            0x06 => SecurityEvent::RemoteArm,
            0x86 => SecurityEvent::RemoteDisarm,
            0x46 => SecurityEvent::RemoteLightOn,
            0xC6 => SecurityEvent::RemoteLightOff,
            0x26 => SecurityEvent::RemotePanic,
            _ => SecurityEvent::NotSet,
        }
    }
}

/// Configuration for the W800RF32 receiver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Serial port the receiver is attached to
    pub port_name: String,
    /// Serial baud rate
    pub baud_rate: u32,
    /// Window within which an identical frame is dropped as a retransmission
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub min_repeat_delay: Duration,
    /// How long to wait for the acknowledgment reply before reconnecting
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub ack_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port_name: super::DEFAULT_PORT_NAME.to_string(),
            baud_rate: super::DEFAULT_BAUD_RATE,
            min_repeat_delay: super::DEFAULT_MIN_REPEAT_DELAY,
            ack_timeout: super::DEFAULT_ACK_TIMEOUT,
        }
    }
}
