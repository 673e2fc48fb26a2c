use tracing::warn;

use crate::core::{Function, HouseCode, SecurityEvent, UnitCode};

/// A decoded X10 lighting command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// The command function
    pub function: Function,
    /// The house code (forced to `NotSet` for Dim/Bright)
    pub house_code: HouseCode,
    /// The unit code (set only for the On/Off unit path)
    pub unit_code: UnitCode,
}

/// A decoded X10 security notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Security {
    /// The sensor or remote event
    pub event: SecurityEvent,
    /// 8-bit address of the originating device
    pub address: u8,
}

/// Reverses the bit order of a byte (bit 0 becomes bit 7)
pub fn reverse_byte(byte: u8) -> u8 {
    let mut byte = byte;
    let mut result = 0;
    for _ in 0..8 {
        result = (result << 1) | (byte & 1);
        byte >>= 1;
    }
    result
}

/// Decodes the house code carried in the high nibble of byte 0.
///
/// The wire sends the house bits reversed; undo that before the table lookup.
pub fn decode_house_code(byte0: u8) -> HouseCode {
    HouseCode::from_wire(reverse_byte(byte0 >> 4) >> 4)
}

/// Decodes a 4-byte command frame.
///
/// Returns `None` when nothing should be reported: an undecodable function
/// byte, an all-lights command without a house code, or an On/Off command
/// whose unit index does not resolve. Dim and Bright are house- and
/// unit-independent and always report with both set to `NotSet`.
pub fn decode_command(frame: &[u8]) -> Option<Command> {
    // house code (4 bits) + 4th bit of unit code
    let house_unit = frame[0];
    // unit code (3 bits) + function code
    let unit_function = frame[2];

    let function = Function::from_wire(unit_function);
    let house_code = decode_house_code(house_unit);
    match function {
        Function::Dim | Function::Bright => Some(Command {
            function,
            house_code: HouseCode::NotSet,
            unit_code: UnitCode::NotSet,
        }),
        Function::AllLightsOn | Function::AllLightsOff => {
            if house_code == HouseCode::NotSet {
                return None;
            }
            Some(Command {
                function,
                house_code,
                unit_code: UnitCode::NotSet,
            })
        }
        Function::NotSet => {
            warn!("unable to decode function value");
            None
        }
        Function::On | Function::Off => {
            // Unit index is scattered across both bytes; the bit positions
            // are a fixed property of the wire format.
            let index = ((house_unit >> 2) & 1) << 3
                | ((unit_function >> 6) & 1) << 2
                | ((unit_function >> 3) & 1) << 1
                | ((unit_function >> 4) & 1);
            let unit_code = UnitCode::from_number(index + 1);
            if unit_code == UnitCode::NotSet {
                warn!("could not parse unit code");
                return None;
            }
            // On/Off for the unit path is carried in bit 5 of byte 2
            let function = if (unit_function >> 5) & 1 == 1 {
                Function::Off
            } else {
                Function::On
            };
            Some(Command {
                function,
                house_code,
                unit_code,
            })
        }
    }
}

/// Decodes a 4-byte security frame.
///
/// Returns `None` when the event byte is not in the table.
pub fn decode_security(frame: &[u8]) -> Option<Security> {
    let event = SecurityEvent::from_wire(frame[2]);
    if event == SecurityEvent::NotSet {
        warn!("could not parse security event");
        return None;
    }
    Some(Security {
        event,
        address: frame[0],
    })
}
