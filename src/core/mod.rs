//! Core types and constants for the W800RF32 receiver
//!
//! This module contains the fundamental building blocks used throughout the library.

pub mod error;
pub mod types;
pub mod serde;

pub use self::error::{Error, Result};
pub use self::types::{
    Config,
    Function,
    HouseCode,
    SecurityEvent,
    UnitCode,
};

use std::time::Duration;

/// Acknowledgment request sent to the receiver after the serial link opens
pub const ACK_REQUEST: [u8; 2] = [0xF0, 0x29];

/// Acknowledgment reply expected back from the receiver
pub const ACK_REPLY: u8 = 0x29;

/// Length in bytes of an RF command or security frame
pub const RF_FRAME_LEN: usize = 4;

/// Default serial port the receiver is attached to
pub const DEFAULT_PORT_NAME: &str = "/dev/ttyUSB0";

/// Default serial baud rate of the W800RF32
pub const DEFAULT_BAUD_RATE: u32 = 4800;

/// Default window for dropping repeated RF frames
pub const DEFAULT_MIN_REPEAT_DELAY: Duration = Duration::from_millis(500);

/// Default handshake watchdog timeout
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_millis(3000);
