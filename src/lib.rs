//! W800RF32: X10 RF receiver library
//!
//! This library decodes the RF traffic a W800RF32 receiver picks up into
//! structured events: lighting commands (house/unit/function), security
//! sensor notifications, raw frames, and connection status changes. It also
//! manages the serial session with the device, including the acknowledgment
//! handshake and watchdog-driven reconnection.

pub mod core;
pub mod protocol;
pub mod receiver;
pub mod transport;

// Re-export commonly used items
pub use self::core::{Config, Error, Function, HouseCode, Result, SecurityEvent, UnitCode};
pub use self::receiver::{RfEvent, RfReceiver};
pub use self::transport::{Transport, TransportEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
