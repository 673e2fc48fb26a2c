//! Domain events emitted by the receiver.
//!
//! Events are delivered through a [`tokio::sync::broadcast`] channel obtained
//! from [`crate::receiver::RfReceiver::subscribe`]. Delivery is best-effort:
//! a subscriber that falls behind the bounded channel misses the oldest
//! events rather than blocking the receiver.

use bytes::Bytes;

use crate::core::{Function, HouseCode, SecurityEvent, UnitCode};

/// An event decoded from W800RF32 traffic or from the session state machine.
///
/// Events are emitted synchronously from whichever transport or timer
/// callback produced them; subscribers must not assume a particular thread.
#[derive(Debug, Clone)]
pub enum RfEvent {
    /// The receiver went online (handshake completed) or offline.
    ///
    /// Fired only on an actual state flip, never repeated for an unchanged
    /// state.
    ConnectionStatusChanged {
        /// `true` when the receiver answered the handshake, `false` on loss.
        connected: bool,
    },

    /// A frame passed the duplicate gate, before any decoding.
    RawFrameReceived {
        /// The frame bytes as delivered by the transport.
        data: Bytes,
    },

    /// A lighting command was decoded from a command frame.
    CommandReceived {
        /// The command function.
        function: Function,
        /// The house code (`NotSet` for house-independent functions).
        house_code: HouseCode,
        /// The unit code (`NotSet` outside the On/Off unit path).
        unit_code: UnitCode,
    },

    /// A security notification was decoded from a security frame.
    SecurityReceived {
        /// The sensor or remote event.
        event: SecurityEvent,
        /// 8-bit address of the originating device.
        address: u8,
    },
}
