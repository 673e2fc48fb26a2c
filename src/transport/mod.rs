//! Transport seam between the decoding core and the physical serial link.
//!
//! The core never opens a device path itself: it drives a [`Transport`] and
//! consumes the [`TransportEvent`] signals the transport pushes back. The
//! default implementation is [`SerialTransport`]; tests substitute their own.

pub mod serial;

pub use self::serial::{FrameDecoder, SerialTransport};

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::core::Result;

/// Signals delivered by a transport to the receiver core
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The physical link came up (`true`) or was lost (`false`)
    ConnectionStatusChanged(bool),
    /// A framed message arrived
    MessageReceived(Bytes),
}

/// Channel end a transport uses to deliver its signals
pub type SignalSender = mpsc::UnboundedSender<TransportEvent>;

/// Byte-level link to the W800RF32.
///
/// Implementations own framing and link recovery at the physical layer; the
/// decoding core only sees already-framed byte sequences. Methods are
/// synchronous and must not block beyond a bounded device-open or teardown.
pub trait Transport: Send {
    /// Attempts to open the link.
    ///
    /// Signals flow through `signals` from the moment the link is up.
    /// Returns `Ok(false)` when the device cannot be opened; the session
    /// layer treats that as a retryable condition, not an error.
    fn connect(&mut self, signals: SignalSender) -> Result<bool>;

    /// Closes the link.
    ///
    /// An explicit close must not signal a link loss; the session layer owns
    /// that emission.
    fn disconnect(&mut self);

    /// Reconfigures the port without touching an established link
    fn set_port(&mut self, name: &str, baud_rate: u32);

    /// Sends raw bytes to the device
    fn send(&mut self, data: &[u8]) -> Result<()>;
}
