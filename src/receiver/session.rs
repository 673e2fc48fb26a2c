use std::time::Duration;

use tokio::task::JoinHandle;

/// Handshake phase of the session with the receiver hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No link, or the link was torn down
    Disconnected,
    /// Link is up, acknowledgment request sent, waiting for the reply
    AwaitingAck,
    /// The receiver answered the handshake
    Online,
}

/// Connection and handshake state machine.
///
/// Tracks the session phase, whether lost sessions should be retried, and
/// the watchdog task that restarts the handshake when no acknowledgment
/// arrives. Observable status is the online/offline boolean; the transition
/// methods report whether that boolean actually flipped so status events are
/// never repeated for an unchanged state.
#[derive(Debug)]
pub struct SessionController {
    state: SessionState,
    /// Cleared by an explicit disconnect, set again by connect
    auto_reconnect: bool,
    /// Armed watchdog task, if any; at most one at a time
    watchdog: Option<JoinHandle<()>>,
    ack_timeout: Duration,
}

impl SessionController {
    /// Creates a controller in the disconnected state
    pub fn new(ack_timeout: Duration) -> Self {
        SessionController {
            state: SessionState::Disconnected,
            auto_reconnect: false,
            watchdog: None,
            ack_timeout,
        }
    }

    /// Current session phase
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the handshake has completed
    pub fn is_online(&self) -> bool {
        self.state == SessionState::Online
    }

    /// How long to wait for the acknowledgment reply
    pub fn ack_timeout(&self) -> Duration {
        self.ack_timeout
    }

    /// Whether a lost session should be re-established automatically
    pub fn auto_reconnect(&self) -> bool {
        self.auto_reconnect
    }

    /// Enables or disables automatic re-establishment
    pub fn set_auto_reconnect(&mut self, on: bool) {
        self.auto_reconnect = on;
    }

    /// Enters the awaiting-acknowledgment phase after a transport connect
    pub fn begin_handshake(&mut self) {
        self.state = SessionState::AwaitingAck;
    }

    /// Records the acknowledgment reply.
    ///
    /// Returns `true` when this is an actual offline-to-online flip.
    pub fn mark_online(&mut self) -> bool {
        let flipped = self.state != SessionState::Online;
        self.state = SessionState::Online;
        flipped
    }

    /// Records loss or teardown of the session.
    ///
    /// Returns `true` when this is an actual online-to-offline flip.
    pub fn mark_offline(&mut self) -> bool {
        let flipped = self.state == SessionState::Online;
        self.state = SessionState::Disconnected;
        flipped
    }

    /// Arms the watchdog, cancelling any previously armed one first
    pub fn arm_watchdog(&mut self, handle: JoinHandle<()>) {
        self.cancel_watchdog();
        self.watchdog = Some(handle);
    }

    /// Aborts the armed watchdog task, if any
    pub fn cancel_watchdog(&mut self) {
        if let Some(handle) = self.watchdog.take() {
            handle.abort();
        }
    }
}
