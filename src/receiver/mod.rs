//! W800RF32 receiver orchestration
//!
//! This module wires transport signals through frame classification,
//! duplicate suppression, and X10 decoding into the outbound event stream,
//! and runs the connect/acknowledge/watchdog session logic.

pub mod events;
pub mod session;

pub use self::events::RfEvent;
pub use self::session::{SessionController, SessionState};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

use bytes::Bytes;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::core::{Config, ACK_REQUEST};
use crate::protocol::{classify, decode_command, decode_security, DuplicateSuppressor, FrameKind};
use crate::transport::{SerialTransport, SignalSender, Transport, TransportEvent};

/// Capacity of the broadcast channel behind [`RfReceiver::subscribe`]
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Mutable receiver state, all behind one lock.
///
/// Transport callbacks, the watchdog, and caller-thread operations race for
/// this state; nothing reads or writes it without the lock, and the lock is
/// never held across an await.
struct Shared {
    transport: Box<dyn Transport>,
    session: SessionController,
    suppressor: DuplicateSuppressor,
    port_name: String,
    baud_rate: u32,
    /// Consumed by the pump task on the first connect
    signal_rx: Option<mpsc::UnboundedReceiver<TransportEvent>>,
}

struct Inner {
    shared: Mutex<Shared>,
    events: broadcast::Sender<RfEvent>,
    signal_tx: SignalSender,
}

/// W800RF32 RF receiver.
///
/// Owns a [`Transport`], decodes everything the device sends into
/// [`RfEvent`]s, and keeps the session alive: after [`RfReceiver::connect`]
/// the handshake and any reconnects run in the background until
/// [`RfReceiver::disconnect`].
pub struct RfReceiver {
    inner: Arc<Inner>,
}

impl RfReceiver {
    /// Creates a receiver talking to the default serial transport
    pub fn new(config: Config) -> Self {
        let transport = SerialTransport::new(config.port_name.clone(), config.baud_rate);
        Self::with_transport(config, Box::new(transport))
    }

    /// Creates a receiver over a caller-provided transport
    pub fn with_transport(config: Config, transport: Box<dyn Transport>) -> Self {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        RfReceiver {
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared {
                    transport,
                    session: SessionController::new(config.ack_timeout),
                    suppressor: DuplicateSuppressor::new(config.min_repeat_delay),
                    port_name: config.port_name,
                    baud_rate: config.baud_rate,
                    signal_rx: Some(signal_rx),
                }),
                events,
                signal_tx,
            }),
        }
    }

    /// Subscribes to the domain event stream
    pub fn subscribe(&self) -> broadcast::Receiver<RfEvent> {
        self.inner.events.subscribe()
    }

    /// Connects to the receiver hardware.
    ///
    /// Any running session is torn down first, so calling this repeatedly
    /// always restarts the handshake cleanly. Returns whether the transport
    /// link opened; the handshake itself completes in the background and is
    /// reported through [`RfEvent::ConnectionStatusChanged`]. A failed open
    /// is retried on the watchdog interval until [`RfReceiver::disconnect`].
    pub async fn connect(&self) -> bool {
        do_connect(&self.inner)
    }

    /// Disconnects and stops any automatic reconnection
    pub async fn disconnect(&self) {
        let flipped = {
            let mut shared = lock(&self.inner.shared);
            shared.session.set_auto_reconnect(false);
            shared.session.cancel_watchdog();
            shared.transport.disconnect();
            shared.suppressor.reset();
            shared.session.mark_offline()
        };
        if flipped {
            debug!("receiver is offline");
            self.inner
                .emit(RfEvent::ConnectionStatusChanged { connected: false });
        }
    }

    /// Whether the receiver hardware has answered the handshake
    pub fn is_connected(&self) -> bool {
        lock(&self.inner.shared).session.is_online()
    }

    /// Name of the serial port the receiver is attached to
    pub fn port_name(&self) -> String {
        lock(&self.inner.shared).port_name.clone()
    }

    /// Reconfigures the serial port name.
    ///
    /// Takes effect on the next connect; an established session is left
    /// running.
    pub fn set_port_name(&self, name: impl Into<String>) {
        let mut shared = lock(&self.inner.shared);
        shared.port_name = name.into();
        let (name, baud_rate) = (shared.port_name.clone(), shared.baud_rate);
        shared.transport.set_port(&name, baud_rate);
    }
}

impl Inner {
    fn emit(&self, event: RfEvent) {
        // A send error only means nobody is subscribed right now
        let _ = self.events.send(event);
    }
}

/// Locks shared state, recovering from a poisoned lock
fn lock<'a>(shared: &'a Mutex<Shared>) -> MutexGuard<'a, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tears down any running session and starts a new one.
///
/// The watchdog is armed whether or not the transport opened: a failed open
/// rides the same retry path as a missed acknowledgment.
fn do_connect(inner: &Arc<Inner>) -> bool {
    let mut shared = lock(&inner.shared);
    shared.session.cancel_watchdog();
    shared.transport.disconnect();
    shared.session.set_auto_reconnect(true);
    if let Some(signal_rx) = shared.signal_rx.take() {
        tokio::spawn(pump(Arc::downgrade(inner), signal_rx));
    }
    let connected = match shared.transport.connect(inner.signal_tx.clone()) {
        Ok(connected) => connected,
        Err(e) => {
            warn!("transport connect failed: {}", e);
            false
        }
    };
    if connected {
        shared.session.begin_handshake();
    }
    arm_watchdog(inner, &mut shared);
    connected
}

/// Arms the handshake watchdog on the session in `shared`
fn arm_watchdog(inner: &Arc<Inner>, shared: &mut Shared) {
    let timeout = shared.session.ack_timeout();
    let weak = Arc::downgrade(inner);
    shared.session.arm_watchdog(tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        if let Some(inner) = weak.upgrade() {
            watchdog_expired(&inner);
        }
    }));
}

/// Restarts the handshake when the watchdog fires before the session is up
fn watchdog_expired(inner: &Arc<Inner>) {
    let retry = {
        let shared = lock(&inner.shared);
        !shared.session.is_online() && shared.session.auto_reconnect()
    };
    if retry {
        debug!("no acknowledgment within the watchdog window, reconnecting");
        do_connect(inner);
    }
}

/// Drains transport signals for the lifetime of the receiver
async fn pump(inner: Weak<Inner>, mut signal_rx: mpsc::UnboundedReceiver<TransportEvent>) {
    while let Some(signal) = signal_rx.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        match signal {
            TransportEvent::ConnectionStatusChanged(connected) => {
                handle_status(&inner, connected)
            }
            TransportEvent::MessageReceived(data) => handle_frame(&inner, data),
        }
    }
}

/// Reacts to the transport link coming up or going down
fn handle_status(inner: &Arc<Inner>, connected: bool) {
    debug!("serial port connected = {}", connected);
    if connected {
        let mut shared = lock(&inner.shared);
        if let Err(e) = shared.transport.send(&ACK_REQUEST) {
            warn!("failed to send acknowledgment request: {}", e);
        }
    } else {
        let flipped = {
            let mut shared = lock(&inner.shared);
            shared.session.cancel_watchdog();
            let flipped = shared.session.mark_offline();
            if shared.session.auto_reconnect() {
                // Link loss rides the same retry path as a missed handshake
                arm_watchdog(inner, &mut shared);
            }
            flipped
        };
        if flipped {
            debug!("receiver is offline");
            inner.emit(RfEvent::ConnectionStatusChanged { connected: false });
        }
    }
}

/// Classifies, deduplicates, decodes, and emits one inbound frame
fn handle_frame(inner: &Arc<Inner>, data: Bytes) {
    let kind = classify(&data);

    // Repeated messages check
    if kind.is_valid_rf() {
        let mut shared = lock(&inner.shared);
        if !shared.suppressor.accept(&data, Instant::now()) {
            warn!(
                "ignoring message repeated within {:?}",
                shared.suppressor.min_repeat_delay()
            );
            return;
        }
    }

    inner.emit(RfEvent::RawFrameReceived { data: data.clone() });

    match kind {
        FrameKind::AckReply => handle_ack(inner),
        FrameKind::Security => {
            if let Some(security) = decode_security(&data) {
                debug!("security event {:?} address {}", security.event, security.address);
                inner.emit(RfEvent::SecurityReceived {
                    event: security.event,
                    address: security.address,
                });
            }
        }
        FrameKind::Command => {
            if let Some(command) = decode_command(&data) {
                debug!(
                    "command {:?} house {:?} unit {:?}",
                    command.function, command.house_code, command.unit_code
                );
                inner.emit(RfEvent::CommandReceived {
                    function: command.function,
                    house_code: command.house_code,
                    unit_code: command.unit_code,
                });
            }
        }
        FrameKind::Invalid => warn!("bad message received"),
    }
}

/// Completes the handshake when the acknowledgment reply arrives
fn handle_ack(inner: &Arc<Inner>) {
    let flipped = {
        let mut shared = lock(&inner.shared);
        match shared.session.state() {
            SessionState::AwaitingAck => shared.session.mark_online(),
            state => {
                debug!("acknowledgment ignored in state {:?}", state);
                false
            }
        }
    };
    if flipped {
        debug!("receiver is online");
        inner.emit(RfEvent::ConnectionStatusChanged { connected: true });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::core::{Function, HouseCode, SecurityEvent, UnitCode};

    /// Test double standing in for the serial link, driven by a [`MockHandle`]
    struct MockTransport {
        state: Arc<MockState>,
    }

    struct MockState {
        connect_ok: bool,
        connect_calls: Mutex<u32>,
        sent: Mutex<Vec<Vec<u8>>>,
        signals: Mutex<Option<SignalSender>>,
    }

    /// Shared handle for inspecting the mock and injecting signals
    #[derive(Clone)]
    struct MockHandle {
        state: Arc<MockState>,
    }

    fn mock_transport(connect_ok: bool) -> (MockTransport, MockHandle) {
        let state = Arc::new(MockState {
            connect_ok,
            connect_calls: Mutex::new(0),
            sent: Mutex::new(Vec::new()),
            signals: Mutex::new(None),
        });
        (
            MockTransport {
                state: Arc::clone(&state),
            },
            MockHandle { state },
        )
    }

    impl MockHandle {
        fn link_established(&self) {
            self.signal(TransportEvent::ConnectionStatusChanged(true));
        }

        fn link_lost(&self) {
            self.signal(TransportEvent::ConnectionStatusChanged(false));
        }

        fn deliver(&self, frame: &[u8]) {
            self.signal(TransportEvent::MessageReceived(Bytes::copy_from_slice(
                frame,
            )));
        }

        fn signal(&self, event: TransportEvent) {
            let signals = self.state.signals.lock().unwrap();
            signals
                .as_ref()
                .expect("transport not connected")
                .send(event)
                .expect("receiver gone");
        }

        fn connect_calls(&self) -> u32 {
            *self.state.connect_calls.lock().unwrap()
        }

        fn sent(&self) -> Vec<Vec<u8>> {
            self.state.sent.lock().unwrap().clone()
        }
    }

    impl Transport for MockTransport {
        fn connect(&mut self, signals: SignalSender) -> crate::core::Result<bool> {
            *self.state.connect_calls.lock().unwrap() += 1;
            *self.state.signals.lock().unwrap() = Some(signals);
            Ok(self.state.connect_ok)
        }

        fn disconnect(&mut self) {}

        fn set_port(&mut self, _name: &str, _baud_rate: u32) {}

        fn send(&mut self, data: &[u8]) -> crate::core::Result<()> {
            self.state.sent.lock().unwrap().push(data.to_vec());
            Ok(())
        }
    }

    fn receiver_with_mock(connect_ok: bool) -> (RfReceiver, MockHandle) {
        let (transport, handle) = mock_transport(connect_ok);
        let receiver = RfReceiver::with_transport(Config::default(), Box::new(transport));
        (receiver, handle)
    }

    async fn next_event(rx: &mut broadcast::Receiver<RfEvent>) -> RfEvent {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("no event within timeout")
            .expect("event channel closed")
    }

    #[tokio::test]
    async fn test_handshake_goes_online_once() {
        let (receiver, handle) = receiver_with_mock(true);
        let mut rx = receiver.subscribe();

        assert!(receiver.connect().await);
        assert!(!receiver.is_connected());

        handle.link_established();
        handle.deliver(&[0x29]);

        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::RawFrameReceived { .. }
        ));
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::ConnectionStatusChanged { connected: true }
        ));
        assert!(receiver.is_connected());
        assert_eq!(handle.sent(), vec![ACK_REQUEST.to_vec()]);

        // A repeated acknowledgment must not re-emit the status event
        handle.deliver(&[0x29]);
        handle.deliver(&[0x60, 0x9F, 0x00, 0xFF]);
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::RawFrameReceived { .. }
        ));
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::RawFrameReceived { .. }
        ));
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::CommandReceived { .. }
        ));
    }

    #[tokio::test]
    async fn test_command_frame_decoded() {
        let (receiver, handle) = receiver_with_mock(true);
        let mut rx = receiver.subscribe();
        assert!(receiver.connect().await);

        handle.deliver(&[0x60, 0x9F, 0x00, 0xFF]);
        let raw = next_event(&mut rx).await;
        match raw {
            RfEvent::RawFrameReceived { data } => assert_eq!(&data[..], &[0x60, 0x9F, 0x00, 0xFF]),
            other => panic!("expected raw frame, got {:?}", other),
        }
        match next_event(&mut rx).await {
            RfEvent::CommandReceived {
                function,
                house_code,
                unit_code,
            } => {
                assert_eq!(function, Function::On);
                assert_eq!(house_code, HouseCode::A);
                assert_eq!(unit_code, UnitCode::Unit1);
            }
            other => panic!("expected command, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_security_frame_decoded() {
        let (receiver, handle) = receiver_with_mock(true);
        let mut rx = receiver.subscribe();
        assert!(receiver.connect().await);

        handle.deliver(&[0x5A, 0x55, 0x0C, 0xF3]);
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::RawFrameReceived { .. }
        ));
        match next_event(&mut rx).await {
            RfEvent::SecurityReceived { event, address } => {
                assert_eq!(event, SecurityEvent::MotionAlert);
                assert_eq!(address, 0x5A);
            }
            other => panic!("expected security event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_repeated_frame_suppressed() {
        let (receiver, handle) = receiver_with_mock(true);
        let mut rx = receiver.subscribe();
        assert!(receiver.connect().await);

        handle.deliver(&[0x60, 0x9F, 0x00, 0xFF]);
        handle.deliver(&[0x60, 0x9F, 0x00, 0xFF]);
        handle.deliver(&[0x5A, 0x55, 0x0C, 0xF3]);

        // The repeat produces nothing: the next events after the first
        // command pair belong to the security frame
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::RawFrameReceived { .. }
        ));
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::CommandReceived { .. }
        ));
        match next_event(&mut rx).await {
            RfEvent::RawFrameReceived { data } => {
                assert_eq!(&data[..], &[0x5A, 0x55, 0x0C, 0xF3])
            }
            other => panic!("expected security raw frame, got {:?}", other),
        }
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::SecurityReceived { .. }
        ));
    }

    #[tokio::test]
    async fn test_invalid_frame_emits_raw_only() {
        let (receiver, handle) = receiver_with_mock(true);
        let mut rx = receiver.subscribe();
        assert!(receiver.connect().await);

        handle.deliver(&[0x60, 0x60, 0x00, 0x00]);
        handle.deliver(&[0x5A, 0x55, 0x0C, 0xF3]);

        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::RawFrameReceived { .. }
        ));
        // Straight to the next frame's raw event: nothing was decoded
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::RawFrameReceived { .. }
        ));
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::SecurityReceived { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_restarts_handshake() {
        let (receiver, handle) = receiver_with_mock(true);
        assert!(receiver.connect().await);
        assert_eq!(handle.connect_calls(), 1);
        handle.link_established();

        // No acknowledgment arrives; the watchdog reconnects
        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(handle.connect_calls(), 2);

        // The restarted session sends the acknowledgment request again
        handle.link_established();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.sent(), vec![ACK_REQUEST.to_vec(), ACK_REQUEST.to_vec()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_open_retries() {
        let (receiver, handle) = receiver_with_mock(false);
        assert!(!receiver.connect().await);
        assert_eq!(handle.connect_calls(), 1);

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(handle.connect_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_link_loss_goes_offline_and_retries() {
        let (receiver, handle) = receiver_with_mock(true);
        let mut rx = receiver.subscribe();
        assert!(receiver.connect().await);
        handle.link_established();
        handle.deliver(&[0x29]);
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::RawFrameReceived { .. }
        ));
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::ConnectionStatusChanged { connected: true }
        ));

        handle.link_lost();
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::ConnectionStatusChanged { connected: false }
        ));
        assert!(!receiver.is_connected());

        // The same retry path as a missed handshake kicks in
        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(handle.connect_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_stops_retrying() {
        let (receiver, handle) = receiver_with_mock(true);
        let mut rx = receiver.subscribe();
        assert!(receiver.connect().await);
        handle.link_established();
        handle.deliver(&[0x29]);
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::RawFrameReceived { .. }
        ));
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::ConnectionStatusChanged { connected: true }
        ));

        receiver.disconnect().await;
        assert!(matches!(
            next_event(&mut rx).await,
            RfEvent::ConnectionStatusChanged { connected: false }
        ));
        assert!(!receiver.is_connected());

        // Disconnecting again is safe and emits nothing further
        receiver.disconnect().await;
        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(handle.connect_calls(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_set_port_name_does_not_reconnect() {
        let (receiver, handle) = receiver_with_mock(true);
        assert!(receiver.connect().await);
        assert_eq!(handle.connect_calls(), 1);

        receiver.set_port_name("/dev/ttyUSB1");
        assert_eq!(receiver.port_name(), "/dev/ttyUSB1");
        assert_eq!(handle.connect_calls(), 1);
    }
}
