use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{debug, warn};

use crate::core::{Error, Result, RF_FRAME_LEN};
use super::{SignalSender, Transport, TransportEvent};

/// Serial read timeout; doubles as the inter-message gap detector
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Carves the serial byte stream into discrete frames.
///
/// RF frames are fixed 4-byte bursts and are emitted as soon as they are
/// buffered. The wire carries no length marker, so anything shorter (the
/// single-byte acknowledgment reply in practice) is only recognizable by the
/// quiet gap that follows it; the reader flushes the remainder on a read
/// timeout via [`FrameDecoder::flush`].
#[derive(Debug, Default)]
pub struct FrameDecoder;

impl Decoder for FrameDecoder {
    type Item = Bytes;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if src.len() < RF_FRAME_LEN {
            return Ok(None);
        }
        Ok(Some(src.split_to(RF_FRAME_LEN).freeze()))
    }
}

impl FrameDecoder {
    /// Emits whatever is buffered once the line goes quiet
    pub fn flush(&mut self, src: &mut BytesMut) -> Option<Bytes> {
        if src.is_empty() {
            None
        } else {
            Some(src.split().freeze())
        }
    }
}

/// Reader thread state for an open link
struct Reader {
    stop: Arc<AtomicBool>,
    thread: thread::JoinHandle<()>,
}

/// Default transport: a serial port with a background reader thread.
///
/// The reader emits a link-established signal after the port opens, then
/// frames and forwards everything the device sends. An I/O error signals a
/// link loss and ends the thread; an explicit [`Transport::disconnect`]
/// stops and joins the thread silently.
pub struct SerialTransport {
    port_name: String,
    baud_rate: u32,
    writer: Option<Box<dyn serialport::SerialPort>>,
    reader: Option<Reader>,
}

impl SerialTransport {
    /// Creates a transport for the given port; nothing is opened yet
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        SerialTransport {
            port_name: port_name.into(),
            baud_rate,
            writer: None,
            reader: None,
        }
    }
}

impl Transport for SerialTransport {
    fn connect(&mut self, signals: SignalSender) -> Result<bool> {
        self.disconnect();
        let port = match serialport::new(self.port_name.as_str(), self.baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
        {
            Ok(port) => port,
            Err(e) => {
                warn!("failed to open {}: {}", self.port_name, e);
                return Ok(false);
            }
        };
        let reader_port = port
            .try_clone()
            .map_err(|e| Error::transport(e.to_string()))?;
        let stop = Arc::new(AtomicBool::new(false));
        let thread = thread::spawn({
            let stop = Arc::clone(&stop);
            move || read_loop(reader_port, signals, stop)
        });
        debug!("opened {} at {} baud", self.port_name, self.baud_rate);
        self.writer = Some(port);
        self.reader = Some(Reader { stop, thread });
        Ok(true)
    }

    fn disconnect(&mut self) {
        self.writer = None;
        if let Some(reader) = self.reader.take() {
            reader.stop.store(true, Ordering::Relaxed);
            let _ = reader.thread.join();
        }
    }

    fn set_port(&mut self, name: &str, baud_rate: u32) {
        self.port_name = name.to_string();
        self.baud_rate = baud_rate;
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        match self.writer.as_mut() {
            Some(port) => {
                port.write_all(data)?;
                Ok(())
            }
            None => Err(Error::transport("serial port is not open")),
        }
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn read_loop(
    mut port: Box<dyn serialport::SerialPort>,
    signals: SignalSender,
    stop: Arc<AtomicBool>,
) {
    let _ = signals.send(TransportEvent::ConnectionStatusChanged(true));
    let mut decoder = FrameDecoder;
    let mut buffer = BytesMut::with_capacity(64);
    let mut chunk = [0u8; 64];
    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        match port.read(&mut chunk) {
            Ok(0) => continue,
            Ok(n) => {
                buffer.extend_from_slice(&chunk[..n]);
                while let Ok(Some(frame)) = decoder.decode(&mut buffer) {
                    let _ = signals.send(TransportEvent::MessageReceived(frame));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                // Quiet gap: whatever is left is a complete short message
                if let Some(frame) = decoder.flush(&mut buffer) {
                    let _ = signals.send(TransportEvent::MessageReceived(frame));
                }
            }
            Err(e) => {
                warn!("serial read failed: {}", e);
                let _ = signals.send(TransportEvent::ConnectionStatusChanged(false));
                return;
            }
        }
    }
}
