//! Serial transport for TiltSketch
//!
//! Opens the device (or a recorded log for replay) on a small private tokio runtime and
//! forwards decoded lines to the UI thread over a channel. Reconnecting tears down the
//! running reader and starts a fresh one with its own channel, so nothing from the old
//! connection can leak into the new one.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_serial::{SerialPortBuilderExt, SerialPortType};

use crate::error::{SerialError, SerialResult};
use crate::telemetry::LineDecoder;

const READ_BUFFER_SIZE: usize = 1024;

/// Where telemetry comes from
#[derive(Debug, Clone, PartialEq)]
pub enum TransportSpec {
    /// A serial or USB CDC device
    Serial { path: String, baud_rate: u32 },
    /// A text file of previously captured device output, played back line by line
    Replay { path: PathBuf, interval: Duration },
}

impl TransportSpec {
    pub fn describe(&self) -> String {
        match self {
            TransportSpec::Serial { path, baud_rate } => format!("{path} @ {baud_rate} baud"),
            TransportSpec::Replay { path, .. } => format!("replay of {}", path.display()),
        }
    }
}

/// Messages from the reader task to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum SerialEvent {
    /// Transport is open; carries a human readable description
    Opened(String),
    /// One trimmed, non-empty line of device output
    Line(String),
    /// Stream ended
    Disconnected,
    /// Open or read failure, already phrased for the scrollback
    Error(String),
}

/// Port kind as reported by the OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortKind {
    Usb { vid: u16, pid: u16, product: Option<String> },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSummary {
    pub name: String,
    pub kind: PortKind,
}

impl PortSummary {
    pub fn is_usb(&self) -> bool {
        matches!(self.kind, PortKind::Usb { .. })
    }
}

/// Enumerate the serial ports visible to this machine
pub fn list_ports() -> SerialResult<Vec<PortSummary>> {
    let ports = tokio_serial::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|info| PortSummary {
            name: info.port_name,
            kind: match info.port_type {
                SerialPortType::UsbPort(usb) => PortKind::Usb {
                    vid: usb.vid,
                    pid: usb.pid,
                    product: usb.product,
                },
                _ => PortKind::Other,
            },
        })
        .collect())
}

/// Pick the port to open: the configured one, else the first USB port, else the first port
pub fn choose_port(configured: Option<&str>, ports: &[PortSummary]) -> Option<String> {
    if let Some(path) = configured.map(str::trim).filter(|p| !p.is_empty()) {
        return Some(path.to_string());
    }
    ports
        .iter()
        .find(|p| p.is_usb())
        .or_else(|| ports.first())
        .map(|p| p.name.clone())
}

/// Owns the background reader and the receiving end of its event channel
pub struct SerialController {
    runtime: Option<tokio::runtime::Runtime>,
    task: Option<JoinHandle<()>>,
    events: Option<UnboundedReceiver<SerialEvent>>,
}

impl SerialController {
    pub fn new() -> Self {
        Self {
            runtime: None,
            task: None,
            events: None,
        }
    }

    /// Stop any running reader and start a new one for `spec`
    pub fn connect(&mut self, spec: TransportSpec) -> SerialResult<()> {
        self.disconnect();

        let runtime = match self.runtime.take() {
            Some(rt) => rt,
            None => tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("tiltsketch-serial")
                .enable_all()
                .build()
                .map_err(|e| SerialError::RuntimeUnavailable { reason: e.to_string() })?,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        log::info!("Starting reader for {}", spec.describe());
        let task = match spec {
            TransportSpec::Serial { path, baud_rate } => {
                runtime.spawn(async move { run_serial(path, baud_rate, tx).await })
            }
            TransportSpec::Replay { path, interval } => {
                runtime.spawn(async move { run_replay(path, interval, tx).await })
            }
        };

        self.runtime = Some(runtime);
        self.task = Some(task);
        self.events = Some(rx);
        Ok(())
    }

    /// Abort the running reader, if any
    pub fn disconnect(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::info!("Reader stopped");
        }
        self.events = None;
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Drain every event that has arrived since the last call. Never blocks.
    pub fn poll(&mut self) -> Vec<SerialEvent> {
        let mut drained = Vec::new();
        let Some(rx) = self.events.as_mut() else {
            return drained;
        };
        loop {
            match rx.try_recv() {
                Ok(event) => drained.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.events = None;
                    break;
                }
            }
        }
        drained
    }
}

impl Default for SerialController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SerialController {
    fn drop(&mut self) {
        self.disconnect();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

async fn run_serial(path: String, baud_rate: u32, tx: UnboundedSender<SerialEvent>) {
    // USB CDC devices ignore the baud rate, but the port builder still needs one
    let stream = match tokio_serial::new(&path, baud_rate).open_native_async() {
        Ok(stream) => stream,
        Err(e) => {
            let err = SerialError::OpenFailed { path, reason: e.to_string() };
            log::warn!("{err}");
            let _ = tx.send(SerialEvent::Error(format!("Error: {err}")));
            return;
        }
    };

    log::info!("Opened {path} at {baud_rate} baud");
    if tx.send(SerialEvent::Opened(path)).is_err() {
        return;
    }
    pump_lines(stream, &tx).await;
}

async fn run_replay(path: PathBuf, interval: Duration, tx: UnboundedSender<SerialEvent>) {
    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(e) => {
            let err = SerialError::ReplayUnavailable {
                path: path.display().to_string(),
                reason: e.to_string(),
            };
            log::warn!("{err}");
            let _ = tx.send(SerialEvent::Error(format!("Error: {err}")));
            return;
        }
    };

    if tx.send(SerialEvent::Opened(path.display().to_string())).is_err() {
        return;
    }

    let mut decoder = LineDecoder::new();
    for chunk in data.split_inclusive(|b| *b == b'\n') {
        for line in decoder.push(chunk) {
            if tx.send(SerialEvent::Line(line)).is_err() {
                return;
            }
        }
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }
    finish_stream(&mut decoder, &tx);
}

/// Read chunks until end of stream or a hard error, forwarding each decoded line
async fn pump_lines<R>(mut reader: R, tx: &UnboundedSender<SerialEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut decoder = LineDecoder::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                for line in decoder.push(&buf[..n]) {
                    log::debug!("rx: {line}");
                    if tx.send(SerialEvent::Line(line)).is_err() {
                        return;
                    }
                }
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::Interrupted) => {
                continue;
            }
            Err(e) => {
                let err = SerialError::from(e);
                log::warn!("{err}");
                let _ = tx.send(SerialEvent::Error(err.to_string()));
                break;
            }
        }
    }
    finish_stream(&mut decoder, tx);
}

fn finish_stream(decoder: &mut LineDecoder, tx: &UnboundedSender<SerialEvent>) {
    if let Some(tail) = decoder.finish() {
        let _ = tx.send(SerialEvent::Line(tail));
    }
    let _ = tx.send(SerialEvent::Disconnected);
}
