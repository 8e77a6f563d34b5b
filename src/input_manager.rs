//! Input manager supervising the keyboard and gamepad sources.
//!
//! Each source runs one long-lived thread that connects its backend, polls it,
//! and on any failure drops the device, abandons in-flight presses and retries
//! after a back-off. Failures never leave the thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use smallvec::SmallVec;

use crate::normalizer::Normalizer;
use crate::state::AppState;
use crate::state::types::{DeviceKind, RawEvent};

/// Upper bound of any single wait, so exit requests are seen promptly.
const EXIT_CHECK_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("device disconnected")]
    Disconnected,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Backend(String),
}

pub type RawEvents = SmallVec<[RawEvent; 8]>;

/// Platform access to one physical input source.
///
/// The backend exclusively owns its device handle between `connect` and `disconnect`.
pub trait InputBackend: Send {
    fn device(&self) -> DeviceKind;

    /// Acquires the device and returns a human-readable name for it.
    fn connect(&mut self) -> Result<String, DeviceError>;

    /// Returns the raw events seen within `timeout`. May return early.
    fn poll(&mut self, timeout: Duration) -> Result<RawEvents, DeviceError>;

    /// Releases the device. Must be safe to call when not connected.
    fn disconnect(&mut self);
}

/// Supervisor state of one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterStatus {
    Connecting,
    Connected,
    Retry { until: Instant },
}

pub struct SourceAdapter {
    backend: Box<dyn InputBackend>,
    state: Arc<AppState>,
    normalizer: Normalizer,
    status: AdapterStatus,
}

impl SourceAdapter {
    pub fn new(backend: Box<dyn InputBackend>, state: Arc<AppState>) -> Self {
        Self {
            backend,
            state,
            normalizer: Normalizer::new(),
            status: AdapterStatus::Connecting,
        }
    }

    #[inline(always)]
    pub fn device(&self) -> DeviceKind {
        self.backend.device()
    }

    #[inline(always)]
    pub fn status(&self) -> AdapterStatus {
        self.status
    }

    /// Runs one supervisor iteration and returns the resulting status.
    pub fn step(&mut self, now: Instant) -> AdapterStatus {
        let device = self.device();

        self.status = match self.status {
            AdapterStatus::Connecting => match self.backend.connect() {
                Ok(name) => {
                    tracing::info!("{} connected: {}", device, name);
                    self.normalizer.reset();
                    AdapterStatus::Connected
                }
                Err(e) => {
                    let retry = self.state.retry_interval();
                    if let DeviceError::NotFound(_) = e {
                        tracing::info!("{}, retrying in {:?}", e, retry);
                    } else {
                        tracing::warn!("Failed to open {}: {}, retrying in {:?}", device, e, retry);
                    }
                    AdapterStatus::Retry { until: now + retry }
                }
            },
            AdapterStatus::Connected => match self.backend.poll(self.state.poll_interval()) {
                Ok(raw_events) => {
                    let at = Instant::now().max(now);
                    for raw in raw_events {
                        tracing::trace!("{} raw event {:?}", device, raw);
                        for event in self.normalizer.normalize(raw) {
                            self.state.handle_event(event, at);
                        }
                    }
                    self.state.tick(device, at);
                    AdapterStatus::Connected
                }
                Err(e) => {
                    tracing::warn!("{} lost: {}", device, e);
                    self.release();
                    AdapterStatus::Retry {
                        until: now + self.state.retry_interval(),
                    }
                }
            },
            AdapterStatus::Retry { until } => {
                if now >= until {
                    AdapterStatus::Connecting
                } else {
                    AdapterStatus::Retry { until }
                }
            }
        };

        self.status
    }

    /// Drops the device and everything that depended on it.
    fn release(&mut self) {
        self.backend.disconnect();
        self.state.abandon(self.device());
        self.normalizer.reset();
    }

    /// Supervises the source until the application exits.
    pub fn run(mut self) {
        while !self.state.should_exit() {
            if let AdapterStatus::Retry { until } = self.step(Instant::now()) {
                let remaining = until.saturating_duration_since(Instant::now());
                thread::sleep(remaining.min(EXIT_CHECK_SLICE));
            }
        }

        if self.status == AdapterStatus::Connected {
            self.release();
        }
        tracing::debug!("{} adapter stopped", self.device());
    }
}

/// Owns the adapter threads.
pub struct InputManager {
    handles: Vec<JoinHandle<()>>,
}

impl InputManager {
    /// Spawns one supervisor thread per backend.
    pub fn start(
        state: Arc<AppState>,
        backends: Vec<Box<dyn InputBackend>>,
    ) -> anyhow::Result<Self> {
        let mut handles = Vec::with_capacity(backends.len());

        for backend in backends {
            let device = backend.device();
            let adapter = SourceAdapter::new(backend, state.clone());
            let handle = thread::Builder::new()
                .name(format!("{}_adapter", device))
                .spawn(move || adapter.run())
                .map_err(|e| anyhow::anyhow!("Failed to start {} adapter: {}", device, e))?;
            handles.push(handle);
        }

        Ok(Self { handles })
    }

    /// Waits for every adapter thread to finish.
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}
