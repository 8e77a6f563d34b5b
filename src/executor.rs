//! Action execution against the operating system.
//!
//! The OS capabilities sit behind [`ProcessControl`] and [`InputInjector`] so the
//! dispatch path can run against in-memory doubles. [`ActionWorker`] moves the
//! actual calls off the adapter threads.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::state::types::{Action, ActionSink, KeyStroke};

/// Result of a terminate-by-name request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminateOutcome {
    /// Number of processes killed.
    Terminated(usize),
    NotFound,
}

impl fmt::Display for TerminateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminateOutcome::Terminated(n) => write!(f, "terminated {} process(es)", n),
            TerminateOutcome::NotFound => write!(f, "no matching process"),
        }
    }
}

pub trait ProcessControl: Send + Sync {
    /// Kills every process whose image name matches `name`, case-insensitively.
    fn terminate_by_name(&self, name: &str) -> anyhow::Result<TerminateOutcome>;
}

pub trait InputInjector: Send + Sync {
    /// Presses the chord in order and releases it in reverse.
    fn send_key(&self, stroke: &KeyStroke) -> anyhow::Result<()>;
    fn move_cursor_relative(&self, dx: i32, dy: i32) -> anyhow::Result<()>;
    /// Left button down and up.
    fn click(&self) -> anyhow::Result<()>;
}

pub struct Executor {
    process: Box<dyn ProcessControl>,
    input: Box<dyn InputInjector>,
}

impl Executor {
    pub fn new(process: Box<dyn ProcessControl>, input: Box<dyn InputInjector>) -> Self {
        Self { process, input }
    }

    pub fn execute(&self, action: &Action) -> anyhow::Result<()> {
        match action {
            Action::TerminateProcess(name) => {
                let outcome = self.process.terminate_by_name(name)?;
                tracing::info!("{}: {}", action, outcome);
            }
            Action::Key(stroke) => {
                self.input.send_key(stroke)?;
                tracing::info!("Sent {}", stroke);
            }
            Action::Click => {
                self.input.click()?;
                tracing::info!("Clicked");
            }
            Action::MoveCursor { dx, dy } => {
                self.input.move_cursor_relative(*dx, *dy)?;
                tracing::trace!("Moved cursor by ({}, {})", dx, dy);
            }
        }
        Ok(())
    }
}

/// Runs actions inline on the calling thread.
impl ActionSink for Executor {
    fn dispatch(&self, action: Action) {
        if let Err(e) = self.execute(&action) {
            tracing::warn!("Action {} failed: {:#}", action, e);
        }
    }
}

/// Queue of actions drained by a dedicated thread.
pub struct ActionWorker {
    sender: Sender<Action>,
    stop: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ActionWorker {
    pub fn start(executor: Executor) -> anyhow::Result<Arc<Self>> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let stop = Arc::new(AtomicBool::new(false));

        let worker_stop = stop.clone();
        let handle = thread::Builder::new()
            .name("action_worker".to_string())
            .spawn(move || Self::run(executor, receiver, worker_stop))
            .map_err(|e| anyhow::anyhow!("Failed to start action worker: {}", e))?;

        Ok(Arc::new(Self {
            sender,
            stop,
            handle: Mutex::new(Some(handle)),
        }))
    }

    fn run(executor: Executor, receiver: Receiver<Action>, stop: Arc<AtomicBool>) {
        while !stop.load(Ordering::Relaxed) {
            match receiver.recv_timeout(Duration::from_millis(100)) {
                Ok(action) => executor.dispatch(action),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        tracing::debug!("Action worker stopped");
    }

    /// Stops the worker thread and waits for it. Queued actions are dropped.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Relaxed);
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl ActionSink for ActionWorker {
    #[inline]
    fn dispatch(&self, action: Action) {
        // Non-blocking send keeps adapter threads responsive
        if self.sender.send(action).is_err() {
            tracing::debug!("Action worker gone, action dropped");
        }
    }
}
