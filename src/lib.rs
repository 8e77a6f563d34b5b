//! Core modules for the padhook input dispatcher.
//!
//! The binary wires these together; they are exposed as a library so the
//! integration tests can drive the dispatcher without real devices.

pub mod config;
pub mod executor;
pub mod input_manager;
pub mod logging;
pub mod normalizer;
pub mod platform;
pub mod signal;
pub mod state;
pub mod util;

// Re-export types for test modules
pub use config::{AppConfig, ButtonMapping};
pub use executor::{ActionWorker, Executor, InputInjector, ProcessControl, TerminateOutcome};
pub use state::AppState;
