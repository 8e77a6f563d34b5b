use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;

/// Sets `should_exit` on Ctrl+C, console close or SIGTERM.
///
/// A second signal after shutdown has started exits immediately.
pub fn set_ctrl_handler(should_exit: Arc<AtomicBool>) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        if should_exit.swap(true, Ordering::SeqCst) {
            // force shutdown
            std::process::exit(130);
        }
        tracing::info!("Shutdown requested");
    })
    .context("Failed to set Ctrl+C handler")
}
