use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use padhook::config::AppConfig;
use padhook::executor::{ActionWorker, Executor};
use padhook::input_manager::InputManager;
use padhook::state::AppState;
use padhook::{logging, platform, signal};

fn main() -> Result<()> {
    logging::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Config.toml".to_string());

    // Load config or create default if not exists
    let config = match AppConfig::load_or_create(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("Failed to load {}: {:#}; using defaults", config_path, e);
            AppConfig::default()
        }
    };

    let executor = Executor::new(platform::process_control(), platform::input_injector());
    let worker = ActionWorker::start(executor)?;

    let state = Arc::new(AppState::new(&config, worker.clone()));

    signal::set_ctrl_handler(state.should_exit.clone())?;

    tracing::info!(
        "padhook started, target process {}, toggle {}",
        config.target_process,
        config.toggle_button
    );

    let manager = InputManager::start(
        state.clone(),
        vec![platform::keyboard_backend(), platform::gamepad_backend()],
    )?;

    while !state.should_exit() {
        thread::sleep(Duration::from_millis(100));
    }

    manager.join();
    worker.shutdown();
    tracing::info!("padhook stopped");

    Ok(())
}
