//! Application state management.

pub mod axis;
mod dispatcher;
pub mod parsing;
pub mod toggle;
pub mod types;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{AppConfig, ButtonMapping};

use axis::{AxisMapper, StickMode};
use toggle::ToggleState;

pub use types::*;

pub struct AppState {
    pub should_exit: Arc<AtomicBool>,
    toggle: ToggleState,
    toggle_button: Option<LogicalButton>,
    click_button: Option<LogicalButton>,
    bindings: HashMap<LogicalButton, ButtonBinding>,
    hold_threshold: Duration,
    pub(crate) pressed: scc::HashMap<LogicalButton, PressRecord>,
    axis_mapper: Mutex<AxisMapper>,
    sink: Arc<dyn ActionSink>,
    poll_interval: Duration,
    retry_interval: Duration,
}

impl AppState {
    /// Builds the state from configuration.
    ///
    /// Invalid entries are logged and replaced by their own default; the rest
    /// of the configuration is kept.
    pub fn new(config: &AppConfig, sink: Arc<dyn ActionSink>) -> Self {
        let toggle_button = Self::parse_optional_button("toggle", &config.toggle_button, "MENU");
        let click_button = Self::parse_optional_button("click", &config.click_button, "A");

        let bindings = Self::create_bindings(config);

        let modes = [
            Self::parse_stick_mode("left", &config.left_stick_mode),
            Self::parse_stick_mode("right", &config.right_stick_mode),
        ];
        let axis_mapper = AxisMapper::new(
            modes,
            config.axis_threshold,
            Duration::from_millis(config.direction_cooldown_ms),
            config.cursor_speed,
            config.cursor_deadzone,
        );

        Self {
            should_exit: Arc::new(AtomicBool::new(false)),
            toggle: ToggleState::new(Duration::from_millis(config.toggle_debounce_ms)),
            toggle_button,
            click_button,
            bindings,
            hold_threshold: Duration::from_millis(config.hold_threshold_ms),
            pressed: scc::HashMap::new(),
            axis_mapper: Mutex::new(axis_mapper),
            sink,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            retry_interval: Duration::from_millis(config.retry_interval_ms),
        }
    }

    /// Empty names disable the button.
    fn parse_optional_button(role: &str, name: &str, default: &str) -> Option<LogicalButton> {
        if name.trim().is_empty() {
            return None;
        }
        parsing::button_name_to_button(name).or_else(|| {
            tracing::warn!("Invalid {} button {:?}, using {}", role, name, default);
            parsing::button_name_to_button(default)
        })
    }

    fn parse_stick_mode(stick: &str, name: &str) -> StickMode {
        name.parse().unwrap_or_else(|e| {
            tracing::warn!("{} for the {} stick, using {:?}", e, stick, StickMode::default());
            StickMode::default()
        })
    }

    /// Resolves every `[[bindings]]` entry. Entries that fail to parse are skipped.
    pub fn create_bindings(config: &AppConfig) -> HashMap<LogicalButton, ButtonBinding> {
        let mut bindings = HashMap::new();

        for mapping in &config.bindings {
            match Self::parse_binding(mapping, &config.target_process) {
                Ok((button, binding)) => {
                    bindings.insert(button, binding);
                }
                Err(e) => tracing::warn!("Skipping binding for {:?}: {}", mapping.button, e),
            }
        }

        bindings
    }

    fn parse_binding(
        mapping: &ButtonMapping,
        target_process: &str,
    ) -> anyhow::Result<(LogicalButton, ButtonBinding)> {
        let button = parsing::button_name_to_button(&mapping.button)
            .ok_or_else(|| anyhow::anyhow!("Invalid button: {}", mapping.button))?;

        let tap = parsing::parse_action(&mapping.tap, target_process)
            .ok_or_else(|| anyhow::anyhow!("Invalid tap action: {}", mapping.tap))?;

        let hold = match &mapping.hold {
            Some(hold) => Some(
                parsing::parse_action(hold, target_process)
                    .ok_or_else(|| anyhow::anyhow!("Invalid hold action: {}", hold))?,
            ),
            None => None,
        };

        // Dual-action buttons resolve on release and never repeat
        let repeat = match (&hold, mapping.repeat_ms) {
            (None, Some(ms)) if ms > 0 => Some(Duration::from_millis(ms.max(10))),
            _ => None,
        };

        Ok((button, ButtonBinding { tap, hold, repeat }))
    }

    /// Signals the application to exit.
    pub fn exit(&self) {
        self.should_exit.store(true, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn should_exit(&self) -> bool {
        self.should_exit.load(Ordering::Relaxed)
    }

    /// Whether actions are currently allowed to fire.
    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.toggle.is_active()
    }

    #[inline]
    pub fn is_pressed(&self, button: &LogicalButton) -> bool {
        self.pressed.contains_sync(button)
    }

    pub fn pressed_count(&self) -> usize {
        self.pressed.len()
    }

    pub fn axis_value(&self, axis: Axis) -> f32 {
        self.lock_axis().value(axis)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }
}
