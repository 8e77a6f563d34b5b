use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_target_process")]
    pub target_process: String,
    #[serde(default = "default_toggle_button")]
    pub toggle_button: String,
    #[serde(default = "default_hold_threshold_ms")]
    pub hold_threshold_ms: u64,
    #[serde(default = "default_toggle_debounce_ms")]
    pub toggle_debounce_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    #[serde(default = "default_stick_mode")]
    pub left_stick_mode: String,
    #[serde(default = "default_stick_mode")]
    pub right_stick_mode: String,
    #[serde(default = "default_axis_threshold")]
    pub axis_threshold: f32,
    #[serde(default = "default_direction_cooldown_ms")]
    pub direction_cooldown_ms: u64,
    #[serde(default = "default_cursor_speed")]
    pub cursor_speed: f32,
    #[serde(default = "default_cursor_deadzone")]
    pub cursor_deadzone: f32,
    #[serde(default = "default_click_button")]
    pub click_button: String,
    #[serde(default = "default_bindings")]
    pub bindings: Vec<ButtonMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ButtonMapping {
    pub button: String,
    pub tap: String,
    #[serde(default)]
    pub hold: Option<String>,
    #[serde(default)]
    pub repeat_ms: Option<u64>,
}

impl ButtonMapping {
    pub fn new(button: &str, tap: &str) -> Self {
        Self {
            button: button.to_string(),
            tap: tap.to_string(),
            hold: None,
            repeat_ms: None,
        }
    }

    pub fn with_hold(mut self, hold: &str) -> Self {
        self.hold = Some(hold.to_string());
        self
    }

    pub fn with_repeat(mut self, repeat_ms: u64) -> Self {
        self.repeat_ms = Some(repeat_ms);
        self
    }
}

fn default_target_process() -> String {
    "chrome.exe".to_string()
}
fn default_toggle_button() -> String {
    "MENU".to_string()
}
fn default_hold_threshold_ms() -> u64 {
    3000
}
fn default_toggle_debounce_ms() -> u64 {
    500
}
fn default_poll_interval_ms() -> u64 {
    10
}
fn default_retry_interval_ms() -> u64 {
    10_000
}
fn default_stick_mode() -> String {
    "keys".to_string()
}
fn default_axis_threshold() -> f32 {
    0.5
}
fn default_direction_cooldown_ms() -> u64 {
    100
}
fn default_cursor_speed() -> f32 {
    25.0
}
fn default_cursor_deadzone() -> f32 {
    0.1
}
fn default_click_button() -> String {
    "A".to_string()
}
fn default_bindings() -> Vec<ButtonMapping> {
    vec![
        ButtonMapping::new("F9", "KILL"),
        ButtonMapping::new("XBOX", "ALT+TAB").with_hold("KILL"),
        ButtonMapping::new("LB", "E"),
        ButtonMapping::new("RB", "Q"),
        ButtonMapping::new("A", "ENTER"),
        ButtonMapping::new("B", "BACKSPACE"),
        ButtonMapping::new("X", "X"),
        ButtonMapping::new("Y", "Y"),
        ButtonMapping::new("UP", "UP"),
        ButtonMapping::new("DOWN", "DOWN"),
        ButtonMapping::new("LEFT", "LEFT"),
        ButtonMapping::new("RIGHT", "RIGHT"),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_process: default_target_process(),
            toggle_button: default_toggle_button(),
            hold_threshold_ms: default_hold_threshold_ms(),
            toggle_debounce_ms: default_toggle_debounce_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            retry_interval_ms: default_retry_interval_ms(),
            left_stick_mode: default_stick_mode(),
            right_stick_mode: default_stick_mode(),
            axis_threshold: default_axis_threshold(),
            direction_cooldown_ms: default_direction_cooldown_ms(),
            cursor_speed: default_cursor_speed(),
            cursor_deadzone: default_cursor_deadzone(),
            click_button: default_click_button(),
            bindings: default_bindings(),
        }
    }
}

impl AppConfig {
    /// Load config from file, or create default if not exists
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if !path.as_ref().exists() {
            let default_config = Self::default();
            default_config.save_to_file(&path)?;
            tracing::info!("Created default config at {}", path.as_ref().display());
            return Ok(default_config);
        }
        Self::load_from_file(path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.validate();
        Ok(config)
    }

    /// Clamps numeric settings into their usable ranges.
    pub fn validate(&mut self) {
        if self.hold_threshold_ms < 50 {
            self.hold_threshold_ms = 50;
        }
        self.poll_interval_ms = self.poll_interval_ms.clamp(1, 100);
        if self.retry_interval_ms < 500 {
            self.retry_interval_ms = 500;
        }
        if !self.axis_threshold.is_finite() {
            self.axis_threshold = default_axis_threshold();
        }
        self.axis_threshold = self.axis_threshold.clamp(0.0, 1.0);
        if !self.cursor_deadzone.is_finite() {
            self.cursor_deadzone = default_cursor_deadzone();
        }
        self.cursor_deadzone = self.cursor_deadzone.clamp(0.0, 1.0);
        if !self.cursor_speed.is_finite() || self.cursor_speed < 0.0 {
            self.cursor_speed = default_cursor_speed();
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        // Add comments to make the config file more readable
        let commented = format!(
            "target_process = {:?}       # Process killed by KILL actions\n\
             toggle_button = {:?}            # Button that pauses/resumes every other binding\n\
             hold_threshold_ms = {}           # Press length (ms) that turns a tap into a hold\n\
             toggle_debounce_ms = {}           # Minimum time between two toggles (ms)\n\
             poll_interval_ms = {}              # Device poll period (ms)\n\
             retry_interval_ms = {}          # Wait before reconnecting a lost device (ms)\n\n\
             # Analog sticks: \"keys\" (arrow keys), \"cursor\" (mouse) or \"off\"\n\
             left_stick_mode = {:?}\n\
             right_stick_mode = {:?}\n\
             axis_threshold = {:?}              # Deflection needed for an arrow key (keys mode)\n\
             direction_cooldown_ms = {}        # Repeat period of a held stick direction (ms)\n\
             cursor_speed = {:?}               # Pixels per poll at full deflection (cursor mode)\n\
             cursor_deadzone = {:?}             # Deflection ignored around center (cursor mode)\n\
             click_button = {:?}                 # Left click while a stick is in cursor mode\n\n\
             # Button bindings\n\
             # Actions: KILL, KILL:<process>, CLICK, or keys joined with '+' (ALT+TAB)\n\n",
            self.target_process,
            self.toggle_button,
            self.hold_threshold_ms,
            self.toggle_debounce_ms,
            self.poll_interval_ms,
            self.retry_interval_ms,
            self.left_stick_mode,
            self.right_stick_mode,
            self.axis_threshold,
            self.direction_cooldown_ms,
            self.cursor_speed,
            self.cursor_deadzone,
            self.click_button,
        );

        let mut result = commented;
        for mapping in &self.bindings {
            result.push_str("[[bindings]]\n");
            result.push_str(&format!(
                "button = {:?}            # Physical button or key\n",
                mapping.button
            ));
            result.push_str(&format!(
                "tap = {:?}               # Fired on press (or on short release when hold is set)\n",
                mapping.tap
            ));
            if let Some(hold) = &mapping.hold {
                result.push_str(&format!(
                    "hold = {:?}              # Fired on release after hold_threshold_ms\n",
                    hold
                ));
            }
            if let Some(repeat_ms) = mapping.repeat_ms {
                result.push_str(&format!(
                    "repeat_ms = {}           # Re-fire period while held\n",
                    repeat_ms
                ));
            }
            result.push('\n');
        }

        fs::write(path, result)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.target_process, "chrome.exe");
        assert_eq!(config.toggle_button, "MENU");
        assert_eq!(config.hold_threshold_ms, 3000);
        assert_eq!(config.retry_interval_ms, 10_000);
        assert_eq!(config.bindings.len(), 12);
        assert_eq!(config.bindings[1].hold.as_deref(), Some("KILL"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str("target_process = \"firefox.exe\"\n").unwrap();
        assert_eq!(config.target_process, "firefox.exe");
        assert_eq!(config.left_stick_mode, "keys");
        assert_eq!(config.right_stick_mode, "keys");
        assert_eq!(config.bindings, default_bindings());
    }

    #[test]
    fn test_validate_clamps() {
        let mut config = AppConfig {
            hold_threshold_ms: 1,
            poll_interval_ms: 0,
            retry_interval_ms: 10,
            axis_threshold: 4.0,
            cursor_deadzone: -1.0,
            cursor_speed: f32::NAN,
            ..AppConfig::default()
        };
        config.validate();

        assert_eq!(config.hold_threshold_ms, 50);
        assert_eq!(config.poll_interval_ms, 1);
        assert_eq!(config.retry_interval_ms, 500);
        assert_eq!(config.axis_threshold, 1.0);
        assert_eq!(config.cursor_deadzone, 0.0);
        assert_eq!(config.cursor_speed, 25.0);
    }
}
