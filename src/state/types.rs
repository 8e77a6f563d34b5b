//! Type definitions for input/output handling.

use std::fmt;
use std::time::{Duration, Instant};

use smallvec::SmallVec;

/// Marker value to identify simulated input events.
pub const SIMULATED_EVENT_MARKER: usize = 0x5048;

/// Physical device a source adapter owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Keyboard,
    Gamepad,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Keyboard => write!(f, "keyboard"),
            DeviceKind::Gamepad => write!(f, "gamepad"),
        }
    }
}

/// Where a logical button comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonSource {
    Keyboard,
    GamepadDigital,
    GamepadHat,
}

impl ButtonSource {
    #[inline(always)]
    pub fn device(self) -> DeviceKind {
        match self {
            ButtonSource::Keyboard => DeviceKind::Keyboard,
            ButtonSource::GamepadDigital | ButtonSource::GamepadHat => DeviceKind::Gamepad,
        }
    }
}

/// Source-independent button identity (`"f9"`, `"xbox"`, `"lb"`, `"up"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicalButton {
    pub id: &'static str,
    pub source: ButtonSource,
}

impl LogicalButton {
    pub const fn new(id: &'static str, source: ButtonSource) -> Self {
        Self { id, source }
    }
}

impl fmt::Display for LogicalButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Analog stick axes. Negative Y is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

impl Axis {
    pub const COUNT: usize = 4;

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Normalized input event, the only shape consumers ever see.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    ButtonDown(LogicalButton),
    ButtonUp(LogicalButton),
    AxisMoved(Axis, f32),
}

/// Raw, backend-level input event. Codes use evdev names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    /// Keyboard key transition (`KEY_F9`).
    Key { code: &'static str, pressed: bool },
    /// Gamepad digital button transition (`BTN_MODE`).
    Button { code: &'static str, pressed: bool },
    /// Directional pad vector, `y` positive is up.
    Hat { x: i8, y: i8 },
    /// Raw stick value in the signed 16-bit range (`ABS_X`).
    Axis { code: &'static str, value: i32 },
}

/// Keys the injectors know how to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Alt,
    Ctrl,
    Shift,
    Meta,
    Tab,
    Enter,
    Backspace,
    Escape,
    Space,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1-F12
    F(u8),
    /// Uppercase ASCII letter or digit
    Char(char),
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::F(n) => write!(f, "F{}", n),
            KeyCode::Char(c) => write!(f, "{}", c),
            other => write!(f, "{}", super::parsing::key_code_name(*other)),
        }
    }
}

/// Ordered key chord. Pressed in order, released in reverse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyStroke(pub SmallVec<[KeyCode; 4]>);

impl KeyStroke {
    pub fn single(key: KeyCode) -> Self {
        let mut keys = SmallVec::new();
        keys.push(key);
        Self(keys)
    }

    pub fn keys(&self) -> &[KeyCode] {
        &self.0
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

/// Synthetic OS-level action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    TerminateProcess(String),
    Key(KeyStroke),
    Click,
    MoveCursor { dx: i32, dy: i32 },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::TerminateProcess(name) => write!(f, "KILL:{}", name),
            Action::Key(stroke) => write!(f, "{}", stroke),
            Action::Click => write!(f, "CLICK"),
            Action::MoveCursor { dx, dy } => write!(f, "MOVE({}, {})", dx, dy),
        }
    }
}

/// Actions bound to one logical button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonBinding {
    pub tap: Action,
    /// Present for dual-action buttons.
    pub hold: Option<Action>,
    /// Turbo period for held single-action buttons.
    pub repeat: Option<Duration>,
}

impl ButtonBinding {
    #[inline(always)]
    pub fn is_dual_action(&self) -> bool {
        self.hold.is_some()
    }
}

/// In-flight press of one logical button.
#[derive(Debug, Clone, Copy)]
pub struct PressRecord {
    pub started: Instant,
    pub last_fired: Instant,
}

/// Receives the actions the state decides to fire.
pub trait ActionSink: Send + Sync {
    fn dispatch(&self, action: Action);
}
