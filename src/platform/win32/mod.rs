//! Windows backends: low-level keyboard hook, XInput polling, `SendInput` and Toolhelp.

mod inject;
mod keyboard;
mod process;
mod xinput;

pub use inject::SendInputInjector;
pub use keyboard::HookKeyboard;
pub use process::{ToolhelpProcessControl, list_process_names};
pub use xinput::XInputGamepad;

use crate::executor::{InputInjector, ProcessControl};
use crate::input_manager::InputBackend;

pub fn keyboard_backend() -> Box<dyn InputBackend> {
    Box::new(HookKeyboard::new())
}

pub fn gamepad_backend() -> Box<dyn InputBackend> {
    Box::new(XInputGamepad::new())
}

pub fn process_control() -> Box<dyn ProcessControl> {
    Box::new(ToolhelpProcessControl)
}

pub fn input_injector() -> Box<dyn InputInjector> {
    Box::new(SendInputInjector)
}
