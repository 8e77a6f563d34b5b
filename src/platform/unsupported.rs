//! Placeholder backends for targets without an input implementation.
//!
//! Adapters built on these stay in their retry loop forever.

use std::time::Duration;

use crate::executor::{InputInjector, ProcessControl, TerminateOutcome};
use crate::input_manager::{DeviceError, InputBackend, RawEvents};
use crate::state::types::{DeviceKind, KeyStroke};

struct UnsupportedBackend(DeviceKind);

impl InputBackend for UnsupportedBackend {
    fn device(&self) -> DeviceKind {
        self.0
    }

    fn connect(&mut self) -> Result<String, DeviceError> {
        Err(DeviceError::Backend(format!(
            "no {} backend for this platform",
            self.0
        )))
    }

    fn poll(&mut self, _timeout: Duration) -> Result<RawEvents, DeviceError> {
        Err(DeviceError::Disconnected)
    }

    fn disconnect(&mut self) {}
}

struct UnsupportedProcessControl;

impl ProcessControl for UnsupportedProcessControl {
    fn terminate_by_name(&self, name: &str) -> anyhow::Result<TerminateOutcome> {
        anyhow::bail!("Cannot terminate {}: unsupported platform", name)
    }
}

struct UnsupportedInjector;

impl InputInjector for UnsupportedInjector {
    fn send_key(&self, stroke: &KeyStroke) -> anyhow::Result<()> {
        anyhow::bail!("Cannot send {}: unsupported platform", stroke)
    }

    fn move_cursor_relative(&self, _dx: i32, _dy: i32) -> anyhow::Result<()> {
        anyhow::bail!("Cursor injection unsupported on this platform")
    }

    fn click(&self) -> anyhow::Result<()> {
        anyhow::bail!("Click injection unsupported on this platform")
    }
}

pub fn keyboard_backend() -> Box<dyn InputBackend> {
    Box::new(UnsupportedBackend(DeviceKind::Keyboard))
}

pub fn gamepad_backend() -> Box<dyn InputBackend> {
    Box::new(UnsupportedBackend(DeviceKind::Gamepad))
}

pub fn process_control() -> Box<dyn ProcessControl> {
    Box::new(UnsupportedProcessControl)
}

pub fn input_injector() -> Box<dyn InputInjector> {
    Box::new(UnsupportedInjector)
}
