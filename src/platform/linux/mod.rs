//! Linux backends: evdev input, uinput injection and `/proc` process control.

mod gamepad;
mod inject;
mod keyboard;
mod process;

pub use gamepad::EvdevGamepad;
pub use inject::{UinputInjector, VIRTUAL_DEVICE_NAME};
pub use keyboard::EvdevKeyboard;
pub use process::{ProcProcessControl, list_process_names};

use std::os::fd::AsRawFd;

use crate::executor::{InputInjector, ProcessControl};
use crate::input_manager::InputBackend;

pub fn keyboard_backend() -> Box<dyn InputBackend> {
    Box::new(EvdevKeyboard::new())
}

pub fn gamepad_backend() -> Box<dyn InputBackend> {
    Box::new(EvdevGamepad::new())
}

pub fn process_control() -> Box<dyn ProcessControl> {
    Box::new(ProcProcessControl)
}

pub fn input_injector() -> Box<dyn InputInjector> {
    Box::new(UinputInjector::new())
}

/// Switches an evdev device to non-blocking reads.
fn set_nonblocking(dev: &evdev::Device) -> std::io::Result<()> {
    let raw_fd = dev.as_raw_fd();

    // Preserve existing flags; just OR in O_NONBLOCK.
    let current = unsafe { libc::fcntl(raw_fd, libc::F_GETFL) };
    if current < 0 {
        return Err(std::io::Error::last_os_error());
    }

    let rc = unsafe { libc::fcntl(raw_fd, libc::F_SETFL, current | libc::O_NONBLOCK) };
    if rc < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}
