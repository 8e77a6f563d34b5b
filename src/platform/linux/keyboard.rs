use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use evdev::{Device, InputEventKind, Key};

use crate::input_manager::{DeviceError, InputBackend, RawEvents};
use crate::state::types::{DeviceKind, RawEvent};

use super::inject::VIRTUAL_DEVICE_NAME;

const KEY_CODES: [(Key, &str); 15] = [
    (Key::KEY_F1, "KEY_F1"),
    (Key::KEY_F2, "KEY_F2"),
    (Key::KEY_F3, "KEY_F3"),
    (Key::KEY_F4, "KEY_F4"),
    (Key::KEY_F5, "KEY_F5"),
    (Key::KEY_F6, "KEY_F6"),
    (Key::KEY_F7, "KEY_F7"),
    (Key::KEY_F8, "KEY_F8"),
    (Key::KEY_F9, "KEY_F9"),
    (Key::KEY_F10, "KEY_F10"),
    (Key::KEY_F11, "KEY_F11"),
    (Key::KEY_F12, "KEY_F12"),
    (Key::KEY_PAUSE, "KEY_PAUSE"),
    (Key::KEY_SCROLLLOCK, "KEY_SCROLLLOCK"),
    (Key::KEY_INSERT, "KEY_INSERT"),
];

fn key_code_name(key: Key) -> Option<&'static str> {
    KEY_CODES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, name)| *name)
}

/// Find all keyboard devices on the system, skipping our own virtual device
fn find_keyboards() -> Vec<(PathBuf, Device)> {
    evdev::enumerate()
        .filter(|(_, device)| device.name() != Some(VIRTUAL_DEVICE_NAME))
        .filter(|(_, device)| {
            // A keyboard should support common keys
            device.supported_keys().is_some_and(|keys| {
                keys.contains(Key::KEY_ENTER)
                    && keys.contains(Key::KEY_SPACE)
                    && keys.contains(Key::KEY_A)
                    && keys.contains(Key::KEY_Z)
            })
        })
        .collect()
}

/// Every evdev keyboard, read without grabbing.
#[derive(Default)]
pub struct EvdevKeyboard {
    devices: Vec<Device>,
}

impl EvdevKeyboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputBackend for EvdevKeyboard {
    fn device(&self) -> DeviceKind {
        DeviceKind::Keyboard
    }

    fn connect(&mut self) -> Result<String, DeviceError> {
        let keyboards = find_keyboards();
        if keyboards.is_empty() {
            return Err(DeviceError::NotFound(
                "keyboard (is the user in the 'input' group?)".to_string(),
            ));
        }

        let mut names = Vec::with_capacity(keyboards.len());
        for (path, device) in keyboards {
            if let Err(e) = super::set_nonblocking(&device) {
                tracing::warn!("Skipping keyboard {}: {}", path.display(), e);
                continue;
            }
            names.push(device.name().unwrap_or("Unknown").to_string());
            self.devices.push(device);
        }

        if self.devices.is_empty() {
            return Err(DeviceError::Backend("no readable keyboard".to_string()));
        }
        Ok(names.join(", "))
    }

    fn poll(&mut self, timeout: Duration) -> Result<RawEvents, DeviceError> {
        thread::sleep(timeout);

        let mut events = RawEvents::new();
        self.devices.retain_mut(|device| {
            let read = device.fetch_events().map(|iter| {
                for ev in iter {
                    // Value 2 is autorepeat
                    if let InputEventKind::Key(key) = ev.kind()
                        && ev.value() < 2
                        && let Some(code) = key_code_name(key)
                    {
                        events.push(RawEvent::Key {
                            code,
                            pressed: ev.value() == 1,
                        });
                    }
                }
            });

            match read {
                Ok(()) => true,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => true,
                Err(e) => {
                    // Only this keyboard is lost; the others keep working
                    tracing::warn!(
                        "Dropping keyboard {}: {}",
                        device.name().unwrap_or("Unknown"),
                        e
                    );
                    false
                }
            }
        });

        if self.devices.is_empty() {
            return Err(DeviceError::Disconnected);
        }
        Ok(events)
    }

    fn disconnect(&mut self) {
        self.devices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_code_name() {
        assert_eq!(key_code_name(Key::KEY_F9), Some("KEY_F9"));
        assert_eq!(key_code_name(Key::KEY_SCROLLLOCK), Some("KEY_SCROLLLOCK"));
        assert_eq!(key_code_name(Key::KEY_A), None);
    }

    #[test]
    fn test_poll_without_devices_is_disconnected() {
        let mut keyboard = EvdevKeyboard::new();
        assert!(matches!(
            keyboard.poll(Duration::ZERO),
            Err(DeviceError::Disconnected)
        ));
    }
}
