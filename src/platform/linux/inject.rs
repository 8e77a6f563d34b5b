use std::sync::Mutex;

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key, RelativeAxisType};

use crate::executor::InputInjector;
use crate::state::types::{KeyCode, KeyStroke};

/// Name of the uinput device, excluded from keyboard discovery.
pub const VIRTUAL_DEVICE_NAME: &str = "padhook virtual input";

const LETTERS: [Key; 26] = [
    Key::KEY_A,
    Key::KEY_B,
    Key::KEY_C,
    Key::KEY_D,
    Key::KEY_E,
    Key::KEY_F,
    Key::KEY_G,
    Key::KEY_H,
    Key::KEY_I,
    Key::KEY_J,
    Key::KEY_K,
    Key::KEY_L,
    Key::KEY_M,
    Key::KEY_N,
    Key::KEY_O,
    Key::KEY_P,
    Key::KEY_Q,
    Key::KEY_R,
    Key::KEY_S,
    Key::KEY_T,
    Key::KEY_U,
    Key::KEY_V,
    Key::KEY_W,
    Key::KEY_X,
    Key::KEY_Y,
    Key::KEY_Z,
];

const DIGITS: [Key; 10] = [
    Key::KEY_0,
    Key::KEY_1,
    Key::KEY_2,
    Key::KEY_3,
    Key::KEY_4,
    Key::KEY_5,
    Key::KEY_6,
    Key::KEY_7,
    Key::KEY_8,
    Key::KEY_9,
];

const FUNCTION_KEYS: [Key; 12] = [
    Key::KEY_F1,
    Key::KEY_F2,
    Key::KEY_F3,
    Key::KEY_F4,
    Key::KEY_F5,
    Key::KEY_F6,
    Key::KEY_F7,
    Key::KEY_F8,
    Key::KEY_F9,
    Key::KEY_F10,
    Key::KEY_F11,
    Key::KEY_F12,
];

const NAMED_KEYS: [Key; 18] = [
    Key::KEY_LEFTALT,
    Key::KEY_LEFTCTRL,
    Key::KEY_LEFTSHIFT,
    Key::KEY_LEFTMETA,
    Key::KEY_TAB,
    Key::KEY_ENTER,
    Key::KEY_BACKSPACE,
    Key::KEY_ESC,
    Key::KEY_SPACE,
    Key::KEY_DELETE,
    Key::KEY_UP,
    Key::KEY_DOWN,
    Key::KEY_LEFT,
    Key::KEY_RIGHT,
    Key::KEY_HOME,
    Key::KEY_END,
    Key::KEY_PAGEUP,
    Key::KEY_PAGEDOWN,
];

fn evdev_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Alt => Key::KEY_LEFTALT,
        KeyCode::Ctrl => Key::KEY_LEFTCTRL,
        KeyCode::Shift => Key::KEY_LEFTSHIFT,
        KeyCode::Meta => Key::KEY_LEFTMETA,
        KeyCode::Tab => Key::KEY_TAB,
        KeyCode::Enter => Key::KEY_ENTER,
        KeyCode::Backspace => Key::KEY_BACKSPACE,
        KeyCode::Escape => Key::KEY_ESC,
        KeyCode::Space => Key::KEY_SPACE,
        KeyCode::Delete => Key::KEY_DELETE,
        KeyCode::Up => Key::KEY_UP,
        KeyCode::Down => Key::KEY_DOWN,
        KeyCode::Left => Key::KEY_LEFT,
        KeyCode::Right => Key::KEY_RIGHT,
        KeyCode::Home => Key::KEY_HOME,
        KeyCode::End => Key::KEY_END,
        KeyCode::PageUp => Key::KEY_PAGEUP,
        KeyCode::PageDown => Key::KEY_PAGEDOWN,
        KeyCode::F(n) => *FUNCTION_KEYS.get((n as usize).checked_sub(1)?)?,
        KeyCode::Char(c) => match c.to_ascii_uppercase() {
            l @ 'A'..='Z' => LETTERS[(l as u8 - b'A') as usize],
            d @ '0'..='9' => DIGITS[(d as u8 - b'0') as usize],
            _ => return None,
        },
    };
    Some(key)
}

/// Synthetic input through a lazily created uinput device.
pub struct UinputInjector {
    device: Mutex<Option<VirtualDevice>>,
}

impl UinputInjector {
    pub fn new() -> Self {
        Self {
            device: Mutex::new(None),
        }
    }

    fn build() -> anyhow::Result<VirtualDevice> {
        let mut keys: AttributeSet<Key> = AttributeSet::new();
        for key in LETTERS
            .iter()
            .chain(DIGITS.iter())
            .chain(FUNCTION_KEYS.iter())
            .chain(NAMED_KEYS.iter())
        {
            keys.insert(*key);
        }
        keys.insert(Key::BTN_LEFT);

        let mut rel: AttributeSet<RelativeAxisType> = AttributeSet::new();
        rel.insert(RelativeAxisType::REL_X);
        rel.insert(RelativeAxisType::REL_Y);

        let device = VirtualDeviceBuilder::new()?
            .name(VIRTUAL_DEVICE_NAME)
            .with_keys(&keys)?
            .with_relative_axes(&rel)?
            .build()?;
        tracing::debug!("Created uinput device {}", VIRTUAL_DEVICE_NAME);
        Ok(device)
    }

    /// Writes events through the device, creating it on first use.
    fn emit(&self, events: &[InputEvent]) -> anyhow::Result<()> {
        let mut guard = self
            .device
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.is_none() {
            *guard = Some(Self::build()?);
        }
        if let Some(device) = guard.as_mut()
            && let Err(e) = device.emit(events)
        {
            // Rebuilt on the next action
            *guard = None;
            return Err(e.into());
        }
        Ok(())
    }
}

impl Default for UinputInjector {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn key_event(key: Key, value: i32) -> InputEvent {
    InputEvent::new(EventType::KEY, key.code(), value)
}

#[inline]
fn sync() -> InputEvent {
    InputEvent::new(EventType::SYNCHRONIZATION, 0, 0)
}

impl InputInjector for UinputInjector {
    fn send_key(&self, stroke: &KeyStroke) -> anyhow::Result<()> {
        let keys = stroke
            .keys()
            .iter()
            .map(|code| evdev_key(*code).ok_or_else(|| anyhow::anyhow!("Unsupported key {}", code)))
            .collect::<anyhow::Result<Vec<Key>>>()?;

        let mut events = Vec::with_capacity(keys.len() * 4);
        for key in &keys {
            events.push(key_event(*key, 1));
            events.push(sync());
        }
        for key in keys.iter().rev() {
            events.push(key_event(*key, 0));
            events.push(sync());
        }
        self.emit(&events)
    }

    fn move_cursor_relative(&self, dx: i32, dy: i32) -> anyhow::Result<()> {
        self.emit(&[
            InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_X.0, dx),
            InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_Y.0, dy),
            sync(),
        ])
    }

    fn click(&self) -> anyhow::Result<()> {
        self.emit(&[
            key_event(Key::BTN_LEFT, 1),
            sync(),
            key_event(Key::BTN_LEFT, 0),
            sync(),
        ])
    }
}
