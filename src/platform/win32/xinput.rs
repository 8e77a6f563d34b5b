//! XInput gamepad polling.
//!
//! Button bits and stick values are diffed against the previous poll and
//! reported under their evdev names.

use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryA};
use windows::Win32::UI::Input::XboxController::*;
use windows::core::{PCSTR, s};

use crate::input_manager::{DeviceError, InputBackend, RawEvents};
use crate::state::types::{DeviceKind, RawEvent};

/// Undocumented Guide button bit, only reported by `XInputGetStateEx`.
const GUIDE_BUTTON: u16 = 0x0400;

const BUTTON_MAP: [(u16, &str); 11] = [
    (0x1000, "BTN_SOUTH"),  // A
    (0x2000, "BTN_EAST"),   // B
    (0x4000, "BTN_NORTH"),  // X
    (0x8000, "BTN_WEST"),   // Y
    (0x0100, "BTN_TL"),     // LEFT_SHOULDER
    (0x0200, "BTN_TR"),     // RIGHT_SHOULDER
    (0x0020, "BTN_SELECT"), // BACK
    (0x0010, "BTN_START"),  // START
    (0x0040, "BTN_THUMBL"), // LEFT_THUMB
    (0x0080, "BTN_THUMBR"), // RIGHT_THUMB
    (GUIDE_BUTTON, "BTN_MODE"),
];

const DPAD_UP: u16 = 0x0001;
const DPAD_DOWN: u16 = 0x0002;
const DPAD_LEFT: u16 = 0x0004;
const DPAD_RIGHT: u16 = 0x0008;

const AXIS_NAMES: [&str; 4] = ["ABS_X", "ABS_Y", "ABS_RX", "ABS_RY"];

type XInputGetStateExFn = unsafe extern "system" fn(u32, *mut XINPUT_STATE) -> u32;

/// `XInputGetStateEx` is exported by ordinal 100 only.
fn get_state_ex() -> Option<XInputGetStateExFn> {
    static GET_STATE_EX: OnceLock<Option<XInputGetStateExFn>> = OnceLock::new();

    *GET_STATE_EX.get_or_init(|| unsafe {
        let module = LoadLibraryA(s!("xinput1_4.dll")).ok()?;
        let proc = GetProcAddress(module, PCSTR(100 as *const u8))?;
        Some(std::mem::transmute::<
            unsafe extern "system" fn() -> isize,
            XInputGetStateExFn,
        >(proc))
    })
}

fn read_state(user_index: u32) -> Option<XINPUT_STATE> {
    let mut state = XINPUT_STATE::default();
    let result = match get_state_ex() {
        Some(get_state_ex) => unsafe { get_state_ex(user_index, &mut state) },
        None => unsafe { XInputGetState(user_index, &mut state) },
    };
    (result == 0).then_some(state)
}

/// XInput reports up as positive; the stick convention is up-negative.
#[inline(always)]
fn flip_y(value: i16) -> i32 {
    -(value as i32) - 1
}

fn axes(gamepad: &XINPUT_GAMEPAD) -> [i32; 4] {
    [
        gamepad.sThumbLX as i32,
        flip_y(gamepad.sThumbLY),
        gamepad.sThumbRX as i32,
        flip_y(gamepad.sThumbRY),
    ]
}

fn hat(buttons: u16) -> (i8, i8) {
    let pressed = |mask: u16| (buttons & mask != 0) as i8;
    (
        pressed(DPAD_RIGHT) - pressed(DPAD_LEFT),
        pressed(DPAD_UP) - pressed(DPAD_DOWN),
    )
}

/// First connected XInput controller.
pub struct XInputGamepad {
    user_index: Option<u32>,
    last_buttons: u16,
    last_axes: [i32; 4],
}

impl XInputGamepad {
    pub fn new() -> Self {
        Self {
            user_index: None,
            last_buttons: 0,
            last_axes: [0, -1, 0, -1],
        }
    }

    fn diff(&mut self, gamepad: &XINPUT_GAMEPAD, events: &mut RawEvents) {
        let buttons = gamepad.wButtons.0;
        let changed = buttons ^ self.last_buttons;

        for &(mask, code) in &BUTTON_MAP {
            if changed & mask != 0 {
                events.push(RawEvent::Button {
                    code,
                    pressed: buttons & mask != 0,
                });
            }
        }

        let dpad = DPAD_UP | DPAD_DOWN | DPAD_LEFT | DPAD_RIGHT;
        if changed & dpad != 0 {
            let (x, y) = hat(buttons);
            events.push(RawEvent::Hat { x, y });
        }

        let current = axes(gamepad);
        for (i, value) in current.iter().enumerate() {
            if *value != self.last_axes[i] {
                events.push(RawEvent::Axis {
                    code: AXIS_NAMES[i],
                    value: *value,
                });
            }
        }

        self.last_buttons = buttons;
        self.last_axes = current;
    }
}

impl Default for XInputGamepad {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBackend for XInputGamepad {
    fn device(&self) -> DeviceKind {
        DeviceKind::Gamepad
    }

    fn connect(&mut self) -> Result<String, DeviceError> {
        let user_index = (0..XUSER_MAX_COUNT)
            .find(|&index| read_state(index).is_some())
            .ok_or_else(|| DeviceError::NotFound("XInput controller".to_string()))?;

        *self = Self::new();
        self.user_index = Some(user_index);

        let guide = if get_state_ex().is_some() {
            ""
        } else {
            ", Guide button unavailable"
        };
        Ok(format!("XInput controller #{}{}", user_index, guide))
    }

    fn poll(&mut self, timeout: Duration) -> Result<RawEvents, DeviceError> {
        thread::sleep(timeout);

        let user_index = self.user_index.ok_or(DeviceError::Disconnected)?;
        let state = read_state(user_index).ok_or(DeviceError::Disconnected)?;

        let mut events = RawEvents::new();
        self.diff(&state.Gamepad, &mut events);
        Ok(events)
    }

    fn disconnect(&mut self) {
        self.user_index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_y_range() {
        assert_eq!(flip_y(i16::MAX), -32768);
        assert_eq!(flip_y(i16::MIN), 32767);
    }

    #[test]
    fn test_hat_from_buttons() {
        assert_eq!(hat(0), (0, 0));
        assert_eq!(hat(DPAD_UP), (0, 1));
        assert_eq!(hat(DPAD_LEFT | DPAD_DOWN), (-1, -1));
    }

    #[test]
    fn test_diff_reports_changes_only() {
        let mut pad = XInputGamepad::new();
        let mut gamepad = XINPUT_GAMEPAD::default();
        gamepad.wButtons = XINPUT_GAMEPAD_BUTTON_FLAGS(0x1000 | DPAD_RIGHT);

        let mut events = RawEvents::new();
        pad.diff(&gamepad, &mut events);
        assert_eq!(
            events.as_slice(),
            &[
                RawEvent::Button {
                    code: "BTN_SOUTH",
                    pressed: true
                },
                RawEvent::Hat { x: 1, y: 0 },
            ]
        );

        let mut events = RawEvents::new();
        pad.diff(&gamepad, &mut events);
        assert!(events.is_empty());
    }
}
