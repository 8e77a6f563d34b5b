use std::io;
use std::thread;
use std::time::Duration;

use evdev::{AbsoluteAxisType, Device, InputEventKind, Key};

use crate::input_manager::{DeviceError, InputBackend, RawEvents};
use crate::normalizer::{AXIS_MAX, AXIS_MIN};
use crate::state::types::{DeviceKind, RawEvent};

const BUTTON_CODES: [(Key, &str); 11] = [
    (Key::BTN_SOUTH, "BTN_SOUTH"),
    (Key::BTN_EAST, "BTN_EAST"),
    (Key::BTN_NORTH, "BTN_NORTH"),
    (Key::BTN_WEST, "BTN_WEST"),
    (Key::BTN_TL, "BTN_TL"),
    (Key::BTN_TR, "BTN_TR"),
    (Key::BTN_SELECT, "BTN_SELECT"),
    (Key::BTN_START, "BTN_START"),
    (Key::BTN_MODE, "BTN_MODE"),
    (Key::BTN_THUMBL, "BTN_THUMBL"),
    (Key::BTN_THUMBR, "BTN_THUMBR"),
];

const AXIS_CODES: [(AbsoluteAxisType, &str); 4] = [
    (AbsoluteAxisType::ABS_X, "ABS_X"),
    (AbsoluteAxisType::ABS_Y, "ABS_Y"),
    (AbsoluteAxisType::ABS_RX, "ABS_RX"),
    (AbsoluteAxisType::ABS_RY, "ABS_RY"),
];

/// Reported range of one stick axis.
#[derive(Debug, Clone, Copy)]
struct AxisRange {
    min: i32,
    max: i32,
}

impl AxisRange {
    const SIGNED_16: AxisRange = AxisRange {
        min: AXIS_MIN,
        max: AXIS_MAX,
    };

    /// Rescales a device value into the signed 16-bit stick range.
    fn to_signed_16(self, value: i32) -> i32 {
        let span = self.max as i64 - self.min as i64;
        if span <= 0 {
            return 0;
        }
        let out = AXIS_MIN as i64
            + (value as i64 - self.min as i64) * (AXIS_MAX as i64 - AXIS_MIN as i64) / span;
        out.clamp(AXIS_MIN as i64, AXIS_MAX as i64) as i32
    }
}

pub struct EvdevGamepad {
    device: Option<Device>,
    ranges: [AxisRange; 4],
    hat: (i8, i8),
}

impl EvdevGamepad {
    pub fn new() -> Self {
        Self {
            device: None,
            ranges: [AxisRange::SIGNED_16; 4],
            hat: (0, 0),
        }
    }

    fn is_gamepad(device: &Device) -> bool {
        device
            .supported_keys()
            .is_some_and(|keys| keys.contains(Key::BTN_SOUTH) && keys.contains(Key::BTN_START))
    }

    fn read_ranges(device: &Device) -> [AxisRange; 4] {
        let mut ranges = [AxisRange::SIGNED_16; 4];
        if let Ok(abs) = device.get_abs_state() {
            for (i, (axis, _)) in AXIS_CODES.iter().enumerate() {
                let info = abs[axis.0 as usize];
                if info.maximum > info.minimum {
                    ranges[i] = AxisRange {
                        min: info.minimum,
                        max: info.maximum,
                    };
                }
            }
        }
        ranges
    }
}

impl Default for EvdevGamepad {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBackend for EvdevGamepad {
    fn device(&self) -> DeviceKind {
        DeviceKind::Gamepad
    }

    fn connect(&mut self) -> Result<String, DeviceError> {
        let Some((path, device)) = evdev::enumerate().find(|(_, dev)| Self::is_gamepad(dev)) else {
            return Err(DeviceError::NotFound("gamepad".to_string()));
        };

        super::set_nonblocking(&device)?;
        let name = format!("{} ({})", device.name().unwrap_or("Unknown"), path.display());

        self.ranges = Self::read_ranges(&device);
        self.hat = (0, 0);
        self.device = Some(device);
        Ok(name)
    }

    fn poll(&mut self, timeout: Duration) -> Result<RawEvents, DeviceError> {
        thread::sleep(timeout);

        let device = self.device.as_mut().ok_or(DeviceError::Disconnected)?;
        let mut events = RawEvents::new();
        let mut hat = self.hat;

        match device.fetch_events() {
            Ok(iter) => {
                for ev in iter {
                    match ev.kind() {
                        InputEventKind::Key(key) => {
                            // 2 is autorepeat
                            if ev.value() > 1 {
                                continue;
                            }
                            if let Some((_, code)) = BUTTON_CODES.iter().find(|(k, _)| *k == key) {
                                events.push(RawEvent::Button {
                                    code: *code,
                                    pressed: ev.value() == 1,
                                });
                            }
                        }
                        InputEventKind::AbsAxis(AbsoluteAxisType::ABS_HAT0X) => {
                            hat.0 = ev.value().signum() as i8;
                        }
                        InputEventKind::AbsAxis(AbsoluteAxisType::ABS_HAT0Y) => {
                            // evdev reports up as negative
                            hat.1 = -(ev.value().signum() as i8);
                        }
                        InputEventKind::AbsAxis(axis) => {
                            if let Some(i) = AXIS_CODES.iter().position(|(a, _)| *a == axis) {
                                events.push(RawEvent::Axis {
                                    code: AXIS_CODES[i].1,
                                    value: self.ranges[i].to_signed_16(ev.value()),
                                });
                            }
                        }
                        _ => {}
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => return Err(DeviceError::Io(e)),
        }

        if hat != self.hat {
            self.hat = hat;
            events.push(RawEvent::Hat { x: hat.0, y: hat.1 });
        }

        Ok(events)
    }

    fn disconnect(&mut self) {
        self.device = None;
        self.hat = (0, 0);
    }
}
