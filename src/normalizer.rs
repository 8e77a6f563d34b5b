//! Translation of backend events into logical input events.
//!
//! Raw codes follow the Linux evdev names; the Windows backends translate
//! their native codes into the same names before handing them over.

use smallvec::SmallVec;

use crate::state::types::*;

/// Lower bound of a raw stick axis.
pub const AXIS_MIN: i32 = -32768;
/// Upper bound of a raw stick axis.
pub const AXIS_MAX: i32 = 32767;

const KEY_TABLE: [(&str, LogicalButton); 15] = [
    ("KEY_F1", LogicalButton::new("f1", ButtonSource::Keyboard)),
    ("KEY_F2", LogicalButton::new("f2", ButtonSource::Keyboard)),
    ("KEY_F3", LogicalButton::new("f3", ButtonSource::Keyboard)),
    ("KEY_F4", LogicalButton::new("f4", ButtonSource::Keyboard)),
    ("KEY_F5", LogicalButton::new("f5", ButtonSource::Keyboard)),
    ("KEY_F6", LogicalButton::new("f6", ButtonSource::Keyboard)),
    ("KEY_F7", LogicalButton::new("f7", ButtonSource::Keyboard)),
    ("KEY_F8", LogicalButton::new("f8", ButtonSource::Keyboard)),
    ("KEY_F9", LogicalButton::new("f9", ButtonSource::Keyboard)),
    ("KEY_F10", LogicalButton::new("f10", ButtonSource::Keyboard)),
    ("KEY_F11", LogicalButton::new("f11", ButtonSource::Keyboard)),
    ("KEY_F12", LogicalButton::new("f12", ButtonSource::Keyboard)),
    ("KEY_PAUSE", LogicalButton::new("pause", ButtonSource::Keyboard)),
    ("KEY_SCROLLLOCK", LogicalButton::new("scrolllock", ButtonSource::Keyboard)),
    ("KEY_INSERT", LogicalButton::new("insert", ButtonSource::Keyboard)),
];

const BUTTON_TABLE: [(&str, LogicalButton); 11] = [
    ("BTN_SOUTH", LogicalButton::new("a", ButtonSource::GamepadDigital)),
    ("BTN_EAST", LogicalButton::new("b", ButtonSource::GamepadDigital)),
    ("BTN_NORTH", LogicalButton::new("x", ButtonSource::GamepadDigital)),
    ("BTN_WEST", LogicalButton::new("y", ButtonSource::GamepadDigital)),
    ("BTN_TL", LogicalButton::new("lb", ButtonSource::GamepadDigital)),
    ("BTN_TR", LogicalButton::new("rb", ButtonSource::GamepadDigital)),
    ("BTN_SELECT", LogicalButton::new("back", ButtonSource::GamepadDigital)),
    ("BTN_START", LogicalButton::new("menu", ButtonSource::GamepadDigital)),
    ("BTN_MODE", LogicalButton::new("xbox", ButtonSource::GamepadDigital)),
    ("BTN_THUMBL", LogicalButton::new("ls", ButtonSource::GamepadDigital)),
    ("BTN_THUMBR", LogicalButton::new("rs", ButtonSource::GamepadDigital)),
];

/// Hat vectors, `y` positive is up. Diagonals are unmapped.
const HAT_TABLE: [((i8, i8), LogicalButton); 4] = [
    ((0, 1), LogicalButton::new("up", ButtonSource::GamepadHat)),
    ((0, -1), LogicalButton::new("down", ButtonSource::GamepadHat)),
    ((-1, 0), LogicalButton::new("left", ButtonSource::GamepadHat)),
    ((1, 0), LogicalButton::new("right", ButtonSource::GamepadHat)),
];

const AXIS_TABLE: [(&str, Axis); 4] = [
    ("ABS_X", Axis::LeftX),
    ("ABS_Y", Axis::LeftY),
    ("ABS_RX", Axis::RightX),
    ("ABS_RY", Axis::RightY),
];

/// Every logical button any source can produce.
pub fn logical_buttons() -> impl Iterator<Item = LogicalButton> {
    KEY_TABLE
        .into_iter()
        .chain(BUTTON_TABLE)
        .map(|(_, button)| button)
        .chain(HAT_TABLE.into_iter().map(|(_, button)| button))
}

#[inline]
fn lookup<T: Copy>(table: &[(&str, T)], code: &str) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| *name == code)
        .map(|(_, value)| *value)
}

#[inline]
fn hat_button(vector: (i8, i8)) -> Option<LogicalButton> {
    HAT_TABLE
        .iter()
        .find(|(v, _)| *v == vector)
        .map(|(_, button)| *button)
}

/// Linearly maps `value` from `[in_min, in_max]` onto `[-1, 1]`.
#[inline]
pub fn scale_axis(value: i32, in_min: i32, in_max: i32) -> f32 {
    let span = (in_max as f64) - (in_min as f64);
    if span <= 0.0 {
        return 0.0;
    }
    let out = -1.0 + ((value as f64) - (in_min as f64)) / span * 2.0;
    out.clamp(-1.0, 1.0) as f32
}

/// Per-source translator. Holds the last hat vector so direction changes
/// become an up/down pair.
#[derive(Debug, Default)]
pub struct Normalizer {
    hat: (i8, i8),
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the remembered hat direction.
    pub fn reset(&mut self) {
        self.hat = (0, 0);
    }

    pub fn normalize(&mut self, raw: RawEvent) -> SmallVec<[InputEvent; 2]> {
        let mut events = SmallVec::new();

        match raw {
            RawEvent::Key { code, pressed } => {
                if let Some(button) = lookup(&KEY_TABLE, code) {
                    events.push(button_event(button, pressed));
                }
            }
            RawEvent::Button { code, pressed } => {
                if let Some(button) = lookup(&BUTTON_TABLE, code) {
                    events.push(button_event(button, pressed));
                }
            }
            RawEvent::Hat { x, y } => {
                let vector = (x.signum(), y.signum());
                if vector != self.hat {
                    if let Some(previous) = hat_button(self.hat) {
                        events.push(InputEvent::ButtonUp(previous));
                    }
                    if let Some(current) = hat_button(vector) {
                        events.push(InputEvent::ButtonDown(current));
                    }
                    self.hat = vector;
                }
            }
            RawEvent::Axis { code, value } => {
                if let Some(axis) = lookup(&AXIS_TABLE, code) {
                    events.push(InputEvent::AxisMoved(
                        axis,
                        scale_axis(value, AXIS_MIN, AXIS_MAX),
                    ));
                }
            }
        }

        if events.is_empty() {
            tracing::trace!("Dropped unmapped event {:?}", raw);
        }
        events
    }
}

#[inline(always)]
fn button_event(button: LogicalButton, pressed: bool) -> InputEvent {
    if pressed {
        InputEvent::ButtonDown(button)
    } else {
        InputEvent::ButtonUp(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(id: &'static str, source: ButtonSource) -> InputEvent {
        InputEvent::ButtonDown(LogicalButton::new(id, source))
    }

    fn up(id: &'static str, source: ButtonSource) -> InputEvent {
        InputEvent::ButtonUp(LogicalButton::new(id, source))
    }

    #[test]
    fn test_scale_axis_bounds() {
        assert_eq!(scale_axis(32767, AXIS_MIN, AXIS_MAX), 1.0);
        assert_eq!(scale_axis(-32768, AXIS_MIN, AXIS_MAX), -1.0);
        assert!(scale_axis(0, AXIS_MIN, AXIS_MAX).abs() < 1e-4);
    }

    #[test]
    fn test_scale_axis_custom_range() {
        assert_eq!(scale_axis(0, 0, 255), -1.0);
        assert_eq!(scale_axis(255, 0, 255), 1.0);
        assert_eq!(scale_axis(5, 5, 5), 0.0);
    }

    #[test]
    fn test_keys_and_buttons() {
        let mut normalizer = Normalizer::new();

        let events = normalizer.normalize(RawEvent::Key {
            code: "KEY_F9",
            pressed: true,
        });
        assert_eq!(events.as_slice(), &[down("f9", ButtonSource::Keyboard)]);

        let events = normalizer.normalize(RawEvent::Button {
            code: "BTN_MODE",
            pressed: false,
        });
        assert_eq!(events.as_slice(), &[up("xbox", ButtonSource::GamepadDigital)]);
    }

    #[test]
    fn test_unknown_codes_dropped() {
        let mut normalizer = Normalizer::new();
        assert!(
            normalizer
                .normalize(RawEvent::Key {
                    code: "KEY_A",
                    pressed: true
                })
                .is_empty()
        );
        assert!(
            normalizer
                .normalize(RawEvent::Axis {
                    code: "ABS_Z",
                    value: 100
                })
                .is_empty()
        );
    }

    #[test]
    fn test_axis_event() {
        let mut normalizer = Normalizer::new();
        let events = normalizer.normalize(RawEvent::Axis {
            code: "ABS_RY",
            value: 32767,
        });
        assert_eq!(events.as_slice(), &[InputEvent::AxisMoved(Axis::RightY, 1.0)]);
    }

    #[test]
    fn test_hat_transitions() {
        let mut normalizer = Normalizer::new();
        let hat = ButtonSource::GamepadHat;

        let events = normalizer.normalize(RawEvent::Hat { x: 0, y: 1 });
        assert_eq!(events.as_slice(), &[down("up", hat)]);

        // Same vector again is not a new press
        assert!(normalizer.normalize(RawEvent::Hat { x: 0, y: 1 }).is_empty());

        let events = normalizer.normalize(RawEvent::Hat { x: 1, y: 0 });
        assert_eq!(events.as_slice(), &[up("up", hat), down("right", hat)]);

        let events = normalizer.normalize(RawEvent::Hat { x: 0, y: 0 });
        assert_eq!(events.as_slice(), &[up("right", hat)]);
    }

    #[test]
    fn test_hat_diagonal_unmapped() {
        let mut normalizer = Normalizer::new();
        let hat = ButtonSource::GamepadHat;

        let events = normalizer.normalize(RawEvent::Hat { x: -1, y: 0 });
        assert_eq!(events.as_slice(), &[down("left", hat)]);

        let events = normalizer.normalize(RawEvent::Hat { x: -1, y: -1 });
        assert_eq!(events.as_slice(), &[up("left", hat)]);

        let events = normalizer.normalize(RawEvent::Hat { x: 0, y: -1 });
        assert_eq!(events.as_slice(), &[down("down", hat)]);
    }

    #[test]
    fn test_reset_forgets_hat() {
        let mut normalizer = Normalizer::new();
        normalizer.normalize(RawEvent::Hat { x: 0, y: 1 });
        normalizer.reset();

        let events = normalizer.normalize(RawEvent::Hat { x: 0, y: 1 });
        assert_eq!(
            events.as_slice(),
            &[down("up", ButtonSource::GamepadHat)]
        );
    }

    #[test]
    fn test_logical_button_ids_unique() {
        let ids: Vec<_> = logical_buttons().map(|b| b.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids.len(), sorted.len());
    }
}
