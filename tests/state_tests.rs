//! Dispatcher tests driven from backend-level events.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use padhook::config::AppConfig;
use padhook::normalizer::Normalizer;
use padhook::state::AppState;
use padhook::state::types::{Action, ActionSink, DeviceKind, KeyCode, KeyStroke, RawEvent};

#[derive(Default)]
struct RecordingSink {
    actions: Mutex<Vec<Action>>,
}

impl RecordingSink {
    fn take(&self) -> Vec<Action> {
        std::mem::take(&mut *self.actions.lock().unwrap())
    }
}

impl ActionSink for RecordingSink {
    fn dispatch(&self, action: Action) {
        self.actions.lock().unwrap().push(action);
    }
}

struct Pipeline {
    state: AppState,
    sink: Arc<RecordingSink>,
    normalizer: Normalizer,
}

impl Pipeline {
    fn new(config: AppConfig) -> Self {
        let sink = Arc::new(RecordingSink::default());
        let state = AppState::new(&config, sink.clone());
        Self {
            state,
            sink,
            normalizer: Normalizer::new(),
        }
    }

    fn feed(&mut self, raw: RawEvent, at: Instant) {
        for event in self.normalizer.normalize(raw) {
            self.state.handle_event(event, at);
        }
    }

    fn button(&mut self, code: &'static str, pressed: bool, at: Instant) {
        self.feed(RawEvent::Button { code, pressed }, at);
    }
}

fn key(code: KeyCode) -> Action {
    Action::Key(KeyStroke::single(code))
}

fn kill() -> Action {
    Action::TerminateProcess("chrome.exe".to_string())
}

#[test]
fn test_f9_kills_immediately() {
    let mut pipeline = Pipeline::new(AppConfig::default());
    let t0 = Instant::now();

    pipeline.feed(RawEvent::Key { code: "KEY_F9", pressed: true }, t0);
    assert_eq!(pipeline.sink.take(), vec![kill()]);

    pipeline.feed(RawEvent::Key { code: "KEY_F9", pressed: false }, t0 + Duration::from_millis(40));
    assert!(pipeline.sink.take().is_empty());
}

#[test]
fn test_xbox_tap_and_hold() {
    let mut pipeline = Pipeline::new(AppConfig::default());
    let t0 = Instant::now();

    pipeline.button("BTN_MODE", true, t0);
    assert!(pipeline.sink.take().is_empty());
    pipeline.button("BTN_MODE", false, t0 + Duration::from_millis(200));
    let tap = pipeline.sink.take();
    assert_eq!(tap.len(), 1);
    assert_eq!(tap[0].to_string(), "ALT+TAB");

    let t1 = t0 + Duration::from_secs(10);
    pipeline.button("BTN_MODE", true, t1);
    pipeline.button("BTN_MODE", false, t1 + Duration::from_millis(3500));
    assert_eq!(pipeline.sink.take(), vec![kill()]);
}

#[test]
fn test_dpad_sends_arrow_keys() {
    let mut pipeline = Pipeline::new(AppConfig::default());
    let t0 = Instant::now();

    pipeline.feed(RawEvent::Hat { x: 0, y: 1 }, t0);
    pipeline.feed(RawEvent::Hat { x: -1, y: 0 }, t0 + Duration::from_millis(50));
    pipeline.feed(RawEvent::Hat { x: 0, y: 0 }, t0 + Duration::from_millis(100));

    assert_eq!(pipeline.sink.take(), vec![key(KeyCode::Up), key(KeyCode::Left)]);
    assert_eq!(pipeline.state.pressed_count(), 0);
}

#[test]
fn test_menu_toggle_gates_everything_else() {
    let mut pipeline = Pipeline::new(AppConfig::default());
    let t0 = Instant::now();

    pipeline.button("BTN_START", true, t0);
    pipeline.button("BTN_START", false, t0 + Duration::from_millis(50));
    assert!(!pipeline.state.is_active());

    let t1 = t0 + Duration::from_millis(100);
    pipeline.feed(RawEvent::Key { code: "KEY_F9", pressed: true }, t1);
    pipeline.feed(RawEvent::Key { code: "KEY_F9", pressed: false }, t1);
    pipeline.button("BTN_SOUTH", true, t1);
    pipeline.button("BTN_SOUTH", false, t1);
    assert!(pipeline.sink.take().is_empty());

    let t2 = t0 + Duration::from_millis(700);
    pipeline.button("BTN_START", true, t2);
    assert!(pipeline.state.is_active());

    pipeline.button("BTN_SOUTH", true, t2 + Duration::from_millis(10));
    assert_eq!(pipeline.sink.take(), vec![key(KeyCode::Enter)]);
}

#[test]
fn test_full_stick_deflection_sends_arrow() {
    let mut pipeline = Pipeline::new(AppConfig::default());
    let t0 = Instant::now();

    pipeline.feed(RawEvent::Axis { code: "ABS_X", value: 32767 }, t0);
    pipeline.state.tick(DeviceKind::Gamepad, t0);
    assert_eq!(pipeline.sink.take(), vec![key(KeyCode::Right)]);

    // Within the cooldown
    pipeline.state.tick(DeviceKind::Gamepad, t0 + Duration::from_millis(50));
    assert!(pipeline.sink.take().is_empty());

    pipeline.state.tick(DeviceKind::Gamepad, t0 + Duration::from_millis(100));
    assert_eq!(pipeline.sink.take(), vec![key(KeyCode::Right)]);

    pipeline.feed(RawEvent::Axis { code: "ABS_X", value: 0 }, t0 + Duration::from_millis(120));
    pipeline.state.tick(DeviceKind::Gamepad, t0 + Duration::from_millis(300));
    assert!(pipeline.sink.take().is_empty());
}

#[test]
fn test_keyboard_tick_does_not_drive_sticks() {
    let mut pipeline = Pipeline::new(AppConfig::default());
    let t0 = Instant::now();

    pipeline.feed(RawEvent::Axis { code: "ABS_Y", value: -32768 }, t0);
    pipeline.state.tick(DeviceKind::Keyboard, t0);
    assert!(pipeline.sink.take().is_empty());

    pipeline.state.tick(DeviceKind::Gamepad, t0);
    assert_eq!(pipeline.sink.take(), vec![key(KeyCode::Up)]);
}

#[test]
fn test_disconnect_mid_hold_fires_nothing() {
    let mut pipeline = Pipeline::new(AppConfig::default());
    let t0 = Instant::now();

    pipeline.button("BTN_MODE", true, t0);
    pipeline.state.abandon(DeviceKind::Gamepad);
    pipeline.normalizer.reset();
    pipeline.button("BTN_MODE", false, t0 + Duration::from_secs(5));
    assert!(pipeline.sink.take().is_empty());

    // Fresh cycle after reconnect
    let t1 = t0 + Duration::from_secs(20);
    pipeline.button("BTN_MODE", true, t1);
    pipeline.button("BTN_MODE", false, t1 + Duration::from_millis(100));
    assert_eq!(pipeline.sink.take().len(), 1);
}
