//! End-to-end dispatch against an in-memory process table.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use padhook::config::{AppConfig, ButtonMapping};
use padhook::executor::{Executor, InputInjector, ProcessControl, TerminateOutcome};
use padhook::normalizer::Normalizer;
use padhook::platform::matches_process_name;
use padhook::state::AppState;
use padhook::state::types::{KeyStroke, RawEvent};

#[derive(Clone, Default)]
struct ProcessTable {
    names: Arc<Mutex<Vec<String>>>,
}

impl ProcessTable {
    fn with(names: &[&str]) -> Self {
        let table = Self::default();
        table
            .names
            .lock()
            .unwrap()
            .extend(names.iter().map(|n| n.to_string()));
        table
    }

    fn list(&self) -> Vec<String> {
        self.names.lock().unwrap().clone()
    }
}

impl ProcessControl for ProcessTable {
    fn terminate_by_name(&self, name: &str) -> anyhow::Result<TerminateOutcome> {
        let mut names = self.names.lock().unwrap();
        let before = names.len();
        names.retain(|candidate| !matches_process_name(candidate, name));
        match before - names.len() {
            0 => Ok(TerminateOutcome::NotFound),
            n => Ok(TerminateOutcome::Terminated(n)),
        }
    }
}

#[derive(Clone, Default)]
struct TypedKeys {
    strokes: Arc<Mutex<Vec<String>>>,
}

impl InputInjector for TypedKeys {
    fn send_key(&self, stroke: &KeyStroke) -> anyhow::Result<()> {
        self.strokes.lock().unwrap().push(stroke.to_string());
        Ok(())
    }

    fn move_cursor_relative(&self, _dx: i32, _dy: i32) -> anyhow::Result<()> {
        Ok(())
    }

    fn click(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

fn dispatcher(config: &AppConfig, table: &ProcessTable, keys: &TypedKeys) -> AppState {
    let executor = Arc::new(Executor::new(
        Box::new(table.clone()),
        Box::new(keys.clone()),
    ));
    AppState::new(config, executor)
}

fn feed(state: &AppState, normalizer: &mut Normalizer, raw: RawEvent, at: Instant) {
    for event in normalizer.normalize(raw) {
        state.handle_event(event, at);
    }
}

#[test]
fn test_f9_terminates_target() {
    let table = ProcessTable::with(&["explorer.exe", "chrome.exe", "chrome.exe", "code.exe"]);
    let keys = TypedKeys::default();
    let state = dispatcher(&AppConfig::default(), &table, &keys);
    let mut normalizer = Normalizer::new();
    let t0 = Instant::now();

    feed(&state, &mut normalizer, RawEvent::Key { code: "KEY_F9", pressed: true }, t0);
    feed(&state, &mut normalizer, RawEvent::Key { code: "KEY_F9", pressed: false }, t0);

    let remaining = table.list();
    assert_eq!(remaining, vec!["explorer.exe".to_string(), "code.exe".to_string()]);
    assert!(keys.strokes.lock().unwrap().is_empty());
}

#[test]
fn test_linux_comm_names_match() {
    let table = ProcessTable::with(&["chrome", "Chrome", "chromedriver"]);
    let state = dispatcher(&AppConfig::default(), &table, &TypedKeys::default());
    let mut normalizer = Normalizer::new();

    feed(&state, &mut normalizer, RawEvent::Key { code: "KEY_F9", pressed: true }, Instant::now());

    assert_eq!(table.list(), vec!["chromedriver".to_string()]);
}

#[test]
fn test_target_absent_is_not_an_error() {
    let table = ProcessTable::with(&["explorer.exe"]);
    let state = dispatcher(&AppConfig::default(), &table, &TypedKeys::default());
    let mut normalizer = Normalizer::new();

    feed(&state, &mut normalizer, RawEvent::Key { code: "KEY_F9", pressed: true }, Instant::now());

    assert_eq!(table.list(), vec!["explorer.exe".to_string()]);
}

#[test]
fn test_xbox_hold_terminates_and_tap_switches() {
    let table = ProcessTable::with(&["chrome.exe"]);
    let keys = TypedKeys::default();
    let state = dispatcher(&AppConfig::default(), &table, &keys);
    let mut normalizer = Normalizer::new();
    let t0 = Instant::now();

    let mode = |pressed| RawEvent::Button { code: "BTN_MODE", pressed };

    feed(&state, &mut normalizer, mode(true), t0);
    feed(&state, &mut normalizer, mode(false), t0 + Duration::from_millis(300));
    assert_eq!(*keys.strokes.lock().unwrap(), vec!["ALT+TAB".to_string()]);
    assert_eq!(table.list(), vec!["chrome.exe".to_string()]);

    let t1 = t0 + Duration::from_secs(5);
    feed(&state, &mut normalizer, mode(true), t1);
    feed(&state, &mut normalizer, mode(false), t1 + Duration::from_secs(3));
    assert!(table.list().is_empty());
    assert_eq!(keys.strokes.lock().unwrap().len(), 1);
}

#[test]
fn test_kill_with_explicit_process() {
    let table = ProcessTable::with(&["chrome.exe", "notepad.exe"]);
    let mut config = AppConfig::default();
    config.bindings = vec![ButtonMapping::new("F10", "KILL:notepad.exe")];
    let state = dispatcher(&config, &table, &TypedKeys::default());
    let mut normalizer = Normalizer::new();

    feed(&state, &mut normalizer, RawEvent::Key { code: "KEY_F10", pressed: true }, Instant::now());

    assert_eq!(table.list(), vec!["chrome.exe".to_string()]);
}
