//! Button and action name parsing.

use smallvec::SmallVec;

use crate::normalizer;

use super::types::*;

/// Alternative spellings accepted for gamepad buttons.
const BUTTON_ALIASES: [(&str, &str); 14] = [
    ("south", "a"),
    ("east", "b"),
    ("north", "x"),
    ("west", "y"),
    ("guide", "xbox"),
    ("mode", "xbox"),
    ("home", "xbox"),
    ("start", "menu"),
    ("select", "back"),
    ("view", "back"),
    ("dpad_up", "up"),
    ("dpad_down", "down"),
    ("dpad_left", "left"),
    ("dpad_right", "right"),
];

/// Resolves a configured button name (`"F9"`, `"XBOX"`, `"south"`) to its logical button.
pub fn button_name_to_button(name: &str) -> Option<LogicalButton> {
    let lower = name.trim().to_lowercase();
    let canonical = BUTTON_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, id)| *id)
        .unwrap_or(lower.as_str());

    normalizer::logical_buttons().find(|button| button.id == canonical)
}

/// Converts key name to key code.
pub fn key_name_to_code(key_name: &str) -> Option<KeyCode> {
    let key = key_name.trim().to_uppercase();

    if key.len() == 1
        && let Some(c) = key.chars().next()
        && (c.is_ascii_alphabetic() || c.is_ascii_digit())
    {
        return Some(KeyCode::Char(c));
    }

    // F1-F12
    if key.starts_with('F')
        && key.len() > 1
        && let Ok(num) = key[1..].parse::<u8>()
        && (1..=12).contains(&num)
    {
        return Some(KeyCode::F(num));
    }

    let code = match key.as_str() {
        "ALT" | "LALT" | "MENU" => KeyCode::Alt,
        "CTRL" | "LCTRL" | "CONTROL" => KeyCode::Ctrl,
        "SHIFT" | "LSHIFT" => KeyCode::Shift,
        "WIN" | "LWIN" | "META" | "SUPER" => KeyCode::Meta,
        "TAB" => KeyCode::Tab,
        "ENTER" | "RETURN" => KeyCode::Enter,
        "BACKSPACE" | "BACK" => KeyCode::Backspace,
        "ESC" | "ESCAPE" => KeyCode::Escape,
        "SPACE" => KeyCode::Space,
        "DELETE" | "DEL" => KeyCode::Delete,
        "UP" => KeyCode::Up,
        "DOWN" => KeyCode::Down,
        "LEFT" => KeyCode::Left,
        "RIGHT" => KeyCode::Right,
        "HOME" => KeyCode::Home,
        "END" => KeyCode::End,
        "PAGEUP" => KeyCode::PageUp,
        "PAGEDOWN" => KeyCode::PageDown,
        _ => return None,
    };
    Some(code)
}

/// Canonical name of a key code.
pub fn key_code_name(code: KeyCode) -> String {
    match code {
        KeyCode::Alt => "ALT".to_string(),
        KeyCode::Ctrl => "CTRL".to_string(),
        KeyCode::Shift => "SHIFT".to_string(),
        KeyCode::Meta => "WIN".to_string(),
        KeyCode::Tab => "TAB".to_string(),
        KeyCode::Enter => "ENTER".to_string(),
        KeyCode::Backspace => "BACKSPACE".to_string(),
        KeyCode::Escape => "ESC".to_string(),
        KeyCode::Space => "SPACE".to_string(),
        KeyCode::Delete => "DELETE".to_string(),
        KeyCode::Up => "UP".to_string(),
        KeyCode::Down => "DOWN".to_string(),
        KeyCode::Left => "LEFT".to_string(),
        KeyCode::Right => "RIGHT".to_string(),
        KeyCode::Home => "HOME".to_string(),
        KeyCode::End => "END".to_string(),
        KeyCode::PageUp => "PAGEUP".to_string(),
        KeyCode::PageDown => "PAGEDOWN".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Char(c) => c.to_string(),
    }
}

/// Parses a `+`-joined chord such as `ALT+TAB`.
pub fn parse_key_stroke(text: &str) -> Option<KeyStroke> {
    let mut keys: SmallVec<[KeyCode; 4]> = SmallVec::new();
    for part in text.split('+') {
        keys.push(key_name_to_code(part)?);
    }
    if keys.is_empty() {
        return None;
    }
    Some(KeyStroke(keys))
}

/// Parses an action name.
///
/// Accepted forms: `KILL` (uses `default_process`), `KILL:<name>`, `CLICK`, or a key chord.
pub fn parse_action(text: &str, default_process: &str) -> Option<Action> {
    let trimmed = text.trim();

    if trimmed.eq_ignore_ascii_case("KILL") {
        return Some(Action::TerminateProcess(default_process.to_string()));
    }
    if trimmed
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("KILL:"))
    {
        let name = trimmed[5..].trim();
        if name.is_empty() {
            return None;
        }
        return Some(Action::TerminateProcess(name.to_string()));
    }
    if trimmed.eq_ignore_ascii_case("CLICK") {
        return Some(Action::Click);
    }

    parse_key_stroke(trimmed).map(Action::Key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_names() {
        let f9 = button_name_to_button("F9").unwrap();
        assert_eq!(f9.id, "f9");
        assert_eq!(f9.source, ButtonSource::Keyboard);

        let xbox = button_name_to_button("XBOX").unwrap();
        assert_eq!(xbox.source, ButtonSource::GamepadDigital);

        let up = button_name_to_button("up").unwrap();
        assert_eq!(up.source, ButtonSource::GamepadHat);
    }

    #[test]
    fn test_button_aliases() {
        assert_eq!(button_name_to_button("south").unwrap().id, "a");
        assert_eq!(button_name_to_button("Guide").unwrap().id, "xbox");
        assert_eq!(button_name_to_button("START").unwrap().id, "menu");
        assert_eq!(button_name_to_button("DPAD_LEFT").unwrap().id, "left");
    }

    #[test]
    fn test_button_invalid() {
        assert!(button_name_to_button("").is_none());
        assert!(button_name_to_button("TRIGGER9").is_none());
    }

    #[test]
    fn test_key_name_to_code() {
        assert_eq!(key_name_to_code("q"), Some(KeyCode::Char('Q')));
        assert_eq!(key_name_to_code("7"), Some(KeyCode::Char('7')));
        assert_eq!(key_name_to_code("F12"), Some(KeyCode::F(12)));
        assert_eq!(key_name_to_code("return"), Some(KeyCode::Enter));
        assert_eq!(key_name_to_code("F13"), None);
        assert_eq!(key_name_to_code("F0"), None);
        assert_eq!(key_name_to_code("ABC"), None);
    }

    #[test]
    fn test_parse_key_stroke() {
        let stroke = parse_key_stroke("ALT+TAB").unwrap();
        assert_eq!(stroke.keys(), &[KeyCode::Alt, KeyCode::Tab]);
        assert_eq!(stroke.to_string(), "ALT+TAB");

        assert!(parse_key_stroke("ALT+").is_none());
        assert!(parse_key_stroke("ALT+NOPE").is_none());
    }

    #[test]
    fn test_parse_action() {
        assert_eq!(
            parse_action("KILL", "chrome.exe"),
            Some(Action::TerminateProcess("chrome.exe".to_string()))
        );
        assert_eq!(
            parse_action("kill:Notepad.exe", "chrome.exe"),
            Some(Action::TerminateProcess("Notepad.exe".to_string()))
        );
        assert_eq!(parse_action("KILL:", "chrome.exe"), None);
        assert_eq!(parse_action("click", "chrome.exe"), Some(Action::Click));
        assert_eq!(
            parse_action("Backspace", "chrome.exe"),
            Some(Action::Key(KeyStroke::single(KeyCode::Backspace)))
        );
        assert_eq!(parse_action("", "chrome.exe"), None);
    }

    #[test]
    fn test_parse_action_non_ascii_prefix() {
        assert_eq!(parse_action("kıll:x", "chrome.exe"), None);
        assert_eq!(parse_action("kıll", "chrome.exe"), None);
        assert_eq!(
            parse_action("KILL:café.exe", "chrome.exe"),
            Some(Action::TerminateProcess("café.exe".to_string()))
        );
    }
}
