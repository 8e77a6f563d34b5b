use windows::Win32::UI::Input::KeyboardAndMouse::*;

use crate::executor::InputInjector;
use crate::state::types::{KeyCode, KeyStroke, SIMULATED_EVENT_MARKER};

fn virtual_key(code: KeyCode) -> Option<u16> {
    let vk = match code {
        KeyCode::Alt => 0x12,
        KeyCode::Ctrl => 0x11,
        KeyCode::Shift => 0x10,
        KeyCode::Meta => 0x5B,
        KeyCode::Tab => 0x09,
        KeyCode::Enter => 0x0D,
        KeyCode::Backspace => 0x08,
        KeyCode::Escape => 0x1B,
        KeyCode::Space => 0x20,
        KeyCode::Delete => 0x2E,
        KeyCode::Left => 0x25,
        KeyCode::Up => 0x26,
        KeyCode::Right => 0x27,
        KeyCode::Down => 0x28,
        KeyCode::Home => 0x24,
        KeyCode::End => 0x23,
        KeyCode::PageUp => 0x21,
        KeyCode::PageDown => 0x22,
        KeyCode::F(n @ 1..=12) => 0x6F + n as u16,
        KeyCode::F(_) => return None,
        KeyCode::Char(c) => match c.to_ascii_uppercase() {
            l @ ('A'..='Z' | '0'..='9') => l as u16,
            _ => return None,
        },
    };
    Some(vk)
}

#[inline]
fn is_extended(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Meta
            | KeyCode::Delete
            | KeyCode::Left
            | KeyCode::Up
            | KeyCode::Right
            | KeyCode::Down
            | KeyCode::Home
            | KeyCode::End
            | KeyCode::PageUp
            | KeyCode::PageDown
    )
}

fn key_input(code: KeyCode, vk: u16, up: bool) -> INPUT {
    let mut flags = KEYBD_EVENT_FLAGS(0);
    if is_extended(code) {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    if up {
        flags |= KEYEVENTF_KEYUP;
    }
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: SIMULATED_EVENT_MARKER,
            },
        },
    }
}

fn mouse_input(dx: i32, dy: i32, flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: SIMULATED_EVENT_MARKER,
            },
        },
    }
}

fn send(inputs: &[INPUT]) -> anyhow::Result<()> {
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize != inputs.len() {
        anyhow::bail!(
            "SendInput injected {} of {} events: {}",
            sent,
            inputs.len(),
            std::io::Error::last_os_error()
        );
    }
    Ok(())
}

/// Synthetic input through `SendInput`, tagged so our own hook ignores it.
pub struct SendInputInjector;

impl InputInjector for SendInputInjector {
    fn send_key(&self, stroke: &KeyStroke) -> anyhow::Result<()> {
        let keys = stroke
            .keys()
            .iter()
            .map(|code| {
                virtual_key(*code)
                    .map(|vk| (*code, vk))
                    .ok_or_else(|| anyhow::anyhow!("Unsupported key {}", code))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        // Press in order, release in reverse
        let inputs: Vec<INPUT> = keys
            .iter()
            .map(|(code, vk)| key_input(*code, *vk, false))
            .chain(keys.iter().rev().map(|(code, vk)| key_input(*code, *vk, true)))
            .collect();
        send(&inputs)
    }

    fn move_cursor_relative(&self, dx: i32, dy: i32) -> anyhow::Result<()> {
        send(&[mouse_input(dx, dy, MOUSEEVENTF_MOVE)])
    }

    fn click(&self) -> anyhow::Result<()> {
        send(&[
            mouse_input(0, 0, MOUSEEVENTF_LEFTDOWN),
            mouse_input(0, 0, MOUSEEVENTF_LEFTUP),
        ])
    }
}
