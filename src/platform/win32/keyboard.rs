use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::input_manager::{DeviceError, InputBackend, RawEvents};
use crate::state::types::{DeviceKind, RawEvent, SIMULATED_EVENT_MARKER};

/// Hook callbacks have no user data pointer, so the sink is process-global.
static HOOK_SINK: Mutex<Option<Sender<RawEvent>>> = Mutex::new(None);

const VK_CODES: [(u32, &str); 15] = [
    (0x70, "KEY_F1"),
    (0x71, "KEY_F2"),
    (0x72, "KEY_F3"),
    (0x73, "KEY_F4"),
    (0x74, "KEY_F5"),
    (0x75, "KEY_F6"),
    (0x76, "KEY_F7"),
    (0x77, "KEY_F8"),
    (0x78, "KEY_F9"),
    (0x79, "KEY_F10"),
    (0x7A, "KEY_F11"),
    (0x7B, "KEY_F12"),
    (0x13, "KEY_PAUSE"),
    (0x91, "KEY_SCROLLLOCK"),
    (0x2D, "KEY_INSERT"),
];

fn vk_name(vk: u32) -> Option<&'static str> {
    VK_CODES
        .iter()
        .find(|(code, _)| *code == vk)
        .map(|(_, name)| *name)
}

fn set_sink(sender: Option<Sender<RawEvent>>) {
    *HOOK_SINK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = sender;
}

unsafe extern "system" fn keyboard_proc(code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if code < 0 {
        return unsafe { CallNextHookEx(None, code, w_param, l_param) };
    }

    let kb_struct = unsafe { &*(l_param.0 as *const KBDLLHOOKSTRUCT) };

    // Skip our own injected keys
    if kb_struct.dwExtraInfo != SIMULATED_EVENT_MARKER
        && let Some(name) = vk_name(kb_struct.vkCode)
    {
        let pressed = match w_param.0 as u32 {
            WM_KEYDOWN | WM_SYSKEYDOWN => Some(true),
            WM_KEYUP | WM_SYSKEYUP => Some(false),
            _ => None,
        };
        if let Some(pressed) = pressed
            && let Some(sender) = HOOK_SINK
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .as_ref()
        {
            let _ = sender.send(RawEvent::Key {
                code: name,
                pressed,
            });
        }
    }

    // Never swallow keys
    unsafe { CallNextHookEx(None, code, w_param, l_param) }
}

/// Installs the hook and pumps messages until `WM_QUIT`.
fn hook_thread(ready: Sender<Result<u32, String>>) {
    let thread_id = unsafe { GetCurrentThreadId() };

    // Force create message queue
    unsafe {
        let mut msg = MSG::default();
        let _ = PeekMessageA(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
    }

    let hook = match unsafe { SetWindowsHookExA(WH_KEYBOARD_LL, Some(keyboard_proc), None, 0) } {
        Ok(hook) if !hook.0.is_null() => hook,
        Ok(_) => {
            let _ = ready.send(Err("SetWindowsHookExA returned null".to_string()));
            return;
        }
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    let _ = ready.send(Ok(thread_id));

    unsafe {
        let mut msg = MSG::default();
        loop {
            let result = GetMessageA(&mut msg, None, 0, 0);
            if result.0 == 0 || result.0 == -1 {
                break;
            }
            let _ = TranslateMessage(&msg);
            DispatchMessageA(&msg);
        }
        let _ = UnhookWindowsHookEx(hook);
    }
}

/// System-wide low-level keyboard hook on its own message-loop thread.
#[derive(Default)]
pub struct HookKeyboard {
    events: Option<Receiver<RawEvent>>,
    hook: Option<(u32, JoinHandle<()>)>,
}

impl HookKeyboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputBackend for HookKeyboard {
    fn device(&self) -> DeviceKind {
        DeviceKind::Keyboard
    }

    fn connect(&mut self) -> Result<String, DeviceError> {
        let (tx, rx) = unbounded();
        set_sink(Some(tx));

        let (ready_tx, ready_rx) = bounded(1);
        let handle = thread::Builder::new()
            .name("keyboard_hook".to_string())
            .spawn(move || hook_thread(ready_tx))?;

        match ready_rx.recv() {
            Ok(Ok(thread_id)) => {
                self.events = Some(rx);
                self.hook = Some((thread_id, handle));
                Ok("low-level keyboard hook".to_string())
            }
            Ok(Err(msg)) => {
                let _ = handle.join();
                set_sink(None);
                Err(DeviceError::Backend(msg))
            }
            Err(_) => {
                let _ = handle.join();
                set_sink(None);
                Err(DeviceError::Backend("keyboard hook thread exited".to_string()))
            }
        }
    }

    fn poll(&mut self, timeout: Duration) -> Result<RawEvents, DeviceError> {
        let events = self.events.as_ref().ok_or(DeviceError::Disconnected)?;
        let mut out = RawEvents::new();

        match events.recv_timeout(timeout) {
            Ok(event) => out.push(event),
            Err(RecvTimeoutError::Timeout) => return Ok(out),
            Err(RecvTimeoutError::Disconnected) => return Err(DeviceError::Disconnected),
        }
        out.extend(events.try_iter());
        Ok(out)
    }

    fn disconnect(&mut self) {
        if let Some((thread_id, handle)) = self.hook.take() {
            unsafe {
                let _ = PostThreadMessageA(thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
            }
            let _ = handle.join();
        }
        set_sink(None);
        self.events = None;
    }
}

impl Drop for HookKeyboard {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vk_name() {
        assert_eq!(vk_name(0x78), Some("KEY_F9"));
        assert_eq!(vk_name(0x70), Some("KEY_F1"));
        assert_eq!(vk_name(0x41), None);
    }
}
