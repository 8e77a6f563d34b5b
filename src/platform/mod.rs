//! Operating system backends.
//!
//! Each platform module provides the same four constructors:
//! `keyboard_backend`, `gamepad_backend`, `process_control` and `input_injector`.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::*;

#[cfg(windows)]
mod win32;
#[cfg(windows)]
pub use win32::*;

#[cfg(not(any(windows, target_os = "linux")))]
mod unsupported;
#[cfg(not(any(windows, target_os = "linux")))]
pub use unsupported::*;

/// Linux truncates `/proc/<pid>/comm` to this many bytes.
pub const COMM_MAX_LEN: usize = 15;

/// Compares a running process name against a configured target, case-insensitively.
///
/// A trailing `.exe` on either side is ignored, and a candidate that fills the
/// whole comm field matches a longer target with the same prefix.
pub fn matches_process_name(candidate: &str, target: &str) -> bool {
    fn stem(name: &str) -> String {
        let lower = name.trim().to_lowercase();
        match lower.strip_suffix(".exe") {
            Some(stem) => stem.to_string(),
            None => lower,
        }
    }

    let candidate_lower = candidate.trim().to_lowercase();
    let target_lower = target.trim().to_lowercase();
    if candidate_lower.is_empty() || target_lower.is_empty() {
        return false;
    }
    if candidate_lower == target_lower {
        return true;
    }

    let (c, t) = (stem(candidate), stem(target));
    if c == t {
        return true;
    }

    candidate_lower.len() == COMM_MAX_LEN
        && (t.starts_with(&candidate_lower) || target_lower.starts_with(&candidate_lower))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_case_insensitive() {
        assert!(matches_process_name("chrome.exe", "chrome.exe"));
        assert!(matches_process_name("Chrome.EXE", "chrome.exe"));
        assert!(!matches_process_name("chromium", "chrome.exe"));
    }

    #[test]
    fn test_exe_suffix_ignored() {
        assert!(matches_process_name("chrome", "chrome.exe"));
        assert!(matches_process_name("chrome.exe", "chrome"));
        assert!(!matches_process_name("chrome_crashpad", "chrome.exe"));
    }

    #[test]
    fn test_truncated_comm() {
        // "chrome_crashpad_handler" as reported by /proc
        assert!(matches_process_name("chrome_crashpad", "chrome_crashpad_handler"));
        assert!(!matches_process_name("chrome_crashpa", "chrome_crashpad_handler"));
    }

    #[test]
    fn test_empty_never_matches() {
        assert!(!matches_process_name("", "chrome.exe"));
        assert!(!matches_process_name("chrome", ""));
    }
}
