use windows::Win32::Foundation::CloseHandle;
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW, TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Threading::{
    GetCurrentProcessId, OpenProcess, PROCESS_TERMINATE, TerminateProcess,
};

use crate::executor::{ProcessControl, TerminateOutcome};
use crate::platform::matches_process_name;

#[inline]
fn exe_name(entry: &PROCESSENTRY32W) -> String {
    let len = entry
        .szExeFile
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(entry.szExeFile.len());
    String::from_utf16_lossy(&entry.szExeFile[..len])
}

/// `(pid, exe name)` for every process in a Toolhelp snapshot.
fn snapshot() -> anyhow::Result<Vec<(u32, String)>> {
    let mut processes = Vec::new();
    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0)?;
        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        if Process32FirstW(snapshot, &mut entry).is_ok() {
            loop {
                processes.push((entry.th32ProcessID, exe_name(&entry)));
                if Process32NextW(snapshot, &mut entry).is_err() {
                    break;
                }
            }
        }
        let _ = CloseHandle(snapshot);
    }
    Ok(processes)
}

/// Names of every running process.
pub fn list_process_names() -> anyhow::Result<Vec<String>> {
    Ok(snapshot()?.into_iter().map(|(_, name)| name).collect())
}

/// `TerminateProcess` by Toolhelp name lookup.
pub struct ToolhelpProcessControl;

impl ProcessControl for ToolhelpProcessControl {
    fn terminate_by_name(&self, name: &str) -> anyhow::Result<TerminateOutcome> {
        let own_pid = unsafe { GetCurrentProcessId() };
        let mut killed = 0usize;
        let mut matched = 0usize;
        let mut last_error = None;

        for (pid, exe) in snapshot()? {
            if pid == own_pid || pid == 0 || !matches_process_name(&exe, name) {
                continue;
            }
            matched += 1;

            let result = unsafe {
                OpenProcess(PROCESS_TERMINATE, false, pid).and_then(|handle| {
                    let result = TerminateProcess(handle, 1);
                    let _ = CloseHandle(handle);
                    result
                })
            };
            match result {
                Ok(()) => killed += 1,
                Err(e) => {
                    tracing::debug!("TerminateProcess({}) failed: {}", pid, e);
                    last_error = Some(e);
                }
            }
        }

        match (killed, last_error) {
            (0, Some(err)) => Err(anyhow::anyhow!(
                "Failed to terminate {} ({} match(es)): {}",
                name,
                matched,
                err
            )),
            (0, None) => Ok(TerminateOutcome::NotFound),
            (n, _) => Ok(TerminateOutcome::Terminated(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_lists_processes() {
        let names = list_process_names().unwrap();
        assert!(!names.is_empty());
    }

    #[test]
    fn test_unknown_name_not_found() {
        let outcome = ToolhelpProcessControl
            .terminate_by_name("padhook-no-such-process.exe")
            .unwrap();
        assert_eq!(outcome, TerminateOutcome::NotFound);
    }
}
