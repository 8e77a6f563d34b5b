use std::fs;
use std::io;

use crate::executor::{ProcessControl, TerminateOutcome};
use crate::platform::matches_process_name;

/// One `/proc/<pid>/stat` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ProcEntry {
    pid: i32,
    comm: String,
    state: char,
}

/// Parses `pid (comm) S ...`. The comm may itself contain parentheses.
fn parse_stat(content: &str) -> Option<ProcEntry> {
    let open = content.find('(')?;
    let close = content.rfind(')')?;
    if close < open {
        return None;
    }
    let pid = content[..open].trim().parse().ok()?;
    let comm = content[open + 1..close].to_string();
    let state = content[close + 1..].trim_start().chars().next()?;
    Some(ProcEntry { pid, comm, state })
}

fn scan() -> io::Result<Vec<ProcEntry>> {
    let mut entries = Vec::new();
    for dir in fs::read_dir("/proc")? {
        let Ok(dir) = dir else { continue };
        let file_name = dir.file_name();
        let Some(name) = file_name.to_str() else { continue };
        if !name.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        // Processes may exit between listing and reading
        if let Ok(content) = fs::read_to_string(dir.path().join("stat"))
            && let Some(entry) = parse_stat(&content)
        {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Names of every live process, as reported by the kernel.
pub fn list_process_names() -> io::Result<Vec<String>> {
    Ok(scan()?
        .into_iter()
        .filter(|entry| entry.state != 'Z')
        .map(|entry| entry.comm)
        .collect())
}

/// `SIGKILL` by `/proc` name lookup.
pub struct ProcProcessControl;

impl ProcessControl for ProcProcessControl {
    fn terminate_by_name(&self, name: &str) -> anyhow::Result<TerminateOutcome> {
        let own_pid = std::process::id() as i32;
        let mut killed = 0usize;
        let mut matched = 0usize;
        let mut last_error = None;

        for entry in scan()? {
            if entry.pid == own_pid || entry.state == 'Z' || !matches_process_name(&entry.comm, name)
            {
                continue;
            }
            matched += 1;

            if unsafe { libc::kill(entry.pid, libc::SIGKILL) } == 0 {
                killed += 1;
            } else {
                let err = io::Error::last_os_error();
                // Already gone
                if err.raw_os_error() != Some(libc::ESRCH) {
                    tracing::debug!("kill({}) failed: {}", entry.pid, err);
                    last_error = Some(err);
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
    fn test_parse_stat() {
        let entry = parse_stat("1234 (chrome) S 1 1234 1234 0 -1").unwrap();
        assert_eq!(entry.pid, 1234);
        assert_eq!(entry.comm, "chrome");
        assert_eq!(entry.state, 'S');
    }

    #[test]
    fn test_parse_stat_nested_parens() {
        let entry = parse_stat("42 (Web (Content)) Z 1").unwrap();
        assert_eq!(entry.comm, "Web (Content)");
        assert_eq!(entry.state, 'Z');
    }

    #[test]
    fn test_parse_stat_malformed() {
        assert!(parse_stat("").is_none());
        assert!(parse_stat("abc (x) S").is_none());
        assert!(parse_stat("1 (x)").is_none());
    }

    #[test]
    fn test_own_process_listed() {
        let own = fs::read_to_string("/proc/self/comm").unwrap();
        let names = list_process_names().unwrap();
        assert!(names.iter().any(|n| n == own.trim()));
    }

    #[test]
    fn test_unknown_name_not_found() {
        let outcome = ProcProcessControl
            .terminate_by_name("padhook-no-such-process.exe")
            .unwrap();
        assert_eq!(outcome, TerminateOutcome::NotFound);
    }
}
