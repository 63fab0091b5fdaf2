//! Linux backend reading `/proc` directly.

use std::{fs, path::PathBuf};

use log::*;

use crate::proc::inspector::{InspectError, Inspector, ProcessEntry, SystemContext};

/// Kernel clock ticks per second as exposed to userspace (`USER_HZ`).
const USER_HZ: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct ProcfsInspector {
    root: PathBuf,
}

impl Default for ProcfsInspector {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl ProcfsInspector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn pid_path(&self, pid: u32, file: &str) -> PathBuf {
        self.root.join(pid.to_string()).join(file)
    }

    fn read(&self, pid: u32, file: &'static str) -> Result<String, InspectError> {
        fs::read_to_string(self.pid_path(pid, file)).map_err(|e| InspectError::from_io(pid, file, e))
    }
}

impl Inspector for ProcfsInspector {
    /// A zombie keeps its `/proc` entry until reaped but has exited, so it
    /// counts as gone.
    fn refresh(&mut self, pid: u32) -> Result<(), InspectError> {
        let stat = self.read(pid, "stat")?;
        match parse_stat_state(&stat) {
            Some(state @ ('Z' | 'X' | 'x')) => {
                debug!(target: "Inspector", "Process {} is in state {}", pid, state);
                Err(InspectError::Vanished(pid))
            }
            _ => Ok(()),
        }
    }

    fn cpu_time_seconds(&mut self, pid: u32) -> Result<f64, InspectError> {
        let stat = self.read(pid, "stat")?;
        let ticks = parse_stat_cpu_ticks(&stat)
            .ok_or_else(|| InspectError::unavailable("stat", "malformed utime/stime"))?;
        Ok(ticks as f64 / USER_HZ)
    }

    fn memory_mb(&mut self, pid: u32) -> Result<f64, InspectError> {
        let status = self.read(pid, "status")?;
        // Kernel threads have no VmRSS line at all.
        Ok(parse_kb_field(&status, "VmRSS:").unwrap_or(0) as f64 / 1024.0)
    }

    fn thread_count(&mut self, pid: u32) -> Result<u32, InspectError> {
        let tasks = self.pid_path(pid, "task");
        let entries = fs::read_dir(&tasks).map_err(|e| InspectError::from_io(pid, "task", e))?;
        let count = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| is_numeric(&entry.file_name().to_string_lossy()))
            .count();
        Ok(count as u32)
    }

    fn process_name(&mut self, pid: u32) -> Result<String, InspectError> {
        let cmdline = fs::read(self.pid_path(pid, "cmdline"))
            .map_err(|e| InspectError::from_io(pid, "cmdline", e))?;
        let name = parse_cmdline(&cmdline);
        if !name.is_empty() {
            return Ok(name);
        }
        let status = self.read(pid, "status")?;
        parse_status_name(&status)
            .ok_or_else(|| InspectError::unavailable("status", "no Name field"))
    }

    fn system_context(&mut self) -> Result<SystemContext, InspectError> {
        let stat = fs::read_to_string(self.root.join("stat"))
            .map_err(|e| InspectError::unavailable("/proc/stat", e))?;
        let meminfo = fs::read_to_string(self.root.join("meminfo"))
            .map_err(|e| InspectError::unavailable("/proc/meminfo", e))?;
        let total_kb = parse_kb_field(&meminfo, "MemTotal:")
            .ok_or_else(|| InspectError::unavailable("/proc/meminfo", "no MemTotal field"))?;
        SystemContext::new(count_cpus(&stat), total_kb as f64 / 1024.0)
    }

    fn list_processes(&mut self, limit: usize) -> Result<Vec<ProcessEntry>, InspectError> {
        let mut pids: Vec<u32> = fs::read_dir(&self.root)
            .map_err(|e| InspectError::unavailable("process list", e))?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_string_lossy().parse().ok())
            .collect();
        pids.sort_unstable();

        let mut listed = Vec::new();
        for pid in pids {
            if listed.len() >= limit {
                break;
            }
            // Kernel threads have an empty command line and are skipped.
            match fs::read(self.pid_path(pid, "cmdline")) {
                Ok(raw) => {
                    let command = parse_cmdline(&raw);
                    if !command.is_empty() {
                        listed.push(ProcessEntry { pid, command });
                    }
                }
                Err(e) => trace!(target: "Inspector", "Skipping {}: {}", pid, e),
            }
        }
        Ok(listed)
    }
}

fn is_numeric(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

/// utime + stime in clock ticks from the contents of `/proc/<pid>/stat`.
///
/// The command name (field 2) may itself contain spaces and parentheses, so
/// fields are counted from the last `)`.
pub(crate) fn parse_stat_cpu_ticks(stat: &str) -> Option<u64> {
    let rest = &stat[stat.rfind(')')? + 1..];
    let mut fields = rest.split_whitespace();
    // `rest` starts at field 3 (state); utime and stime are fields 14 and 15.
    let utime: u64 = fields.nth(11)?.parse().ok()?;
    let stime: u64 = fields.next()?.parse().ok()?;
    Some(utime + stime)
}

/// Single-letter process state (field 3) from `/proc/<pid>/stat`.
pub(crate) fn parse_stat_state(stat: &str) -> Option<char> {
    let rest = &stat[stat.rfind(')')? + 1..];
    rest.split_whitespace().next()?.chars().next()
}

/// Value of a `Key:   1234 kB` line as found in `status` and `meminfo`.
pub(crate) fn parse_kb_field(contents: &str, key: &str) -> Option<u64> {
    contents
        .lines()
        .find_map(|line| line.strip_prefix(key))
        .and_then(|value| value.split_whitespace().next())
        .and_then(|value| value.parse().ok())
}

pub(crate) fn parse_status_name(status: &str) -> Option<String> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Name:"))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// NUL-separated arguments joined with spaces.
pub(crate) fn parse_cmdline(raw: &[u8]) -> String {
    raw.split(|b| *b == 0)
        .filter(|arg| !arg.is_empty())
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of per-cpu lines (`cpu0`, `cpu1`, ...) in `/proc/stat`.
pub(crate) fn count_cpus(stat: &str) -> u32 {
    stat.lines()
        .filter(|line| {
            line.strip_prefix("cpu")
                .and_then(|rest| rest.chars().next())
                .is_some_and(|c| c.is_ascii_digit())
        })
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "1234 (my (odd) proc) S 1 1234 1234 0 -1 4194560 2040 0 0 0 \
                        250 75 0 0 20 0 3 0 123456 12345678 900 18446744073709551615";

    const STATUS: &str = "Name:\tmy proc\n\
                          Umask:\t0022\n\
                          State:\tS (sleeping)\n\
                          VmPeak:\t  20000 kB\n\
                          VmRSS:\t   51200 kB\n\
                          Threads:\t3\n";

    const MEMINFO: &str = "MemTotal:        8192000 kB\n\
                           MemFree:         1024000 kB\n\
                           MemAvailable:    4096000 kB\n";

    const PROC_STAT: &str = "cpu  100 0 200 3000 0 0 0 0 0 0\n\
                             cpu0 50 0 100 1500 0 0 0 0 0 0\n\
                             cpu1 50 0 100 1500 0 0 0 0 0 0\n\
                             intr 12345\n\
                             ctxt 678\n";

    #[test]
    fn stat_ticks_skip_parenthesised_name() {
        assert_eq!(parse_stat_cpu_ticks(STAT), Some(325));
    }

    #[test]
    fn stat_ticks_reject_truncated_line() {
        assert_eq!(parse_stat_cpu_ticks("1234 (proc) S 1 1234"), None);
        assert_eq!(parse_stat_cpu_ticks("garbage"), None);
    }

    #[test]
    fn stat_state() {
        assert_eq!(parse_stat_state(STAT), Some('S'));
        assert_eq!(parse_stat_state("77 (zombie) Z 1 77"), Some('Z'));
        assert_eq!(parse_stat_state("77 (cut)"), None);
    }

    #[test]
    fn kb_fields() {
        assert_eq!(parse_kb_field(STATUS, "VmRSS:"), Some(51200));
        assert_eq!(parse_kb_field(MEMINFO, "MemTotal:"), Some(8_192_000));
        assert_eq!(parse_kb_field(STATUS, "VmSwap:"), None);
    }

    #[test]
    fn status_name() {
        assert_eq!(parse_status_name(STATUS).as_deref(), Some("my proc"));
        assert_eq!(parse_status_name("Name:\t\n"), None);
    }

    #[test]
    fn cmdline_joins_arguments() {
        assert_eq!(parse_cmdline(b"/usr/bin/python3\0-m\0http.server\0"), "/usr/bin/python3 -m http.server");
        assert_eq!(parse_cmdline(b""), "");
    }

    #[test]
    fn cpu_count_ignores_aggregate_line() {
        assert_eq!(count_cpus(PROC_STAT), 2);
    }

    #[test]
    fn fake_proc_tree() {
        let root = std::env::temp_dir().join(format!("procmon-procfs-{}", std::process::id()));
        let pid_dir = root.join("42");
        fs::create_dir_all(pid_dir.join("task").join("42")).unwrap();
        fs::create_dir_all(pid_dir.join("task").join("43")).unwrap();
        fs::write(pid_dir.join("stat"), STAT).unwrap();
        fs::write(pid_dir.join("status"), STATUS).unwrap();
        fs::write(pid_dir.join("cmdline"), b"").unwrap();
        fs::write(root.join("stat"), PROC_STAT).unwrap();
        fs::write(root.join("meminfo"), MEMINFO).unwrap();

        let mut inspector = ProcfsInspector::new(&root);
        inspector.refresh(42).unwrap();
        assert_eq!(inspector.cpu_time_seconds(42).unwrap(), 3.25);
        assert_eq!(inspector.memory_mb(42).unwrap(), 50.0);
        assert_eq!(inspector.thread_count(42).unwrap(), 2);
        assert_eq!(inspector.process_name(42).unwrap(), "my proc");
        assert_eq!(
            inspector.system_context().unwrap(),
            SystemContext::new(2, 8000.0).unwrap()
        );
        // Empty command line: not listed.
        assert!(inspector.list_processes(20).unwrap().is_empty());

        assert!(matches!(inspector.refresh(99), Err(InspectError::Vanished(99))));

        // Exited but not yet reaped: no VmRSS, state Z.
        let zombie = root.join("43");
        fs::create_dir_all(&zombie).unwrap();
        fs::write(zombie.join("stat"), "43 (defunct) Z 1 43 43 0 -1 4228108 0 0 0 0 9 4 0 0 20 0 1 0 5 0 0").unwrap();
        fs::write(zombie.join("status"), "Name:\tdefunct\nState:\tZ (zombie)\n").unwrap();
        assert!(matches!(inspector.refresh(43), Err(InspectError::Vanished(43))));
        assert!(matches!(inspector.cpu_time_seconds(99), Err(InspectError::Vanished(99))));

        fs::remove_dir_all(&root).unwrap();
    }
}
