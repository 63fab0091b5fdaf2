//! Portable backend on top of `sysinfo`.

use log::*;
use sysinfo::{CpuRefreshKind, Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::proc::inspector::{InspectError, Inspector, ProcessEntry, SystemContext};

const MIB: f64 = 1024.0 * 1024.0;

#[derive(Debug)]
pub struct SysinfoInspector {
    sys: System,
}

impl Default for SysinfoInspector {
    fn default() -> Self {
        Self { sys: System::new() }
    }
}

impl SysinfoInspector {
    fn process(&self, pid: u32) -> Result<&sysinfo::Process, InspectError> {
        self.sys
            .process(Pid::from_u32(pid))
            .ok_or(InspectError::Vanished(pid))
    }
}

impl Inspector for SysinfoInspector {
    /// Refresh the sysinfo entry for `pid`, dropping it if the process exited.
    fn refresh(&mut self, pid: u32) -> Result<(), InspectError> {
        let pids = [Pid::from_u32(pid)];
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&pids),
            true,
            ProcessRefreshKind::everything(),
        );
        self.process(pid).map(|_| ())
    }

    fn cpu_time_seconds(&mut self, pid: u32) -> Result<f64, InspectError> {
        let info = self.process(pid)?;
        Ok(info.accumulated_cpu_time() as f64 / 1000.0)
    }

    fn memory_mb(&mut self, pid: u32) -> Result<f64, InspectError> {
        let info = self.process(pid)?;
        Ok(info.memory() as f64 / MIB)
    }

    fn thread_count(&mut self, pid: u32) -> Result<u32, InspectError> {
        let info = self.process(pid)?;
        match info.tasks() {
            Some(tasks) => Ok(tasks.len() as u32),
            // sysinfo only lists tasks on Linux.
            None => native_thread_count(pid),
        }
    }

    fn process_name(&mut self, pid: u32) -> Result<String, InspectError> {
        let info = self.process(pid)?;
        let command = join_command(info);
        if command.is_empty() {
            Ok(info.name().to_string_lossy().into_owned())
        } else {
            Ok(command)
        }
    }

    fn system_context(&mut self) -> Result<SystemContext, InspectError> {
        self.sys.refresh_memory();
        self.sys.refresh_cpu_list(CpuRefreshKind::nothing());
        debug!(
            target: "Inspector",
            "sysinfo reports {} cpus and {} bytes of memory",
            self.sys.cpus().len(),
            self.sys.total_memory()
        );
        SystemContext::new(
            self.sys.cpus().len() as u32,
            self.sys.total_memory() as f64 / MIB,
        )
    }

    fn list_processes(&mut self, limit: usize) -> Result<Vec<ProcessEntry>, InspectError> {
        self.sys.refresh_processes(ProcessesToUpdate::All, true);
        let mut entries: Vec<ProcessEntry> = self
            .sys
            .processes()
            .values()
            .filter(|p| p.thread_kind().is_none())
            .map(|p| {
                let command = join_command(p);
                ProcessEntry {
                    pid: p.pid().as_u32(),
                    command: if command.is_empty() {
                        p.name().to_string_lossy().into_owned()
                    } else {
                        command
                    },
                }
            })
            .collect();
        if entries.is_empty() {
            return Err(InspectError::unavailable("process list", "no processes visible"));
        }
        entries.sort_by_key(|e| e.pid);
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(windows)]
fn native_thread_count(pid: u32) -> Result<u32, InspectError> {
    crate::proc::toolhelp::count_threads(pid)
}

#[cfg(not(windows))]
fn native_thread_count(_pid: u32) -> Result<u32, InspectError> {
    Err(InspectError::Unsupported("thread count"))
}

fn join_command(info: &sysinfo::Process) -> String {
    info.cmd()
        .iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn own_pid() -> u32 {
        std::process::id()
    }

    #[test]
    fn inspects_own_process() {
        let mut inspector = SysinfoInspector::default();
        let pid = own_pid();
        inspector.refresh(pid).unwrap();
        assert!(inspector.cpu_time_seconds(pid).unwrap() >= 0.0);
        assert!(inspector.memory_mb(pid).unwrap() > 0.0);
        assert!(!inspector.process_name(pid).unwrap().is_empty());
        #[cfg(any(target_os = "linux", windows))]
        assert!(inspector.thread_count(pid).unwrap() >= 1);
        #[cfg(not(any(target_os = "linux", windows)))]
        assert!(matches!(
            inspector.thread_count(pid),
            Err(InspectError::Unsupported("thread count"))
        ));
    }

    #[test]
    fn system_context_is_sane() {
        let mut inspector = SysinfoInspector::default();
        let ctx = inspector.system_context().unwrap();
        assert!(ctx.cores >= 1);
        assert!(ctx.total_ram_mb > 0.0);
    }

    #[test]
    fn listing_respects_limit() {
        let mut inspector = SysinfoInspector::default();
        let listed = inspector.list_processes(5).unwrap();
        assert!(!listed.is_empty());
        assert!(listed.len() <= 5);
        assert!(listed.windows(2).all(|w| w[0].pid < w[1].pid));
    }

    #[test]
    fn missing_process_is_vanished() {
        let mut inspector = SysinfoInspector::default();
        // Above the default Linux pid_max and any realistic Windows pid.
        let pid = u32::MAX - 1;
        assert!(matches!(inspector.refresh(pid), Err(InspectError::Vanished(_))));
        assert!(matches!(inspector.memory_mb(pid), Err(InspectError::Vanished(_))));
    }
}
