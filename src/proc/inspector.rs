use std::io;

use thiserror::Error;

/// Display name used when a process name cannot be resolved.
pub const UNKNOWN_PROCESS: &str = "Unknown Process";

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("process {0} no longer exists")]
    Vanished(u32),
    #[error("access to process {0} denied")]
    AccessDenied(u32),
    #[error("{what} unavailable: {reason}")]
    Unavailable { what: &'static str, reason: String },
    /// The backend has no way to read this on the current platform.
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

impl InspectError {
    /// Whether the monitored process is gone for good (as opposed to a single
    /// bad read).
    pub fn is_terminal(&self) -> bool {
        matches!(self, InspectError::Vanished(_) | InspectError::AccessDenied(_))
    }

    pub fn unavailable(what: &'static str, reason: impl ToString) -> Self {
        InspectError::Unavailable {
            what,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn from_io(pid: u32, what: &'static str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => InspectError::Vanished(pid),
            io::ErrorKind::PermissionDenied => InspectError::AccessDenied(pid),
            _ => InspectError::unavailable(what, err),
        }
    }
}

/// Host facts read once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemContext {
    pub cores: u32,
    pub total_ram_mb: f64,
}

impl SystemContext {
    pub fn new(cores: u32, total_ram_mb: f64) -> Result<Self, InspectError> {
        if cores == 0 {
            return Err(InspectError::unavailable("core count", "reported zero cores"));
        }
        if !(total_ram_mb > 0.0) {
            return Err(InspectError::unavailable(
                "total memory",
                format!("reported {total_ram_mb} MB"),
            ));
        }
        Ok(Self {
            cores,
            total_ram_mb,
        })
    }
}

/// One line of the startup process listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub command: String,
}

/// Read-only view of a process's kernel counters.
///
/// `refresh` is called once per tick before the per-process queries so that
/// backends which snapshot the process table can do it once; the queries
/// themselves are idempotent between refreshes.
pub trait Inspector {
    fn refresh(&mut self, _pid: u32) -> Result<(), InspectError> {
        Ok(())
    }

    /// Cumulative user plus system CPU time in seconds.
    fn cpu_time_seconds(&mut self, pid: u32) -> Result<f64, InspectError>;

    /// Resident memory in MiB.
    fn memory_mb(&mut self, pid: u32) -> Result<f64, InspectError>;

    fn thread_count(&mut self, pid: u32) -> Result<u32, InspectError>;

    fn process_name(&mut self, pid: u32) -> Result<String, InspectError>;

    fn system_context(&mut self) -> Result<SystemContext, InspectError>;

    /// Up to `limit` processes in ascending pid order.
    fn list_processes(&mut self, limit: usize) -> Result<Vec<ProcessEntry>, InspectError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_kinds() {
        let gone = InspectError::from_io(7, "stat", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(gone, InspectError::Vanished(7)));
        assert!(gone.is_terminal());

        let denied = InspectError::from_io(7, "stat", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, InspectError::AccessDenied(7)));
        assert!(denied.is_terminal());

        let glitch = InspectError::from_io(7, "stat", io::Error::from(io::ErrorKind::InvalidData));
        assert!(matches!(glitch, InspectError::Unavailable { what: "stat", .. }));
        assert!(!glitch.is_terminal());
        assert!(!InspectError::Unsupported("thread count").is_terminal());
    }

    #[test]
    fn system_context_rejects_zero_values() {
        assert!(SystemContext::new(0, 8000.0).is_err());
        assert!(SystemContext::new(4, 0.0).is_err());
        assert!(SystemContext::new(4, f64::NAN).is_err());
        let ctx = SystemContext::new(4, 8000.0).unwrap();
        assert_eq!(ctx.cores, 4);
        assert_eq!(ctx.total_ram_mb, 8000.0);
    }
}
