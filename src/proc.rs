//! OS process inspection backends.

use log::*;

pub mod inspector;
#[cfg(target_os = "linux")]
pub mod procfs;
pub mod system;
#[cfg(windows)]
mod toolhelp;

pub use inspector::{InspectError, Inspector, ProcessEntry, SystemContext, UNKNOWN_PROCESS};
#[cfg(target_os = "linux")]
pub use procfs::ProcfsInspector;
pub use system::SysinfoInspector;

use crate::config::InspectorKind;

impl InspectorKind {
    /// Construct the backend this kind names, resolving `Auto` for the
    /// current platform.
    pub fn build(self) -> Box<dyn Inspector> {
        match self {
            InspectorKind::Sysinfo => Box::new(SysinfoInspector::default()),
            InspectorKind::Auto | InspectorKind::Procfs => platform_inspector(self),
        }
    }
}

#[cfg(target_os = "linux")]
fn platform_inspector(_kind: InspectorKind) -> Box<dyn Inspector> {
    debug!(target: "Inspector", "Using /proc backend");
    Box::new(ProcfsInspector::default())
}

#[cfg(not(target_os = "linux"))]
fn platform_inspector(kind: InspectorKind) -> Box<dyn Inspector> {
    if kind == InspectorKind::Procfs {
        warn!(target: "Inspector", "/proc backend is only available on Linux, using sysinfo");
    }
    Box::new(SysinfoInspector::default())
}
