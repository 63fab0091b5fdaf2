//! Windows thread counting from a ToolHelp thread snapshot.
//! The snapshot handle is closed on every path.

use std::{io, mem};

use windows_sys::Win32::{
    Foundation::{CloseHandle, HANDLE, INVALID_HANDLE_VALUE},
    System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, TH32CS_SNAPTHREAD, THREADENTRY32, Thread32First, Thread32Next,
    },
};

use crate::proc::inspector::InspectError;

struct Snapshot(HANDLE);

impl Drop for Snapshot {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful CreateToolhelp32Snapshot
        // and is closed exactly once.
        unsafe {
            CloseHandle(self.0);
        }
    }
}

/// Number of threads owned by `pid`, walking the system-wide snapshot.
pub fn count_threads(pid: u32) -> Result<u32, InspectError> {
    // SAFETY: valid flags; the process id argument is ignored for thread snapshots.
    let handle = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPTHREAD, 0) };
    if handle == INVALID_HANDLE_VALUE {
        return Err(InspectError::unavailable("thread snapshot", io::Error::last_os_error()));
    }
    let snapshot = Snapshot(handle);

    // SAFETY: THREADENTRY32 is plain data, all-zero is a valid value.
    let mut entry: THREADENTRY32 = unsafe { mem::zeroed() };
    entry.dwSize = mem::size_of::<THREADENTRY32>() as u32;

    let mut count = 0;
    // SAFETY: `entry` is a live THREADENTRY32 with dwSize set.
    let mut ok = unsafe { Thread32First(snapshot.0, &mut entry) } != 0;
    while ok {
        if entry.th32OwnerProcessID == pid {
            count += 1;
        }
        // SAFETY: as above.
        ok = unsafe { Thread32Next(snapshot.0, &mut entry) } != 0;
    }
    Ok(count)
}
