//! Target process discovery
//!
//! Scans the live process table for the server process to monitor,
//! identified by substrings of its command line. Enumeration works on a
//! snapshot of the process table, so processes vanishing or denying
//! access mid-scan simply fail to match instead of aborting the scan.

use drainmon_config::domains::monitor::ProcessMarkers;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::debug;

/// Find the PID of the first process whose command line contains both
/// configured markers, or `None` after a full scan without a match.
pub fn find_target_process(markers: &ProcessMarkers) -> Option<u32> {
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always),
    );

    find_in_system(&system, markers)
}

fn find_in_system(system: &System, markers: &ProcessMarkers) -> Option<u32> {
    for (pid, process) in system.processes() {
        let cmdline = process
            .cmd()
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");

        if cmdline.contains(&markers.launcher) && cmdline.contains(&markers.module) {
            debug!(pid = pid.as_u32(), %cmdline, "matched target process");
            return Some(pid.as_u32());
        }
    }
    None
}
