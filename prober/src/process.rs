//! Host process table lookup gating whether a probe is attempted at all

use sysinfo::System;

/// Returns true when a process with exactly the given executable name is
/// alive on this host. An absent process short-circuits the probe so an
/// offline server costs no network time.
pub fn is_process_running(process_name: &str) -> bool {
    let mut system = System::new();
    system.refresh_processes();
    system
        .processes()
        .values()
        .any(|process| process.name() == process_name)
}
