//! Startup check for the telemetry server process.

use sysinfo::{ProcessesToUpdate, System};

/// True when a process whose executable name equals `name` (case-insensitive) is running.
pub fn is_process_running(name: &str) -> bool {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);
    let found = any_matches(
        system
            .processes()
            .values()
            .map(|p| p.name().to_string_lossy().into_owned()),
        name,
    );
    tracing::debug!(process = name, found, "Checked for telemetry server process");
    found
}

fn any_matches<I>(names: I, wanted: &str) -> bool
where
    I: IntoIterator<Item = String>,
{
    names.into_iter().any(|n| n.eq_ignore_ascii_case(wanted))
}
