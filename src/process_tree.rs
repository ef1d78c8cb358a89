//! Process lineage discovery.
//!
//! The focus guard needs to know which processes "are" this tool from the
//! user's point of view: the autotyper process itself, the shell that
//! launched it and the terminal hosting that shell. This module walks the
//! parent chain of the current process using `sysinfo`.
//!
//! The walk ends at the first ancestor that hosts a visible window, which is
//! the terminal the user sees. When that terminal is embedded in a larger
//! application, such as an IDE's integrated terminal, the whole application
//! counts as our window and typing into it pauses; `focus_guard: false`
//! turns the check off for that setup.

use std::collections::HashSet;
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Processes at which the walk stops. They host the whole desktop session,
/// so treating them as "our" window would pause typing everywhere.
const SESSION_ROOTS: &[&str] = &[
    "explorer.exe",
    "explorer",
    "init",
    "systemd",
    "launchd",
    "services.exe",
    "wininit.exe",
    "sshd",
];

/// Upper bound on the number of ancestors collected.
const MAX_DEPTH: usize = 8;

/// Walks the parent chain of a process.
pub struct ProcessTree {
    system: System,
}

impl Default for ProcessTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTree {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// PIDs of the current process and its ancestors, up to the first
    /// window host or the session root.
    pub fn current_lineage(&mut self, is_window_host: impl Fn(u32) -> bool) -> HashSet<u32> {
        match sysinfo::get_current_pid() {
            Ok(pid) => self.lineage_of(pid.as_u32(), is_window_host),
            Err(e) => {
                tracing::warn!("cannot determine own pid: {}", e);
                HashSet::new()
            }
        }
    }

    /// Walk up from `pid`. The first process for which `is_window_host`
    /// holds is included and ends the walk.
    pub fn lineage_of(&mut self, pid: u32, is_window_host: impl Fn(u32) -> bool) -> HashSet<u32> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);

        let mut lineage = HashSet::new();
        let mut current = Some(Pid::from_u32(pid));

        while let Some(pid) = current {
            if lineage.len() >= MAX_DEPTH {
                break;
            }
            let Some(process) = self.system.process(pid) else {
                // Process exited or is invisible to us; keep what we have.
                if lineage.is_empty() {
                    lineage.insert(pid.as_u32());
                }
                break;
            };

            let name = process.name().to_string_lossy().to_lowercase();
            if SESSION_ROOTS.contains(&name.as_str()) {
                break;
            }

            if !lineage.insert(pid.as_u32()) || is_window_host(pid.as_u32()) {
                break;
            }
            current = process.parent();
        }

        lineage
    }
}
