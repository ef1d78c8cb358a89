//! Focus safety.
//!
//! Before every keystroke the coordinator asks whether the window holding
//! input focus belongs to this tool. Typing into our own terminal would feed
//! the text back into the console command reader, so such a step is turned
//! into an automatic pause instead.

use crate::process_tree::ProcessTree;
use std::collections::HashSet;
use tracing::debug;

/// Decides whether the focused window is one of ours.
#[derive(Debug, Clone)]
pub struct FocusGuard {
    enabled: bool,
    lineage: HashSet<u32>,
}

impl FocusGuard {
    pub fn new(enabled: bool) -> Self {
        let lineage = if enabled {
            let hosts = platform::window_owners();
            ProcessTree::new().current_lineage(|pid| hosts.contains(&pid))
        } else {
            HashSet::new()
        };
        debug!(enabled, processes = lineage.len(), "focus guard ready");
        Self { enabled, lineage }
    }

    /// A guard that never reports focus.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            lineage: HashSet::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn lineage(&self) -> &HashSet<u32> {
        &self.lineage
    }

    pub fn is_own_window_focused(&self) -> bool {
        self.enabled && platform::own_window_focused(&self.lineage)
    }
}

#[cfg(windows)]
mod platform {
    use std::collections::HashSet;
    use winapi::shared::minwindef::{BOOL, LPARAM, TRUE};
    use winapi::shared::windef::HWND;
    use winapi::um::wincon::GetConsoleWindow;
    use winapi::um::winuser::{
        EnumWindows, GetForegroundWindow, GetWindow, GetWindowThreadProcessId, IsWindowVisible,
        GW_OWNER,
    };

    pub fn own_window_focused(lineage: &HashSet<u32>) -> bool {
        // SAFETY: these calls take no pointers except `pid`, which outlives them.
        unsafe {
            let foreground = GetForegroundWindow();
            if foreground.is_null() {
                return false;
            }
            if foreground == GetConsoleWindow() {
                return true;
            }
            let mut pid: u32 = 0;
            GetWindowThreadProcessId(foreground, &mut pid);
            pid != 0 && lineage.contains(&pid)
        }
    }

    /// PIDs owning at least one visible top-level window.
    pub fn window_owners() -> HashSet<u32> {
        let mut owners = HashSet::new();
        // SAFETY: `owners` outlives the enumeration, which is synchronous.
        unsafe {
            EnumWindows(Some(collect_owner), &mut owners as *mut HashSet<u32> as LPARAM);
        }
        owners
    }

    unsafe extern "system" fn collect_owner(hwnd: HWND, lparam: LPARAM) -> BOOL {
        let owners = &mut *(lparam as *mut HashSet<u32>);
        if IsWindowVisible(hwnd) != 0 && GetWindow(hwnd, GW_OWNER).is_null() {
            let mut pid: u32 = 0;
            GetWindowThreadProcessId(hwnd, &mut pid);
            if pid != 0 {
                owners.insert(pid);
            }
        }
        TRUE
    }
}

#[cfg(not(windows))]
mod platform {
    use std::collections::HashSet;
    use std::sync::Once;
    use tracing::warn;

    static QUERY_FAILED: Once = Once::new();

    /// Compares the PID behind the active window with our lineage. Terminals
    /// that are not an ancestor of the shell (gnome-terminal-server, for one)
    /// are not recognised.
    pub fn own_window_focused(lineage: &HashSet<u32>) -> bool {
        match active_win_pos_rs::get_active_window() {
            Ok(window) => lineage_owns(window.process_id, lineage),
            Err(_) => {
                QUERY_FAILED.call_once(|| {
                    warn!("cannot query the active window (Wayland?); focus guard is inactive")
                });
                false
            }
        }
    }

    pub fn lineage_owns(pid: u64, lineage: &HashSet<u32>) -> bool {
        u32::try_from(pid).is_ok_and(|pid| lineage.contains(&pid))
    }

    // Window ownership is not enumerated here; the lineage walk ends at a
    // session root instead.
    pub fn window_owners() -> HashSet<u32> {
        HashSet::new()
    }
}
