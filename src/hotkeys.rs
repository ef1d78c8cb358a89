//! Global hotkeys.
//!
//! While a session runs, input focus belongs to the target application, so
//! the console cannot be used to pause or stop. Global hotkeys are registered
//! with the OS instead and translated into coordinator [`Command`]s.
//!
//! The OS delivers hotkey events to the thread that registered them, so the
//! manager lives on a dedicated thread (see [`HotkeyManager::spawn`]). On
//! Windows that thread runs a message loop. macOS only delivers events
//! through an event loop on the main thread, which this tool does not run;
//! hotkeys register there but never fire.

use crate::command::Command;
use crate::error::{Result, TyperError};
use global_hotkey::hotkey::HotKey;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::mpsc as std_mpsc;
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, info};

const MODIFIERS: &[&str] = &["ctrl", "alt", "shift", "super"];

pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    bindings: HashMap<u32, Command>,
}

impl HotkeyManager {
    pub fn new() -> Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| TyperError::hotkey(format!("failed to create hotkey manager: {}", e)))?;

        Ok(Self {
            manager,
            bindings: HashMap::new(),
        })
    }

    /// Parse `bindings`, then register them on a new hotkey thread that
    /// forwards presses to `commands` for the rest of the process.
    ///
    /// Returns the registered bindings by hotkey id once the thread is ready.
    pub fn spawn(
        bindings: &[(&str, Command)],
        commands: mpsc::UnboundedSender<Command>,
    ) -> Result<HashMap<u32, Command>> {
        let parsed = bindings
            .iter()
            .map(|(hotkey_str, command)| -> Result<(String, HotKey, Command)> {
                Ok((hotkey_str.to_string(), parse_hotkey(hotkey_str)?, command.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        #[cfg(target_os = "macos")]
        tracing::warn!("global hotkeys need a main-thread event loop on macOS and will not fire");

        let (ready_tx, ready_rx) = std_mpsc::channel();
        thread::Builder::new()
            .name("hotkeys".to_string())
            .spawn(move || {
                let mut manager = match Self::new() {
                    Ok(manager) => manager,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                for (hotkey_str, hotkey, command) in parsed {
                    if let Err(e) = manager.register(&hotkey_str, hotkey, command) {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                }
                manager.start_listener(commands);
                let _ = ready_tx.send(Ok(manager.bindings().clone()));

                platform::pump_messages();
                debug!("hotkey thread exiting");
            })?;

        ready_rx
            .recv()
            .map_err(|_| TyperError::hotkey("hotkey thread exited during setup"))?
    }

    /// Register an already parsed `hotkey` so that pressing it sends `command`.
    pub fn register(&mut self, hotkey_str: &str, hotkey: HotKey, command: Command) -> Result<()> {
        let id = hotkey.id();

        self.manager.register(hotkey).map_err(|e| {
            TyperError::hotkey(format!("failed to register '{}': {}", hotkey_str, e))
        })?;

        info!(hotkey = hotkey_str, command = command.name(), "hotkey registered");
        self.bindings.insert(id, command);
        Ok(())
    }

    pub fn bindings(&self) -> &HashMap<u32, Command> {
        &self.bindings
    }

    /// Forward hotkey presses to `commands` from a background thread.
    ///
    /// The manager itself must stay alive for the hotkeys to remain
    /// registered.
    pub fn start_listener(&self, commands: mpsc::UnboundedSender<Command>) {
        let bindings = self.bindings.clone();
        let receiver = GlobalHotKeyEvent::receiver();

        std::thread::spawn(move || {
            while let Ok(event) = receiver.recv() {
                if event.state != HotKeyState::Pressed {
                    continue;
                }
                let Some(command) = bindings.get(&event.id) else {
                    continue;
                };
                debug!(command = command.name(), "hotkey pressed");
                if commands.send(command.clone()).is_err() {
                    break;
                }
            }
        });
    }
}

#[cfg(windows)]
mod platform {
    use winapi::um::winuser::{DispatchMessageW, GetMessageW, TranslateMessage, MSG};

    /// Run the Win32 message loop until `WM_QUIT` or an error.
    pub fn pump_messages() {
        // SAFETY: `msg` is a plain C struct that outlives every call.
        unsafe {
            let mut msg: MSG = std::mem::zeroed();
            while GetMessageW(&mut msg, std::ptr::null_mut(), 0, 0) > 0 {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }
}

#[cfg(not(windows))]
mod platform {
    /// Keep the manager alive; events arrive through the global receiver.
    pub fn pump_messages() {
        loop {
            std::thread::park();
        }
    }
}

/// Parse strings such as `"ctrl+alt+p"` or `"Shift+F9"`.
///
/// Exactly one non-modifier key is required.
pub fn parse_hotkey(hotkey_str: &str) -> Result<HotKey> {
    let mut normalized = Vec::new();
    let mut has_key = false;

    for part in hotkey_str.split('+').map(|s| s.trim().to_lowercase()) {
        if part.is_empty() {
            return Err(TyperError::hotkey(format!("empty key in '{}'", hotkey_str)));
        }
        let part = match part.as_str() {
            "control" => "ctrl".to_string(),
            "meta" | "cmd" | "win" => "super".to_string(),
            "return" => "enter".to_string(),
            "esc" => "escape".to_string(),
            _ => part,
        };
        if !MODIFIERS.contains(&part.as_str()) {
            if has_key {
                return Err(TyperError::hotkey(format!(
                    "multiple keys specified in '{}'",
                    hotkey_str
                )));
            }
            has_key = true;
        }
        normalized.push(part);
    }

    if !has_key {
        return Err(TyperError::hotkey(format!(
            "no key specified in '{}'",
            hotkey_str
        )));
    }

    HotKey::from_str(&normalized.join("+"))
        .map_err(|e| TyperError::hotkey(format!("unsupported hotkey '{}': {}", hotkey_str, e)))
}
