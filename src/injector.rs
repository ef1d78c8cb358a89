//! Keyboard injection backends.
//!
//! [`InputInjector`] is the seam between the typing coordinator and the
//! operating system. [`EnigoInjector`] synthesizes real key events through
//! `enigo`; [`DryRunInjector`] only logs what would have been typed.

use crate::error::{Result, TyperError};
use crate::focus::FocusGuard;
use crate::keystroke::{Keystroke, NamedKey};
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use std::time::Duration;
use tracing::{debug, info};

/// Default minimum delay the backend leaves between synthetic events.
pub const DEFAULT_KEYBOARD_DELAY: Duration = Duration::from_millis(1);

/// Platform capability for synthesizing keyboard input.
pub trait InputInjector {
    /// Type a literal character into the focused window.
    fn inject_character(&mut self, c: char) -> Result<()>;

    /// Tap a named key.
    fn inject_key(&mut self, key: NamedKey) -> Result<()>;

    /// Minimum delay between synthetic events; configured once at startup.
    fn set_inter_character_delay(&mut self, delay: Duration) -> Result<()>;

    /// Whether the window holding input focus belongs to this tool.
    fn is_own_window_focused(&self) -> bool;

    fn inject(&mut self, keystroke: Keystroke) -> Result<()> {
        match keystroke {
            Keystroke::Key(key) => self.inject_key(key),
            Keystroke::Text(c) => self.inject_character(c),
        }
    }
}

/// Injects keystrokes through the OS input APIs.
pub struct EnigoInjector {
    enigo: Enigo,
    focus: FocusGuard,
}

impl EnigoInjector {
    pub fn new(focus: FocusGuard) -> Result<Self> {
        let enigo = Self::connect(DEFAULT_KEYBOARD_DELAY)?;
        Ok(Self { enigo, focus })
    }

    fn connect(delay: Duration) -> Result<Enigo> {
        let mut settings = Settings::default();
        settings.linux_delay = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Enigo::new(&settings).map_err(|e| TyperError::injector_init(e.to_string()))
    }
}

impl InputInjector for EnigoInjector {
    fn inject_character(&mut self, c: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.enigo
            .text(c.encode_utf8(&mut buf))
            .map_err(|e| TyperError::injection(Keystroke::Text(c).to_string(), e.to_string()))
    }

    fn inject_key(&mut self, key: NamedKey) -> Result<()> {
        let code = match key {
            NamedKey::Enter => Key::Return,
            NamedKey::Tab => Key::Tab,
        };
        self.enigo
            .key(code, Direction::Click)
            .map_err(|e| TyperError::injection(Keystroke::Key(key).to_string(), e.to_string()))
    }

    fn set_inter_character_delay(&mut self, delay: Duration) -> Result<()> {
        // enigo only reads the delay at connection time.
        self.enigo = Self::connect(delay)?;
        debug!(delay_ms = delay.as_millis() as u64, "keyboard delay configured");
        Ok(())
    }

    fn is_own_window_focused(&self) -> bool {
        self.focus.is_own_window_focused()
    }
}

/// Logs keystrokes instead of sending them.
#[derive(Debug, Default)]
pub struct DryRunInjector {
    typed: String,
}

impl DryRunInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything "typed" so far, with named keys rendered as their characters.
    pub fn typed(&self) -> &str {
        &self.typed
    }
}

impl InputInjector for DryRunInjector {
    fn inject_character(&mut self, c: char) -> Result<()> {
        info!(character = ?c, "dry run");
        self.typed.push(c);
        Ok(())
    }

    fn inject_key(&mut self, key: NamedKey) -> Result<()> {
        info!(key = %key, "dry run");
        self.typed.push(match key {
            NamedKey::Enter => '\n',
            NamedKey::Tab => '\t',
        });
        Ok(())
    }

    fn set_inter_character_delay(&mut self, _delay: Duration) -> Result<()> {
        Ok(())
    }

    fn is_own_window_focused(&self) -> bool {
        false
    }
}
