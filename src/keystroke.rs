//! Mapping from text characters to the keystrokes that produce them.

use std::fmt;

/// Keys that are tapped by name instead of being typed as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Tab,
}

impl NamedKey {
    pub fn name(&self) -> &'static str {
        match self {
            NamedKey::Enter => "enter",
            NamedKey::Tab => "tab",
        }
    }
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single unit of synthetic input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    /// Tap a dedicated key.
    Key(NamedKey),
    /// Type a literal character.
    Text(char),
}

impl Keystroke {
    pub fn for_char(c: char) -> Self {
        match c {
            '\n' | '\r' => Keystroke::Key(NamedKey::Enter),
            '\t' => Keystroke::Key(NamedKey::Tab),
            other => Keystroke::Text(other),
        }
    }
}

impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keystroke::Key(key) => write!(f, "key '{}'", key),
            Keystroke::Text(c) => write!(f, "character {:?}", c),
        }
    }
}

/// Normalise text before it is handed to a session.
///
/// Windows line endings would otherwise produce two Enter taps per line.
pub fn normalize_text(text: &str) -> Vec<char> {
    text.replace("\r\n", "\n").chars().collect()
}
