//! Configuration file support.
//!
//! A configuration is a JSON document; every field is optional and falls
//! back to a sensible default:
//!
//! ```json
//! {
//!   "text_file": "letter.txt",
//!   "char_rate": 300,
//!   "word_rate": 60,
//!   "keyboard_delay": "1ms",
//!   "pause_hotkey": "ctrl+alt+p",
//!   "stop_hotkey": "ctrl+alt+s"
//! }
//! ```

use crate::delay::{validate_rate, Rates, DEFAULT_CHAR_RATE, DEFAULT_WORD_RATE};
use crate::error::{Result, TyperError};
use crate::hotkeys::parse_hotkey;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

const MAX_KEYBOARD_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Text typed by the session. Mutually exclusive with `text_file`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_file: Option<String>,

    /// Characters per minute.
    #[serde(default = "default_char_rate")]
    pub char_rate: f64,

    /// Words per minute, a word being five characters.
    #[serde(default = "default_word_rate")]
    pub word_rate: f64,

    /// Minimum delay the input backend leaves between synthetic events.
    #[serde(default = "default_keyboard_delay", with = "duration_format")]
    pub keyboard_delay: Duration,

    #[serde(default = "default_pause_hotkey")]
    pub pause_hotkey: String,

    #[serde(default = "default_stop_hotkey")]
    pub stop_hotkey: String,

    /// Pause automatically when our own window has focus.
    #[serde(default = "default_true")]
    pub focus_guard: bool,

    #[serde(default)]
    pub verbose: bool,
}

fn default_char_rate() -> f64 {
    DEFAULT_CHAR_RATE
}

fn default_word_rate() -> f64 {
    DEFAULT_WORD_RATE
}

fn default_keyboard_delay() -> Duration {
    Duration::from_millis(1)
}

fn default_pause_hotkey() -> String {
    "ctrl+alt+p".to_string()
}

fn default_stop_hotkey() -> String {
    "ctrl+alt+s".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text: String::new(),
            text_file: None,
            char_rate: default_char_rate(),
            word_rate: default_word_rate(),
            keyboard_delay: default_keyboard_delay(),
            pause_hotkey: default_pause_hotkey(),
            stop_hotkey: default_stop_hotkey(),
            focus_guard: true,
            verbose: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| TyperError::config_load(path, e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| TyperError::config_load(path, e.to_string()))
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| TyperError::config_save(path, e.to_string()))
    }

    /// A commented-by-example configuration for `--generate-config`.
    pub fn sample() -> Self {
        Self {
            text: "Hello from autotyper!\n".to_string(),
            char_rate: 300.0,
            word_rate: 60.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_rate("char_rate", self.char_rate)
            .and_then(|_| validate_rate("word_rate", self.word_rate))
            .map_err(|e| TyperError::config_validation(e.to_string()))?;

        if !self.text.is_empty() && self.text_file.is_some() {
            return Err(TyperError::config_validation(
                "set either text or text_file, not both",
            ));
        }

        if self.keyboard_delay > MAX_KEYBOARD_DELAY {
            return Err(TyperError::config_validation(format!(
                "keyboard_delay must be at most {}ms",
                MAX_KEYBOARD_DELAY.as_millis()
            )));
        }

        let mut hotkey_ids = Vec::with_capacity(2);
        for (name, value) in [
            ("pause_hotkey", &self.pause_hotkey),
            ("stop_hotkey", &self.stop_hotkey),
        ] {
            if value.trim().is_empty() {
                return Err(TyperError::config_validation(format!(
                    "{} cannot be empty",
                    name
                )));
            }
            let hotkey = parse_hotkey(value)
                .map_err(|e| TyperError::config_validation(format!("{}: {}", name, e)))?;
            hotkey_ids.push(hotkey.id());
        }

        if hotkey_ids[0] == hotkey_ids[1] {
            return Err(TyperError::config_validation(
                "pause_hotkey and stop_hotkey must differ",
            ));
        }

        Ok(())
    }

    pub fn rates(&self) -> Result<Rates> {
        Rates::new(self.char_rate, self.word_rate)
    }

    /// The text to type: the inline text, or the contents of `text_file`.
    pub fn load_text(&self) -> Result<String> {
        match &self.text_file {
            Some(path) => fs::read_to_string(path).map_err(TyperError::from),
            None => Ok(self.text.clone()),
        }
    }
}

/// Parse a duration such as `"500ms"`, `"2s"`, `"1m"` or bare milliseconds.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let value = input.trim().to_lowercase();
    if value.is_empty() {
        return Err(TyperError::invalid_duration(input, "empty duration"));
    }

    let (number, unit_ms) = if let Some(n) = value.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = value.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = value.strip_suffix('m') {
        (n, 60_000)
    } else {
        (value.as_str(), 1)
    };

    let amount: u64 = number
        .trim()
        .parse()
        .map_err(|_| TyperError::invalid_duration(input, "expected a non-negative integer"))?;

    amount
        .checked_mul(unit_ms)
        .map(Duration::from_millis)
        .ok_or_else(|| TyperError::invalid_duration(input, "duration too large"))
}

mod duration_format {
    use super::parse_duration;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
