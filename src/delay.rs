//! Emission pacing.
//!
//! The delay between two characters is bounded by two limits: a raw
//! characters-per-minute rate and a words-per-minute rate (a word being
//! five characters). Whichever limit is slower wins, so neither is exceeded.

use crate::error::{Result, TyperError};
use std::time::Duration;

/// Average word length used to convert WPM into characters.
pub const CHARS_PER_WORD: f64 = 5.0;

pub const DEFAULT_CHAR_RATE: f64 = 100.0;
pub const DEFAULT_WORD_RATE: f64 = 40.0;

/// Milliseconds to wait before the next character, given both rates.
///
/// Callers are expected to pass positive rates; see [`Rates::new`].
pub fn calculate_delay(char_rate: f64, word_rate: f64) -> f64 {
    let char_delay = 60_000.0 / char_rate;
    let word_delay = 60_000.0 / (word_rate * CHARS_PER_WORD);
    char_delay.max(word_delay)
}

/// A validated pair of typing speeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    char_rate: f64,
    word_rate: f64,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            char_rate: DEFAULT_CHAR_RATE,
            word_rate: DEFAULT_WORD_RATE,
        }
    }
}

impl Rates {
    /// Build a rate pair, rejecting zero, negative and non-finite values.
    pub fn new(char_rate: f64, word_rate: f64) -> Result<Self> {
        validate_rate("char_rate", char_rate)?;
        validate_rate("word_rate", word_rate)?;
        Ok(Self {
            char_rate,
            word_rate,
        })
    }

    pub fn char_rate(&self) -> f64 {
        self.char_rate
    }

    pub fn word_rate(&self) -> f64 {
        self.word_rate
    }

    pub fn delay_ms(&self) -> f64 {
        calculate_delay(self.char_rate, self.word_rate)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_nanos((self.delay_ms() * 1_000_000.0).round() as u64)
    }
}

pub(crate) fn validate_rate(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TyperError::invalid_rate(name, value))
    }
}
