//! Custom error types for autotyper.
//!
//! This module provides structured error types using `thiserror` so that
//! command handlers, the injector and the configuration layer can report
//! failures with informative messages.

use std::io;
use thiserror::Error;

/// Main error type for autotyper operations.
#[derive(Error, Debug)]
pub enum TyperError {
    /// A session was started without any text to type.
    #[error("no text to type")]
    EmptyText,

    /// A typing speed is zero, negative or not a number.
    #[error("invalid {name} '{value}': must be a positive, finite number")]
    InvalidRate { name: &'static str, value: f64 },

    /// The platform refused to synthesize a keystroke.
    #[error("failed to type {keystroke}: {reason}")]
    Injection { keystroke: String, reason: String },

    /// The platform input backend could not be created.
    #[error("failed to initialise keyboard injection: {0}")]
    InjectorInit(String),

    /// Configuration validation error.
    #[error("configuration error: {0}")]
    ConfigValidation(String),

    /// Error reading or parsing configuration file.
    #[error("failed to load config from '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },

    /// Error writing configuration file.
    #[error("failed to save config to '{path}': {reason}")]
    ConfigSave { path: String, reason: String },

    /// Error parsing duration string.
    #[error("invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    /// A console line could not be turned into a command.
    #[error("invalid command '{input}': {reason}")]
    InvalidCommand { input: String, reason: String },

    /// Error registering or handling hotkey.
    #[error("hotkey error: {0}")]
    Hotkey(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for autotyper operations.
pub type Result<T> = std::result::Result<T, TyperError>;

impl TyperError {
    /// Create a new InvalidRate error.
    pub fn invalid_rate(name: &'static str, value: f64) -> Self {
        Self::InvalidRate { name, value }
    }

    /// Create a new Injection error.
    pub fn injection(keystroke: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Injection {
            keystroke: keystroke.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InjectorInit error.
    pub fn injector_init(message: impl Into<String>) -> Self {
        Self::InjectorInit(message.into())
    }

    /// Create a new ConfigValidation error.
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation(message.into())
    }

    /// Create a new ConfigLoad error.
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new ConfigSave error.
    pub fn config_save(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigSave {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InvalidDuration error.
    pub fn invalid_duration(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDuration {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InvalidCommand error.
    pub fn invalid_command(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Hotkey error.
    pub fn hotkey(message: impl Into<String>) -> Self {
        Self::Hotkey(message.into())
    }
}
