//! Messages exchanged between the control surface and the coordinator.
//!
//! Both directions are one-way and asynchronous: the control surface sends
//! [`Command`]s, the coordinator answers with zero or more [`Event`]s. Both
//! serialize to JSON objects tagged with their kebab-case name, e.g.
//! `{"command":"set-speeds","char_rate":300,"word_rate":60}`.

use serde::{Deserialize, Serialize};

/// User intent forwarded to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Command {
    SetText { text: String },
    SetSpeeds { char_rate: f64, word_rate: f64 },
    StartTyping,
    PauseTyping,
    ResumeTyping,
    StopTyping,
    /// Pause when typing, resume when paused.
    TogglePause,
    /// Stop the coordinator loop.
    Shutdown,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetText { .. } => "set-text",
            Command::SetSpeeds { .. } => "set-speeds",
            Command::StartTyping => "start-typing",
            Command::PauseTyping => "pause-typing",
            Command::ResumeTyping => "resume-typing",
            Command::StopTyping => "stop-typing",
            Command::TogglePause => "toggle-pause",
            Command::Shutdown => "shutdown",
        }
    }
}

/// Status notifications emitted by the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Event {
    CountdownStart {
        seconds: u32,
    },
    CountdownUpdate {
        seconds: u32,
    },
    CountdownComplete,
    TypingProgress {
        index: usize,
        total: usize,
        /// Percentage rounded to one decimal place.
        progress: f64,
    },
    TypingComplete,
    TypingPaused,
    /// The typing target turned out to be our own window.
    AutoPaused,
    TypingResumed,
    TypingStopped,
    TypingError {
        message: String,
    },
    /// A `set-speeds` command carried unusable values and was ignored.
    SpeedsRejected {
        message: String,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::CountdownStart { .. } => "countdown-start",
            Event::CountdownUpdate { .. } => "countdown-update",
            Event::CountdownComplete => "countdown-complete",
            Event::TypingProgress { .. } => "typing-progress",
            Event::TypingComplete => "typing-complete",
            Event::TypingPaused => "typing-paused",
            Event::AutoPaused => "auto-paused",
            Event::TypingResumed => "typing-resumed",
            Event::TypingStopped => "typing-stopped",
            Event::TypingError { .. } => "typing-error",
            Event::SpeedsRejected { .. } => "speeds-rejected",
        }
    }

    /// Whether this event leaves the coordinator idle.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::TypingComplete | Event::TypingStopped | Event::TypingError { .. }
        )
    }
}
