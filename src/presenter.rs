//! Terminal rendering of coordinator events.

use crate::command::Event;
use colored::Colorize;
use std::io::{self, Write};
use tokio::sync::mpsc;

/// Prints events either as coloured status lines or as JSON lines.
#[derive(Debug, Clone, Copy)]
pub struct Presenter {
    json: bool,
}

impl Presenter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// One line of output for `event`, without a trailing newline.
    pub fn render(&self, event: &Event) -> String {
        if self.json {
            return serde_json::to_string(event).unwrap_or_else(|_| event.name().to_string());
        }

        match event {
            Event::CountdownStart { seconds } => format!(
                "⏳ Starting in {}... switch to the target window",
                seconds
            )
            .yellow()
            .to_string(),
            Event::CountdownUpdate { seconds } => format!("⏳ {}...", seconds).yellow().to_string(),
            Event::CountdownComplete => "⌨️  Typing".green().to_string(),
            Event::TypingProgress {
                index,
                total,
                progress,
            } => format!("[{}/{}] {:.1}%", index, total, progress),
            Event::TypingComplete => "✅ Typing complete".green().bold().to_string(),
            Event::TypingPaused => "⏸️  Paused".cyan().to_string(),
            Event::AutoPaused => "⚠️  Auto-paused: this window has focus, resume when ready"
                .yellow()
                .bold()
                .to_string(),
            Event::TypingResumed => "▶️  Resumed".green().to_string(),
            Event::TypingStopped => "⏹️  Stopped".cyan().to_string(),
            Event::TypingError { message } => {
                format!("❌ Error: {}", message).red().bold().to_string()
            }
            Event::SpeedsRejected { message } => {
                format!("⚠️  Speeds rejected: {}", message).yellow().to_string()
            }
        }
    }

    /// Print events until the channel closes, or until the session ends
    /// when `exit_when_idle` is set.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<Event>, exit_when_idle: bool) {
        let stdout = io::stdout();
        let mut progress_line = false;

        while let Some(event) = events.recv().await {
            let line = self.render(&event);
            let mut out = stdout.lock();

            // Progress overwrites itself in place; everything else gets a line.
            let result = if !self.json && matches!(event, Event::TypingProgress { .. }) {
                progress_line = true;
                write!(out, "\r{}", line).and_then(|_| out.flush())
            } else {
                let prefix = if std::mem::take(&mut progress_line) { "\n" } else { "" };
                writeln!(out, "{}{}", prefix, line)
            };
            if result.is_err() {
                break;
            }

            if exit_when_idle && event.is_terminal() {
                break;
            }
        }
    }
}
