//! Line-based console control.
//!
//! Each stdin line is one command. Plain words cover the common cases; a
//! line starting with `{` is decoded as a JSON [`Command`].

use crate::command::Command;
use crate::error::{Result, TyperError};
use std::io::{self, BufRead};
use tokio::sync::mpsc;
use tracing::warn;

pub const HELP: &str = "\
commands:
  start                 start typing after a 3 second countdown
  pause | resume        pause or resume the session
  toggle                pause when typing, resume when paused
  stop                  stop and rewind to the beginning
  text <TEXT>           replace the text (\\n and \\t are expanded)
  speeds <CPM> <WPM>    change typing speed
  quit                  exit
  {\"command\": ...}      any command as JSON";

/// Parse one console line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| TyperError::invalid_command(trimmed, e.to_string()));
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (trimmed, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "start" => Command::StartTyping,
        "pause" => Command::PauseTyping,
        "resume" => Command::ResumeTyping,
        "toggle" => Command::TogglePause,
        "stop" => Command::StopTyping,
        "quit" | "exit" => Command::Shutdown,
        "text" => Command::SetText {
            text: unescape(rest),
        },
        "speeds" => {
            let mut numbers = rest.split_whitespace().map(str::parse::<f64>);
            match (numbers.next(), numbers.next(), numbers.next()) {
                (Some(Ok(char_rate)), Some(Ok(word_rate)), None) => Command::SetSpeeds {
                    char_rate,
                    word_rate,
                },
                _ => {
                    return Err(TyperError::invalid_command(
                        trimmed,
                        "expected: speeds <CPM> <WPM>",
                    ))
                }
            }
        }
        other => {
            return Err(TyperError::invalid_command(
                trimmed,
                format!("unknown command '{}', type 'help'", other),
            ))
        }
    };

    Ok(Some(command))
}

/// Expand `\n`, `\t` and `\\`; other escapes are kept as written.
fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Read commands from stdin on a background thread.
///
/// With `shutdown_on_eof`, closing stdin ends the program.
pub fn spawn_reader(commands: mpsc::UnboundedSender<Command>, shutdown_on_eof: bool) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().eq_ignore_ascii_case("help") {
                eprintln!("{}", HELP);
                continue;
            }
            match parse_line(&line) {
                Ok(Some(command)) => {
                    if commands.send(command).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("{}", e),
            }
        }
        if shutdown_on_eof {
            let _ = commands.send(Command::Shutdown);
        }
    });
}
