//! # autotyper
//!
//! Types arbitrary text into whichever window has input focus, one character
//! at a time, at a pace bounded by both a characters-per-minute and a
//! words-per-minute limit.
//!
//! ## Features
//!
//! - 3 second countdown before starting and before every resume
//! - Pause, resume and stop from the console or via global hotkeys
//! - Automatic pause when the tool's own window takes focus
//! - JSON configuration file and JSON command/event lines
//!
//! ## Example
//!
//! ```no_run
//! use autotyper::{Command, DryRunInjector, TypingCoordinator};
//! use tokio::sync::mpsc;
//!
//! # async fn demo() {
//! let (commands, command_rx) = mpsc::unbounded_channel();
//! let (events, mut event_rx) = mpsc::unbounded_channel();
//! let mut coordinator = TypingCoordinator::new(DryRunInjector::new(), events);
//!
//! commands.send(Command::SetText { text: "hello".into() }).unwrap();
//! commands.send(Command::StartTyping).unwrap();
//! tokio::spawn(async move {
//!     while let Some(event) = event_rx.recv().await {
//!         println!("{:?}", event);
//!     }
//! });
//! coordinator.run(command_rx).await;
//! # }
//! ```

pub mod command;
pub mod config;
pub mod console;
pub mod coordinator;
pub mod delay;
pub mod error;
pub mod focus;
pub mod hotkeys;
pub mod injector;
pub mod keystroke;
pub mod presenter;
pub mod process_tree;

pub use command::{Command, Event};
pub use config::Config;
pub use coordinator::{Phase, SessionState, TypingCoordinator};
pub use delay::{calculate_delay, Rates};
pub use error::{Result, TyperError};
pub use focus::FocusGuard;
pub use hotkeys::HotkeyManager;
pub use injector::{DryRunInjector, EnigoInjector, InputInjector};
pub use keystroke::{Keystroke, NamedKey};
pub use presenter::Presenter;
