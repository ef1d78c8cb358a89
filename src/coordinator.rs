//! The typing coordinator.
//!
//! A single [`TypingCoordinator`] owns the session state and two timer slots:
//! the one-second countdown ticker and the pending emission step. Commands
//! and timer callbacks are processed one at a time by [`TypingCoordinator::run`],
//! so a handler never observes a half-applied transition. Cancelling a timer
//! means clearing its slot; a cleared slot can never fire.

use crate::command::{Command, Event};
use crate::delay::Rates;
use crate::error::TyperError;
use crate::injector::InputInjector;
use crate::keystroke::{normalize_text, Keystroke};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, error, info, warn};

/// Length of the countdown before a session starts or resumes.
pub const COUNTDOWN_SECONDS: u32 = 3;

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Observable state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingCountdown,
    Typing,
    Paused,
}

#[derive(Debug, Clone, Copy)]
struct Countdown {
    remaining: u32,
    next_tick: Instant,
}

/// Mutable session record.
///
/// Invariants: `cursor <= text.len()`, `paused` implies `running`, and a
/// pending step only exists while running, unpaused and not counting down.
#[derive(Debug, Default)]
pub struct SessionState {
    text: Vec<char>,
    cursor: usize,
    rates: Rates,
    running: bool,
    paused: bool,
    countdown: Option<Countdown>,
    pending_step: Option<Instant>,
}

impl SessionState {
    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn rates(&self) -> Rates {
        self.rates
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn has_pending_step(&self) -> bool {
        self.pending_step.is_some()
    }

    /// Seconds left on the active countdown, if any.
    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown.map(|c| c.remaining)
    }

    pub fn phase(&self) -> Phase {
        if !self.running {
            Phase::Idle
        } else if self.countdown.is_some() {
            Phase::AwaitingCountdown
        } else if self.paused {
            Phase::Paused
        } else {
            Phase::Typing
        }
    }

    fn cancel_timers(&mut self) {
        self.countdown = None;
        self.pending_step = None;
    }
}

/// Percentage of `index` over `total`, rounded to one decimal place.
pub fn progress_percent(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (index as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Drives a typing session from commands and timers.
pub struct TypingCoordinator<I> {
    state: SessionState,
    injector: I,
    events: mpsc::UnboundedSender<Event>,
}

impl<I: InputInjector> TypingCoordinator<I> {
    pub fn new(injector: I, events: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            state: SessionState::default(),
            injector,
            events,
        }
    }

    pub fn with_rates(mut self, rates: Rates) -> Self {
        self.state.rates = rates;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn injector(&self) -> &I {
        &self.injector
    }

    pub fn injector_mut(&mut self) -> &mut I {
        &mut self.injector
    }

    /// Process commands and timers until `shutdown` or the sender is dropped.
    pub async fn run(&mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        info!("typing coordinator running");
        loop {
            let countdown_due = self.state.countdown.map(|c| c.next_tick);
            let step_due = self.state.pending_step;

            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                _ = sleep_until_some(countdown_due) => self.countdown_tick(),
                _ = sleep_until_some(step_due) => self.emit_step(),
            }
        }
        self.state.cancel_timers();
        info!("typing coordinator shut down");
    }

    pub fn handle(&mut self, command: Command) {
        debug!(command = command.name(), "handling command");
        match command {
            Command::SetText { text } => self.set_text(&text),
            Command::SetSpeeds {
                char_rate,
                word_rate,
            } => self.set_rates(char_rate, word_rate),
            Command::StartTyping => self.start(),
            Command::PauseTyping => self.pause(),
            Command::ResumeTyping => self.resume(),
            Command::StopTyping => self.stop(),
            Command::TogglePause => self.toggle_pause(),
            Command::Shutdown => self.state.cancel_timers(),
        }
    }

    /// Replace the text and rewind the cursor. A running session keeps
    /// running and continues from the start of the new text.
    pub fn set_text(&mut self, text: &str) {
        self.state.text = normalize_text(text);
        self.state.cursor = 0;
        if self.state.running {
            warn!(
                chars = self.state.text.len(),
                "text replaced while a session is active"
            );
        } else {
            debug!(chars = self.state.text.len(), "text set");
        }
    }

    pub fn set_rates(&mut self, char_rate: f64, word_rate: f64) {
        match Rates::new(char_rate, word_rate) {
            Ok(rates) => {
                debug!(char_rate, word_rate, delay_ms = rates.delay_ms(), "speeds set");
                self.state.rates = rates;
            }
            Err(e) => {
                warn!("rejecting speeds: {}", e);
                self.notify(Event::SpeedsRejected {
                    message: e.to_string(),
                });
            }
        }
    }

    pub fn start(&mut self) {
        if self.state.running {
            debug!("start ignored: session already running");
            return;
        }
        if self.state.text.is_empty() {
            warn!("start requested without text");
            self.notify(Event::TypingError {
                message: TyperError::EmptyText.to_string(),
            });
            return;
        }

        self.state.running = true;
        self.state.paused = false;
        info!(
            chars = self.state.text.len(),
            from = self.state.cursor,
            "starting session"
        );
        self.start_countdown();
    }

    /// Suspend emission. Also cancels the initial countdown if it is running.
    pub fn pause(&mut self) {
        if !self.state.running || self.state.paused {
            return;
        }
        self.state.cancel_timers();
        self.state.paused = true;
        info!(cursor = self.state.cursor, "session paused");
        self.notify(Event::TypingPaused);
    }

    pub fn resume(&mut self) {
        if !self.state.running || !self.state.paused {
            return;
        }
        if self.state.countdown.is_some() {
            debug!("resume ignored: countdown already running");
            return;
        }
        info!(cursor = self.state.cursor, "resuming session");
        self.start_countdown();
    }

    pub fn toggle_pause(&mut self) {
        match self.state.phase() {
            Phase::Typing => self.pause(),
            Phase::Paused => self.resume(),
            Phase::AwaitingCountdown if !self.state.paused => self.pause(),
            _ => debug!("toggle ignored in {:?}", self.state.phase()),
        }
    }

    pub fn stop(&mut self) {
        self.state.cancel_timers();
        self.state.running = false;
        self.state.paused = false;
        self.state.cursor = 0;
        info!("session stopped");
        self.notify(Event::TypingStopped);
    }

    fn start_countdown(&mut self) {
        self.state.pending_step = None;
        self.state.countdown = Some(Countdown {
            remaining: COUNTDOWN_SECONDS,
            next_tick: Instant::now() + COUNTDOWN_TICK,
        });
        self.notify(Event::CountdownStart {
            seconds: COUNTDOWN_SECONDS,
        });
    }

    /// Countdown timer callback, due once per second while counting down.
    pub fn countdown_tick(&mut self) {
        let Some(mut countdown) = self.state.countdown.take() else {
            return;
        };

        countdown.remaining = countdown.remaining.saturating_sub(1);
        if countdown.remaining > 0 {
            countdown.next_tick += COUNTDOWN_TICK;
            self.state.countdown = Some(countdown);
            self.notify(Event::CountdownUpdate {
                seconds: countdown.remaining,
            });
            return;
        }

        self.notify(Event::CountdownComplete);
        if self.state.paused {
            self.state.paused = false;
            self.notify(Event::TypingResumed);
        }
        self.emit_step();
    }

    /// Emission timer callback: type one character and schedule the next.
    pub fn emit_step(&mut self) {
        self.state.pending_step = None;
        if !self.state.running || self.state.paused {
            return;
        }

        if self.injector.is_own_window_focused() {
            warn!("own window has focus, pausing");
            self.state.cancel_timers();
            self.state.paused = true;
            self.notify(Event::TypingPaused);
            self.notify(Event::AutoPaused);
            return;
        }

        let total = self.state.text.len();
        if self.state.cursor >= total {
            self.state.running = false;
            self.state.cursor = 0;
            info!(chars = total, "session complete");
            self.notify(Event::TypingComplete);
            return;
        }

        let keystroke = Keystroke::for_char(self.state.text[self.state.cursor]);
        if let Err(e) = self.injector.inject(keystroke) {
            error!(cursor = self.state.cursor, "typing failed: {}", e);
            self.state.cancel_timers();
            self.state.running = false;
            self.state.paused = false;
            self.notify(Event::TypingError {
                message: e.to_string(),
            });
            return;
        }

        self.state.cursor += 1;
        let index = self.state.cursor;
        self.notify(Event::TypingProgress {
            index,
            total,
            progress: progress_percent(index, total),
        });

        let delay = self.state.rates.delay();
        self.state.pending_step = Some(Instant::now() + delay);
    }

    fn notify(&self, event: Event) {
        debug!(event = event.name(), "notify");
        if self.events.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }
}

async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
