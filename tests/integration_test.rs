use anyhow::Result;
use autotyper::config::{parse_duration, Config};
use autotyper::error::Result as TyperResult;
use autotyper::{
    calculate_delay, Command, Event, InputInjector, NamedKey, Phase, TypingCoordinator,
    TyperError,
};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Injector whose state stays observable after it moves into a coordinator.
#[derive(Clone, Default)]
struct SharedInjector {
    typed: Arc<Mutex<String>>,
    focused: Arc<AtomicBool>,
    fail_at: Option<usize>,
}

impl SharedInjector {
    fn typed(&self) -> String {
        self.typed.lock().unwrap().clone()
    }

    fn push(&self, c: char) -> TyperResult<()> {
        let mut typed = self.typed.lock().unwrap();
        if self.fail_at == Some(typed.chars().count()) {
            return Err(TyperError::injection(format!("{:?}", c), "no display"));
        }
        typed.push(c);
        Ok(())
    }
}

impl InputInjector for SharedInjector {
    fn inject_character(&mut self, c: char) -> TyperResult<()> {
        self.push(c)
    }

    fn inject_key(&mut self, key: NamedKey) -> TyperResult<()> {
        self.push(match key {
            NamedKey::Enter => '\n',
            NamedKey::Tab => '\t',
        })
    }

    fn set_inter_character_delay(&mut self, _delay: Duration) -> TyperResult<()> {
        Ok(())
    }

    fn is_own_window_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }
}

struct Harness {
    commands: mpsc::UnboundedSender<Command>,
    events: mpsc::UnboundedReceiver<Event>,
    handle: JoinHandle<TypingCoordinator<SharedInjector>>,
}

impl Harness {
    fn spawn(injector: SharedInjector) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();
        let mut coordinator = TypingCoordinator::new(injector, event_tx);
        let handle = tokio::spawn(async move {
            coordinator.run(command_rx).await;
            coordinator
        });
        Self {
            commands,
            events,
            handle,
        }
    }

    fn send(&self, command: Command) {
        self.commands.send(command).unwrap();
    }

    /// Collect events up to and including the first one matching `until`.
    async fn collect_until(&mut self, until: impl Fn(&Event) -> bool) -> Vec<Event> {
        let mut seen = Vec::new();
        while let Some(event) = self.events.recv().await {
            let done = until(&event);
            seen.push(event);
            if done {
                return seen;
            }
        }
        panic!("coordinator exited, events so far: {:?}", seen);
    }

    async fn shutdown(self) -> (TypingCoordinator<SharedInjector>, Vec<Event>) {
        let Harness {
            commands,
            mut events,
            handle,
        } = self;
        commands.send(Command::Shutdown).unwrap();
        let coordinator = handle.await.unwrap();
        let mut rest = Vec::new();
        while let Ok(event) = events.try_recv() {
            rest.push(event);
        }
        (coordinator, rest)
    }
}

fn progress_indices(events: &[Event]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::TypingProgress { index, .. } => Some(*index),
            _ => None,
        })
        .collect()
}

/// The timer wheel has millisecond resolution.
fn assert_close(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(20),
        "expected about {:?}, got {:?}",
        expected,
        actual
    );
}

// Coordinator, driven in virtual time

#[tokio::test(start_paused = true)]
async fn test_full_session() {
    let injector = SharedInjector::default();
    let mut harness = Harness::spawn(injector.clone());

    let started = tokio::time::Instant::now();
    harness.send(Command::SetText {
        text: "Hi\r\nyo".into(),
    });
    harness.send(Command::SetSpeeds {
        char_rate: 60.0,
        word_rate: 1000.0,
    });
    harness.send(Command::StartTyping);

    let events = harness
        .collect_until(|e| *e == Event::TypingComplete)
        .await;

    assert_eq!(events[0], Event::CountdownStart { seconds: 3 });
    assert_eq!(progress_indices(&events), vec![1, 2, 3, 4, 5]);
    assert!(events.contains(&Event::TypingProgress {
        index: 5,
        total: 5,
        progress: 100.0
    }));
    // 3s countdown, then 5 characters one second apart; completion is
    // detected on the step after the last character.
    assert_close(started.elapsed(), Duration::from_secs(8));
    assert_eq!(injector.typed(), "Hi\nyo");

    let (coordinator, rest) = harness.shutdown().await;
    assert!(rest.is_empty());
    assert_eq!(coordinator.state().cursor(), 0);
    assert_eq!(coordinator.state().phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_start_without_text() {
    let mut harness = Harness::spawn(SharedInjector::default());
    harness.send(Command::StartTyping);
    let events = harness.collect_until(|_| true).await;
    assert_eq!(
        events,
        vec![Event::TypingError {
            message: "no text to type".into()
        }]
    );

    let (coordinator, rest) = harness.shutdown().await;
    assert!(rest.is_empty());
    assert!(!coordinator.state().is_running());
}

#[tokio::test(start_paused = true)]
async fn test_pause_resume_continues_at_cursor() {
    let injector = SharedInjector::default();
    let mut harness = Harness::spawn(injector.clone());
    harness.send(Command::SetText {
        text: "abcdef".into(),
    });
    harness.send(Command::StartTyping);

    harness
        .collect_until(|e| matches!(e, Event::TypingProgress { index: 3, .. }))
        .await;
    harness.send(Command::PauseTyping);
    harness.collect_until(|e| *e == Event::TypingPaused).await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(injector.typed(), "abc");

    harness.send(Command::ResumeTyping);
    let events = harness
        .collect_until(|e| *e == Event::TypingComplete)
        .await;
    assert_eq!(
        events[..5],
        [
            Event::CountdownStart { seconds: 3 },
            Event::CountdownUpdate { seconds: 2 },
            Event::CountdownUpdate { seconds: 1 },
            Event::CountdownComplete,
            Event::TypingResumed,
        ]
    );
    assert_eq!(progress_indices(&events), vec![4, 5, 6]);
    assert_eq!(injector.typed(), "abcdef");

    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_toggle_pause_from_hotkey() {
    let injector = SharedInjector::default();
    let mut harness = Harness::spawn(injector.clone());
    harness.send(Command::SetText { text: "abc".into() });
    harness.send(Command::StartTyping);
    harness
        .collect_until(|e| matches!(e, Event::TypingProgress { index: 1, .. }))
        .await;

    harness.send(Command::TogglePause);
    harness.collect_until(|e| *e == Event::TypingPaused).await;
    harness.send(Command::TogglePause);
    harness.collect_until(|e| *e == Event::TypingResumed).await;
    harness
        .collect_until(|e| *e == Event::TypingComplete)
        .await;
    assert_eq!(injector.typed(), "abc");

    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_prevents_further_typing() {
    let injector = SharedInjector::default();
    let mut harness = Harness::spawn(injector.clone());
    harness.send(Command::SetText {
        text: "stop me".into(),
    });
    harness.send(Command::StartTyping);
    harness
        .collect_until(|e| matches!(e, Event::TypingProgress { index: 2, .. }))
        .await;

    harness.send(Command::StopTyping);
    harness.collect_until(|e| *e == Event::TypingStopped).await;
    tokio::time::sleep(Duration::from_secs(60)).await;

    let (coordinator, rest) = harness.shutdown().await;
    assert!(rest.is_empty(), "unexpected events after stop: {:?}", rest);
    assert_eq!(injector.typed(), "st");
    assert_eq!(coordinator.state().cursor(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_countdown() {
    let injector = SharedInjector::default();
    let mut harness = Harness::spawn(injector.clone());
    harness.send(Command::SetText { text: "abc".into() });
    harness.send(Command::StartTyping);
    harness
        .collect_until(|e| matches!(e, Event::CountdownUpdate { seconds: 2 }))
        .await;
    harness.send(Command::StopTyping);
    harness.collect_until(|e| *e == Event::TypingStopped).await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    let (_, rest) = harness.shutdown().await;
    assert!(rest.is_empty());
    assert!(injector.typed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_injection_failure_aborts_session() {
    let injector = SharedInjector {
        fail_at: Some(3),
        ..Default::default()
    };
    let mut harness = Harness::spawn(injector.clone());
    harness.send(Command::SetText {
        text: "abcdef".into(),
    });
    harness.send(Command::StartTyping);

    let events = harness
        .collect_until(|e| matches!(e, Event::TypingError { .. }))
        .await;
    assert_eq!(progress_indices(&events), vec![1, 2, 3]);
    match events.last() {
        Some(Event::TypingError { message }) => assert!(message.contains("no display")),
        other => panic!("expected error, got {:?}", other),
    }

    tokio::time::sleep(Duration::from_secs(10)).await;
    let (coordinator, rest) = harness.shutdown().await;
    assert!(rest.is_empty());
    assert!(!coordinator.state().is_running());
    assert_eq!(coordinator.state().cursor(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_focus_guard_auto_pauses() {
    let injector = SharedInjector::default();
    let mut harness = Harness::spawn(injector.clone());
    harness.send(Command::SetText {
        text: "abcd".into(),
    });
    harness.send(Command::StartTyping);
    harness
        .collect_until(|e| matches!(e, Event::TypingProgress { index: 2, .. }))
        .await;

    injector.focused.store(true, Ordering::SeqCst);
    let events = harness.collect_until(|e| *e == Event::AutoPaused).await;
    assert_eq!(events, vec![Event::TypingPaused, Event::AutoPaused]);
    assert_eq!(injector.typed(), "ab");

    // Resuming while still focused pauses again right after the countdown.
    harness.send(Command::ResumeTyping);
    harness.collect_until(|e| *e == Event::AutoPaused).await;
    assert_eq!(injector.typed(), "ab");

    injector.focused.store(false, Ordering::SeqCst);
    harness.send(Command::ResumeTyping);
    harness
        .collect_until(|e| *e == Event::TypingComplete)
        .await;
    assert_eq!(injector.typed(), "abcd");

    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_speed_change_applies_to_next_step() {
    let mut harness = Harness::spawn(SharedInjector::default());
    harness.send(Command::SetText {
        text: "abc".into(),
    });
    harness.send(Command::StartTyping);
    harness
        .collect_until(|e| matches!(e, Event::TypingProgress { index: 1, .. }))
        .await;

    harness.send(Command::SetSpeeds {
        char_rate: -5.0,
        word_rate: 10.0,
    });
    let events = harness
        .collect_until(|e| matches!(e, Event::SpeedsRejected { .. }))
        .await;
    assert_eq!(events.len(), 1);

    harness.send(Command::SetSpeeds {
        char_rate: 6000.0,
        word_rate: 12.0,
    });
    // Default pace of 600ms is still pending for the second character.
    let before = tokio::time::Instant::now();
    harness
        .collect_until(|e| matches!(e, Event::TypingProgress { index: 2, .. }))
        .await;
    harness
        .collect_until(|e| matches!(e, Event::TypingProgress { index: 3, .. }))
        .await;
    assert_close(before.elapsed(), Duration::from_millis(1600));

    harness.shutdown().await;
}

// Delay calculation

#[test]
fn test_delay_examples() {
    assert_eq!(calculate_delay(60.0, 1000.0), 1000.0);
    assert_eq!(calculate_delay(3000.0, 12.0), 1000.0);
}

// Configuration

#[test]
fn test_config_file_operations() -> Result<()> {
    let mut temp_file = NamedTempFile::new()?;
    let json_content = r#"
    {
        "text": "Dear team,\n\tthanks!",
        "char_rate": 300,
        "word_rate": 60,
        "keyboard_delay": "5ms",
        "pause_hotkey": "ctrl+shift+p",
        "verbose": true
    }
    "#;
    temp_file.write_all(json_content.as_bytes())?;

    let config = Config::from_file(temp_file.path().to_str().unwrap())?;
    assert_eq!(config.text, "Dear team,\n\tthanks!");
    assert_eq!(config.char_rate, 300.0);
    assert_eq!(config.word_rate, 60.0);
    assert_eq!(config.keyboard_delay, Duration::from_millis(5));
    assert_eq!(config.pause_hotkey, "ctrl+shift+p");
    assert_eq!(config.stop_hotkey, "ctrl+alt+s");
    assert!(config.focus_guard);
    assert!(config.verbose);
    assert!(config.validate().is_ok());
    assert_eq!(config.rates()?.delay(), Duration::from_millis(200));

    Ok(())
}

#[test]
fn test_default_values() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config, Config::default());
    assert!(config.text.is_empty());
    assert_eq!(config.text_file, None);
    assert_eq!(config.char_rate, 100.0);
    assert_eq!(config.word_rate, 40.0);
    assert_eq!(config.keyboard_delay, Duration::from_millis(1));
    assert_eq!(config.pause_hotkey, "ctrl+alt+p");
    assert!(config.validate().is_ok());
}

#[test]
fn test_text_file_is_loaded() -> Result<()> {
    let mut text_file = NamedTempFile::new()?;
    text_file.write_all("line one\nline two\n".as_bytes())?;

    let config = Config {
        text_file: Some(text_file.path().to_str().unwrap().to_string()),
        ..Config::default()
    };
    assert!(config.validate().is_ok());
    assert_eq!(config.load_text()?, "line one\nline two\n");

    let missing = Config {
        text_file: Some("/definitely/not/here.txt".into()),
        ..Config::default()
    };
    assert!(matches!(missing.load_text(), Err(TyperError::Io(_))));
    Ok(())
}

#[test]
fn test_config_save_load_roundtrip() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("autotyper.json");
    let path = path.to_str().unwrap();

    let original = Config {
        text: "round trip".into(),
        char_rate: 450.0,
        word_rate: 75.0,
        keyboard_delay: Duration::from_millis(3),
        stop_hotkey: "ctrl+shift+x".into(),
        focus_guard: false,
        ..Config::default()
    };
    original.save_to_file(path)?;
    let loaded = Config::from_file(path)?;
    assert_eq!(loaded, original);

    Ok(())
}

#[test]
fn test_invalid_config_files() -> Result<()> {
    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(br#"{"keyboard_delay": "soon"}"#)?;
    let err = Config::from_file(temp_file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, TyperError::ConfigLoad { .. }));

    assert!(matches!(
        Config::from_file("/no/such/config.json"),
        Err(TyperError::ConfigLoad { .. })
    ));

    let config: Config = serde_json::from_str(r#"{"word_rate": 0}"#)?;
    assert!(matches!(
        config.validate(),
        Err(TyperError::ConfigValidation(_))
    ));
    Ok(())
}

#[test]
fn test_duration_parsing_edge_cases() {
    assert_eq!(parse_duration("1000").unwrap(), Duration::from_millis(1000));
    assert_eq!(parse_duration("1S").unwrap(), Duration::from_secs(1));
    assert!(parse_duration("1.5s").is_err());
    assert!(parse_duration("ms").is_err());
}

// Console and wire format

#[test]
fn test_console_commands_drive_json_protocol() {
    use autotyper::console::parse_line;

    let json = serde_json::to_string(&Command::SetText {
        text: "hi".into(),
    })
    .unwrap();
    assert_eq!(json, r#"{"command":"set-text","text":"hi"}"#);
    assert_eq!(
        parse_line(&json).unwrap(),
        Some(Command::SetText { text: "hi".into() })
    );
    assert_eq!(parse_line("stop").unwrap(), Some(Command::StopTyping));
}

#[test]
fn test_error_types() {
    let err = TyperError::injection("character 'a'", "no display");
    assert!(err.to_string().contains("no display"));

    let err = TyperError::invalid_command("dance", "unknown command");
    assert!(err.to_string().contains("dance"));

    let err = TyperError::config_validation("missing field");
    assert!(err.to_string().contains("missing field"));
}
