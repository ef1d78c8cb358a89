use anyhow::{bail, Context, Result};
use autotyper::{
    console, Command, Config, DryRunInjector, EnigoInjector, Event, FocusGuard, HotkeyManager,
    InputInjector, Presenter, Rates, TypingCoordinator,
};
use clap::Parser;
use colored::Colorize;
use std::io::{self, IsTerminal, Read};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Types text into the focused window at a human pace
#[derive(Parser, Debug)]
#[command(name = "autotyper", version, about)]
struct Cli {
    /// Text to type; read from stdin when omitted and stdin is piped
    text: Option<String>,

    /// Read the text from a file
    #[arg(short, long, value_name = "PATH", conflicts_with = "text")]
    file: Option<String>,

    /// JSON configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Characters per minute
    #[arg(long)]
    cpm: Option<f64>,

    /// Words per minute (5 characters per word)
    #[arg(long)]
    wpm: Option<f64>,

    /// Hotkey that pauses and resumes typing
    #[arg(long)]
    pause_hotkey: Option<String>,

    /// Hotkey that stops typing
    #[arg(long)]
    stop_hotkey: Option<String>,

    /// Keep typing even when this terminal has focus
    #[arg(long)]
    no_focus_guard: bool,

    /// Wait for console commands instead of starting right away
    #[arg(short, long)]
    interactive: bool,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,

    /// Log keystrokes instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Write a sample configuration file and exit
    #[arg(long, value_name = "PATH")]
    generate_config: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(text) = &self.text {
            config.text = text.clone();
            config.text_file = None;
        }
        if let Some(file) = &self.file {
            config.text = String::new();
            config.text_file = Some(file.clone());
        }
        if let Some(cpm) = self.cpm {
            config.char_rate = cpm;
        }
        if let Some(wpm) = self.wpm {
            config.word_rate = wpm;
        }
        if let Some(hotkey) = &self.pause_hotkey {
            config.pause_hotkey = hotkey.clone();
        }
        if let Some(hotkey) = &self.stop_hotkey {
            config.stop_hotkey = hotkey.clone();
        }
        if self.no_focus_guard {
            config.focus_guard = false;
        }
        if self.verbose {
            config.verbose = true;
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "autotyper=debug" } else { "autotyper=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.generate_config {
        Config::sample().save_to_file(path)?;
        println!("📝 Sample configuration written to {}", path);
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    cli.apply(&mut config);
    init_tracing(config.verbose);
    config.validate()?;

    let mut text = config.load_text().context("failed to read text")?;
    let mut stdin_is_text = false;
    if text.is_empty() && !cli.interactive && !io::stdin().is_terminal() {
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read text from stdin")?;
        stdin_is_text = true;
    }
    if text.is_empty() && !cli.interactive {
        bail!("no text to type: pass TEXT, --file, pipe text on stdin, or use --interactive");
    }
    let rates = config.rates()?;

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let hotkeys = [
        (config.pause_hotkey.as_str(), Command::TogglePause),
        (config.stop_hotkey.as_str(), Command::StopTyping),
    ];
    if let Err(e) = HotkeyManager::spawn(&hotkeys, command_tx.clone()) {
        warn!("global hotkeys unavailable: {}", e);
    }
    if !stdin_is_text {
        console::spawn_reader(command_tx.clone(), cli.interactive);
    }

    print_banner(&config, &rates, text.chars().count(), cli.interactive);

    if !text.is_empty() {
        command_tx.send(Command::SetText { text })?;
    }
    if !cli.interactive {
        command_tx.send(Command::StartTyping)?;
    }

    let presenter = Presenter::new(cli.json);
    let exit_when_idle = !cli.interactive;
    let channels = Channels {
        command_rx,
        event_tx,
        event_rx,
    };
    if cli.dry_run {
        run(DryRunInjector::new(), &config, rates, channels, presenter, exit_when_idle).await
    } else {
        let injector = EnigoInjector::new(FocusGuard::new(config.focus_guard))?;
        run(injector, &config, rates, channels, presenter, exit_when_idle).await
    }
}

struct Channels {
    command_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::UnboundedSender<Event>,
    event_rx: mpsc::UnboundedReceiver<Event>,
}

async fn run<I: InputInjector>(
    mut injector: I,
    config: &Config,
    rates: Rates,
    channels: Channels,
    presenter: Presenter,
    exit_when_idle: bool,
) -> Result<()> {
    injector.set_inter_character_delay(config.keyboard_delay)?;
    let mut coordinator = TypingCoordinator::new(injector, channels.event_tx).with_rates(rates);

    tokio::select! {
        _ = coordinator.run(channels.command_rx) => {}
        _ = presenter.run(channels.event_rx, exit_when_idle) => {}
        _ = tokio::signal::ctrl_c() => {
            println!();
            info!("interrupted");
        }
    }

    Ok(())
}

fn print_banner(config: &Config, rates: &Rates, chars: usize, interactive: bool) {
    println!("{}", "⌨️  autotyper".bold());
    println!(
        "   {} characters at {} CPM / {} WPM ({:.0} ms per character)",
        chars,
        rates.char_rate(),
        rates.word_rate(),
        rates.delay_ms()
    );
    println!(
        "   🔥 {} pause/resume, {} stop",
        config.pause_hotkey.cyan(),
        config.stop_hotkey.cyan()
    );
    if interactive {
        println!("   type 'help' for console commands");
    }
}
