//! Kali Robot Entry Point
//!
//! Brings up voice, display and notifier, switches to the start mode, says
//! hello and runs the tick driver until asked to stop.
//!
//! Usage:
//!   kali [OPTIONS]
//!
//! Options:
//!   --config <PATH>     Configuration file (default: ~/.config/kali-robot/robot.toml)
//!   --mode <MODE>       Start mode: kid, cyber or locked (default: kid)
//!   --headless          Run without the terminal face
//!   --greeting <TEXT>   First thing to say
//!   --no-greeting       Start silently

use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use robot_core::{
    default_config_path, load_config_from_path, AudioPlayer, FaceDisplay, ModeCoordinator,
    OperationalMode, PollySynthesizer, RobotConfig, RobotHandle, TickDriver, VoiceService,
    WebhookNotifier,
};
use robot_face::input::spawn_input_task;
use robot_face::surface::restore_terminal;
use robot_face::DisplayAnimator;

const DEFAULT_GREETING: &str = "Hello! My name is Kali. I am ready!";

#[derive(Parser, Debug)]
#[command(name = "kali", version, about = "Kali robot controller")]
struct Cli {
    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start mode
    #[arg(long, default_value = "kid")]
    mode: OperationalMode,

    /// Run without the terminal face
    #[arg(long)]
    headless: bool,

    /// First thing to say
    #[arg(long, default_value = DEFAULT_GREETING, conflicts_with = "no_greeting")]
    greeting: String,

    /// Start silently
    #[arg(long)]
    no_greeting: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config_from_path(cli.config.clone().or_else(default_config_path))?;

    let headless = cli.headless || !io::stdout().is_terminal();
    init_logging(&config, !headless)?;

    info!(headless, "Kali robot starting");
    config.log_origin();

    // Restore the terminal before the panic message is printed
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    let display = if headless {
        DisplayAnimator::headless()
    } else {
        DisplayAnimator::terminal()
    };
    let voice = Arc::new(VoiceService::new(
        PollySynthesizer::from_config(&config.voice),
        AudioPlayer::new(&config.voice.player, &config.voice.output_device),
        &config.voice.audio_dir,
    ));
    let notifier = Arc::new(WebhookNotifier::from_config(&config.notifier)?);

    let mut coordinator = ModeCoordinator::new(
        voice,
        notifier,
        display,
        config.voice.profile.clone(),
        config.notifier.robot_name.clone(),
    );
    if let Err(e) = coordinator.initialize().await {
        coordinator.shutdown().await;
        return Err(e.into());
    }
    coordinator.set_mode(cli.mode);
    info!(mode = %coordinator.mode(), "Kali robot initialized");

    let driver = TickDriver::new(coordinator, config.display.frame_duration());
    let handle = driver.handle();

    if !cli.no_greeting {
        handle.speak(cli.greeting.clone(), None).await?;
    }

    let signals = tokio::spawn(forward_shutdown_signals(handle.clone()));
    let input = driver
        .coordinator()
        .display()
        .is_enabled()
        .then(|| spawn_input_task(handle.clone()));

    let coordinator = driver.run().await;

    signals.abort();
    if let Some(input) = input {
        input.abort();
    }

    info!(uptime_secs = coordinator.status().uptime_secs, "Goodbye!");
    Ok(())
}

/// Log to stderr, or to the log file while the face owns the screen
fn init_logging(config: &RobotConfig, to_file: bool) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if !to_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
        return Ok(());
    }

    match config.logging.file {
        Some(ref path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .init();
        }
    }
    Ok(())
}

/// Ctrl-C / SIGTERM → driver shutdown
async fn forward_shutdown_signals(handle: RobotHandle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }

    handle.shutdown();
}
