//! Kali Check
//!
//! Pre-deployment diagnostics for a robot.
//!
//! # Usage
//!
//! ```bash
//! # Probe the workflow host, the speech endpoint and configured extras
//! kali-check connectivity
//!
//! # Speak a sample line with the kid and cyber voices
//! kali-check voices
//!
//! # Try specific voices
//! kali-check voices --voice Ivy --voice Brian --text "Testing one two"
//! ```
//!
//! # Environment Variables
//!
//! Same as the robot itself: `AWS_DEFAULT_REGION`, `AWS_ACCESS_KEY_ID`,
//! `AWS_SECRET_ACCESS_KEY`, `KALI_N8N_BASE_URL`, `KALI_AUDIO_PLAYER`,
//! `KALI_AUDIO_DEVICE`, `KALI_LOG_LEVEL`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use robot_core::connectivity::{check_all, default_targets};
use robot_core::{
    default_config_path, load_config_from_path, AudioPlayer, PollySynthesizer, VoiceAdapter,
    VoiceService,
};

const SAMPLE_TEXT: &str = "Hello! My name is Kali. This is a voice test.";

#[derive(Parser, Debug)]
#[command(name = "kali-check", version, about = "Diagnostics for the Kali robot")]
struct Cli {
    /// Configuration file (default: ~/.config/kali-robot/robot.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that external services are reachable
    Connectivity,
    /// Speak a sample line with one or more voices
    Voices {
        /// Voice id to try (repeatable; default: the kid and cyber voices)
        #[arg(long = "voice")]
        voices: Vec<String>,
        /// Text to speak
        #[arg(long, default_value = SAMPLE_TEXT)]
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config_from_path(cli.config.or_else(default_config_path))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_new(&config.logging.level)?)
        .with_target(false)
        .init();

    config.log_origin();

    let healthy = match cli.command {
        Command::Connectivity => run_connectivity(&config).await?,
        Command::Voices { voices, text } => run_voices(&config, voices, &text).await?,
    };

    Ok(if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_connectivity(config: &robot_core::RobotConfig) -> anyhow::Result<bool> {
    let client = reqwest::Client::builder().build()?;
    let targets = default_targets(config);
    let reports = check_all(&client, &targets).await;

    for report in &reports {
        println!("{}", report.summary());
    }

    let failed = reports.iter().filter(|r| !r.is_reachable()).count();
    if failed == 0 {
        println!("All {} targets reachable", reports.len());
    } else {
        println!("{failed} of {} targets unreachable", reports.len());
    }
    Ok(failed == 0)
}

async fn run_voices(
    config: &robot_core::RobotConfig,
    voices: Vec<String>,
    text: &str,
) -> anyhow::Result<bool> {
    let voices = if voices.is_empty() {
        vec![
            config.voice.profile.kid.clone(),
            config.voice.profile.cyber.clone(),
        ]
    } else {
        voices
    };

    let service = VoiceService::new(
        PollySynthesizer::from_config(&config.voice),
        AudioPlayer::new(&config.voice.player, &config.voice.output_device),
        &config.voice.audio_dir,
    );
    service.initialize().await?;

    let mut healthy = true;
    for voice in &voices {
        println!("Testing voice {voice}...");
        match service.speak(text, Some(voice)).await {
            Ok(()) => println!("  ok"),
            Err(e) => {
                error!(voice = %voice, error = %e, "Voice test failed");
                println!("  FAILED: {e}");
                healthy = false;
            }
        }
    }

    service.shutdown().await;
    Ok(healthy)
}
