//! Voice Adapter
//!
//! Cloud speech synthesis plus local playback through an external player.
//!
//! # Usage
//!
//! ```ignore
//! use robot_core::voice::{AudioPlayer, PollySynthesizer, VoiceAdapter, VoiceService};
//!
//! let polly = PollySynthesizer::from_config(&config.voice);
//! let player = AudioPlayer::new(&config.voice.player, &config.voice.output_device);
//! let voice = VoiceService::new(polly, player, &config.voice.audio_dir);
//! voice.initialize().await?;
//! voice.speak("Hello!", None).await?;
//! ```

mod player;
mod polly;
mod service;
pub mod sigv4;
mod traits;

pub use player::AudioPlayer;
pub use polly::PollySynthesizer;
pub use service::{VoiceService, DEFAULT_VOICE};
pub use traits::{SpeechSynthesizer, SynthesisRequest, VoiceAdapter};
