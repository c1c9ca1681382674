//! Voice Traits
//!
//! Two seams: [`SpeechSynthesizer`] turns text into audio bytes, and
//! [`VoiceAdapter`] is what the coordinator talks to (voice selection plus
//! synthesize-and-play). [`super::VoiceService`] composes the first into
//! the second.

use async_trait::async_trait;

use crate::error::VoiceError;

/// One synthesis call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynthesisRequest {
    /// Text to speak
    pub text: String,
    /// Provider voice id (e.g. `"Joanna"`)
    pub voice_id: String,
    /// Audio container requested from the provider
    pub output_format: String,
    /// Provider engine
    pub engine: String,
}

impl SynthesisRequest {
    /// MP3 from the neural engine
    pub fn new(text: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_id: voice_id.into(),
            output_format: "mp3".to_string(),
            engine: "neural".to_string(),
        }
    }
}

/// Text-to-speech provider
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Provider name for logs (e.g. "Polly")
    fn name(&self) -> &str;

    /// Resolve credentials and build the client
    async fn initialize(&self) -> Result<(), VoiceError>;

    /// Synthesize `request` into encoded audio
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, VoiceError>;
}

/// What the coordinator needs from a voice
///
/// Methods take `&self` so a single adapter can be shared between the tick
/// path (voice selection) and the speech worker (playback).
#[async_trait]
pub trait VoiceAdapter: Send + Sync {
    /// Adapter name for logs
    fn name(&self) -> &str;

    /// Prepare the adapter; a failure aborts start-up
    async fn initialize(&self) -> Result<(), VoiceError>;

    /// Change the current voice
    fn select_voice(&self, voice_id: &str);

    /// The current voice
    fn current_voice(&self) -> String;

    /// Synthesize and play `text`, with `voice_override` or the current voice
    async fn speak(&self, text: &str, voice_override: Option<&str>) -> Result<(), VoiceError>;

    /// Release resources and remove leftover scratch audio
    async fn shutdown(&self);
}
