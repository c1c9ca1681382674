//! Voice Service
//!
//! The [`VoiceAdapter`] used by the robot: any [`SpeechSynthesizer`] plus
//! the external [`AudioPlayer`], with the current voice selection.
//!
//! Synthesized audio is written to a `speech_*.mp3` scratch file that is
//! removed when the speak call ends, whether playback succeeded, failed or
//! was cancelled.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::player::AudioPlayer;
use super::traits::{SpeechSynthesizer, SynthesisRequest, VoiceAdapter};
use crate::error::VoiceError;

/// Voice selected before any mode switch
pub const DEFAULT_VOICE: &str = "Joanna";

const SCRATCH_PREFIX: &str = "speech_";
const SCRATCH_SUFFIX: &str = ".mp3";

/// Synthesizer + player voice adapter
pub struct VoiceService<S: SpeechSynthesizer> {
    synthesizer: S,
    player: AudioPlayer,
    audio_dir: PathBuf,
    current_voice: RwLock<String>,
    initialized: AtomicBool,
}

impl<S: SpeechSynthesizer> VoiceService<S> {
    /// Create a service writing scratch audio under `audio_dir`
    pub fn new(synthesizer: S, player: AudioPlayer, audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            synthesizer,
            player,
            audio_dir: audio_dir.into(),
            current_voice: RwLock::new(DEFAULT_VOICE.to_string()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Scratch directory
    #[must_use]
    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// The wrapped synthesizer
    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    /// Reserve a `speech_*.mp3` name and fill it with `audio`
    async fn write_scratch(&self, audio: &[u8]) -> Result<tempfile::TempPath, VoiceError> {
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(SCRATCH_SUFFIX)
            .tempfile_in(&self.audio_dir)?
            .into_temp_path();
        tokio::fs::write(&scratch, audio).await?;
        Ok(scratch)
    }

    /// Remove `speech_*.mp3` files left behind by a crash
    async fn remove_leftovers(&self) -> usize {
        let Ok(mut entries) = tokio::fs::read_dir(&self.audio_dir).await else {
            return 0;
        };
        let mut removed = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(SCRATCH_PREFIX) && name.ends_with(SCRATCH_SUFFIX) {
                match tokio::fs::remove_file(entry.path()).await {
                    Ok(()) => removed += 1,
                    Err(e) => tracing::debug!(file = %name, error = %e, "Could not remove scratch audio"),
                }
            }
        }
        removed
    }
}

#[async_trait]
impl<S: SpeechSynthesizer> VoiceAdapter for VoiceService<S> {
    fn name(&self) -> &str {
        self.synthesizer.name()
    }

    async fn initialize(&self) -> Result<(), VoiceError> {
        self.synthesizer.initialize().await?;
        tokio::fs::create_dir_all(&self.audio_dir).await.map_err(|e| {
            VoiceError::Initialization(format!(
                "cannot create audio directory {}: {e}",
                self.audio_dir.display()
            ))
        })?;
        self.initialized.store(true, Ordering::SeqCst);

        tracing::info!(
            synthesizer = self.synthesizer.name(),
            player = self.player.program(),
            voice = %self.current_voice(),
            "Voice service initialized"
        );
        Ok(())
    }

    fn select_voice(&self, voice_id: &str) {
        let mut current = self.current_voice.write();
        if *current != voice_id {
            tracing::info!(from = %current.as_str(), to = voice_id, "Voice changed");
            *current = voice_id.to_string();
        }
    }

    fn current_voice(&self) -> String {
        self.current_voice.read().clone()
    }

    async fn speak(&self, text: &str, voice_override: Option<&str>) -> Result<(), VoiceError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(VoiceError::NotInitialized);
        }
        if text.trim().is_empty() {
            tracing::debug!("Skipping empty speech");
            return Ok(());
        }

        let voice = voice_override.map_or_else(|| self.current_voice(), str::to_string);
        tracing::info!(voice = %voice, text, "Speaking");

        let request = SynthesisRequest::new(text, voice);
        let audio = self.synthesizer.synthesize(&request).await?;

        // Dropping `scratch` deletes the file, including on cancellation
        let scratch = self.write_scratch(&audio).await?;
        self.player.play(&scratch).await
    }

    async fn shutdown(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        let removed = self.remove_leftovers().await;
        tracing::info!(removed, "Voice service shut down");
    }
}
