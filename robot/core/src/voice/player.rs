//! External audio player
//!
//! Plays a file by running `<program> -q -a <device> --buffer 8192 <file>`
//! (mpg123 flags) and waiting for it to exit. The child is killed if the
//! waiting future is dropped, so aborting the speech worker stops playback.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::VoiceError;

/// Player buffer size in KiB
const PLAYER_BUFFER: &str = "8192";

/// Runs the external player
#[derive(Clone, Debug)]
pub struct AudioPlayer {
    program: String,
    device: String,
}

impl AudioPlayer {
    /// Player `program` writing to output `device`
    pub fn new(program: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            device: device.into(),
        }
    }

    /// Executable name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed for `file`
    #[must_use]
    pub fn args(&self, file: &Path) -> Vec<OsString> {
        vec![
            "-q".into(),
            "-a".into(),
            self.device.clone().into(),
            "--buffer".into(),
            PLAYER_BUFFER.into(),
            file.as_os_str().to_owned(),
        ]
    }

    /// Play `file` to completion
    ///
    /// # Errors
    ///
    /// [`VoiceError::Playback`] if the player cannot be started or exits
    /// with a non-zero status.
    pub async fn play(&self, file: &Path) -> Result<(), VoiceError> {
        tracing::debug!(player = %self.program, file = %file.display(), "Starting playback");

        let output = Command::new(&self.program)
            .args(self.args(file))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| VoiceError::Playback(format!("failed to start {}: {e}", self.program)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            Err(VoiceError::Playback(if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                format!("{} exited with {}: {stderr}", self.program, output.status)
            }))
        }
    }
}
