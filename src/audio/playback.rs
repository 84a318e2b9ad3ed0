use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::decode::{AudioDecodeError, DecodedAudio, decode_pcm16};

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error(transparent)]
    Decode(#[from] AudioDecodeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to render WAV: {0}")]
    Wav(#[from] hound::Error),
    #[error("playback task failed: {0}")]
    Task(String),
}

/// Anything that can output a decoded buffer
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn play(&self, label: &str, audio: DecodedAudio) -> Result<(), PlaybackError>;
}

/// Starts playback without waiting for it
///
/// Returns `None` when there is nothing to play (the word has no audio).
/// Failures are logged and swallowed; concurrent calls simply overlap.
pub fn play_in_background(
    sink: Arc<dyn AudioSink>,
    label: impl Into<String>,
    audio_data: &str,
) -> Option<JoinHandle<()>> {
    if audio_data.is_empty() {
        return None;
    }

    let label = label.into();
    let audio_data = audio_data.to_string();

    Some(tokio::spawn(async move {
        let result = match decode_pcm16(&audio_data) {
            Ok(audio) => sink.play(&label, audio).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = result {
            warn!("Playback of '{}' failed: {}", label, e);
        }
    }))
}

/// Renders each played buffer to `<dir>/<label>.wav`
#[derive(Debug, Clone)]
pub struct WavFileSink {
    dir: PathBuf,
}

impl WavFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, label: &str) -> PathBuf {
        let safe_label = label
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .collect::<String>();
        self.dir.join(format!("{}.wav", safe_label))
    }
}

#[async_trait]
impl AudioSink for WavFileSink {
    async fn play(&self, label: &str, audio: DecodedAudio) -> Result<(), PlaybackError> {
        let path = self.path_for(label);
        let dir = self.dir.clone();

        let written = tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&dir)?;
            let bytes = audio.to_wav_bytes()?;
            std::fs::write(&path, bytes)?;
            Ok::<_, PlaybackError>((path, audio.duration_secs()))
        })
        .await
        .map_err(|e| PlaybackError::Task(e.to_string()))??;

        info!("Wrote {:?} ({:.2}s)", written.0, written.1);
        Ok(())
    }
}
