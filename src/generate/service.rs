//! Seams to the three generative services.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("service returned no {0}")]
    EmptyResponse(&'static str),
    #[error("word details do not match the expected shape: {0}")]
    MalformedDetails(String),
    #[error("{0}")]
    Service(String),
}

/// An image returned inline by the image service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 image bytes
    pub data: String,
}

impl InlineImage {
    /// Self-contained `data:` URI usable directly as an image source
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Audio returned inline by the speech service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAudio {
    pub mime_type: String,
    /// Base64 PCM16 LE mono 24kHz
    pub data: String,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate JSON constrained to `schema`
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, GenerationError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// `Ok(None)` when the service answered without an image
    async fn generate_image(&self, prompt: &str) -> Result<Option<InlineImage>, GenerationError>;
}

#[async_trait]
pub trait SpeechGenerator: Send + Sync {
    /// `Ok(None)` when the service answered without audio
    async fn synthesize(
        &self,
        script: &str,
        voice: &str,
    ) -> Result<Option<InlineAudio>, GenerationError>;
}
