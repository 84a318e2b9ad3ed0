//! Gemini `generateContent` client for the text, image and speech services.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::service::{
    GenerationError, ImageGenerator, InlineAudio, InlineImage, SpeechGenerator, TextGenerator,
};
use crate::config::{Config, ConfigError};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
    }

    /// Text of the first part that carries any
    pub fn first_text(&self) -> Option<&str> {
        self.parts()
            .filter_map(|p| p.text.as_deref())
            .find(|t| !t.trim().is_empty())
    }

    /// First inline payload with non-empty data
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.parts()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| !d.data.is_empty())
    }
}

pub struct GeminiClient {
    http_client: reqwest::Client,
    api_base: String,
    api_key: String,
    text_model: String,
    image_model: String,
    speech_model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?.to_string();

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("kotoba/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                var: "KOTOBA_REQUEST_TIMEOUT_SECS",
                value: e.to_string(),
            })?;

        Ok(Self {
            http_client,
            api_base: config.api_base.clone(),
            api_key,
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            speech_model: config.speech_model.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }

    async fn generate_content(
        &self,
        model: &str,
        body: Value,
    ) -> Result<GenerateContentResponse, GenerationError> {
        debug!("Calling {} on {}", model, self.api_base);

        let response = self
            .http_client
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

fn user_content(prompt: &str) -> Value {
    json!([{ "role": "user", "parts": [{ "text": prompt }] }])
}

fn structured_request(prompt: &str, schema: &Value) -> Value {
    json!({
        "contents": user_content(prompt),
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": schema,
        }
    })
}

fn image_request(prompt: &str) -> Value {
    json!({
        "contents": user_content(prompt),
        "generationConfig": {
            "responseModalities": ["IMAGE"],
        }
    })
}

fn speech_request(script: &str, voice: &str) -> Value {
    json!({
        "contents": user_content(script),
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice }
                }
            }
        }
    })
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<Value, GenerationError> {
        let response = self
            .generate_content(&self.text_model, structured_request(prompt, schema))
            .await?;

        let text = response
            .first_text()
            .ok_or(GenerationError::EmptyResponse("text"))?;

        serde_json::from_str(text).map_err(|e| GenerationError::MalformedDetails(e.to_string()))
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate_image(&self, prompt: &str) -> Result<Option<InlineImage>, GenerationError> {
        let response = self
            .generate_content(&self.image_model, image_request(prompt))
            .await?;

        Ok(response.first_inline_data().map(|d| InlineImage {
            mime_type: d.mime_type.clone(),
            data: d.data.clone(),
        }))
    }
}

#[async_trait]
impl SpeechGenerator for GeminiClient {
    async fn synthesize(
        &self,
        script: &str,
        voice: &str,
    ) -> Result<Option<InlineAudio>, GenerationError> {
        let response = self
            .generate_content(&self.speech_model, speech_request(script, voice))
            .await?;

        Ok(response.first_inline_data().map(|d| InlineAudio {
            mime_type: d.mime_type.clone(),
            data: d.data.clone(),
        }))
    }
}
