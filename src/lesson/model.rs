use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("lesson subtitle must not be blank")]
    EmptySubtitle,
    #[error("no words were given")]
    NoWords,
    #[error("missing or malformed field: {0}")]
    MissingField(String),
    #[error("lesson contains no words")]
    EmptyLesson,
}

/// One syllable of a word and its romaji reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phoneme {
    pub syllable: String,
    pub romaji: String,
}

/// One taught vocabulary item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    /// `None` when the word has no kanji form
    pub kanji: Option<String>,
    pub hiragana: String,
    pub portuguese: String,
    pub romaji: String,
    pub emoji: String,
    pub image_prompt: String,
    /// Concatenated in order these spell out `hiragana`
    pub phonemes: Vec<Phoneme>,
    /// Empty, or a `data:<mime>;base64,...` URI
    pub image_url: String,
    /// Base64 PCM16 LE mono 24kHz, empty when no audio was produced
    pub audio_data: String,
}

impl WordEntry {
    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }

    pub fn has_audio(&self) -> bool {
        !self.audio_data.is_empty()
    }

    /// Kanji when present, otherwise the hiragana
    pub fn display_form(&self) -> &str {
        self.kanji.as_deref().unwrap_or(&self.hiragana)
    }
}

/// A named, ordered collection of words
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub subtitle: String,
    pub words: Vec<WordEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_user_created: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Lesson {
    /// A freshly generated, user-created lesson
    pub fn new_user_lesson(subtitle: impl Into<String>, words: Vec<WordEntry>) -> Self {
        Self {
            id: mint_lesson_id(),
            subtitle: subtitle.into(),
            words,
            is_user_created: Some(true),
            created_at: Some(Utc::now()),
        }
    }

    /// Same lesson under a newly minted id
    pub fn with_fresh_id(mut self) -> Self {
        self.id = mint_lesson_id();
        self
    }
}

/// Random 128-bit identifier, unique across sessions without coordination
pub fn mint_lesson_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
