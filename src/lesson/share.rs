//! Share tokens: a whole lesson, images and audio included, packed into a
//! single URL query parameter.

use reqwest::Url;
use serde_json::error::Category;
use thiserror::Error;
use tracing::info;

use super::{Lesson, ValidationError};
use crate::codec::{DecodeError, ascii_safe_to_utf8, utf8_to_ascii_safe};
use crate::db::{LessonStore, StoreError};

/// Query parameter that carries the share token
pub const LESSON_QUERY_PARAM: &str = "lesson";

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("share token is corrupted: {0}")]
    Decode(#[from] DecodeError),
    /// The token decoded to text that is not JSON at all
    #[error("share token is corrupted: {0}")]
    Syntax(serde_json::Error),
    #[error("shared lesson is incomplete: {0}")]
    Validation(#[from] ValidationError),
    #[error("failed to serialize lesson: {0}")]
    Encode(serde_json::Error),
    #[error("invalid share link: {0}")]
    InvalidLink(String),
}

impl ShareError {
    /// True when the token itself could not be read, as opposed to holding
    /// an incomplete lesson
    pub fn is_corrupted(&self) -> bool {
        matches!(self, ShareError::Decode(_) | ShareError::Syntax(_))
    }
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Share(#[from] ShareError),
    #[error("failed to store imported lesson: {0}")]
    Store(#[from] StoreError),
}

pub fn encode_lesson_token(lesson: &Lesson) -> Result<String, ShareError> {
    let json = serde_json::to_string(lesson).map_err(ShareError::Encode)?;
    Ok(utf8_to_ascii_safe(&json))
}

pub fn decode_lesson_token(token: &str) -> Result<Lesson, ShareError> {
    let json = ascii_safe_to_utf8(token)?;

    let lesson: Lesson = serde_json::from_str(&json).map_err(|e| match e.classify() {
        Category::Data => ShareError::Validation(ValidationError::MissingField(e.to_string())),
        _ => ShareError::Syntax(e),
    })?;

    if lesson.words.is_empty() {
        return Err(ValidationError::EmptyLesson.into());
    }

    Ok(lesson)
}

/// Builds a link to `base_url` carrying the lesson as a query parameter
///
/// The token's `+`, `/` and `=` are percent-encoded here.
pub fn share_link(base_url: &str, lesson: &Lesson) -> Result<String, ShareError> {
    let mut url = Url::parse(base_url).map_err(|e| ShareError::InvalidLink(e.to_string()))?;
    let token = encode_lesson_token(lesson)?;

    url.query_pairs_mut().append_pair(LESSON_QUERY_PARAM, &token);

    Ok(url.to_string())
}

/// Pulls the share token out of a link, if it carries one
pub fn token_from_link(link: &str) -> Result<Option<String>, ShareError> {
    let url = Url::parse(link).map_err(|e| ShareError::InvalidLink(e.to_string()))?;

    Ok(url
        .query_pairs()
        .find(|(key, _)| key == LESSON_QUERY_PARAM)
        .map(|(_, value)| value.into_owned()))
}

/// Decodes a shared lesson and appends it under a newly minted id
///
/// The embedded id is never persisted, so importing the same link twice
/// yields two distinct lessons.
pub async fn import_lesson(store: &dyn LessonStore, token: &str) -> Result<Lesson, ImportError> {
    let shared = decode_lesson_token(token)?;
    let shared_id = shared.id.clone();
    let lesson = shared.with_fresh_id();

    store.append(&lesson).await?;

    info!(
        "Imported lesson '{}' ({} words) as {} (shared as {})",
        lesson.subtitle,
        lesson.words.len(),
        lesson.id,
        shared_id
    );

    Ok(lesson)
}
