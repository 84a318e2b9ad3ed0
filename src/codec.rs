//! Conversions between raw bytes, base64 text and UTF-8 strings.
//!
//! Share tokens go through UTF-8 bytes before base64 so that kana, kanji and
//! emoji survive the trip unchanged.

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded bytes are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Decode standard (padded) base64 into raw bytes
pub fn bytes_from_base64(s: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(STANDARD.decode(s.trim())?)
}

/// Encode raw bytes as standard (padded) base64
pub fn bytes_to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Encode an arbitrary string as an ASCII-only base64 token
pub fn utf8_to_ascii_safe(s: &str) -> String {
    bytes_to_base64(s.as_bytes())
}

/// Inverse of [`utf8_to_ascii_safe`]
pub fn ascii_safe_to_utf8(token: &str) -> Result<String, DecodeError> {
    let bytes = bytes_from_base64(token)?;
    Ok(String::from_utf8(bytes)?)
}
