pub mod model;
pub mod share;

#[cfg(test)]
pub mod fixtures;

pub use model::{Lesson, Phoneme, ValidationError, WordEntry};
pub use share::{ImportError, encode_lesson_token, import_lesson, share_link, token_from_link};
