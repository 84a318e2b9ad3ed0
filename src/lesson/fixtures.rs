//! Lessons shared by the test modules.

use super::{Lesson, Phoneme, WordEntry};
use crate::codec::bytes_to_base64;

fn phonemes(pairs: &[(&str, &str)]) -> Vec<Phoneme> {
    pairs
        .iter()
        .map(|(syllable, romaji)| Phoneme {
            syllable: syllable.to_string(),
            romaji: romaji.to_string(),
        })
        .collect()
}

pub fn sample_word() -> WordEntry {
    WordEntry {
        kanji: Some("犬".to_string()),
        hiragana: "いぬ".to_string(),
        portuguese: "cachorro".to_string(),
        romaji: "inu".to_string(),
        emoji: "🐶".to_string(),
        image_prompt: "a happy puppy".to_string(),
        phonemes: phonemes(&[("い", "i"), ("ぬ", "nu")]),
        image_url: String::new(),
        audio_data: String::new(),
    }
}

/// A two-word lesson with embedded image and audio payloads
pub fn sample_lesson() -> Lesson {
    let dog = WordEntry {
        image_url: format!("data:image/png;base64,{}", bytes_to_base64(b"\x89PNG\r\n\x1a\nfake")),
        audio_data: bytes_to_base64(&[0x00, 0x80, 0xFF, 0x7F, 0x00, 0x00]),
        ..sample_word()
    };
    let apple = WordEntry {
        kanji: None,
        hiragana: "りんご".to_string(),
        portuguese: "maçã".to_string(),
        romaji: "ringo".to_string(),
        emoji: "🍎".to_string(),
        image_prompt: "a shiny red apple".to_string(),
        phonemes: phonemes(&[("り", "ri"), ("ん", "n"), ("ご", "go")]),
        image_url: String::new(),
        audio_data: String::new(),
    };

    Lesson::new_user_lesson("Primeiras palavras 🌸", vec![dog, apple])
}
