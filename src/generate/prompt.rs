//! Prompt templates and the structured shape expected back from the text
//! service.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::service::GenerationError;
use crate::lesson::Phoneme;

/// Parsed answer of the detail generation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDetails {
    pub hiragana: String,
    pub portuguese: String,
    pub romaji: String,
    pub emoji: String,
    pub image_prompt: String,
    #[serde(default)]
    pub kanji: Option<String>,
    pub phonemes: Vec<Phoneme>,
}

impl WordDetails {
    pub fn from_value(value: serde_json::Value) -> Result<Self, GenerationError> {
        serde_json::from_value(value).map_err(|e| GenerationError::MalformedDetails(e.to_string()))
    }

    /// Blank kanji means the word is written in kana only
    pub fn kanji(&self) -> Option<String> {
        self.kanji
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }
}

pub fn details_prompt(word: &str) -> String {
    format!(
        "Você é um professor de japonês para crianças brasileiras. \
        Analise a palavra japonesa \"{word}\" e responda com: \
        a leitura em hiragana, a tradução para o português, a leitura em romaji, \
        um único emoji que represente a palavra, \
        uma descrição curta em inglês para gerar uma ilustração da palavra, \
        a forma em kanji (texto vazio se a palavra não tiver kanji) \
        e a divisão da palavra em sílabas, cada uma com seu romaji, na ordem da pronúncia."
    )
}

/// Response schema for [`details_prompt`], in the service's OpenAPI subset
pub fn details_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "hiragana": { "type": "STRING" },
            "portuguese": { "type": "STRING" },
            "romaji": { "type": "STRING" },
            "emoji": { "type": "STRING" },
            "imagePrompt": { "type": "STRING" },
            "kanji": { "type": "STRING" },
            "phonemes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "syllable": { "type": "STRING" },
                        "romaji": { "type": "STRING" }
                    },
                    "required": ["syllable", "romaji"]
                }
            }
        },
        "required": ["hiragana", "portuguese", "romaji", "emoji", "imagePrompt", "phonemes"]
    })
}

pub fn image_prompt(subject: &str) -> String {
    format!(
        "A bright, colorful, child-friendly cartoon illustration of {}. \
        Simple shapes, soft outlines, cheerful mood, plain light background. \
        Do not include any text, letters, numbers or writing in the image.",
        subject.trim()
    )
}

/// Narration read by the speech service
///
/// Word, then each syllable with pauses, the syllables again together, the
/// whole word slowly, its meaning and a word of encouragement.
pub fn narration_script(details: &WordDetails) -> String {
    let syllables: Vec<&str> = details.phonemes.iter().map(|p| p.syllable.as_str()).collect();
    let spelled = syllables
        .iter()
        .map(|s| format!("{s}..."))
        .collect::<Vec<_>>()
        .join(" ");
    let together = syllables.join(" - ");

    format!(
        "Fale de forma calma, clara e animada, para uma criança. \
        A palavra de hoje é: {word}. \
        Vamos falar cada som: {spelled} \
        Mais uma vez, todos juntos: {together}. \
        Agora a palavra inteira, bem devagar: {word}. \
        {word} quer dizer {meaning}! \
        Muito bem, você conseguiu!",
        word = details.hiragana,
        meaning = details.portuguese,
    )
}
