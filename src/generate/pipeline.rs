use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::progress::{GenerationStep, ProgressSink, ProgressUpdate};
use super::prompt::{WordDetails, details_prompt, details_schema, image_prompt, narration_script};
use super::service::{
    GenerationError, ImageGenerator, InlineAudio, InlineImage, SpeechGenerator, TextGenerator,
};
use crate::db::{LessonStore, StoreError};
use crate::lesson::{Lesson, ValidationError, WordEntry};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("generation failed for '{word}': {source}")]
    Generation {
        word: String,
        #[source]
        source: GenerationError,
    },
    #[error("failed to store lesson: {0}")]
    Store(#[from] StoreError),
}

/// Split raw user input into target words: one per line, blanks dropped,
/// order kept
pub fn parse_word_list(raw_words_text: &str) -> Vec<String> {
    raw_words_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turns raw word lists into lessons using the three generative services
pub struct LessonGenerator {
    text: Arc<dyn TextGenerator>,
    image: Arc<dyn ImageGenerator>,
    speech: Arc<dyn SpeechGenerator>,
    voice: String,
    progress: Arc<dyn ProgressSink>,
}

impl LessonGenerator {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        image: Arc<dyn ImageGenerator>,
        speech: Arc<dyn SpeechGenerator>,
        voice: impl Into<String>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            text,
            image,
            speech,
            voice: voice.into(),
            progress,
        }
    }

    /// Generate a complete lesson, or nothing
    ///
    /// Words are processed strictly in input order and the lesson keeps that
    /// order. A detail failure on any word abandons the whole batch; a missing
    /// illustration or narration only leaves that field empty.
    pub async fn generate_lesson(
        &self,
        subtitle: &str,
        raw_words_text: &str,
    ) -> Result<Lesson, PipelineError> {
        let subtitle = subtitle.trim();
        if subtitle.is_empty() {
            return Err(ValidationError::EmptySubtitle.into());
        }

        let words = parse_word_list(raw_words_text);
        if words.is_empty() {
            return Err(ValidationError::NoWords.into());
        }

        info!("Generating lesson '{}' with {} words", subtitle, words.len());
        let start_time = std::time::Instant::now();

        let total = words.len();
        let mut entries = Vec::with_capacity(total);
        for (index, word) in words.iter().enumerate() {
            entries.push(self.generate_word(word, index + 1, total).await?);
        }

        let lesson = Lesson::new_user_lesson(subtitle, entries);

        info!(
            "Generated lesson {} ({} words) in {:.1}s",
            lesson.id,
            lesson.words.len(),
            start_time.elapsed().as_secs_f32()
        );

        Ok(lesson)
    }

    /// Generate a lesson and append it to `store` only once it is complete
    pub async fn generate_and_store(
        &self,
        store: &dyn LessonStore,
        subtitle: &str,
        raw_words_text: &str,
    ) -> Result<Lesson, PipelineError> {
        let lesson = self.generate_lesson(subtitle, raw_words_text).await?;
        store.append(&lesson).await?;
        Ok(lesson)
    }

    async fn generate_word(
        &self,
        word: &str,
        position: usize,
        total: usize,
    ) -> Result<WordEntry, PipelineError> {
        self.report(word, GenerationStep::Details, position, total);
        let details = self
            .generate_details(word)
            .await
            .map_err(|source| PipelineError::Generation {
                word: word.to_string(),
                source,
            })?;

        self.report(word, GenerationStep::Image, position, total);
        let image = self.generate_illustration(word, &details).await;

        self.report(word, GenerationStep::Audio, position, total);
        let audio = self.generate_narration(word, &details).await;

        Ok(assemble_entry(details, image, audio))
    }

    async fn generate_details(&self, word: &str) -> Result<WordDetails, GenerationError> {
        let value = self
            .text
            .generate_structured(&details_prompt(word), &details_schema())
            .await?;

        WordDetails::from_value(value)
    }

    async fn generate_illustration(&self, word: &str, details: &WordDetails) -> Option<InlineImage> {
        match self.image.generate_image(&image_prompt(&details.image_prompt)).await {
            Ok(Some(image)) => Some(image),
            Ok(None) => {
                warn!("No illustration returned for '{}', falling back to emoji", word);
                None
            }
            Err(e) => {
                warn!("Illustration failed for '{}': {}", word, e);
                None
            }
        }
    }

    async fn generate_narration(&self, word: &str, details: &WordDetails) -> Option<InlineAudio> {
        match self.speech.synthesize(&narration_script(details), &self.voice).await {
            Ok(Some(audio)) => Some(audio),
            Ok(None) => {
                warn!("No narration returned for '{}', playback will be silent", word);
                None
            }
            Err(e) => {
                warn!("Narration failed for '{}': {}", word, e);
                None
            }
        }
    }

    fn report(&self, word: &str, step: GenerationStep, position: usize, total: usize) {
        self.progress.report(&ProgressUpdate {
            word: word.to_string(),
            step,
            position,
            total,
        });
    }
}

/// Absent media crosses into the data model as empty strings
fn assemble_entry(
    details: WordDetails,
    image: Option<InlineImage>,
    audio: Option<InlineAudio>,
) -> WordEntry {
    let kanji = details.kanji();

    WordEntry {
        kanji,
        hiragana: details.hiragana,
        portuguese: details.portuguese,
        romaji: details.romaji,
        emoji: details.emoji,
        image_prompt: details.image_prompt,
        phonemes: details.phonemes,
        image_url: image.map(|i| i.to_data_uri()).unwrap_or_default(),
        audio_data: audio.map(|a| a.data).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryLessonStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers with canned details per word; words in `failing` error out
    struct FakeText {
        answers: HashMap<&'static str, serde_json::Value>,
        failing: Vec<&'static str>,
        requested: Mutex<Vec<String>>,
    }

    impl FakeText {
        fn new() -> Self {
            let mut answers = HashMap::new();
            answers.insert(
                "犬",
                details_json("いぬ", "cachorro", "inu", "🐶", "犬", &[("い", "i"), ("ぬ", "nu")]),
            );
            answers.insert(
                "猫",
                details_json("ねこ", "gato", "neko", "🐱", "猫", &[("ね", "ne"), ("こ", "ko")]),
            );
            answers.insert(
                "りんご",
                details_json(
                    "りんご",
                    "maçã",
                    "ringo",
                    "🍎",
                    "",
                    &[("り", "ri"), ("ん", "n"), ("ご", "go")],
                ),
            );
            Self {
                answers,
                failing: Vec::new(),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(mut self, word: &'static str) -> Self {
            self.failing.push(word);
            self
        }
    }

    fn details_json(
        hiragana: &str,
        portuguese: &str,
        romaji: &str,
        emoji: &str,
        kanji: &str,
        phonemes: &[(&str, &str)],
    ) -> serde_json::Value {
        json!({
            "hiragana": hiragana,
            "portuguese": portuguese,
            "romaji": romaji,
            "emoji": emoji,
            "imagePrompt": format!("a picture of {romaji}"),
            "kanji": kanji,
            "phonemes": phonemes
                .iter()
                .map(|(s, r)| json!({ "syllable": s, "romaji": r }))
                .collect::<Vec<_>>(),
        })
    }

    #[async_trait]
    impl TextGenerator for FakeText {
        async fn generate_structured(
            &self,
            prompt: &str,
            _schema: &serde_json::Value,
        ) -> Result<serde_json::Value, GenerationError> {
            let word = self
                .answers
                .keys()
                .find(|w| prompt.contains(&format!("\"{w}\"")))
                .copied()
                .ok_or_else(|| GenerationError::Service("unknown word".to_string()))?;
            self.requested.lock().unwrap().push(word.to_string());

            if self.failing.contains(&word) {
                return Err(GenerationError::Http {
                    status: 500,
                    body: "internal".to_string(),
                });
            }
            Ok(self.answers[word].clone())
        }
    }

    struct MalformedText;

    #[async_trait]
    impl TextGenerator for MalformedText {
        async fn generate_structured(
            &self,
            _prompt: &str,
            _schema: &serde_json::Value,
        ) -> Result<serde_json::Value, GenerationError> {
            Ok(json!({ "hiragana": "いぬ", "phonemes": "not a list" }))
        }
    }

    enum ImageBehaviour {
        Image,
        Nothing,
        Fail,
    }

    struct FakeImage(ImageBehaviour);

    #[async_trait]
    impl ImageGenerator for FakeImage {
        async fn generate_image(&self, prompt: &str) -> Result<Option<InlineImage>, GenerationError> {
            assert!(prompt.contains("a picture of"));
            match self.0 {
                ImageBehaviour::Image => Ok(Some(InlineImage {
                    mime_type: "image/png".to_string(),
                    data: "iVBORw0KGgo=".to_string(),
                })),
                ImageBehaviour::Nothing => Ok(None),
                ImageBehaviour::Fail => Err(GenerationError::EmptyResponse("image")),
            }
        }
    }

    struct FakeSpeech {
        silent: bool,
        voices: Mutex<Vec<String>>,
    }

    impl FakeSpeech {
        fn new(silent: bool) -> Self {
            Self {
                silent,
                voices: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SpeechGenerator for FakeSpeech {
        async fn synthesize(
            &self,
            _script: &str,
            voice: &str,
        ) -> Result<Option<InlineAudio>, GenerationError> {
            self.voices.lock().unwrap().push(voice.to_string());
            if self.silent {
                return Ok(None);
            }
            Ok(Some(InlineAudio {
                mime_type: "audio/L16;codec=pcm;rate=24000".to_string(),
                data: "AIA=".to_string(),
            }))
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        lines: Mutex<Vec<String>>,
    }

    impl ProgressSink for RecordingProgress {
        fn report(&self, update: &ProgressUpdate) {
            self.lines.lock().unwrap().push(update.to_string());
        }
    }

    fn generator_with(
        text: Arc<dyn TextGenerator>,
        image: ImageBehaviour,
        speech: Arc<FakeSpeech>,
        progress: Arc<RecordingProgress>,
    ) -> LessonGenerator {
        LessonGenerator::new(text, Arc::new(FakeImage(image)), speech, "Kore", progress)
    }

    fn default_generator() -> LessonGenerator {
        generator_with(
            Arc::new(FakeText::new()),
            ImageBehaviour::Image,
            Arc::new(FakeSpeech::new(false)),
            Arc::new(RecordingProgress::default()),
        )
    }

    #[test]
    fn test_parse_word_list() {
        let words = parse_word_list("犬\n\n   \n 猫 \r\nりんご\n");
        assert_eq!(words, vec!["犬", "猫", "りんご"]);
        assert!(parse_word_list(" \n\t\n").is_empty());
    }

    #[tokio::test]
    async fn test_two_words_in_order() {
        let lesson = default_generator()
            .generate_lesson("Animais", "犬\n猫")
            .await
            .unwrap();

        assert_eq!(lesson.subtitle, "Animais");
        assert_eq!(lesson.is_user_created, Some(true));
        assert!(lesson.created_at.is_some());
        assert_eq!(lesson.words.len(), 2);

        let hiragana: Vec<&str> = lesson.words.iter().map(|w| w.hiragana.as_str()).collect();
        assert_eq!(hiragana, vec!["いぬ", "ねこ"]);

        for word in &lesson.words {
            assert!(!word.hiragana.is_empty());
            assert!(!word.portuguese.is_empty());
            assert!(!word.romaji.is_empty());
            assert!(!word.phonemes.is_empty());
            assert_eq!(word.image_url, "data:image/png;base64,iVBORw0KGgo=");
            assert_eq!(word.audio_data, "AIA=");
        }
        assert_eq!(lesson.words[1].kanji.as_deref(), Some("猫"));
    }

    #[tokio::test]
    async fn test_blank_kanji_becomes_none() {
        let lesson = default_generator()
            .generate_lesson("Frutas", "りんご")
            .await
            .unwrap();
        assert_eq!(lesson.words[0].kanji, None);
    }

    #[tokio::test]
    async fn test_detail_failure_aborts_and_persists_nothing() {
        let text = Arc::new(FakeText::new().failing_on("猫"));
        let generator = generator_with(
            text.clone(),
            ImageBehaviour::Image,
            Arc::new(FakeSpeech::new(false)),
            Arc::new(RecordingProgress::default()),
        );
        let store = MemoryLessonStore::default();

        let err = generator
            .generate_and_store(&store, "Animais", "犬\n猫\nりんご")
            .await
            .unwrap_err();

        match err {
            PipelineError::Generation { word, .. } => assert_eq!(word, "猫"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.append_count(), 0);
        // The third word is never attempted
        assert_eq!(*text.requested.lock().unwrap(), vec!["犬", "猫"]);
    }

    #[tokio::test]
    async fn test_malformed_details_abort() {
        let generator = generator_with(
            Arc::new(MalformedText),
            ImageBehaviour::Image,
            Arc::new(FakeSpeech::new(false)),
            Arc::new(RecordingProgress::default()),
        );

        let err = generator.generate_lesson("Animais", "犬").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Generation {
                source: GenerationError::MalformedDetails(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_image_is_tolerated() {
        let generator = generator_with(
            Arc::new(FakeText::new()),
            ImageBehaviour::Nothing,
            Arc::new(FakeSpeech::new(false)),
            Arc::new(RecordingProgress::default()),
        );

        let lesson = generator.generate_lesson("Animais", "犬").await.unwrap();
        assert_eq!(lesson.words[0].image_url, "");
        assert_eq!(lesson.words[0].emoji, "🐶");
        assert_eq!(lesson.words[0].audio_data, "AIA=");
    }

    #[tokio::test]
    async fn test_failed_image_is_tolerated() {
        let generator = generator_with(
            Arc::new(FakeText::new()),
            ImageBehaviour::Fail,
            Arc::new(FakeSpeech::new(false)),
            Arc::new(RecordingProgress::default()),
        );

        let lesson = generator.generate_lesson("Animais", "犬\n猫").await.unwrap();
        assert!(lesson.words.iter().all(|w| w.image_url.is_empty()));
    }

    #[tokio::test]
    async fn test_missing_audio_is_tolerated() {
        let speech = Arc::new(FakeSpeech::new(true));
        let generator = generator_with(
            Arc::new(FakeText::new()),
            ImageBehaviour::Image,
            speech.clone(),
            Arc::new(RecordingProgress::default()),
        );

        let lesson = generator.generate_lesson("Animais", "犬").await.unwrap();
        assert_eq!(lesson.words[0].audio_data, "");
        assert_eq!(*speech.voices.lock().unwrap(), vec!["Kore"]);
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_call() {
        let text = Arc::new(FakeText::new());
        let generator = generator_with(
            text.clone(),
            ImageBehaviour::Image,
            Arc::new(FakeSpeech::new(false)),
            Arc::new(RecordingProgress::default()),
        );

        assert!(matches!(
            generator.generate_lesson("   ", "犬").await,
            Err(PipelineError::Validation(ValidationError::EmptySubtitle))
        ));
        assert!(matches!(
            generator.generate_lesson("Animais", "\n  \n").await,
            Err(PipelineError::Validation(ValidationError::NoWords))
        ));
        assert!(text.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_progress_before_each_step() {
        let progress = Arc::new(RecordingProgress::default());
        let generator = generator_with(
            Arc::new(FakeText::new()),
            ImageBehaviour::Image,
            Arc::new(FakeSpeech::new(false)),
            progress.clone(),
        );

        generator.generate_lesson("Animais", "犬\n猫").await.unwrap();

        assert_eq!(
            *progress.lines.lock().unwrap(),
            vec![
                "[1/2] 犬: generating details...",
                "[1/2] 犬: generating illustration...",
                "[1/2] 犬: generating narration...",
                "[2/2] 猫: generating details...",
                "[2/2] 猫: generating illustration...",
                "[2/2] 猫: generating narration...",
            ]
        );
    }

    #[tokio::test]
    async fn test_generate_and_store_appends_once() {
        let store = MemoryLessonStore::default();
        let lesson = default_generator()
            .generate_and_store(&store, "Animais", "犬\n猫")
            .await
            .unwrap();

        assert_eq!(store.append_count(), 1);
        assert_eq!(store.list().await.unwrap(), vec![lesson]);
    }
}
