use anyhow::{Context as _, bail};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db::SqliteLessonStore;
use crate::generate::{
    GeminiClient, LessonGenerator, PipelineError, ProgressBarSink, ProgressSink, TracingProgress,
    parse_word_list,
};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Lesson title shown to the learner
    #[arg(long, short)]
    pub subtitle: String,

    /// Japanese words, one per line
    #[arg(long, short, conflicts_with = "file", required_unless_present = "file")]
    pub words: Option<String>,

    /// Read the word list from a file instead
    #[arg(long, short, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Log status lines instead of drawing a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

pub async fn run(args: GenerateArgs, store: &SqliteLessonStore) -> anyhow::Result<()> {
    let raw_words = match (&args.words, &args.file) {
        (Some(words), _) => words.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read word list from {}", path.display()))?,
        (None, None) => String::new(),
    };

    let config = Config::from_env().context("Invalid configuration")?;
    let client = Arc::new(GeminiClient::new(&config).context("Gemini client is not configured")?);

    let word_count = parse_word_list(&raw_words).len();
    let bar = (!args.no_progress).then(|| Arc::new(ProgressBarSink::new(word_count)));
    let sink: Arc<dyn ProgressSink> = match &bar {
        Some(bar) => bar.clone(),
        None => Arc::new(TracingProgress),
    };

    let generator = LessonGenerator::new(
        client.clone(),
        client.clone(),
        client,
        config.voice.clone(),
        sink,
    );

    let result = tokio::select! {
        result = generator.generate_and_store(store, &args.subtitle, &raw_words) => result,
        _ = tokio::signal::ctrl_c() => {
            if let Some(bar) = &bar {
                bar.abandon();
            }
            warn!("Generation cancelled, nothing was saved");
            bail!("Generation cancelled");
        }
    };

    if let Some(bar) = &bar {
        match &result {
            Ok(_) => bar.finish("done"),
            Err(_) => bar.abandon(),
        }
    }

    match result {
        Ok(lesson) => {
            info!("Lesson {} saved", lesson.id);
            println!("✅ Created lesson '{}' with {} words", lesson.subtitle, lesson.words.len());
            println!("   id: {}", lesson.id);

            let missing_images = lesson.words.iter().filter(|w| !w.has_image()).count();
            let missing_audio = lesson.words.iter().filter(|w| !w.has_audio()).count();
            if missing_images > 0 || missing_audio > 0 {
                println!(
                    "   {} words use their emoji instead of an illustration, {} have no narration",
                    missing_images, missing_audio
                );
            }
            Ok(())
        }
        Err(PipelineError::Validation(e)) => bail!("{}", e),
        Err(e) => {
            error!("Lesson generation failed: {}", e);
            bail!("Failed to create the lesson. Please try again.")
        }
    }
}
