use anyhow::bail;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::find_lesson;
use crate::audio::{AudioSink, WavFileSink, play_in_background};
use crate::db::SqliteLessonStore;

#[derive(Args, Debug)]
pub struct ExportAudioArgs {
    /// Id of the lesson to export
    pub id: String,

    /// Directory the WAV files are written to
    #[arg(long, short, default_value = "exports")]
    pub out: PathBuf,

    /// Only export the word at this 1-based position
    #[arg(long)]
    pub word: Option<usize>,
}

pub async fn run(args: ExportAudioArgs, store: &SqliteLessonStore) -> anyhow::Result<()> {
    let lesson = find_lesson(store, &args.id).await?;

    let selected: Vec<(usize, _)> = match args.word {
        Some(position) => match lesson.words.get(position.wrapping_sub(1)) {
            Some(word) => vec![(position, word)],
            None => bail!(
                "Lesson has {} words, there is no word {}",
                lesson.words.len(),
                position
            ),
        },
        None => lesson.words.iter().enumerate().map(|(i, w)| (i + 1, w)).collect(),
    };

    let out_dir = args.out.join(&lesson.id);
    let sink: Arc<dyn AudioSink> = Arc::new(WavFileSink::new(&out_dir));

    let mut handles = Vec::new();
    let mut silent = 0;
    for (position, word) in selected {
        let label = format!("{:02}_{}", position, word.romaji);
        match play_in_background(sink.clone(), label, &word.audio_data) {
            Some(handle) => handles.push(handle),
            None => silent += 1,
        }
    }

    let exported = handles.len();
    for handle in handles {
        handle.await.ok();
    }

    info!("Exported {} narrations to {}", exported, out_dir.display());
    println!("🔊 Exported {} narrations to {}", exported, out_dir.display());
    if silent > 0 {
        println!("   {} words have no narration", silent);
    }

    Ok(())
}
