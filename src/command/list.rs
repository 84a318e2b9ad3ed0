use anyhow::Context as _;
use clap::Args;

use crate::db::{LessonStore, SqliteLessonStore};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Also print every word of each lesson
    #[arg(long)]
    pub words: bool,
}

pub async fn run(args: ListArgs, store: &SqliteLessonStore) -> anyhow::Result<()> {
    let lessons = store.list().await.context("Failed to load lessons")?;

    if lessons.is_empty() {
        println!("No lessons yet. Create one with `kotoba generate`.");
        return Ok(());
    }

    for lesson in &lessons {
        let created = lesson
            .created_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let origin = if lesson.is_user_created == Some(true) { "mine" } else { "shared" };

        println!(
            "{}  {}  ({} words, {}, {})",
            lesson.id,
            lesson.subtitle,
            lesson.words.len(),
            origin,
            created
        );

        if args.words {
            for word in &lesson.words {
                println!(
                    "    {} {} [{}] {} - {}{}",
                    word.emoji,
                    word.display_form(),
                    word.romaji,
                    word.hiragana,
                    word.portuguese,
                    if word.has_audio() { "" } else { " (no audio)" }
                );
            }
        }
    }

    Ok(())
}
