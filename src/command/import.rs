use anyhow::{Context as _, bail};
use clap::Args;
use tracing::warn;

use crate::db::SqliteLessonStore;
use crate::lesson::{ImportError, import_lesson, token_from_link};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Share link or bare share token
    pub link: String,
}

pub async fn run(args: ImportArgs, store: &SqliteLessonStore) -> anyhow::Result<()> {
    let input = args.link.trim();

    let token = if input.starts_with("http://") || input.starts_with("https://") {
        match token_from_link(input) {
            Ok(Some(token)) => token,
            Ok(None) => bail!("This link does not carry a lesson"),
            Err(e) => {
                warn!("Unreadable share link: {}", e);
                bail!("Shared link is corrupted");
            }
        }
    } else {
        input.to_string()
    };

    match import_lesson(store, &token).await {
        Ok(lesson) => {
            println!(
                "📥 Imported '{}' with {} words as {}",
                lesson.subtitle,
                lesson.words.len(),
                lesson.id
            );
            Ok(())
        }
        Err(ImportError::Share(e)) => {
            if e.is_corrupted() {
                warn!("Unreadable share token: {}", e);
            } else {
                warn!("Rejected incomplete shared lesson: {}", e);
            }
            bail!("Shared link is corrupted")
        }
        Err(e) => Err(e).context("Failed to save imported lesson"),
    }
}
