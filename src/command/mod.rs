use anyhow::bail;

use crate::db::{LessonStore, SqliteLessonStore};
use crate::lesson::Lesson;

pub mod crystals;
pub mod delete;
pub mod export_audio;
pub mod generate;
pub mod import;
pub mod list;
pub mod share;

pub async fn find_lesson(store: &SqliteLessonStore, id: &str) -> anyhow::Result<Lesson> {
    let lessons = store.list().await?;
    match lessons.into_iter().find(|l| l.id == id) {
        Some(lesson) => Ok(lesson),
        None => bail!("No lesson with id {}", id),
    }
}
