//! In-memory lesson store for tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{LessonStore, StoreError};
use crate::lesson::Lesson;

#[derive(Debug, Default)]
pub struct MemoryLessonStore {
    lessons: Mutex<Vec<Lesson>>,
    appends: AtomicUsize,
}

impl MemoryLessonStore {
    pub fn with_lessons(lessons: Vec<Lesson>) -> Self {
        Self {
            lessons: Mutex::new(lessons),
            appends: AtomicUsize::new(0),
        }
    }

    /// Number of `append` calls seen so far
    pub fn append_count(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LessonStore for MemoryLessonStore {
    async fn list(&self) -> Result<Vec<Lesson>, StoreError> {
        Ok(self.lessons.lock().unwrap().clone())
    }

    async fn append(&self, lesson: &Lesson) -> Result<(), StoreError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        let mut lessons = self.lessons.lock().unwrap();
        lessons.retain(|l| l.id != lesson.id);
        lessons.push(lesson.clone());
        Ok(())
    }

    async fn remove_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let mut lessons = self.lessons.lock().unwrap();
        let before = lessons.len();
        lessons.retain(|l| l.id != id);
        Ok(lessons.len() != before)
    }
}
