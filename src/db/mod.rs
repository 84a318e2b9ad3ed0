use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::lesson::{Lesson, WordEntry};

#[cfg(test)]
pub mod memory;

pub type DbPool = SqlitePool;

const CRYSTALS_KEY: &str = "crystals";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("stored lesson is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored timestamp is invalid: {0}")]
    InvalidTimestamp(String),
}

/// The persisted lesson collection
///
/// The core only touches it at run boundaries: after a successful
/// generation and after a successful import.
#[async_trait]
pub trait LessonStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Lesson>, StoreError>;

    /// Adds a lesson; a lesson with the same id is replaced (last writer wins)
    async fn append(&self, lesson: &Lesson) -> Result<(), StoreError>;

    /// Returns whether a lesson was removed
    async fn remove_by_id(&self, id: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct LessonRow {
    id: String,
    subtitle: String,
    is_user_created: Option<bool>,
    created_at: Option<String>,
    words_json: String,
}

impl LessonRow {
    fn into_lesson(self) -> Result<Lesson, StoreError> {
        let words: Vec<WordEntry> = serde_json::from_str(&self.words_json)?;
        let created_at = match self.created_at {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(&raw)
                    .map_err(|_| StoreError::InvalidTimestamp(raw.clone()))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        Ok(Lesson {
            id: self.id,
            subtitle: self.subtitle,
            words,
            is_user_created: self.is_user_created,
            created_at,
        })
    }
}

pub async fn init_db(database_url: &str) -> Result<DbPool, StoreError> {
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        let path = path.split('?').next().unwrap_or(path);
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// SQLite-backed lesson collection plus the session crystal tally
#[derive(Debug, Clone)]
pub struct SqliteLessonStore {
    pool: DbPool,
}

impl SqliteLessonStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = init_db(database_url).await?;
        info!("Lesson store opened at {}", database_url);
        Ok(Self::new(pool))
    }

    pub async fn get_crystals(&self) -> Result<i64, StoreError> {
        let value: Option<i64> = sqlx::query_scalar("SELECT value FROM counters WHERE key = ?")
            .bind(CRYSTALS_KEY)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value.unwrap_or(0))
    }

    /// Adds to the crystal tally and returns the new total
    pub async fn add_crystals(&self, amount: i64) -> Result<i64, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO counters (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key)
            DO UPDATE SET value = value + excluded.value, updated_at = datetime('now')
            "#,
        )
        .bind(CRYSTALS_KEY)
        .bind(amount)
        .execute(&self.pool)
        .await?;

        self.get_crystals().await
    }
}

#[async_trait]
impl LessonStore for SqliteLessonStore {
    async fn list(&self) -> Result<Vec<Lesson>, StoreError> {
        let rows = sqlx::query_as::<_, LessonRow>(
            "SELECT id, subtitle, is_user_created, created_at, words_json FROM lessons ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LessonRow::into_lesson).collect()
    }

    async fn append(&self, lesson: &Lesson) -> Result<(), StoreError> {
        let words_json = serde_json::to_string(&lesson.words)?;
        let created_at = lesson.created_at.map(|ts| ts.to_rfc3339());

        sqlx::query(
            r#"
            INSERT INTO lessons (id, subtitle, is_user_created, created_at, words_json)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id)
            DO UPDATE SET subtitle = excluded.subtitle,
                          is_user_created = excluded.is_user_created,
                          created_at = excluded.created_at,
                          words_json = excluded.words_json,
                          stored_at = datetime('now')
            "#,
        )
        .bind(&lesson.id)
        .bind(&lesson.subtitle)
        .bind(lesson.is_user_created)
        .bind(created_at)
        .bind(words_json)
        .execute(&self.pool)
        .await?;

        info!("Stored lesson {} ({} words)", lesson.id, lesson.words.len());
        Ok(())
    }

    async fn remove_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
