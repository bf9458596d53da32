//! SQLite-backed student store
//!
//! - open: creates the file (and parent directories) and runs the schema
//! - create: single autocommit INSERT, id from AUTOINCREMENT
//! - reads: plain SELECTs ordered by id

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::pool::create_pool;
use super::{StoreError, StudentStore};
use crate::models::{NewStudent, Student, StudentId};

/// AUTOINCREMENT keeps ids strictly increasing and never reuses one,
/// even after the highest row is deleted.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    age INTEGER NOT NULL
)
"#;

/// Student storage engine over a single SQLite file
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteStore {
    /// Open or create the database at `path` and ensure the schema exists.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Unavailable`] if the directory or file cannot be created/opened
    /// - [`StoreError::Schema`] if the `students` table cannot be created
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| unavailable(&path, sqlx::Error::Io(e)))?;
        }

        let pool = create_pool(&path)
            .await
            .map_err(|e| unavailable(&path, e))?;

        let store = Self { pool, path };
        store.initialize().await?;

        tracing::debug!(path = %store.path.display(), "student store opened");
        Ok(store)
    }

    /// Create the `students` table if it does not exist.
    ///
    /// Idempotent: existing tables and rows are left untouched.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Schema)?;
        Ok(())
    }

    /// Underlying pool, for direct queries in tooling and tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close all pooled connections, waiting for checked-out ones to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn unavailable(path: &Path, source: sqlx::Error) -> StoreError {
    StoreError::Unavailable {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl StudentStore for SqliteStore {
    async fn create_student(&self, student: &NewStudent) -> Result<StudentId, StoreError> {
        let result = sqlx::query("INSERT INTO students (name, email, age) VALUES (?, ?, ?)")
            .bind(student.name())
            .bind(student.email())
            .bind(student.age())
            .execute(&self.pool)
            .await
            .map_err(StoreError::Write)?;

        let row_id = result.last_insert_rowid();
        StudentId::new(row_id).ok_or(StoreError::InvalidRowId(row_id))
    }

    async fn get_student(&self, id: StudentId) -> Result<Student, StoreError> {
        sqlx::query_as::<_, Student>("SELECT id, name, email, age FROM students WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::Read)?
            .ok_or(StoreError::NotFound { id })
    }

    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        sqlx::query_as::<_, Student>("SELECT id, name, email, age FROM students ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::Read)
    }
}
