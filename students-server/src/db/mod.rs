//! Database layer - connection pool and the student store
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections) - no Arc<Mutex<Connection>>
//! - Ids come from SQLite AUTOINCREMENT, never computed in the application
//! - Rely on the engine's locking for concurrent writers, no app-level locks
//! - A returned id is always positive; every failure is an error

pub mod pool;
pub mod students;

use async_trait::async_trait;

use crate::models::{NewStudent, Student, StudentId};

pub use pool::{create_pool, create_pool_with_options};
pub use students::SqliteStore;

/// Storage error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file could not be opened or created
    #[error("storage unavailable at {path}: {source}")]
    Unavailable {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    /// Schema creation failed
    #[error("schema error: {0}")]
    Schema(#[source] sqlx::Error),

    /// The store rejected an insert
    #[error("write error: {0}")]
    Write(#[source] sqlx::Error),

    /// Insert reported success but produced no usable id
    #[error("write error: store returned invalid row id {0}")]
    InvalidRowId(i64),

    /// A read query failed
    #[error("read error: {0}")]
    Read(#[source] sqlx::Error),

    #[error("not found: student '{id}'")]
    NotFound { id: StudentId },
}

/// Persistence contract for student records.
///
/// Implementations must be safe to share across request tasks; the handler
/// holds one behind an `Arc`.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Insert a student and return its newly assigned id.
    ///
    /// The write is committed before this returns.
    async fn create_student(&self, student: &NewStudent) -> Result<StudentId, StoreError>;

    /// Fetch a single student.
    async fn get_student(&self, id: StudentId) -> Result<Student, StoreError>;

    /// All students ordered by id.
    async fn list_students(&self) -> Result<Vec<Student>, StoreError>;
}
