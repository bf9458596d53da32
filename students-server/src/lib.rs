//! students-server: HTTP API and storage engine for student records
//!
//! Persists students in a single-file SQLite database and exposes them over a
//! small JSON API with graceful shutdown.

pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod state;

pub use config::{Config, ConfigError, HttpServerConfig};
pub use db::{SqliteStore, StoreError, StudentStore};
pub use http::{build_router, HttpServer, RunningServer, ServerError};
pub use models::{NewStudent, Student, StudentId, ValidationError};
pub use state::AppState;
