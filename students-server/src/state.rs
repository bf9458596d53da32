//! Application state shared across handlers

use std::sync::Arc;

use crate::db::StudentStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn StudentStore>,
    env: String,
}

impl AppState {
    pub fn new(store: Arc<dyn StudentStore>, env: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                env: env.into(),
            }),
        }
    }

    pub fn store(&self) -> &dyn StudentStore {
        self.inner.store.as_ref()
    }

    /// Environment name from config, echoed by the welcome route
    pub fn env(&self) -> &str {
        &self.inner.env
    }
}
