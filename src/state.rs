use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::{FeedbackStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FeedbackStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// In-memory store and fixed test configuration; touches no database.
    pub fn fake() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            config: Arc::new(AppConfig::for_tests()),
        }
    }
}
