use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::history::HistoryStore;

/// Shared handler state. Lock order is `db` before `history`.
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub history: Mutex<HistoryStore>,
}

impl AppState {
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("database lock poisoned")))
    }

    pub fn history(&self) -> Result<MutexGuard<'_, HistoryStore>, AppError> {
        self.history
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("history lock poisoned")))
    }
}
