//! Shared application state.
//!
//! `CoreState` is built once at startup from `AppConfig` and shared by all
//! request handlers behind an `Arc`. It owns the single SQLite connection
//! (serialized by a `Mutex`) and, when a credential is configured, the
//! prescription reader used for live extraction.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db;
use crate::pipeline::prescription::{
    OpenAiVisionClient, PrescriptionError, PrescriptionReader, VisionClient,
};

pub struct CoreState {
    /// Single connection; every handler takes the lock for one unit of work.
    db: Mutex<Connection>,
    /// `None` when no extraction credential is configured (demo mode).
    reader: Option<PrescriptionReader>,
}

impl CoreState {
    /// Open the configured database and build the extraction client.
    pub fn open(config: AppConfig) -> Result<Self, CoreError> {
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = db::open_database(&config.database_path)?;

        let client = OpenAiVisionClient::from_config(&config.extraction)?
            .map(|c| Arc::new(c) as Arc<dyn VisionClient>);
        if client.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set, prescription uploads run in demo mode");
        }

        Ok(Self::with_connection(config, conn, client))
    }

    /// Assemble state from pre-built parts (in-memory databases, mock clients).
    pub fn with_connection(
        config: AppConfig,
        conn: Connection,
        client: Option<Arc<dyn VisionClient>>,
    ) -> Self {
        let max_tokens = config.extraction.max_tokens;
        Self {
            db: Mutex::new(conn),
            reader: client.map(|c| PrescriptionReader::new(c, max_tokens)),
        }
    }

    /// Lock the database for one unit of work.
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.db.lock().map_err(|_| CoreError::LockPoisoned)
    }

    /// The guarded connection itself, for work that must release the lock
    /// part-way (the extraction call).
    pub fn db_mutex(&self) -> &Mutex<Connection> {
        &self.db
    }

    pub fn reader(&self) -> Option<&PrescriptionReader> {
        self.reader.as_ref()
    }

    /// Whether uploads go to the live extraction service.
    pub fn extraction_live(&self) -> bool {
        self.reader.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Extraction client error: {0}")]
    Extraction(#[from] PrescriptionError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
