//! Operations a user triggers: capture, map (clustering), insight, and bulk
//! transfer.
//!
//! [`IdeaCloud`] is the explicitly constructed handle that owns the store
//! connection, the model client, and the in-flight guard. Every operation holds
//! the database lock only around store reads and writes, never across a model
//! call.

pub mod capture;
pub mod guard;
pub mod insight;
pub mod map;

use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

use crate::config::{ClusteringConfig, IdeaCloudConfig};
use crate::error::Result;
use crate::ideas::transfer::{self, ImportReport};
use crate::model::transport::{ChatTransport, HttpTransport};
use crate::model::ModelClient;
use guard::{OperationGuard, OperationKind};

pub use capture::CaptureOutcome;
pub use insight::InsightOutcome;
pub use map::MapOutcome;

/// Store handle plus model client; the unit every CLI command works through.
pub struct IdeaCloud<T> {
    db: Mutex<Connection>,
    model: ModelClient<T>,
    guard: OperationGuard,
    clustering: ClusteringConfig,
}

impl IdeaCloud<HttpTransport> {
    /// Open the configured database and build the HTTP-backed model client.
    pub fn open(config: &IdeaCloudConfig) -> anyhow::Result<Self> {
        let conn = crate::db::open_database(config.resolved_db_path())?;
        let model = ModelClient::from_config(&config.model, &config.limits)?;
        Ok(Self::new(conn, model, config.clustering.clone()))
    }
}

impl<T: ChatTransport> IdeaCloud<T> {
    pub fn new(conn: Connection, model: ModelClient<T>, clustering: ClusteringConfig) -> Self {
        Self {
            db: Mutex::new(conn),
            model,
            guard: OperationGuard::new(),
            clustering,
        }
    }

    /// Lock the store. A poisoned lock is recovered; SQLite keeps its own consistency.
    pub fn db(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn model(&self) -> &ModelClient<T> {
        &self.model
    }

    pub fn guard(&self) -> &OperationGuard {
        &self.guard
    }

    /// Serialize every fragment as a JSON array.
    pub fn export_json(&self) -> Result<String> {
        transfer::export_json(&self.db())
    }

    /// Validate and upsert an uploaded JSON array of fragments.
    pub fn import_json(&self, json: &str) -> Result<ImportReport> {
        let _lease = self.guard.try_acquire(OperationKind::Import)?;
        transfer::import_fragments(&mut self.db(), json)
    }

    /// Close the store, flushing the WAL.
    pub fn close(self) -> Result<()> {
        let conn = self.db.into_inner().unwrap_or_else(|e| e.into_inner());
        conn.close().map_err(|(_, e)| e)?;
        tracing::debug!("store closed");
        Ok(())
    }
}
