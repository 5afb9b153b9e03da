//! Per-operation-kind in-flight guard.
//!
//! At most one operation of each [`OperationKind`] runs at a time. A second
//! trigger of the same kind is rejected with
//! [`IdeaError::OperationInProgress`] instead of racing the first one's writes.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::error::{IdeaError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Capture,
    Map,
    Insight,
    Import,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Map => "map",
            Self::Insight => "insight",
            Self::Import => "import",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared set of operation kinds currently in flight.
#[derive(Debug, Clone, Default)]
pub struct OperationGuard {
    active: Arc<Mutex<HashSet<OperationKind>>>,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lease for `kind`, or fail if it is already held.
    pub fn try_acquire(&self, kind: OperationKind) -> Result<OperationLease> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(kind) {
            tracing::warn!(operation = %kind, "rejecting overlapping operation");
            return Err(IdeaError::OperationInProgress(kind));
        }
        Ok(OperationLease {
            kind,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_active(&self, kind: OperationKind) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&kind)
    }
}

/// Releases its operation kind when dropped.
#[derive(Debug)]
pub struct OperationLease {
    kind: OperationKind,
    active: Arc<Mutex<HashSet<OperationKind>>>,
}

impl OperationLease {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

impl Drop for OperationLease {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.kind);
    }
}
