//! Capture flow: tag a new fragment with the model and persist it.

use chrono::{SecondsFormat, Utc};

use super::guard::OperationKind;
use super::IdeaCloud;
use crate::error::{IdeaError, Result};
use crate::ideas::fragments;
use crate::ideas::types::{Fragment, Priority};
use crate::model::transport::ChatTransport;

/// A stored fragment and the model's advisory tag confidence.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub fragment: Fragment,
    pub confidence: f64,
}

impl<T: ChatTransport> IdeaCloud<T> {
    /// Tag `text` (reusing tags already in the store where the model sees fit)
    /// and store it as a new fragment with priority `star`.
    pub async fn capture(&self, text: &str, star: u8) -> Result<CaptureOutcome> {
        let _lease = self.guard.try_acquire(OperationKind::Capture)?;

        if text.trim().is_empty() {
            return Err(IdeaError::EmptyText);
        }

        let existing_tags = fragments::all_tags(&self.db())?;
        let tagged = self.model.tag_fragment(text, &existing_tags).await?;

        let fragment = Fragment {
            id: uuid::Uuid::now_v7().to_string(),
            text: text.to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            star: star.min(Priority::MAX_STAR),
            tags: tagged.tags,
            cluster_id: None,
            rel: Vec::new(),
        };
        fragments::insert_fragment(&mut self.db(), &fragment)?;

        tracing::info!(
            id = %fragment.id,
            tags = ?fragment.tags,
            confidence = tagged.confidence,
            "fragment captured"
        );

        Ok(CaptureOutcome {
            fragment,
            confidence: tagged.confidence,
        })
    }
}
