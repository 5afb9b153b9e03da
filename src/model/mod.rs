//! External model client.
//!
//! [`ModelClient`] wraps a [`ChatTransport`] with credential checking, bounded
//! retry with linear backoff, JSON extraction, and the three typed passes used by
//! the flows: tagging, clustering, and summarization.

pub mod prompts;
pub mod responses;
pub mod transport;

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::{LimitsConfig, ModelConfig};
use crate::error::{IdeaError, Result};
use crate::ideas::types::{Cluster, Fragment};
use prompts::{
    ClusterHint, ClusterPayload, FragmentSample, PreviousInsight, SummaryPayload, TagPayload,
};
use responses::{strip_code_fence, ClusterSet, InsightDraft, TagResult};
use transport::{ChatCompletionResponse, ChatMessage, ChatRequest, ChatTransport, HttpTransport};

/// Retrying JSON client for the chat-completion endpoint.
pub struct ModelClient<T> {
    config: ModelConfig,
    limits: LimitsConfig,
    transport: T,
}

impl ModelClient<HttpTransport> {
    /// Client backed by the real HTTP transport.
    pub fn from_config(config: &ModelConfig, limits: &LimitsConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)
            .map_err(|e| IdeaError::RequestFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::new(config.clone(), limits.clone(), transport))
    }
}

impl<T: ChatTransport> ModelClient<T> {
    pub fn new(config: ModelConfig, limits: LimitsConfig, transport: T) -> Self {
        Self {
            config,
            limits,
            transport,
        }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `instruction` plus the JSON-encoded `payload` and return the parsed
    /// JSON value the model answered with.
    ///
    /// 5xx replies, transport errors, and unparseable model text are retried up
    /// to `max_retries` times with a `retry_backoff_ms * attempt` pause. Other
    /// HTTP failures end the call immediately.
    pub async fn request_json<P: Serialize>(&self, instruction: &str, payload: &P) -> Result<Value> {
        let credential = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(IdeaError::ConfigurationMissing)?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(prompts::system_message(instruction)),
                ChatMessage::user(serde_json::to_string(payload)?),
            ],
            temperature: self.config.temperature,
        };

        let max_attempts = self.config.max_retries + 1;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let last = attempt >= max_attempts;
            tracing::debug!(attempt, max_attempts, model = %self.config.model, "model request");

            let failure = match self.transport.send(credential, &request).await {
                Err(cause) => IdeaError::RequestFailed(cause),
                Ok(reply) if reply.is_server_error() => {
                    IdeaError::RequestFailed(format!("server returned HTTP {}", reply.status))
                }
                Ok(reply) if !reply.is_success() => {
                    return Err(IdeaError::RequestFailed(format!(
                        "HTTP {}: {}",
                        reply.status,
                        truncate(&reply.body, 200)
                    )));
                }
                Ok(reply) => match extract_json(&reply.body) {
                    Ok(value) => return Ok(value),
                    Err(cause) => IdeaError::ResponseShapeInvalid(cause),
                },
            };

            if last {
                tracing::warn!(attempt, error = %failure, "model request giving up");
                return Err(failure);
            }

            let backoff = Duration::from_millis(self.config.retry_backoff_ms * u64::from(attempt));
            tracing::warn!(attempt, error = %failure, backoff_ms = backoff.as_millis() as u64, "model request failed, retrying");
            tokio::time::sleep(backoff).await;
        }
    }

    /// Propose up to `limits.max_tags` tags for `text`, preferring `existing_tags`.
    pub async fn tag_fragment(&self, text: &str, existing_tags: &[String]) -> Result<TagResult> {
        let payload = TagPayload {
            text,
            existing_tags,
        };
        let value = self.request_json(prompts::TAG_INSTRUCTION, &payload).await?;
        TagResult::from_value(&value, self.limits.max_tags)
    }

    /// Cluster the most recent `limits.max_fragments` of `fragments` (given
    /// oldest first), passing `previous` clusters as hints.
    pub async fn cluster_fragments(
        &self,
        fragments: &[Fragment],
        previous: &[Cluster],
    ) -> Result<ClusterSet> {
        let sample = tail(fragments, self.limits.max_fragments);
        let payload = ClusterPayload {
            fragments: sample
                .iter()
                .map(|f| FragmentSample {
                    id: &f.id,
                    text: &f.text,
                    tags: &f.tags,
                })
                .collect(),
            existing_clusters: previous
                .iter()
                .map(|c| ClusterHint {
                    id: &c.id,
                    label: &c.label,
                    member_ids: head(&c.fragment_ids, self.limits.max_cluster_members),
                    keywords: head(&c.tag_hints, self.limits.max_cluster_keywords),
                })
                .collect(),
        };

        let value = self.request_json(prompts::CLUSTER_INSTRUCTION, &payload).await?;
        ClusterSet::from_value(&value)
    }

    /// Summarize the most recent `limits.max_fragments` of `texts`, merging into
    /// `previous` when given.
    pub async fn summarize(
        &self,
        texts: &[String],
        previous: Option<&PreviousInsight>,
    ) -> Result<InsightDraft> {
        let items = tail(texts, self.limits.max_fragments);
        let value = match previous {
            Some(previous_insight) => {
                let payload = SummaryPayload::Merge {
                    new_items: items,
                    previous_insight,
                };
                self.request_json(prompts::MERGE_SUMMARY_INSTRUCTION, &payload)
                    .await?
            }
            None => {
                let payload = SummaryPayload::Fresh { items };
                self.request_json(prompts::SUMMARY_INSTRUCTION, &payload)
                    .await?
            }
        };
        InsightDraft::from_value(&value)
    }
}

/// Pull the model's text out of the completion envelope and parse it as JSON.
fn extract_json(body: &str) -> std::result::Result<Value, String> {
    let envelope: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| format!("unreadable completion envelope: {e}"))?;
    let content = envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or("completion has no message content")?;
    serde_json::from_str(strip_code_fence(&content))
        .map_err(|e| format!("model output is not valid JSON: {e}"))
}

fn tail<T>(items: &[T], max: usize) -> &[T] {
    &items[items.len().saturating_sub(max)..]
}

fn head<T>(items: &[T], max: usize) -> &[T] {
    &items[..items.len().min(max)]
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
