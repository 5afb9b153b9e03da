//! Wire types for the chat-completion endpoint and the HTTP seam.
//!
//! [`ChatTransport`] is the only place that touches the network. The retrying
//! client in [`super::ModelClient`] is generic over it so tests can script replies.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ModelConfig;

/// Request body for `POST {endpoint}/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// A message in the chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Response envelope from the Chat Completions API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

/// A choice in the response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatReplyMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Raw HTTP outcome: status code and body text.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one chat request and returns the raw reply.
///
/// `Err` means the request never produced an HTTP response (DNS, connect, timeout).
#[allow(async_fn_in_trait)]
pub trait ChatTransport {
    async fn send(&self, credential: &str, request: &ChatRequest) -> Result<HttpReply, String>;
}

/// Production transport backed by `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ModelConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }
}

impl ChatTransport for HttpTransport {
    async fn send(&self, credential: &str, request: &ChatRequest) -> Result<HttpReply, String> {
        let response = self
            .client
            .post(self.url())
            .bearer_auth(credential)
            .json(request)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| e.to_string())?;
        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_in_openai_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("{}")],
            temperature: 0.2,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "{}");
    }

    #[test]
    fn url_ignores_trailing_slash() {
        let config = ModelConfig {
            endpoint: "http://localhost:1234/v1/".into(),
            ..ModelConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.url(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn reply_classification() {
        let reply = |status| HttpReply { status, body: String::new() };
        assert!(reply(200).is_success());
        assert!(!reply(429).is_success());
        assert!(!reply(429).is_server_error());
        assert!(reply(503).is_server_error());
    }
}
