#![allow(dead_code)]

use ideacloud::config::{ClusteringConfig, LimitsConfig, ModelConfig};
use ideacloud::db;
use ideacloud::flows::IdeaCloud;
use ideacloud::ideas::fragments;
use ideacloud::ideas::types::Fragment;
use ideacloud::model::transport::{ChatRequest, ChatTransport, HttpReply};
use ideacloud::model::ModelClient;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Transport that replays queued replies and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpReply, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Result<HttpReply, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    /// Every reply is held back by `delay`, so overlapping calls can be observed.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The JSON payload of the `n`th request's user message.
    pub fn payload(&self, n: usize) -> Value {
        let requests = self.requests.lock().unwrap();
        serde_json::from_str(&requests[n].messages[1].content).unwrap()
    }
}

impl ChatTransport for ScriptedTransport {
    async fn send(&self, credential: &str, request: &ChatRequest) -> Result<HttpReply, String> {
        assert_eq!(credential, "test-key");
        self.requests.lock().unwrap().push(request.clone());
        // taken before the delay so replies follow request order
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted reply left".to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

/// A 200 reply whose first choice carries `content` verbatim.
pub fn completion_text(content: &str) -> Result<HttpReply, String> {
    let body = json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    });
    Ok(HttpReply {
        status: 200,
        body: body.to_string(),
    })
}

/// A 200 reply whose model output is `value` serialized as JSON.
pub fn completion(value: Value) -> Result<HttpReply, String> {
    completion_text(&value.to_string())
}

pub fn http_status(status: u16) -> Result<HttpReply, String> {
    Ok(HttpReply {
        status,
        body: format!("{{\"error\":\"status {status}\"}}"),
    })
}

pub fn insight_reply(summary: &str) -> Result<HttpReply, String> {
    completion(json!({
        "summary": summary,
        "next_steps": [format!("follow up on {summary}")],
        "titles": [format!("{summary} title")]
    }))
}

pub fn test_model_config() -> ModelConfig {
    ModelConfig {
        api_key: Some("test-key".into()),
        retry_backoff_ms: 0,
        ..ModelConfig::default()
    }
}

pub fn test_client(transport: ScriptedTransport) -> ModelClient<ScriptedTransport> {
    ModelClient::new(test_model_config(), LimitsConfig::default(), transport)
}

/// In-memory store plus scripted model.
pub fn test_cloud(replies: Vec<Result<HttpReply, String>>) -> IdeaCloud<ScriptedTransport> {
    cloud_with(ScriptedTransport::new(replies))
}

pub fn cloud_with(transport: ScriptedTransport) -> IdeaCloud<ScriptedTransport> {
    let conn = db::open_memory_database().unwrap();
    IdeaCloud::new(conn, test_client(transport), ClusteringConfig::default())
}

/// Fragment `id` created `minute` minutes after a fixed epoch.
pub fn fragment(id: &str, text: &str, minute: u32) -> Fragment {
    Fragment {
        id: id.to_string(),
        text: text.to_string(),
        created_at: format!("2024-05-01T{:02}:{:02}:00.000Z", minute / 60, minute % 60),
        star: 0,
        tags: vec![],
        cluster_id: None,
        rel: vec![],
    }
}

pub fn seed(cloud: &IdeaCloud<ScriptedTransport>, list: &[Fragment]) {
    let mut conn = cloud.db();
    for f in list {
        fragments::insert_fragment(&mut conn, f).unwrap();
    }
}

/// Seed fragments "1".."n" with texts "idea 1".."idea n".
pub fn seed_numbered(cloud: &IdeaCloud<ScriptedTransport>, n: u32) {
    let list: Vec<Fragment> = (1..=n)
        .map(|i| fragment(&i.to_string(), &format!("idea {i}"), i))
        .collect();
    seed(cloud, &list);
}
