mod helpers;

use helpers::*;
use ideacloud::config::{LimitsConfig, ModelConfig};
use ideacloud::model::ModelClient;
use ideacloud::IdeaError;
use serde_json::json;

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    let config = ModelConfig {
        api_key: None,
        ..test_model_config()
    };
    let client = ModelClient::new(config, LimitsConfig::default(), ScriptedTransport::new(vec![]));

    let err = client.request_json("x", &json!({})).await.unwrap_err();

    assert!(matches!(err, IdeaError::ConfigurationMissing));
    assert_eq!(client.transport().request_count(), 0);
}

#[tokio::test]
async fn blank_credential_counts_as_missing() {
    let config = ModelConfig {
        api_key: Some("  ".into()),
        ..test_model_config()
    };
    let client = ModelClient::new(config, LimitsConfig::default(), ScriptedTransport::new(vec![]));

    let err = client.request_json("x", &json!({})).await.unwrap_err();
    assert!(matches!(err, IdeaError::ConfigurationMissing));
}

#[tokio::test]
async fn request_carries_model_temperature_and_json_payload() {
    let client = test_client(ScriptedTransport::new(vec![completion(json!({"ok": true}))]));

    let value = client
        .request_json("Do the thing.", &json!({"items": ["a"]}))
        .await
        .unwrap();

    assert_eq!(value["ok"], true);
    let requests = client.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "gpt-4o-mini");
    assert_eq!(requests[0].temperature, 0.2);
    assert_eq!(requests[0].messages[0].role, "system");
    assert!(requests[0].messages[0].content.starts_with("Do the thing."));
    assert_eq!(client.transport().payload(0), json!({"items": ["a"]}));
}

#[tokio::test]
async fn server_errors_are_retried_then_succeed() {
    let client = test_client(ScriptedTransport::new(vec![
        http_status(502),
        http_status(503),
        completion(json!({"ok": 1})),
    ]));

    let value = client.request_json("x", &json!({})).await.unwrap();

    assert_eq!(value["ok"], 1);
    assert_eq!(client.transport().request_count(), 3);
}

#[tokio::test]
async fn server_errors_exhaust_bounded_retries() {
    let client = test_client(ScriptedTransport::new(vec![
        http_status(500),
        http_status(500),
        http_status(500),
        completion(json!({"never": "reached"})),
    ]));

    let err = client.request_json("x", &json!({})).await.unwrap_err();

    assert!(matches!(err, IdeaError::RequestFailed(_)));
    // one attempt plus two retries
    assert_eq!(client.transport().request_count(), 3);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let client = test_client(ScriptedTransport::new(vec![
        http_status(401),
        completion(json!({"ok": 1})),
    ]));

    let err = client.request_json("x", &json!({})).await.unwrap_err();

    match err {
        IdeaError::RequestFailed(msg) => assert!(msg.contains("401")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(client.transport().request_count(), 1);
}

#[tokio::test]
async fn transport_errors_are_retried() {
    let client = test_client(ScriptedTransport::new(vec![
        Err("connection reset".into()),
        completion(json!({"ok": 1})),
    ]));

    assert!(client.request_json("x", &json!({})).await.is_ok());
    assert_eq!(client.transport().request_count(), 2);
}

#[tokio::test]
async fn unparseable_model_output_is_retried() {
    let client = test_client(ScriptedTransport::new(vec![
        completion_text("Sure! Here is your JSON:"),
        completion_text("```json\n{\"ok\": true}\n```"),
    ]));

    let value = client.request_json("x", &json!({})).await.unwrap();

    assert_eq!(value["ok"], true);
    assert_eq!(client.transport().request_count(), 2);
}

#[tokio::test]
async fn persistent_garbage_is_a_shape_error() {
    let client = test_client(ScriptedTransport::new(vec![
        completion_text("nope"),
        completion_text("still nope"),
        completion_text("{broken"),
    ]));

    let err = client.request_json("x", &json!({})).await.unwrap_err();

    assert!(matches!(err, IdeaError::ResponseShapeInvalid(_)));
    assert_eq!(client.transport().request_count(), 3);
}

#[tokio::test]
async fn zero_retries_means_one_attempt() {
    let config = ModelConfig {
        max_retries: 0,
        ..test_model_config()
    };
    let client = ModelClient::new(
        config,
        LimitsConfig::default(),
        ScriptedTransport::new(vec![http_status(503), completion(json!({}))]),
    );

    assert!(client.request_json("x", &json!({})).await.is_err());
    assert_eq!(client.transport().request_count(), 1);
}

#[tokio::test]
async fn tag_pass_sends_existing_tags_and_validates_reply() {
    let client = test_client(ScriptedTransport::new(vec![completion(json!({
        "tags": ["travel", "food", "extra"],
        "confidence": 0.8
    }))]));

    let existing = vec!["travel".to_string()];
    let result = client.tag_fragment("ramen in Sapporo", &existing).await.unwrap();

    assert_eq!(result.tags, ["travel", "food"]);
    assert_eq!(result.confidence, 0.8);
    let payload = client.transport().payload(0);
    assert_eq!(payload["text"], "ramen in Sapporo");
    assert_eq!(payload["existingTags"], json!(["travel"]));
}

#[tokio::test]
async fn malformed_tag_reply_is_a_shape_error() {
    let client = test_client(ScriptedTransport::new(vec![completion(json!({"labels": []}))]));

    let err = client.tag_fragment("x", &[]).await.unwrap_err();
    assert!(matches!(err, IdeaError::ResponseShapeInvalid(_)));
    // a well-formed JSON reply with the wrong shape is not retried
    assert_eq!(client.transport().request_count(), 1);
}
