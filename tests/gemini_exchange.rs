//! End-to-end tests of the Gemini exchange against a local mock endpoint.
//!
//! Every test points a `GeminiClient` at a wiremock server, so the full path
//! (request body, query-string key, status handling, retry, envelope) is
//! exercised without touching the real API.

use std::time::Duration;

use careerai::agent::{send_message, Agent, ChatBackend, HistoryEntry, Role};
use careerai::{
    CallEnvelope, CallResult, ChatError, Config, FailureClass, GeminiClient, GeminiSettings,
    HintCategory, RetryPolicy,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";
const GENERATE_PATH: &str = "/models/gemini-test:generateContent";

fn settings(server: &MockServer) -> GeminiSettings {
    GeminiSettings {
        model: MODEL.to_string(),
        base_url: server.uri(),
        timeout_secs: 5,
        ..GeminiSettings::default()
    }
}

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key", &settings(server), "You are CareerAI").unwrap()
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(5),
    }
}

fn success_body(text: &str, total_tokens: u64) -> serde_json::Value {
    json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}],
        "usageMetadata": {"promptTokenCount": 3, "totalTokenCount": total_tokens}
    })
}

fn error_body(code: u16, message: &str) -> serde_json::Value {
    json!({"error": {"code": code, "message": message, "status": "ERROR"}})
}

#[tokio::test]
async fn rate_limited_twice_then_succeeds_on_third_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(error_body(429, "Resource has been exhausted")),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(success_body("Here are 3 resume tips", 87)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = send_message(&client(&server), "resume tips?", &[], &fast_policy()).await;
    let envelope = CallEnvelope::from(result);

    assert!(envelope.success, "expected success, got {envelope:?}");
    assert_eq!(envelope.text, "Here are 3 resume tips");
    assert_eq!(envelope.tokens_used, 87);
    assert!(envelope.error.is_empty());
}

#[tokio::test]
async fn permission_denied_fails_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(error_body(403, "Permission denied: Gemini API has not been enabled")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = send_message(&client(&server), "hello", &[], &fast_policy()).await;
    let envelope = CallEnvelope::from(result);

    assert!(!envelope.success);
    assert!(envelope.text.is_empty());
    assert_eq!(envelope.tokens_used, 0);
    assert!(envelope.error.contains("Permission denied"), "{}", envelope.error);
    assert_eq!(HintCategory::classify(&envelope.error), HintCategory::Permission);
}

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    let server = MockServer::start().await;

    let mut config = Config::default();
    config.gemini = settings(&server);

    let err = GeminiClient::from_lookup(&config, "You are CareerAI", |_| None).unwrap_err();
    assert!(matches!(err, ChatError::MissingApiKey));
    assert_eq!(err.class(), FailureClass::Configuration);

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "no request may be issued without a key");
}

#[tokio::test]
async fn deterministic_endpoint_gives_identical_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body("Same answer", 21)))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    let history = vec![
        HistoryEntry::new(Role::User, "I am a nurse"),
        HistoryEntry::new(Role::Model, "Great, how can I help?"),
    ];

    let first = send_message(&client, "switch to tech?", &history, &fast_policy()).await;
    let second = send_message(&client, "switch to tech?", &history, &fast_policy()).await;

    assert_eq!(first, second);
    assert_eq!(
        first,
        CallResult::Success {
            text: "Same answer".to_string(),
            tokens_used: 21
        }
    );
}

#[tokio::test]
async fn request_carries_key_history_and_system_instruction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "hi"}]},
                {"role": "model", "parts": [{"text": "hello"}]},
                {"role": "user", "parts": [{"text": "next?"}]}
            ],
            "systemInstruction": {"parts": [{"text": "You are CareerAI"}]},
            "generationConfig": {"maxOutputTokens": 1024, "topK": 40}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok", 5)))
        .expect(1)
        .mount(&server)
        .await;

    let history = vec![
        HistoryEntry::new(Role::User, "hi"),
        HistoryEntry::new(Role::Model, "hello"),
    ];
    let reply = client(&server).exchange("next?", &history).await.unwrap();
    assert_eq!(reply.text, "ok");
    assert_eq!(reply.tokens_used, 5);
}

#[tokio::test]
async fn unparseable_error_body_is_used_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client(&server).exchange("q", &[]).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 400: upstream exploded");
    assert!(!err.is_transient());
}

#[tokio::test]
async fn success_without_candidates_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let err = client(&server).exchange("q", &[]).await.unwrap_err();
    assert!(matches!(err, ChatError::InvalidResponse(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_failure() {
    let settings = GeminiSettings {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout_secs: 2,
        ..GeminiSettings::default()
    };
    let client = GeminiClient::new("test-key", &settings, "p").unwrap();

    let err = client.exchange("q", &[]).await.unwrap_err();
    assert!(matches!(err, ChatError::Network(_)));
    assert!(!err.to_string().contains("test-key"), "key must not leak: {err}");

    let result = send_message(&client, "q", &[], &fast_policy()).await;
    assert!(!result.is_success());
}

#[tokio::test]
async fn list_models_keeps_generate_content_models() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "models/gemini-2.5-flash", "displayName": "Gemini 2.5 Flash",
                 "supportedGenerationMethods": ["generateContent", "countTokens"]},
                {"name": "models/text-embedding-004",
                 "supportedGenerationMethods": ["embedContent"]}
            ]
        })))
        .mount(&server)
        .await;

    let models = client(&server).list_models().await.unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "gemini-2.5-flash");
    assert_eq!(models[0].display_name.as_deref(), Some("Gemini 2.5 Flash"));
}

#[tokio::test]
async fn ping_reports_connection_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body("OK", 2)))
        .mount(&server)
        .await;

    let status = client(&server).ping().await;
    assert!(status.connected);
    assert_eq!(status.detail, "Connected - model: gemini-test");
}

#[tokio::test]
async fn agent_turns_accumulate_reported_usage() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body("Advice", 30)))
        .expect(2)
        .mount(&server)
        .await;

    let mut agent = Agent::new(client(&server), fast_policy(), 10);
    assert!(agent.chat("How do I negotiate salary?").await.is_success());
    assert!(agent.chat("And for a promotion?").await.is_success());

    assert_eq!(agent.session().count(), 4);
    assert_eq!(agent.session().total_tokens_used(), 60);
    assert_eq!(agent.model(), MODEL);
}
