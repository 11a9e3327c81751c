//! AI functions against a local mock of the chat-completions endpoint.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use orbit::ai::functions::{
    generate_message, search_contacts, summarize, ContactProfile, GenerateMessageRequest,
    SearchContactsRequest, SummarizeRequest,
};
use orbit::ai::{AiError, ChatClient};
use orbit::relationship::types::Layer;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
struct Mock {
    status: StatusCode,
    reply: String,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn completions(
    State(mock): State<Mock>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    mock.seen.lock().unwrap().push((auth, body));

    if !mock.status.is_success() {
        return (mock.status, Json(json!({"error": {"message": "nope"}})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "choices": [{"message": {"role": "assistant", "content": mock.reply}}]
        })),
    )
}

/// Serve a mock upstream and return its base URL plus the request log.
async fn spawn_upstream(
    status: StatusCode,
    reply: &str,
) -> (String, Arc<Mutex<Vec<(Option<String>, Value)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mock = Mock {
        status,
        reply: reply.to_string(),
        seen: Arc::clone(&seen),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v1"), seen)
}

fn client(base_url: &str) -> ChatClient {
    ChatClient::new("test-key", "test-model").with_base_url(base_url)
}

fn message_request(layer: Layer) -> GenerateMessageRequest {
    GenerateMessageRequest {
        contact_name: "Priya".into(),
        contact_layer: layer,
        opportunity_type: "check_in".into(),
        title: "Reconnect with Priya".into(),
        description: Some("Last contact 40 days ago".into()),
    }
}

#[tokio::test]
async fn generate_message_sends_tone_and_returns_text() {
    let (url, seen) = spawn_upstream(StatusCode::OK, "  Hey Priya! Coffee soon?  ").await;

    let resp = generate_message(&client(&url), &message_request(Layer::Distant))
        .await
        .unwrap();
    assert_eq!(resp.message, "Hey Priya! Coffee soon?");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (auth, body) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer test-key"));
    assert_eq!(body["model"], "test-model");
    let system = body["messages"][0]["content"].as_str().unwrap();
    assert!(system.contains("formal"));
    let user = body["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("Priya"));
    assert!(user.contains("40 days"));
}

#[tokio::test]
async fn rate_limit_and_credit_errors_keep_their_status() {
    let (url, _) = spawn_upstream(StatusCode::TOO_MANY_REQUESTS, "").await;
    let err = generate_message(&client(&url), &message_request(Layer::Vip))
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::RateLimited));
    assert_eq!(err.status_code(), 429);

    let (url, _) = spawn_upstream(StatusCode::PAYMENT_REQUIRED, "").await;
    let err = summarize(&client(&url), &SummarizeRequest { text: "notes".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::CreditsExhausted));
    assert_eq!(err.status_code(), 402);

    let (url, _) = spawn_upstream(StatusCode::BAD_GATEWAY, "").await;
    let err = summarize(&client(&url), &SummarizeRequest { text: "notes".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::Upstream { status: 502, .. }));
    assert_eq!(err.status_code(), 500);
}

fn profiles() -> Vec<ContactProfile> {
    ["c1", "c2"]
        .into_iter()
        .map(|id| ContactProfile {
            id: id.into(),
            name: format!("Person {id}"),
            layer: Some(Layer::Regular),
            company: None,
            role: None,
            notes: Some("plays chess".into()),
            tags: vec![],
        })
        .collect()
}

#[tokio::test]
async fn search_drops_ids_not_in_the_input() {
    let reply = r#"{"matched_ids": ["c2", "ghost"], "message": "c2 plays chess"}"#;
    let (url, _) = spawn_upstream(StatusCode::OK, reply).await;

    let resp = search_contacts(
        &client(&url),
        &SearchContactsRequest {
            query: "who plays chess".into(),
            contacts: profiles(),
        },
    )
    .await
    .unwrap();
    assert_eq!(resp.matched_ids, vec!["c2".to_string()]);
    assert_eq!(resp.message, "c2 plays chess");
}

#[tokio::test]
async fn search_with_prose_reply_returns_no_matches() {
    let (url, _) = spawn_upstream(StatusCode::OK, "I couldn't find anyone.").await;

    let resp = search_contacts(
        &client(&url),
        &SearchContactsRequest {
            query: "astronauts".into(),
            contacts: profiles(),
        },
    )
    .await
    .unwrap();
    assert!(resp.matched_ids.is_empty());
    assert_eq!(resp.message, "I couldn't find anyone.");
}

/// Serve the function endpoints and return their base URL.
async fn spawn_functions(chat: Option<ChatClient>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = orbit::server::functions_router(chat);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn http_endpoints_map_errors_to_status_and_json() {
    let (upstream, _) = spawn_upstream(StatusCode::TOO_MANY_REQUESTS, "").await;
    let base = spawn_functions(Some(client(&upstream))).await;
    let http = reqwest::Client::new();

    let resp = http
        .post(format!("{base}/functions/summarize"))
        .json(&json!({"text": "long notes"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 429);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("rate limited"));

    let resp = http
        .post(format!("{base}/functions/generate-message"))
        .json(&json!({"contactName": "Priya"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn http_endpoints_without_key_answer_500() {
    let base = spawn_functions(None).await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/functions/search-contacts"))
        .json(&json!({"query": "chess", "contacts": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 500);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("API key"));
}

#[tokio::test]
async fn http_generate_message_round_trip() {
    let (upstream, _) = spawn_upstream(StatusCode::OK, "Happy birthday, Priya!").await;
    let base = spawn_functions(Some(client(&upstream))).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/functions/generate-message"))
        .json(&json!({
            "contactName": "Priya",
            "contactLayer": "inner",
            "opportunityType": "birthday",
            "title": "Priya's birthday"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Happy birthday, Priya!");
}
