use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use sous_conversation::DisplayTurn;
use sous_llm::{MockProvider, ToolRegistry};
use test_log::test;

use super::*;

/// Start the server on a random port, returning its base URL.
async fn start(provider: &MockProvider) -> String {
    let chat = ChatManager::new(Arc::new(provider.clone()), Arc::new(ToolRegistry::new()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move { axum::serve(listener, router(chat)).await });

    format!("http://{address}")
}

/// The JSON payloads of all events in an SSE body.
fn events(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}

#[test(tokio::test)]
async fn test_index_serves_widget() {
    let url = start(&MockProvider::new()).await;

    let body = reqwest::get(&url).await.unwrap().text().await.unwrap();

    assert!(body.starts_with("<!DOCTYPE html>"));
    for needle in ["Stream", "Send", "Clear Chat", "chicken parmesan"] {
        assert!(body.contains(needle), "missing {needle:?}");
    }
}

#[test(tokio::test)]
async fn test_chat_streams_display_snapshots() {
    let provider = MockProvider::with_chunked_message(&["Hi ", "there!"]);
    let url = start(&provider).await;

    let response = reqwest::Client::new()
        .post(format!("{url}/api/chat"))
        .json(&json!({
            "message": "hello",
            "history": [{ "user": "earlier", "assistant": "reply" }],
            "stream": true,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );

    let events = events(&response.text().await.unwrap());
    assert_eq!(events.len(), 3);
    assert_eq!(events[0][1], json!({ "user": "hello", "assistant": "Hi " }));
    assert_eq!(
        events[2],
        json!([
            { "user": "earlier", "assistant": "reply" },
            { "user": "hello", "assistant": "Hi there!" },
        ])
    );
}

#[test(tokio::test)]
async fn test_blank_message_returns_history_unchanged() {
    let url = start(&MockProvider::new()).await;

    let body = reqwest::Client::new()
        .post(format!("{url}/api/chat"))
        .json(&json!({ "message": " ", "history": [] }))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert_eq!(events(&body), vec![json!([])]);
}

#[test(tokio::test)]
async fn test_clear_resets_history() {
    let provider = MockProvider::with_message("Hello!");
    let url = start(&provider).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{url}/api/chat"))
        .json(&json!({ "message": "hi", "stream": false }))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    let cleared: Vec<DisplayTurn> = client
        .post(format!("{url}/api/clear"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(cleared, vec![]);
}
