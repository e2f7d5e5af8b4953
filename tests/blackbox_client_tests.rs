//! # 上游客户端测试集
//!
//! 用mockito模拟Blackbox聊天接口：
//! - 成功响应按原始文本返回
//! - 429/5xx/其他非2xx分别映射到对应错误
//! - 请求体携带期望的会话字段

use chat_relay::llm_api::blackbox::{BlackboxClient, UpstreamError};
use mockito::{Matcher, Server};
use serde_json::json;

#[tokio::test]
async fn test_chat_returns_raw_body_on_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body("$~~~$search results$~~~$Hello! How can I help you today?")
        .create_async()
        .await;

    let client = BlackboxClient::new(server.url()).expect("Client should build");
    let body = client.chat("hello").await.expect("Chat should succeed");

    // 客户端不做清洗，原样返回
    assert_eq!(body, "$~~~$search results$~~~$Hello! How can I help you today?");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_maps_429_to_rate_limited() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/chat")
        .with_status(429)
        .with_body("slow down")
        .create_async()
        .await;

    let client = BlackboxClient::new(server.url()).unwrap();
    let result = client.chat("hello").await;
    assert!(matches!(result, Err(UpstreamError::RateLimited)));
}

#[tokio::test]
async fn test_chat_maps_5xx_to_server_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/chat")
        .with_status(503)
        .create_async()
        .await;

    let client = BlackboxClient::new(server.url()).unwrap();
    match client.chat("hello").await {
        Err(UpstreamError::ServerError { status }) => assert_eq!(status, 503),
        other => panic!("Expected ServerError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_maps_other_failures_to_unexpected() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/chat")
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let client = BlackboxClient::new(server.url()).unwrap();
    match client.chat("hello").await {
        Err(UpstreamError::Unexpected { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "not found");
        }
        other => panic!("Expected Unexpected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_request_carries_expected_session_fields() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_header("content-type", "application/json")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "maxTokens": 99999,
                "userSelectedAgent": "VscodeAgent",
                "validated": "a38f5889-8fef-46d4-8ede-bf4668b6a9bb",
                "webSearchModeOption": { "webMode": true },
            })),
            Matcher::Regex(r#""content":"what is rust?""#.to_string()),
            Matcher::Regex(r#""role":"user""#.to_string()),
        ]))
        .with_status(200)
        .with_body("Rust is a systems programming language.")
        .create_async()
        .await;

    let client = BlackboxClient::new(server.url()).unwrap();
    client.chat("what is rust?").await.expect("Chat should succeed");
    mock.assert_async().await;
}
