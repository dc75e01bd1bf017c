//! HTTP clients against a local mock server.

mod common;

use sahay_core::{
    Audience, ChatMessage, CompletionBackend, CompletionRequest, DatabaseInfo, DispatchError,
    Dispatcher, HttpKnowledgeBase, KnowledgeBase, OpenAiCompatClient, RagChat,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> CompletionRequest {
    CompletionRequest {
        model: "llama-3.1-8b-instant".to_string(),
        messages: vec![ChatMessage::user("What is a credit score?")],
        max_tokens: 100,
        temperature: 0.3,
    }
}

fn client(server: &MockServer) -> OpenAiCompatClient {
    OpenAiCompatClient::new(&server.uri(), "test-key", Duration::from_secs(5))
}

#[tokio::test]
async fn test_completion_returns_first_choice() {
    common::init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "llama-3.1-8b-instant", "max_tokens": 100})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "A number lenders use."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server).complete(&request()).await.unwrap();
    assert_eq!(text, "A number lenders use.");
}

#[tokio::test]
async fn test_server_error_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    match client(&server).complete(&request()).await {
        Err(DispatchError::Api { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream down");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_no_choices_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    assert!(matches!(
        client(&server).complete(&request()).await,
        Err(DispatchError::EmptyResponse)
    ));
}

#[tokio::test]
async fn test_knowledge_base_context_and_stats() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/context"))
        .and(body_partial_json(json!({"query": "crop loan", "max_context_length": 10})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"context": "Kisan Credit Card scheme"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"total_documents": 42, "unique_files": 3})),
        )
        .mount(&server)
        .await;

    let kb = HttpKnowledgeBase::new(&server.uri(), Duration::from_secs(5));
    let context = kb.context_for_query("crop loan", 10).await.unwrap();
    assert_eq!(context, "Kisan Cred");

    let offline = Dispatcher::offline();
    let chat = RagChat::new(offline, Some(Arc::new(kb)), 5);
    match chat.database_info().await {
        DatabaseInfo::Available { stats, message } => {
            assert_eq!(stats.unique_files, 3);
            assert_eq!(message, "Knowledge base contains 42 documents from 3 PDF files");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_knowledge_base_failure_reports_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/context"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let kb = HttpKnowledgeBase::new(&server.uri(), Duration::from_secs(5));
    assert!(kb.context_for_query("anything", 100).await.is_err());

    let mut chat = RagChat::new(Dispatcher::offline(), Some(Arc::new(kb)), 5);
    assert!(matches!(chat.database_info().await, DatabaseInfo::Error { .. }));
    let answer = chat.get_response("anything", Audience::Borrower).await;
    assert_eq!(
        answer,
        "I'm experiencing technical difficulties. Please try again in a moment."
    );
}
