//! Route tests for the buffered chat endpoints, health and fallbacks.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

use amolo_axum::{AxumContext, CorsConfig, Environment, ServerConfig, bootstrap, create_router};
use amolo_core::{
    AdmissionConfig, ChatMessage, ChunkStream, CompletionPort, CompletionRequest,
    CompletionResult, DEFAULT_SYSTEM_DIRECTIVE, MessageRole, ServiceError,
};

use common::fake::FakeCompletions;
use common::http::{app, body_json, get, post_json, post_raw};

#[tokio::test]
async fn test_health() {
    let response = app(Arc::new(FakeCompletions::replying("hi")))
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["service"], "AMOLO AI Backend");
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_chat_returns_completion() {
    let fake = Arc::new(FakeCompletions::replying("hi there"));
    let response = app(fake.clone())
        .oneshot(post_json(
            "/api/chat",
            &json!({"messages": [{"role": "user", "content": "hello"}]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "success": true,
            "message": "hi there",
            "usage": {"prompt_tokens": 20, "completion_tokens": 3, "total_tokens": 23}
        })
    );

    let request = fake.last_request();
    assert_eq!(request.model, "gpt-4o-mini");
    assert_eq!(
        request.messages,
        vec![
            ChatMessage::system(DEFAULT_SYSTEM_DIRECTIVE),
            ChatMessage::user("hello"),
        ]
    );
}

#[tokio::test]
async fn test_long_history_is_windowed() {
    let fake = Arc::new(FakeCompletions::replying("ok"));
    let history: Vec<_> = (0..12)
        .map(|i| json!({"role": if i % 2 == 0 { "user" } else { "assistant" }, "content": format!("m{i}")}))
        .collect();

    let response = app(fake.clone())
        .oneshot(post_json("/api/chat", &json!({ "messages": history })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let messages = fake.last_request().messages;
    assert_eq!(messages.len(), 11);
    assert_eq!(messages[0].role, MessageRole::System);
    assert_eq!(messages[1].content, "m2");
    assert_eq!(messages[10].content, "m11");
}

#[tokio::test]
async fn test_model_override() {
    let fake = Arc::new(FakeCompletions::replying("ok"));
    let response = app(fake.clone())
        .oneshot(post_json(
            "/api/chat",
            &json!({"model": "gpt-4o", "messages": [{"role": "user", "content": "hi"}]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(fake.last_request().model, "gpt-4o");
}

#[tokio::test]
async fn test_empty_messages_rejected() {
    let fake = Arc::new(FakeCompletions::replying("unused"));
    let response = app(fake.clone())
        .oneshot(post_json("/api/chat", &json!({"messages": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Invalid request: messages array is required"})
    );
    assert_eq!(fake.calls(), 0);
}

#[tokio::test]
async fn test_malformed_bodies_rejected_before_provider() {
    let fake = Arc::new(FakeCompletions::replying("unused"));
    let router = app(fake.clone());

    let bodies = [
        json!({}),
        json!({"messages": "hello"}),
        json!({"messages": [{"role": "robot", "content": "beep"}]}),
        json!({"messages": [{"role": "user"}]}),
        json!({"messages": [{"role": "user", "content": "hi"}], "model": ""}),
        json!(["not", "an", "object"]),
    ];
    for body in bodies {
        let response = router
            .clone()
            .oneshot(post_json("/api/chat", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let error = body_json(response).await["error"].as_str().unwrap().to_string();
        assert!(error.starts_with("Invalid request"), "{error}");
    }

    let response = router
        .clone()
        .oneshot(post_raw("/api/chat", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(fake.calls(), 0);
}

#[tokio::test]
async fn test_missing_credential_is_configuration_error() {
    let ctx = bootstrap(&ServerConfig::default()).unwrap();
    let router = create_router(ctx, &ServerConfig::default().cors);

    let response = router
        .oneshot(post_json(
            "/api/chat",
            &json!({"messages": [{"role": "user", "content": "hello"}]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Server configuration error: OPENAI_API_KEY is not set"})
    );
}

#[tokio::test]
async fn test_provider_failures_are_mapped() {
    let cases = [
        (
            ServiceError::Auth("Invalid API key".into()),
            StatusCode::UNAUTHORIZED,
            "Invalid API key",
        ),
        (
            ServiceError::RateLimited("Rate limit exceeded. Please try again later.".into()),
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded. Please try again later.",
        ),
        (
            ServiceError::UpstreamUnavailable("AI service temporarily unavailable".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "AI service temporarily unavailable",
        ),
        (
            ServiceError::Provider {
                status: 404,
                message: "The model `nope` does not exist".into(),
            },
            StatusCode::NOT_FOUND,
            "The model `nope` does not exist",
        ),
        (
            ServiceError::Internal("connection pool poisoned".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        ),
    ];

    for (err, status, message) in cases {
        let response = app(Arc::new(FakeCompletions::failing(err)))
            .oneshot(post_json(
                "/api/chat",
                &json!({"messages": [{"role": "user", "content": "hello"}]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), status);
        assert_eq!(body_json(response).await, json!({ "error": message }));
    }
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let response = app(Arc::new(FakeCompletions::replying("hi")))
        .oneshot(get("/unknown"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Endpoint not found", "path": "/unknown"})
    );
}

#[tokio::test]
async fn test_wrong_method_is_not_found() {
    let fake = Arc::new(FakeCompletions::replying("hi"));
    let router = app(fake.clone());

    let response = router.clone().oneshot(get("/api/chat")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Endpoint not found", "path": "/api/chat"})
    );

    let response = router
        .oneshot(post_json("/health", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(fake.calls(), 0);
}

#[tokio::test]
async fn test_legacy_chat_route() {
    let fake = Arc::new(FakeCompletions::replying("hi there"));
    let router = app(fake.clone());

    let response = router
        .clone()
        .oneshot(post_json("/chat", &json!({"message": "hello"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "hi there");
    assert_eq!(
        fake.last_request().messages,
        vec![
            ChatMessage::system(DEFAULT_SYSTEM_DIRECTIVE),
            ChatMessage::user("hello"),
        ]
    );

    let response = router
        .oneshot(post_json("/chat", &json!({"message": ""})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Invalid request: message is required"})
    );
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn test_cors_preflight() {
    let response = app(Arc::new(FakeCompletions::replying("hi")))
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/chat")
                .header(header::ORIGIN, "https://amolo.ai")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

/// Port whose every call panics, standing in for an unclassified failure.
struct PanickingCompletions;

#[async_trait]
impl CompletionPort for PanickingCompletions {
    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResult, ServiceError> {
        panic!("completion backend exploded");
    }

    async fn open_stream(&self, _request: &CompletionRequest) -> Result<ChunkStream, ServiceError> {
        panic!("completion backend exploded");
    }
}

#[tokio::test]
async fn test_handler_panic_becomes_generic_500() {
    for (environment, message) in [
        (Environment::Production, "Internal server error"),
        (Environment::Development, "completion backend exploded"),
    ] {
        let router = create_router(
            AxumContext::new(
                Arc::new(PanickingCompletions),
                AdmissionConfig::default(),
                environment,
            ),
            &CorsConfig::AllowAll,
        );

        let response = router
            .oneshot(post_json(
                "/api/chat",
                &json!({"messages": [{"role": "user", "content": "hello"}]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "error": message }));
    }
}
