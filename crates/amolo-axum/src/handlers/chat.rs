//! Chat handlers: buffered, streamed and the legacy single-message route.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Response;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use amolo_core::{
    ChatMessage, CompletionRequest, ServiceError, Usage, build_conversation, parse_history,
};

use crate::error::HttpError;
use crate::sse::relay_response;
use crate::state::AppState;

/// Successful buffered chat response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub message: String,
    pub usage: Usage,
}

/// `POST /api/chat`
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, HttpError> {
    let request = build_request(&state, body).map_err(|e| state.http_error(e))?;
    complete(&state, &request).await
}

/// `POST /api/chat/stream`
///
/// Failures before the provider accepts the stream are plain JSON errors;
/// later failures arrive in-band as an error event.
pub async fn chat_stream(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, HttpError> {
    let request = build_request(&state, body).map_err(|e| state.http_error(e))?;

    let upstream = state
        .completions
        .open_stream(&request)
        .await
        .map_err(|e| state.http_error(e))?;

    debug!(model = %request.model, "Relaying completion stream");
    Ok(relay_response(upstream))
}

/// `POST /chat`
///
/// Accepts `{"message": "..."}` and answers like `POST /api/chat`.
pub async fn legacy_chat(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, HttpError> {
    let request = build_legacy_request(&state, body).map_err(|e| state.http_error(e))?;
    complete(&state, &request).await
}

async fn complete(
    state: &AppState,
    request: &CompletionRequest,
) -> Result<Json<ChatResponse>, HttpError> {
    let result = state
        .completions
        .complete(request)
        .await
        .map_err(|e| state.http_error(e))?;

    info!(
        model = %request.model,
        total_tokens = result.usage.total_tokens,
        "Chat completed"
    );

    Ok(Json(ChatResponse {
        success: true,
        message: result.content,
        usage: result.usage,
    }))
}

fn build_request(
    state: &AppState,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<CompletionRequest, ServiceError> {
    let Json(body) = body.map_err(invalid_body)?;

    let history = parse_history(body.get("messages"))?;
    let model = parse_model(&body)?;
    let conversation = build_conversation(&state.system_directive, &history)?;

    Ok(CompletionRequest::new(model, conversation))
}

fn build_legacy_request(
    state: &AppState,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<CompletionRequest, ServiceError> {
    let Json(body) = body.map_err(invalid_body)?;

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| {
            ServiceError::Validation("Invalid request: message is required".to_string())
        })?;
    let model = parse_model(&body)?;
    let conversation =
        build_conversation(&state.system_directive, &[ChatMessage::user(message)])?;

    Ok(CompletionRequest::new(model, conversation))
}

/// Optional model override; must be a non-empty string when present.
fn parse_model(body: &Value) -> Result<Option<String>, ServiceError> {
    match body.get("model") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(model)) if !model.trim().is_empty() => Ok(Some(model.clone())),
        Some(_) => Err(ServiceError::Validation(
            "Invalid request: model must be a non-empty string".to_string(),
        )),
    }
}

fn invalid_body(rejection: JsonRejection) -> ServiceError {
    ServiceError::Validation(format!(
        "Invalid request: {}",
        rejection.body_text()
    ))
}
