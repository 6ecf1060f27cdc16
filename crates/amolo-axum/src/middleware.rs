//! Admission gate for the chat routes.
//!
//! Runs before body extraction, so rejected requests never reach the
//! window builder or the provider.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use amolo_core::{AdmissionDecision, RATE_LIMIT_MESSAGE, ServiceError};

use crate::state::AppState;

pub const RATE_LIMIT_LIMIT: &str = "ratelimit-limit";
pub const RATE_LIMIT_REMAINING: &str = "ratelimit-remaining";
pub const RATE_LIMIT_RESET: &str = "ratelimit-reset";

/// Count the request against its client's window and reject it once the
/// quota is spent.
pub async fn admission_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let decision = state.admission.check(client_ip(&request));

    let mut response = if decision.accepted {
        next.run(request).await
    } else {
        let mut response = state
            .http_error(ServiceError::RateLimited(RATE_LIMIT_MESSAGE.to_string()))
            .into_response();
        response
            .headers_mut()
            .insert("retry-after", header_secs(decision.reset_after.as_secs()));
        response
    };

    apply_quota_headers(response.headers_mut(), &decision);
    response
}

/// Peer address of the connection, or the shared unspecified bucket when
/// the server was not started with connect info.
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |ConnectInfo(addr)| {
            addr.ip()
        })
}

fn apply_quota_headers(headers: &mut HeaderMap, decision: &AdmissionDecision) {
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(
        RATE_LIMIT_RESET,
        header_secs(decision.reset_after.as_secs()),
    );
}

fn header_secs(secs: u64) -> HeaderValue {
    HeaderValue::from(secs.max(1))
}
