// ABOUTME: Request tracing helpers for correlation and structured logging
// ABOUTME: Builds the per-request span used by TraceLayer and records the caller once authenticated
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use axum::http::Request;
use tracing::Span;
use uuid::Uuid;

/// Header carrying a caller-supplied correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Span for one HTTP request, keyed by `x-request-id` or a generated id
pub fn make_request_span<B>(request: &Request<B>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or_else(|| format!("req_{}", Uuid::new_v4().simple()), str::to_owned);

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        user_id = tracing::field::Empty,
    )
}

/// Record the authenticated user on the current request span
pub fn record_user(user_id: Uuid) {
    Span::current().record("user_id", user_id.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_builds_without_request_id() {
        let request = Request::builder()
            .uri("/api/providers/search")
            .body(())
            .unwrap();
        let _span = make_request_span(&request);
    }
}
