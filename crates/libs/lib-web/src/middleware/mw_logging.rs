//! # Request/Response Logging Middleware
//!
//! One `[REQUEST]` line when a request arrives and one `[RESPONSE]` line
//! when it leaves, correlated by the id from
//! [`stamp_req`](super::stamp_req). Must run inside the stamping layer.
//!
//! Headers are logged at debug level with credentials redacted. Bodies are
//! never logged: they carry the user's chat text.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::mw_req_stamp::RequestStamp;

/// Header names containing any of these are redacted.
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "x-api-key",
    "x-goog-api-key",
    "x-auth-token",
];

const REDACTED: &str = "***REDACTED***";

pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|q| q.to_string());
    let is_upgrade = is_websocket_upgrade(req.headers());

    let request_id = req
        .extensions()
        .get::<RequestStamp>()
        .map(|s| s.id.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let client_ip = req
        .headers()
        .get("x-forwarded-for")
        .or_else(|| req.headers().get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query = ?query,
        client_ip = ?client_ip,
        websocket = is_upgrade,
        "[REQUEST] {} {}",
        method,
        path
    );
    debug!(request_id = %request_id, headers = ?sanitize_headers(req.headers()), "[REQUEST HEADERS]");

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        error!(request_id = %request_id, method = %method, path = %path, status, duration_ms, "[RESPONSE] {} {} -> {}", method, path, status);
    } else if response.status().is_client_error() {
        warn!(request_id = %request_id, method = %method, path = %path, status, duration_ms, "[RESPONSE] {} {} -> {}", method, path, status);
    } else {
        info!(request_id = %request_id, method = %method, path = %path, status, duration_ms, "[RESPONSE] {} {} -> {}", method, path, status);
    }

    response
}

fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
}

fn sanitize_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            if SENSITIVE_HEADERS.iter().any(|h| name_lower.contains(h)) {
                Some((name.to_string(), REDACTED.to_string()))
            } else {
                value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
            }
        })
        .collect()
}
