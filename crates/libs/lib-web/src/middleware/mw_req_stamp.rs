//! # Request Stamping Middleware
//!
//! Gives every request an id, available to handlers as
//! `Extension<RequestStamp>` and echoed back in the `X-Request-ID` response
//! header. An id supplied by the caller (e.g. a reverse proxy) is kept.
//!
//! ```rust,no_run
//! use axum::{extract::Extension, routing::get, Router};
//! use lib_web::middleware::{stamp_req, RequestStamp};
//!
//! async fn handler(Extension(stamp): Extension<RequestStamp>) -> String {
//!     format!("Request ID: {}", stamp.id)
//! }
//!
//! let app: Router = Router::new()
//!     .route("/", get(handler))
//!     .layer(axum::middleware::from_fn(stamp_req));
//! ```

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::SystemTime;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest caller-supplied id that is reused as is.
const MAX_FORWARDED_ID_LEN: usize = 128;

#[derive(Clone, Debug)]
pub struct RequestStamp {
    pub id: String,
    pub timestamp: SystemTime,
}

impl RequestStamp {
    fn from_request(req: &Request) -> Self {
        let id = req
            .headers()
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.len() <= MAX_FORWARDED_ID_LEN)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            id,
            timestamp: SystemTime::now(),
        }
    }
}

pub async fn stamp_req(mut req: Request, next: Next) -> Response {
    let stamp = RequestStamp::from_request(&req);
    req.extensions_mut().insert(stamp.clone());

    let mut res = next.run(req).await;

    if let Ok(header_value) = HeaderValue::from_str(&stamp.id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    res
}
