use axum::{
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::context::RequestContext;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Attach a request id to every request and echo it on the response.
///
/// A well-formed UUID in `x-request-id` is reused; anything else is replaced.
pub async fn request_id_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let request_id = extract_request_id(req.headers()).unwrap_or_else(Uuid::now_v7);
    req.extensions_mut().insert(RequestContext::new(request_id));

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

fn extract_request_id(headers: &HeaderMap) -> Option<Uuid> {
    let header = headers.get(REQUEST_ID_HEADER)?;
    let header = header.to_str().ok()?;
    header.trim().parse().ok()
}
