use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Stamp `Content-Type: application/json` on every response, whatever its
/// status, including empty 204s.
pub async fn json_content_type(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
