//! Middleware for logging requests and responses.

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::Error;

/// Bodies longer than this many bytes are truncated in the `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// JSON fields whose values are never written to the logs.
const REDACTED_FIELDS: [&str; 3] = ["password", "accessToken", "refreshToken"];

const REDACTED_VALUE: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated and
/// the full body is logged at the `debug` level. Passwords and tokens in JSON
/// bodies are redacted, and multipart bodies are not logged at all.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            return Error::InvalidRequestBody(error.to_string()).into_response();
        }
    };

    log_request(&parts, &display_body(&parts.headers, &body_bytes));

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_response(&parts, &display_body(&parts.headers, &body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

/// The text to log for a body with the given headers.
fn display_body(headers: &HeaderMap, body: &[u8]) -> String {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("multipart/") {
        return format!("<multipart body, {} bytes>", body.len());
    }

    if content_type.starts_with("image/") {
        return format!("<image, {} bytes>", body.len());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(mut json) => {
            redact(&mut json);
            json.to_string()
        }
        Err(_) => String::from_utf8_lossy(body).to_string(),
    }
}

/// Replace the values of [REDACTED_FIELDS] anywhere in `json`.
fn redact(json: &mut Value) {
    match json {
        Value::Object(map) => {
            for (key, value) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *value = Value::String(REDACTED_VALUE.to_owned());
                } else {
                    redact(value);
                }
            }
        }
        Value::Array(values) => values.iter_mut().for_each(redact),
        _ => {}
    }
}

/// The longest prefix of `text` that fits in [LOG_BODY_LENGTH_LIMIT] bytes
/// without splitting a character.
fn truncate(text: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(text.len());

    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    let (method, uri) = (&parts.method, &parts.uri);

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("Received request: {method} {uri}\nbody: {}...", truncate(body));
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {method} {uri}\nbody: {body:?}");
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    let status = parts.status;

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("Sending response: {status}\nbody: {}...", truncate(body));
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {status}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::http::{HeaderMap, HeaderValue, header::CONTENT_TYPE};
    use serde_json::json;

    use super::{LOG_BODY_LENGTH_LIMIT, display_body, truncate};

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn redacts_credentials() {
        let body = json!({
            "email": "test@example.com",
            "password": "hunter2hunter2",
        })
        .to_string();

        let display = display_body(&headers("application/json"), body.as_bytes());

        assert!(!display.contains("hunter2"));
        assert!(display.contains("test@example.com"));
    }

    #[test]
    fn redacts_nested_tokens() {
        let body = json!({
            "user": { "id": 1 },
            "accessToken": "secret-access",
            "refreshToken": "secret-refresh",
        })
        .to_string();

        let display = display_body(&headers("application/json"), body.as_bytes());

        assert!(!display.contains("secret-access"));
        assert!(!display.contains("secret-refresh"));
    }

    #[test]
    fn skips_multipart_bodies() {
        let display = display_body(
            &headers("multipart/form-data; boundary=abc"),
            b"--abc\r\nbinary",
        );

        assert_eq!(display, "<multipart body, 13 bytes>");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let truncated = truncate(&text);

        assert!(truncated.len() <= LOG_BODY_LENGTH_LIMIT);
        assert!(truncated.chars().all(|c| c == 'é'));
    }
}
