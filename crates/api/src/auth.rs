//! API-key middleware for the payment routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;

/// Expected `x-api-key` value; `None` disables the check entirely.
#[derive(Debug, Clone)]
pub struct ApiKey(pub Option<String>);

/// Rejects requests whose `x-api-key` header does not match the configured
/// key. Requests reaching the handlers past this point are considered
/// authorized.
pub async fn require_api_key(
    State(ApiKey(expected)): State<ApiKey>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = &expected {
        let presented = request
            .headers()
            .get("x-api-key")
            .and_then(|value| value.to_str().ok());
        if presented != Some(expected.as_str()) {
            return Err(ApiError::Unauthorized);
        }
    }
    Ok(next.run(request).await)
}
