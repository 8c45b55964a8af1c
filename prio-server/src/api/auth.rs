//! Host token check for session administration
//!
//! Creating a session returns an opaque host token. Endpoints that change a
//! session's setup or lifecycle require it in the `X-Host-Token` header.

use axum::http::HeaderMap;
use prio_common::models::Session;
use tracing::warn;

use crate::{ApiError, ApiResult};

pub const HOST_TOKEN_HEADER: &str = "x-host-token";

/// Ensure the request carries the session's host token
pub fn require_host(headers: &HeaderMap, session: &Session) -> ApiResult<()> {
    let provided = headers
        .get(HOST_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing host token".to_string()))?;

    if !tokens_match(provided.as_bytes(), session.host_token.as_bytes()) {
        warn!("Rejected host token for session {}", session.id);
        return Err(ApiError::Unauthorized("Invalid host token".to_string()));
    }
    Ok(())
}

/// Length-checked comparison that inspects every byte
fn tokens_match(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;
    use prio_common::models::SessionStatus;

    fn session() -> Session {
        Session {
            id: "s1".to_string(),
            name: "Test".to_string(),
            status: SessionStatus::Draft,
            points_budget: 100,
            host_token: "abc123".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_host() {
        let mut headers = HeaderMap::new();
        assert!(matches!(require_host(&headers, &session()), Err(ApiError::Unauthorized(_))));

        headers.insert(HOST_TOKEN_HEADER, HeaderValue::from_static("abc124"));
        assert!(matches!(require_host(&headers, &session()), Err(ApiError::Unauthorized(_))));

        headers.insert(HOST_TOKEN_HEADER, HeaderValue::from_static("abc123"));
        assert!(require_host(&headers, &session()).is_ok());
    }

    #[test]
    fn test_tokens_match_length_mismatch() {
        assert!(!tokens_match(b"abc", b"abcd"));
        assert!(tokens_match(b"", b""));
    }
}
