//! Session authentication middleware
//!
//! Stands in for the identity-provider boundary: requests must present the
//! shared session key as a bearer token before any pipeline operation is
//! reachable. The signed-in display name rides in the `x-user-name` header.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use super::ApiState;

/// Display name of the authenticated user, injected into request extensions
#[derive(Debug, Clone)]
pub struct SessionUser(pub String);

/// Extract the bearer token from the Authorization header
fn extract_bearer(req: &Request) -> Option<&str> {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Extract the display name from the `x-user-name` header
fn extract_user_name(req: &Request) -> Option<String> {
    req.headers()
        .get("x-user-name")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Middleware to verify the session key and record the display name
pub async fn require_session(
    State(state): State<Arc<ApiState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user_name =
        extract_user_name(&req).unwrap_or_else(|| state.default_user_name.clone());

    // If no session key is configured, allow all requests (development mode)
    let Some(expected_key) = &state.session_key else {
        tracing::warn!("session key not configured - allowing unauthenticated access");
        req.extensions_mut().insert(SessionUser(user_name));
        return Ok(next.run(req).await);
    };

    match extract_bearer(&req) {
        Some(key) if key == expected_key => {
            req.extensions_mut().insert(SessionUser(user_name));
            Ok(next.run(req).await)
        }
        Some(_) => {
            tracing::warn!("invalid session key provided");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::debug!("no session key provided");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_extract_bearer() {
        let mut req = Request::builder().body(Body::empty()).unwrap();

        // No header
        assert_eq!(extract_bearer(&req), None);

        // With Bearer token
        req.headers_mut().insert(
            "authorization",
            HeaderValue::from_static("Bearer test-key-123"),
        );
        assert_eq!(extract_bearer(&req), Some("test-key-123"));
    }

    #[test]
    fn test_extract_user_name() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_user_name(&req), None);

        req.headers_mut()
            .insert("x-user-name", HeaderValue::from_static("  Robin  "));
        assert_eq!(extract_user_name(&req), Some("Robin".to_string()));

        req.headers_mut()
            .insert("x-user-name", HeaderValue::from_static("   "));
        assert_eq!(extract_user_name(&req), None);
    }
}
