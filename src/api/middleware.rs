//! API Middleware
//!
//! Bearer-token authentication and request logging.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::domain::OperationContext;
use crate::error::AppError;

use super::AppState;

/// Header carrying the request's correlation ID
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

const BEARER_SCHEME: &str = "bearer";

// =========================================================================
// Bearer Token Authentication Middleware
// =========================================================================

/// Verify the access token from the `Authorization: Bearer` header.
///
/// On success the token payload and an [`OperationContext`] are stored in the
/// request extensions. Verification does not touch storage.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(request.headers())?;

    let payload = state
        .token_maker
        .verify_token(token)
        .map_err(AppError::InvalidAccessToken)?;

    let context = operation_context(&request, &payload.username);

    request.extensions_mut().insert(payload);
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::MissingAccessToken)?
        .to_str()
        .map_err(|_| AppError::MissingAccessToken)?;

    let mut fields = value.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => Ok(token),
        _ => Err(AppError::MissingAccessToken),
    }
}

/// Context for the authenticated caller. The client IP is only known when
/// the server was started with connect info.
fn operation_context(request: &Request<Body>, username: &str) -> OperationContext {
    let mut context = OperationContext::new().with_username(username);
    if let Some(correlation_id) = correlation_id(request.headers()) {
        context = context.with_correlation_id(correlation_id);
    }
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        context = context.with_client_ip(addr.ip());
    }
    context
}

fn correlation_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
///
/// Assigns a correlation ID when the client did not send one, so the auth
/// middleware and handlers log under the same ID. The ID is echoed back in
/// the response headers.
pub async fn logging_middleware(mut request: Request<Body>, next: Next) -> Response {
    let correlation_id = match correlation_id(request.headers()) {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4();
            if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
                request.headers_mut().insert(CORRELATION_ID_HEADER, value);
            }
            id
        }
    };

    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();
    let headers = mask_headers_for_logging(request.headers());

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        version = ?version,
        correlation_id = %correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        correlation_id = %correlation_id,
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_authorization(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer() {
        let headers = with_authorization("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&headers).unwrap(), "abc.def.ghi");

        let headers = with_authorization("bearer abc.def.ghi");
        assert_eq!(extract_bearer(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_extract_bearer_rejects_bad_headers() {
        assert!(matches!(
            extract_bearer(&HeaderMap::new()),
            Err(AppError::MissingAccessToken)
        ));

        for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer a b", "abc.def.ghi"] {
            let headers = with_authorization(value);
            assert!(extract_bearer(&headers).is_err(), "value {value:?}");
        }
    }

    #[test]
    fn test_operation_context_from_request() {
        let correlation_id = Uuid::new_v4();
        let mut request = Request::builder()
            .header(CORRELATION_ID_HEADER, correlation_id.to_string())
            .body(Body::empty())
            .unwrap();
        let addr: SocketAddr = "192.168.1.20:54321".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));

        let context = operation_context(&request, "alice");

        assert_eq!(context.username.as_deref(), Some("alice"));
        assert_eq!(context.correlation_id, Some(correlation_id));
        assert_eq!(context.client_ip, Some(addr.ip()));
    }

    #[test]
    fn test_operation_context_without_connect_info() {
        let request = Request::builder().body(Body::empty()).unwrap();

        let context = operation_context(&request, "bob");

        assert_eq!(context.username.as_deref(), Some("bob"));
        assert!(context.correlation_id.is_none());
        assert!(context.client_ip.is_none());
    }

    #[test]
    fn test_mask_headers_for_logging() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("authorization", "Bearer secret-token".parse().unwrap());
        headers.insert(CORRELATION_ID_HEADER, "req-123".parse().unwrap());

        let masked = mask_headers_for_logging(&headers);

        let auth = masked.iter().find(|(k, _)| k == "authorization");
        let content_type = masked.iter().find(|(k, _)| k == "content-type");
        let correlation = masked.iter().find(|(k, _)| k == CORRELATION_ID_HEADER);

        assert_eq!(auth.unwrap().1, "[REDACTED]");
        assert_eq!(content_type.unwrap().1, "application/json");
        assert_eq!(correlation.unwrap().1, "req-123");
    }

    #[test]
    fn test_correlation_id_parsing() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_ID_HEADER, id.to_string().parse().unwrap());
        assert_eq!(correlation_id(&headers), Some(id));

        headers.insert(CORRELATION_ID_HEADER, "not-a-uuid".parse().unwrap());
        assert_eq!(correlation_id(&headers), None);
    }
}
