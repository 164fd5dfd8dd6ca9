use thiserror::Error;

/// Failure of a refresh exchange.
///
/// Every caller queued behind the exchange receives its own copy of the same
/// outcome, so this type is `Clone` and carries no transport handles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Refresh token rejected (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Refresh request failed: {0}")]
    Transport(String),

    #[error("Refresh response did not contain an access token")]
    MissingAccessToken,

    #[error("Token refresh was abandoned before it completed")]
    Abandoned,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Not logged in - run `shopadmin login` first")]
    NotAuthenticated,

    #[error("Session expired: {0}")]
    Refresh(#[from] AuthError),

    #[error("Session storage error: {0:#}")]
    Storage(#[from] anyhow::Error),

    #[error("Invalid input: {0}")]
    Validation(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Pull the `detail` message out of a DRF-style error body, falling back
    /// to the (truncated) raw body.
    pub(crate) fn detail_message(body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("detail")
                    .or_else(|| v.get("message"))
                    .and_then(|d| d.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| Self::truncate_body(body))
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::detail_message(body);
        match status.as_u16() {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            405 => ApiError::MethodNotAllowed(message),
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    /// True for errors that end the local session.
    pub fn is_session_terminal(&self) -> bool {
        matches!(
            self,
            ApiError::Refresh(_) | ApiError::NotAuthenticated | ApiError::Unauthorized(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_extracts_detail() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"detail": "Order not found"}"#);
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "Order not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope"),
            ApiError::AccessDenied(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::METHOD_NOT_ALLOWED, r#"{"detail":"Cannot modify static product"}"#),
            ApiError::MethodNotAllowed(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, ""),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(800);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.contains("800 total bytes"));

        // Never split a multi-byte character
        let wide = "é".repeat(400);
        let truncated = ApiError::truncate_body(&wide);
        assert!(truncated.contains("800 total bytes"));
    }
}
