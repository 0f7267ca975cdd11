use serde::Deserialize;
use thiserror::Error;

use crate::auth::SessionKind;

/// Server phrases that mark a 401 as a rejected session rather than a
/// plain authorization failure.
const SESSION_EXPIRED: &str = "Api session expired";
const SESSION_INVALID: &str = "Invalid session";

#[derive(Error, Debug)]
pub enum ApiError {
    /// The authenticate endpoint declared a session type other than the
    /// one requested. Fatal: retrying would only repeat the mismatch.
    #[error("expected {expected} session from authentication, got {got:?}")]
    ProtocolMismatch { expected: SessionKind, got: String },

    /// The server rejected a freshly issued session. One retry is all
    /// the protocol allows.
    #[error("api session expired twice")]
    SessionExpiredTwice,

    /// Any other non-success response, by numeric status.
    #[error("API request failed with status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success or authenticate response whose body could not be
    /// understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Error payload the API attaches to 400 and 401 responses. Parsed
/// tolerantly: any unknown shape reads as all-absent.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub user_error: Option<String>,
    #[serde(default)]
    pub api_error: Option<String>,
    #[serde(default)]
    pub api_errors: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// Whether the server reported the presented session as expired or
    /// invalid.
    pub fn is_session_rejection(&self) -> bool {
        matches!(
            self.error.as_deref(),
            Some(SESSION_EXPIRED) | Some(SESSION_INVALID)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_and_invalid_phrases_are_session_rejections() {
        assert!(ErrorBody::parse(r#"{"error":"Api session expired"}"#).is_session_rejection());
        assert!(ErrorBody::parse(r#"{"error":"Invalid session"}"#).is_session_rejection());
        assert!(!ErrorBody::parse(r#"{"error":"Not authorized"}"#).is_session_rejection());
        assert!(!ErrorBody::parse(r#"{}"#).is_session_rejection());
    }

    #[test]
    fn bad_request_message_variants_parse() {
        let single = ErrorBody::parse(r#"{"user_error":"Name is taken"}"#);
        assert_eq!(single.user_error.as_deref(), Some("Name is taken"));

        let api = ErrorBody::parse(r#"{"api_error":"Invalid plugin id"}"#);
        assert_eq!(api.api_error.as_deref(), Some("Invalid plugin id"));

        let many = ErrorBody::parse(r#"{"api_errors":["bad owner","bad slug"]}"#);
        assert_eq!(
            many.api_errors.as_deref(),
            Some(["bad owner".to_string(), "bad slug".to_string()].as_slice())
        );
    }

    #[test]
    fn garbage_bodies_parse_to_nothing() {
        let body = ErrorBody::parse("<html>504 Gateway Timeout</html>");
        assert!(body.error.is_none());
        assert!(!body.is_session_rejection());
    }
}
