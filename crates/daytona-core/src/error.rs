//! Error types for daytona-core.

use thiserror::Error;

/// Result type alias for daytona-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while talking to the Daytona API.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The server rejected the credential (401/403).
    #[error("authentication failed ({status}): {message}")]
    Auth {
        /// HTTP status code
        status: u16,
        /// Response body returned by the server
        message: String,
    },

    /// Unknown sandbox or path (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-2xx response.
    #[error("remote error {status}: {body}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Response body, kept verbatim for diagnostics
        body: String,
    },

    /// Connection failure, timeout, or a broken response stream.
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed arguments, raised before any network call.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// A 2xx response whose body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CoreError {
    /// Stable, machine-readable name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::NotFound(_) => "not_found",
            Self::Remote { .. } => "remote",
            Self::Transport(_) => "transport",
            Self::Validation(_) => "validation",
            Self::Decode(_) => "decode",
        }
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Only transport failures qualify; the server's answers are final.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Map a non-success HTTP status and its body to an error.
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Auth {
                status,
                message: body,
            },
            404 => Self::NotFound(if body.is_empty() {
                "resource does not exist".to_string()
            } else {
                body
            }),
            _ => Self::Remote { status, body },
        }
    }
}

/// Reject an empty or blank argument before it reaches the network.
pub(crate) fn require<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        CoreError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            CoreError::from_status(401, String::new()),
            CoreError::Auth { status: 401, .. }
        ));
        assert!(matches!(
            CoreError::from_status(403, "forbidden".into()),
            CoreError::Auth { status: 403, .. }
        ));
        assert!(matches!(
            CoreError::from_status(404, "gone".into()),
            CoreError::NotFound(ref m) if m == "gone"
        ));
        match CoreError::from_status(500, "boom".into()) {
            CoreError::Remote { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_only_transport_is_transient() {
        assert!(CoreError::Transport("reset".into()).is_transient());
        assert!(!CoreError::from_status(503, String::new()).is_transient());
        assert!(!CoreError::from_status(404, String::new()).is_transient());
        assert!(!CoreError::Validation("empty".into()).is_transient());
    }

    #[test]
    fn test_require_trims_and_rejects_blank() {
        assert_eq!(require("  abc ", "sandbox_id").unwrap(), "abc");
        match require("   ", "sandbox_id") {
            Err(CoreError::Validation(msg)) => assert!(msg.contains("sandbox_id")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(CoreError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(CoreError::Validation("x".into()).kind(), "validation");
        assert_eq!(CoreError::from_status(418, String::new()).kind(), "remote");
    }
}
