//! Error types for lineage emission and transport configuration

use thiserror::Error;

/// Errors raised while emitting a batch of lineage events.
///
/// These never leave the crate through [`crate::transport::Transport::emit`];
/// the transport logs and drops them.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("Timeout emitting events to {endpoint}")]
    Timeout {
        endpoint: String,
        #[source]
        source: ureq::Error,
    },
    #[error("Connection error emitting events to {endpoint}: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: ureq::Error,
    },
    #[error("Rate limited by Correlator")]
    RateLimited,
    #[error("Event rejected by Correlator ({status}): {body}")]
    ClientRejection { status: u16, body: String },
    #[error("Correlator returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("HTTP error emitting events to {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: ureq::Error,
    },
    #[error("failed to serialize lineage events: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl EmitError {
    /// Whether a caller-side retry could plausibly succeed.
    ///
    /// Nothing in this crate retries; the flag only informs callers that own a retry policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            EmitError::Timeout { .. } | EmitError::Connection { .. } | EmitError::RateLimited => true,
            EmitError::Server { status, .. } => *status >= 500,
            EmitError::ClientRejection { .. } | EmitError::Http { .. } | EmitError::Serialize(_) => false,
        }
    }

    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            EmitError::RateLimited => Some(429),
            EmitError::ClientRejection { status, .. } | EmitError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while resolving transport configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid transport configuration: {0}")]
    InvalidValue(#[source] serde_json::Error),
    #[error("unknown transport type `{kind}` (known: {known})")]
    UnknownTransport { kind: String, known: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejection_message_embeds_status_and_body() {
        let err = EmitError::ClientRejection {
            status: 400,
            body: r#"{"error":"Invalid JSON"}"#.to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("Invalid JSON"));
    }

    #[test]
    fn test_rate_limited_is_distinct() {
        let err = EmitError::RateLimited;
        assert_eq!(err.to_string(), "Rate limited by Correlator");
        assert_eq!(err.status(), Some(429));
        assert!(!matches!(err, EmitError::ClientRejection { .. }));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(EmitError::RateLimited.is_retryable());
        assert!(
            EmitError::Server {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !EmitError::Server {
                status: 302,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !EmitError::ClientRejection {
                status: 422,
                body: String::new()
            }
            .is_retryable()
        );
    }
}
