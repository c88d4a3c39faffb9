use std::fmt;

use thiserror::Error;

use crate::models::ApplicationStatus;

/// Failures below the gateway: the request never produced usable data.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Request was not successful: {0}")]
    Unsuccessful(String),
}

/// Why a status change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDenial {
    /// The requested status is not one hop away from the current one.
    NotReachable,
    /// The current status is `rejected` or `hired`.
    Terminal,
    /// The actor is not the HR user who owns the job.
    NotJobOwner,
    /// The application belongs to a different job.
    JobMismatch,
}

impl fmt::Display for TransitionDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TransitionDenial::NotReachable => "not reachable in one step",
            TransitionDenial::Terminal => "current status is terminal",
            TransitionDenial::NotJobOwner => "only the job's HR owner may change status",
            TransitionDenial::JobMismatch => "application does not belong to this job",
        };
        f.write_str(text)
    }
}

/// Client-level error type shared by every component.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
        reason: TransitionDenial,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(TransportError::Http(err))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Transport(TransportError::Parse(err))
    }
}

impl ClientError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Auth(_) => "AUTH_ERROR",
            ClientError::Validation(_) => "VALIDATION_ERROR",
            ClientError::InvalidTransition { .. } => "INVALID_TRANSITION",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::NotFound(_) => "NOT_FOUND",
            ClientError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// Transport and storage details go to the log, not the screen.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Auth(msg) => msg.clone(),
            ClientError::Validation(msg) => msg.clone(),
            ClientError::InvalidTransition { from, to, reason } => format!(
                "Cannot move application from {} to {}: {reason}",
                from.label(),
                to.label()
            ),
            ClientError::NotFound(msg) => format!("Not found: {msg}"),
            ClientError::Transport(e) => {
                tracing::error!("Transport error: {e}");
                match e {
                    TransportError::Api { message, .. } | TransportError::Unsuccessful(message)
                        if !message.is_empty() =>
                    {
                        message.clone()
                    }
                    _ => "Could not reach the recruitment service".to_string(),
                }
            }
            ClientError::Storage(e) => {
                tracing::error!("Session storage error: {e}");
                "Could not access the local session store".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_names_both_statuses() {
        let err = ClientError::InvalidTransition {
            from: ApplicationStatus::Applied,
            to: ApplicationStatus::Hired,
            reason: TransitionDenial::NotReachable,
        };
        let text = err.to_string();
        assert!(text.contains("applied"), "{text}");
        assert!(text.contains("hired"), "{text}");
        assert_eq!(err.code(), "INVALID_TRANSITION");
    }

    #[test]
    fn test_transport_message_prefers_service_text() {
        let err = ClientError::Transport(TransportError::Unsuccessful("Job is closed".into()));
        assert_eq!(err.user_message(), "Job is closed");
    }

    #[test]
    fn test_parse_failures_hide_details() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ClientError::from(parse);
        assert_eq!(err.user_message(), "Could not reach the recruitment service");
    }
}
