use std::time::Duration;

use thiserror::Error;

/// Errors produced while validating, shaping, or delivering a mail send
/// request.
///
/// These are the internal errors of the crate. At the public
/// [`send`](crate::SendGridClient::send) boundary they are converted into an
/// [`EmailResult`](crate::EmailResult) so callers always get a value back.
#[derive(Debug, Error)]
pub enum SendGridError {
    /// One or more required request fields are missing or empty. Field names
    /// are listed in the fixed order `api_key, to, from, subject, content`.
    #[error("The following required parameters are missing: {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    /// A recipient field (`to`, `cc` or `bcc`) was present but not a list.
    #[error("'{0}' email address(es) must be specified in a list.")]
    NotAList(&'static str),

    /// The `attachments` field was present but not a list.
    #[error("Attachments must be specified in a list.")]
    AttachmentsNotAList,

    /// An attachment is missing its content, MIME type, or filename.
    #[error("Each attachment must include values for 'content', 'type', and 'filename'.")]
    IncompleteAttachment,

    /// The request payload has an invalid structure.
    #[error("invalid request payload: {0}")]
    InvalidPayload(String),

    /// The HTTP client could not be built from the configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The HTTP request failed before a response was obtained.
    #[error("HTTP transport failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// No response arrived within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the request before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// The API answered with a status outside `200..=299` and no error body.
    #[error("Error: see status for HTTP code.")]
    HttpStatus(u16),

    /// The API answered with an `errors[0].message` in its response body.
    #[error("{message}")]
    Api { status: u16, message: String },
}

impl SendGridError {
    /// HTTP status associated with this error, if a response (or a
    /// status-bearing transport error) was obtained.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::HttpStatus(status) | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for errors raised before any network activity.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingParameters(_)
                | Self::NotAList(_)
                | Self::AttachmentsNotAList
                | Self::IncompleteAttachment
                | Self::InvalidPayload(_)
        )
    }

    /// Returns `true` if the failure is transient and the same request may
    /// succeed if sent again. The crate never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::HttpStatus(status) | Self::Api { status, .. } => {
                *status == 429 || (500..600).contains(status)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameters_lists_fields_in_order() {
        let err = SendGridError::MissingParameters(vec!["api_key", "subject"]);
        assert_eq!(
            err.to_string(),
            "The following required parameters are missing: api_key, subject"
        );
        assert!(err.is_validation());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn not_a_list_names_the_field() {
        let err = SendGridError::NotAList("cc");
        assert_eq!(
            err.to_string(),
            "'cc' email address(es) must be specified in a list."
        );
        assert!(err.is_validation());
    }

    #[test]
    fn http_status_carries_status() {
        let err = SendGridError::HttpStatus(503);
        assert_eq!(err.to_string(), "Error: see status for HTTP code.");
        assert_eq!(err.status(), Some(503));
        assert!(err.is_retryable());
        assert!(!err.is_validation());
    }

    #[test]
    fn api_error_displays_remote_message() {
        let err = SendGridError::Api {
            status: 401,
            message: "unauthorized".into(),
        };
        assert_eq!(err.to_string(), "unauthorized");
        assert_eq!(err.status(), Some(401));
        assert!(!err.is_retryable());
    }

    #[test]
    fn rate_limit_is_retryable() {
        let err = SendGridError::Api {
            status: 429,
            message: "too many requests".into(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn timeout_and_cancel() {
        let err = SendGridError::Timeout(Duration::from_millis(500));
        assert_eq!(err.to_string(), "request timed out after 500ms");
        assert!(err.is_retryable());
        assert_eq!(err.status(), None);

        let err = SendGridError::Cancelled;
        assert!(!err.is_retryable());
        assert!(!err.is_validation());
    }
}
