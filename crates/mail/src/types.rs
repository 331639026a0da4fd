use serde::{Deserialize, Serialize};

use crate::error::SendGridError;

/// Message reported for an accepted request.
pub const SUCCESS_MESSAGE: &str = "Success!";

/// A request the API accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// HTTP status of the response, normally `202 Accepted`.
    pub status: u16,

    /// Value of the `X-Message-Id` response header, if present.
    pub message_id: Option<String>,
}

/// Normalized outcome of a send call.
///
/// Exactly one of success, validation error, transport error, or remote
/// error is reported per call. `status` is present whenever an HTTP
/// response was obtained.
///
/// # Examples
///
/// ```
/// use sendgrid_mail::EmailResult;
///
/// let result = EmailResult::success(202);
/// assert!(!result.error);
/// assert_eq!(result.message, "Success!");
/// assert_eq!(result.status, Some(202));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailResult {
    /// `true` when the email was not accepted.
    pub error: bool,

    /// Human-readable outcome or failure detail.
    pub message: String,

    /// HTTP status code, absent on validation and pure transport failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl EmailResult {
    pub fn success(status: u16) -> Self {
        Self {
            error: false,
            message: SUCCESS_MESSAGE.to_owned(),
            status: Some(status),
        }
    }

    pub fn is_success(&self) -> bool {
        !self.error
    }
}

impl From<SendGridError> for EmailResult {
    fn from(err: SendGridError) -> Self {
        Self {
            error: true,
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl From<Delivery> for EmailResult {
    fn from(delivery: Delivery) -> Self {
        Self::success(delivery.status)
    }
}

impl From<Result<Delivery, SendGridError>> for EmailResult {
    fn from(result: Result<Delivery, SendGridError>) -> Self {
        match result {
            Ok(delivery) => delivery.into(),
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_has_no_status() {
        let result: EmailResult = SendGridError::IncompleteAttachment.into();
        assert!(result.error);
        assert_eq!(result.status, None);
        assert_eq!(
            result.message,
            "Each attachment must include values for 'content', 'type', and 'filename'."
        );
    }

    #[test]
    fn api_error_keeps_status_and_message() {
        let result: EmailResult = Err::<Delivery, _>(SendGridError::Api {
            status: 401,
            message: "unauthorized".into(),
        })
        .into();
        assert_eq!(
            result,
            EmailResult {
                error: true,
                message: "unauthorized".into(),
                status: Some(401),
            }
        );
    }

    #[test]
    fn delivery_converts_to_success() {
        let result: EmailResult = Ok::<_, SendGridError>(Delivery {
            status: 202,
            message_id: Some("abc".into()),
        })
        .into();
        assert_eq!(result, EmailResult::success(202));
        assert!(result.is_success());
    }

    #[test]
    fn serialization_omits_missing_status() {
        let result: EmailResult = SendGridError::Cancelled.into();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({"error": true, "message": "request cancelled"})
        );
    }
}
