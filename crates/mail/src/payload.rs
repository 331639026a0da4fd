use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::{Recipient, normalize_list};
use crate::error::SendGridError;
use crate::request::{Attachment, EmailRequest};

/// MIME type of the single content block every message carries.
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// JSON body of a `POST /v3/mail/send` request.
///
/// Empty recipient lists and an empty attachment list are left out of the
/// serialized body because the API rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailSendPayload {
    pub personalizations: Vec<Personalization>,
    pub from: EmailAddress,
    pub reply_to: EmailAddress,
    pub subject: String,
    pub content: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Personalization {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<Recipient>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<Recipient>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<Recipient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailAddress {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

impl MailSendPayload {
    /// Validate `request` and shape it into the Mail Send body.
    pub fn build(request: &EmailRequest) -> Result<Self, SendGridError> {
        request.validate()?;

        let personalization = Personalization {
            to: normalize_list("to", &request.to),
            cc: normalize_list("cc", &request.cc),
            bcc: normalize_list("bcc", &request.bcc),
        };

        debug!(
            to = personalization.to.len(),
            cc = personalization.cc.len(),
            bcc = personalization.bcc.len(),
            attachments = request.attachments.len(),
            "built mail send payload"
        );

        Ok(Self {
            personalizations: vec![personalization],
            from: EmailAddress {
                email: request.from.clone(),
            },
            reply_to: EmailAddress {
                email: request.reply_to_address().to_owned(),
            },
            subject: request.subject.clone(),
            content: vec![Content {
                content_type: HTML_CONTENT_TYPE.to_owned(),
                value: request.content.clone(),
            }],
            attachments: request.attachments.clone(),
        })
    }
}

/// Error body returned by the API, e.g.
/// `{"errors":[{"message":"...","field":"...","help":null}]}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEntry {
    #[serde(default)]
    pub message: serde_json::Value,
}

impl ErrorResponse {
    /// The first non-empty error message in a response body, if the body
    /// is JSON and carries one. Non-string scalars are rendered as text.
    pub(crate) fn first_message(body: &str) -> Option<String> {
        let response: Self = serde_json::from_str(body).ok()?;
        let message = response.errors.into_iter().next()?.message;
        match message {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Number(n) if n.as_i64() != Some(0) => Some(n.to_string()),
            serde_json::Value::Bool(true) => Some("true".to_owned()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn base_request() -> EmailRequest {
        EmailRequest::new(
            "SG.key",
            "sender@example.com",
            "My First Email",
            "Hello <strong>World</strong>!",
        )
    }

    #[test]
    fn minimal_payload_shape() {
        let request = base_request().with_to("jane.doe@example.com");
        let payload = MailSendPayload::build(&request).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "personalizations": [{"to": [{"email": "jane.doe@example.com"}]}],
                "from": {"email": "sender@example.com"},
                "reply_to": {"email": "sender@example.com"},
                "subject": "My First Email",
                "content": [{"type": "text/html", "value": "Hello <strong>World</strong>!"}]
            })
        );
    }

    #[test]
    fn full_payload_shape() {
        let request = base_request()
            .with_to("jane.doe@example.com")
            .with_to("John Doe <john.doe@example.com>")
            .with_cc("George Washington <g.washington@example.com>")
            .with_cc("abraham.lincoln@example.com")
            .with_bcc("Alexander Hamilton <a.hamilton@example.com>")
            .with_reply_to("replies@example.com")
            .with_attachment(Attachment::new("QQ==", "text/plain", "attachment1.txt"))
            .with_attachment(Attachment::new("Qg==", "text/plain", "attachment2.txt"));

        let payload = MailSendPayload::build(&request).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "personalizations": [{
                    "to": [
                        {"email": "jane.doe@example.com"},
                        {"email": "john.doe@example.com", "name": "John Doe"}
                    ],
                    "cc": [
                        {"email": "g.washington@example.com", "name": "George Washington"},
                        {"email": "abraham.lincoln@example.com"}
                    ],
                    "bcc": [
                        {"email": "a.hamilton@example.com", "name": "Alexander Hamilton"}
                    ]
                }],
                "from": {"email": "sender@example.com"},
                "reply_to": {"email": "replies@example.com"},
                "subject": "My First Email",
                "content": [{"type": "text/html", "value": "Hello <strong>World</strong>!"}],
                "attachments": [
                    {"content": "QQ==", "type": "text/plain", "filename": "attachment1.txt"},
                    {"content": "Qg==", "type": "text/plain", "filename": "attachment2.txt"}
                ]
            })
        );
    }

    #[test]
    fn lists_empty_after_filtering_are_omitted() {
        let request = base_request()
            .with_to("a@example.com")
            .with_cc("not-an-email")
            .with_bcc("");
        let value = serde_json::to_value(MailSendPayload::build(&request).unwrap()).unwrap();
        let personalization = &value["personalizations"][0];
        assert!(personalization.get("cc").is_none());
        assert!(personalization.get("bcc").is_none());
        assert!(value.get("attachments").is_none());
    }

    #[test]
    fn unparseable_to_entries_are_dropped() {
        let request = base_request()
            .with_to("not-an-email")
            .with_to("Jane Doe <jane@example.com>");
        let payload = MailSendPayload::build(&request).unwrap();
        assert_eq!(
            payload.personalizations[0].to,
            vec![Recipient {
                email: "jane@example.com".into(),
                name: Some("Jane Doe".into()),
            }]
        );
    }

    #[test]
    fn build_is_deterministic() {
        let request = base_request()
            .with_to("a@example.com")
            .with_cc("B <b@example.com>");
        let first = serde_json::to_string(&MailSendPayload::build(&request).unwrap()).unwrap();
        let second = serde_json::to_string(&MailSendPayload::build(&request).unwrap()).unwrap();
        assert_eq!(first, second);
        assert!(!first.contains("SG.key"));
    }

    #[test]
    fn build_validates_first() {
        let request = base_request();
        let err = MailSendPayload::build(&request).unwrap_err();
        assert!(matches!(err, SendGridError::MissingParameters(_)));
    }

    #[test]
    fn error_response_first_message() {
        assert_eq!(
            ErrorResponse::first_message(r#"{"errors":[{"message":"unauthorized"}]}"#),
            Some("unauthorized".to_owned())
        );
        assert_eq!(
            ErrorResponse::first_message(
                r#"{"errors":[{"message":"bad from","field":"from.email","help":null},{"message":"second"}]}"#
            ),
            Some("bad from".to_owned())
        );
        assert_eq!(ErrorResponse::first_message(""), None);
        assert_eq!(ErrorResponse::first_message("not json"), None);
        assert_eq!(ErrorResponse::first_message(r#"{"errors":[]}"#), None);
        assert_eq!(ErrorResponse::first_message(r#"{"errors":[{"message":""}]}"#), None);
        assert_eq!(ErrorResponse::first_message(r#"{"ok":true}"#), None);
    }

    #[test]
    fn error_response_non_string_message() {
        assert_eq!(
            ErrorResponse::first_message(r#"{"errors":[{"message":500}]}"#),
            Some("500".to_owned())
        );
        assert_eq!(
            ErrorResponse::first_message(r#"{"errors":[{"message":true}]}"#),
            Some("true".to_owned())
        );
        assert_eq!(ErrorResponse::first_message(r#"{"errors":[{"message":0}]}"#), None);
        assert_eq!(ErrorResponse::first_message(r#"{"errors":[{"message":null}]}"#), None);
        assert_eq!(ErrorResponse::first_message(r#"{"errors":[{"field":"from"}]}"#), None);
    }
}
