use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SendGridError;

/// Required request fields, in the order they are reported when missing.
pub const REQUIRED_PARAMETERS: [&str; 5] = ["api_key", "to", "from", "subject", "content"];

/// An HTML email to send through the Mail Send API.
///
/// Recipient entries may be bare addresses (`user@example.com`) or display
/// form (`Name <user@example.com>`). Entries that hold no valid address are
/// dropped when the request is shaped into a payload.
///
/// # Examples
///
/// ```
/// use sendgrid_mail::{Attachment, EmailRequest};
///
/// let request = EmailRequest::new("SG.key", "sender@example.com", "Hello", "<p>Hi</p>")
///     .with_to("Jane Doe <jane@example.com>")
///     .with_cc("cc@example.com")
///     .with_attachment(Attachment::new("aGVsbG8=", "text/plain", "hello.txt"));
/// assert!(request.missing_parameters().is_empty());
/// assert_eq!(request.reply_to_address(), "sender@example.com");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailRequest {
    /// SendGrid API key, sent as a bearer token.
    pub api_key: String,

    /// Primary recipients.
    pub to: Vec<String>,

    /// Carbon-copy recipients.
    pub cc: Vec<String>,

    /// Blind carbon-copy recipients.
    pub bcc: Vec<String>,

    /// Sender address.
    pub from: String,

    /// Reply-to address. Falls back to `from` when absent or empty.
    pub reply_to: Option<String>,

    /// Subject line.
    pub subject: String,

    /// HTML body.
    pub content: String,

    /// Base64-encoded attachments.
    pub attachments: Vec<Attachment>,
}

impl std::fmt::Debug for EmailRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailRequest")
            .field("api_key", &"[REDACTED]")
            .field("to", &self.to)
            .field("cc", &self.cc)
            .field("bcc", &self.bcc)
            .field("from", &self.from)
            .field("reply_to", &self.reply_to)
            .field("subject", &self.subject)
            .field("content_len", &self.content.len())
            .field("attachments", &self.attachments.len())
            .finish()
    }
}

/// A single attachment, already base64 encoded by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Base64-encoded file content.
    pub content: String,

    /// MIME type, e.g. `application/pdf`.
    #[serde(rename = "type")]
    pub mime_type: String,

    /// File name shown to the recipient.
    pub filename: String,
}

impl Attachment {
    pub fn new(
        content: impl Into<String>,
        mime_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            mime_type: mime_type.into(),
            filename: filename.into(),
        }
    }

    /// `true` when content, type and filename are all non-empty.
    pub fn is_complete(&self) -> bool {
        !self.content.is_empty() && !self.mime_type.is_empty() && !self.filename.is_empty()
    }
}

impl EmailRequest {
    /// Create a request with the required scalar fields. At least one `to`
    /// recipient must still be added.
    pub fn new(
        api_key: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            from: from.into(),
            subject: subject.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Add a primary recipient.
    #[must_use]
    pub fn with_to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Add a carbon-copy recipient.
    #[must_use]
    pub fn with_cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Add a blind carbon-copy recipient.
    #[must_use]
    pub fn with_bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    /// Set the reply-to address.
    #[must_use]
    pub fn with_reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Append an attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// The effective reply-to address.
    pub fn reply_to_address(&self) -> &str {
        self.reply_to
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.from)
    }

    /// Names of the required fields that are empty, in reporting order.
    pub fn missing_parameters(&self) -> Vec<&'static str> {
        let empty = [
            self.api_key.is_empty(),
            self.to.is_empty(),
            self.from.is_empty(),
            self.subject.is_empty(),
            self.content.is_empty(),
        ];
        REQUIRED_PARAMETERS
            .into_iter()
            .zip(empty)
            .filter_map(|(name, is_empty)| is_empty.then_some(name))
            .collect()
    }

    /// Check required fields and attachments.
    pub fn validate(&self) -> Result<(), SendGridError> {
        let missing = self.missing_parameters();
        if !missing.is_empty() {
            return Err(SendGridError::MissingParameters(missing));
        }
        if !self.attachments.iter().all(Attachment::is_complete) {
            return Err(SendGridError::IncompleteAttachment);
        }
        Ok(())
    }

    /// Build a request from loosely-typed JSON.
    ///
    /// Checks run in this order: required fields, then the shape of `to`,
    /// `cc` and `bcc`, then attachments. Non-string entries in a recipient
    /// list are dropped the same way unparseable addresses are.
    ///
    /// # Examples
    ///
    /// ```
    /// use sendgrid_mail::EmailRequest;
    ///
    /// let err = EmailRequest::from_json(&serde_json::json!({
    ///     "api_key": "SG.key",
    ///     "to": "jane@example.com",
    ///     "from": "sender@example.com",
    ///     "subject": "Hi",
    ///     "content": "<p>Hi</p>"
    /// }))
    /// .unwrap_err();
    /// assert_eq!(err.to_string(), "'to' email address(es) must be specified in a list.");
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, SendGridError> {
        let fields = value.as_object().ok_or_else(|| {
            SendGridError::InvalidPayload("request must be a JSON object".into())
        })?;

        let missing: Vec<&'static str> = REQUIRED_PARAMETERS
            .into_iter()
            .filter(|name| fields.get(*name).is_none_or(is_blank))
            .collect();
        if !missing.is_empty() {
            return Err(SendGridError::MissingParameters(missing));
        }

        let to = address_list(fields, "to")?;
        let cc = address_list(fields, "cc")?;
        let bcc = address_list(fields, "bcc")?;

        let attachments = match fields.get("attachments") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(attachment_from_json)
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(SendGridError::AttachmentsNotAList),
        };

        Ok(Self {
            api_key: string_field(fields, "api_key")?,
            to,
            cc,
            bcc,
            from: string_field(fields, "from")?,
            reply_to: Some(string_field(fields, "reply_to")?).filter(|r| !r.is_empty()),
            subject: string_field(fields, "subject")?,
            content: string_field(fields, "content")?,
            attachments,
        })
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(true) | Value::Number(_) => false,
    }
}

fn string_field(fields: &Map<String, Value>, name: &str) -> Result<String, SendGridError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(SendGridError::InvalidPayload(format!(
            "'{name}' must be a string"
        ))),
    }
}

fn address_list(
    fields: &Map<String, Value>,
    name: &'static str,
) -> Result<Vec<String>, SendGridError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_owned))
            .collect()),
        Some(_) => Err(SendGridError::NotAList(name)),
    }
}

fn attachment_from_json(value: &Value) -> Result<Attachment, SendGridError> {
    let text = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .ok_or(SendGridError::IncompleteAttachment)
    };
    Ok(Attachment {
        content: text("content")?,
        mime_type: text("type")?,
        filename: text("filename")?,
    })
}
