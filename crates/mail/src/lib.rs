//! Send transactional HTML email through the SendGrid v3 Mail Send API.
//!
//! A request is validated, shaped into the Mail Send JSON body, posted once
//! with a bearer token, and the outcome is normalized into an
//! [`EmailResult`]. Recipients may be given as `user@example.com` or
//! `Name <user@example.com>`.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use sendgrid_mail::{Attachment, EmailRequest, SendGridClient, SendGridConfig};
//!
//! # async fn run() -> Result<(), sendgrid_mail::SendGridError> {
//! let client = SendGridClient::new(SendGridConfig::default().with_timeout_secs(15))?;
//!
//! let request = EmailRequest::new("SG.api-key", "sender@example.com", "My First Email", "Hello <strong>World</strong>!")
//!     .with_to("jane.doe@example.com")
//!     .with_to("John Doe <john.doe@example.com>")
//!     .with_bcc("Alexander Hamilton <a.hamilton@example.com>")
//!     .with_attachment(Attachment::new("SGVsbG8=", "text/plain", "attachment1.txt"));
//!
//! let result = client.send(&request).await;
//! if result.error {
//!     eprintln!("send failed ({:?}): {}", result.status, result.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod request;
pub mod types;

pub use address::Recipient;
pub use client::{SendGridClient, send};
pub use config::SendGridConfig;
pub use error::SendGridError;
pub use payload::MailSendPayload;
pub use request::{Attachment, EmailRequest};
pub use types::{Delivery, EmailResult};

// Re-exported so callers do not need a direct tokio-util dependency.
pub use tokio_util::sync::CancellationToken;
