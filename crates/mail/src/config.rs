use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default SendGrid API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.sendgrid.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum number of redirects followed per request.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Configuration for the [`SendGridClient`](crate::SendGridClient).
///
/// Every field has a default, so a partial TOML or JSON document
/// deserializes into a usable configuration.
///
/// # Examples
///
/// ```
/// use sendgrid_mail::SendGridConfig;
///
/// let config = SendGridConfig::default().with_timeout_secs(10);
/// assert_eq!(config.api_base_url, "https://api.sendgrid.com");
/// assert_eq!(config.timeout().map(|t| t.as_secs()), Some(10));
/// assert!(!config.danger_accept_invalid_certs);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendGridConfig {
    /// Base URL for the SendGrid API. Override this for testing against a
    /// mock server.
    pub api_base_url: String,

    /// Request timeout in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,

    /// Maximum number of redirects to follow. `0` disables redirects.
    pub max_redirects: usize,

    /// Skip TLS certificate verification. Never enable this outside of
    /// local testing.
    pub danger_accept_invalid_certs: bool,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for SendGridConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            danger_accept_invalid_certs: false,
            user_agent: concat!("sendgrid-mail/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl SendGridConfig {
    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Remove the request timeout entirely.
    #[must_use]
    pub fn without_timeout(mut self) -> Self {
        self.timeout_secs = None;
        self
    }

    /// Set the maximum number of redirects to follow.
    #[must_use]
    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Opt in to skipping TLS certificate verification.
    #[must_use]
    pub fn with_danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.danger_accept_invalid_certs = accept;
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The configured timeout as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Full URL of the Mail Send endpoint.
    pub fn mail_send_url(&self) -> String {
        format!(
            "{}/v3/mail/send",
            self.api_base_url.trim_end_matches('/')
        )
    }
}
