use reqwest::Client;
use reqwest::redirect::Policy;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::SendGridConfig;
use crate::error::SendGridError;
use crate::payload::{ErrorResponse, MailSendPayload};
use crate::request::EmailRequest;
use crate::types::{Delivery, EmailResult};

/// Response header carrying the id SendGrid assigned to an accepted message.
const MESSAGE_ID_HEADER: &str = "x-message-id";

/// Client for the SendGrid v3 Mail Send endpoint.
///
/// Holds only configuration and a `reqwest::Client`, so one instance can be
/// shared across tasks. Every call sends exactly one request and never
/// retries.
pub struct SendGridClient {
    config: SendGridConfig,
    client: Client,
}

impl std::fmt::Debug for SendGridClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SendGridClient {
    /// Create a client from the given configuration.
    ///
    /// Returns [`SendGridError::Configuration`] if the HTTP client cannot be
    /// built.
    pub fn new(config: SendGridConfig) -> Result<Self, SendGridError> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(if config.max_redirects == 0 {
                Policy::none()
            } else {
                Policy::limited(config.max_redirects)
            });

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        if config.danger_accept_invalid_certs {
            warn!("TLS certificate verification is disabled for SendGrid requests");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| SendGridError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create a client with a custom HTTP client.
    ///
    /// Timeout, redirect and TLS settings of `config` are not applied; the
    /// given client is used as is.
    pub fn with_client(config: SendGridConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &SendGridConfig {
        &self.config
    }

    /// Send `request` and normalize the outcome. Never fails.
    pub async fn send(&self, request: &EmailRequest) -> EmailResult {
        self.try_send(request).await.into()
    }

    /// Like [`send`](Self::send), but gives up as soon as `cancel` fires.
    pub async fn send_with_cancel(
        &self,
        request: &EmailRequest,
        cancel: &CancellationToken,
    ) -> EmailResult {
        self.try_send_with_cancel(request, cancel).await.into()
    }

    /// Send `request`, returning the typed error on failure.
    #[instrument(skip(self, request), fields(provider = "sendgrid", subject = %request.subject))]
    pub async fn try_send(&self, request: &EmailRequest) -> Result<Delivery, SendGridError> {
        let payload = MailSendPayload::build(request)?;
        self.post(&request.api_key, &payload).await
    }

    /// Like [`try_send`](Self::try_send), but resolves to
    /// [`SendGridError::Cancelled`] as soon as `cancel` fires.
    pub async fn try_send_with_cancel(
        &self,
        request: &EmailRequest,
        cancel: &CancellationToken,
    ) -> Result<Delivery, SendGridError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("mail send cancelled by caller");
                Err(SendGridError::Cancelled)
            }
            result = self.try_send(request) => result,
        }
    }

    /// Post a built payload to the Mail Send endpoint and interpret the
    /// response.
    async fn post(
        &self,
        api_key: &str,
        payload: &MailSendPayload,
    ) -> Result<Delivery, SendGridError> {
        let url = self.config.mail_send_url();
        let body = serde_json::to_vec(payload)
            .map_err(|e| SendGridError::InvalidPayload(format!("failed to serialize payload: {e}")))?;

        debug!(url = %url, bytes = body.len(), "posting mail send request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let message_id = response
            .headers()
            .get(MESSAGE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        // A status was obtained, so an unreadable body only loses the error
        // detail; the status checks below still apply.
        let text = response.text().await.unwrap_or_else(|e| {
            warn!(status, error = %e, "failed to read SendGrid response body");
            String::new()
        });

        if let Some(message) = ErrorResponse::first_message(&text) {
            warn!(status, error = %message, "SendGrid rejected the request");
            return Err(SendGridError::Api { status, message });
        }

        if !(200..300).contains(&status) {
            warn!(status, "SendGrid returned a non-success status");
            return Err(SendGridError::HttpStatus(status));
        }

        info!(status, message_id = message_id.as_deref().unwrap_or("-"), "email accepted");

        Ok(Delivery { status, message_id })
    }

    fn transport_error(&self, err: reqwest::Error) -> SendGridError {
        match self.config.timeout() {
            Some(timeout) if err.is_timeout() => {
                warn!(?timeout, "SendGrid request timed out");
                SendGridError::Timeout(timeout)
            }
            _ => {
                warn!(error = %err, "SendGrid request failed");
                SendGridError::Transport(err)
            }
        }
    }
}

/// Send `request` with the default configuration.
///
/// Builds a fresh client per call. Prefer a shared [`SendGridClient`] when
/// sending more than one email.
pub async fn send(request: &EmailRequest) -> EmailResult {
    match SendGridClient::new(SendGridConfig::default()) {
        Ok(client) => client.send(request).await,
        Err(err) => err.into(),
    }
}
