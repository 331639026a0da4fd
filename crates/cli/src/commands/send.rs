use clap::Args;
use sendgrid_mail::{EmailRequest, EmailResult, SendGridClient};
use serde_json::Value;

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Full JSON request (string or @file path). Replaces the message flags.
    #[arg(
        long,
        conflicts_with_all = ["from", "to", "cc", "bcc", "reply_to", "subject", "html"]
    )]
    pub payload: Option<String>,
    /// Sender address.
    #[arg(long)]
    pub from: Option<String>,
    /// Recipient, `user@example.com` or `Name <user@example.com>`. Repeatable.
    #[arg(long)]
    pub to: Vec<String>,
    /// Carbon-copy recipient. Repeatable.
    #[arg(long)]
    pub cc: Vec<String>,
    /// Blind carbon-copy recipient. Repeatable.
    #[arg(long)]
    pub bcc: Vec<String>,
    /// Reply-to address (defaults to the sender).
    #[arg(long)]
    pub reply_to: Option<String>,
    /// Subject line.
    #[arg(long)]
    pub subject: Option<String>,
    /// HTML body (string or @file path).
    #[arg(long)]
    pub html: Option<String>,
    /// Request timeout in seconds, overriding the configuration file.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Read an argument that is either inline text or `@path`.
fn read_arg(raw: &str) -> anyhow::Result<String> {
    match raw.strip_prefix('@') {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(raw.to_owned()),
    }
}

fn request_from_flags(api_key: Option<&str>, args: &SendArgs) -> anyhow::Result<EmailRequest> {
    let content = args.html.as_deref().map(read_arg).transpose()?;
    Ok(EmailRequest {
        api_key: api_key.unwrap_or_default().to_owned(),
        to: args.to.clone(),
        cc: args.cc.clone(),
        bcc: args.bcc.clone(),
        from: args.from.clone().unwrap_or_default(),
        reply_to: args.reply_to.clone(),
        subject: args.subject.clone().unwrap_or_default(),
        content: content.unwrap_or_default(),
        attachments: Vec::new(),
    })
}

/// Fill in the API key from the command line when the payload has none.
fn with_api_key(mut value: Value, api_key: Option<&str>) -> Value {
    if let (Some(key), Some(fields)) = (api_key, value.as_object_mut()) {
        let has_key = fields
            .get("api_key")
            .and_then(Value::as_str)
            .is_some_and(|k| !k.is_empty());
        if !has_key {
            fields.insert("api_key".to_owned(), Value::String(key.to_owned()));
        }
    }
    value
}

fn render(result: &EmailResult, format: &OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Text => {
            let outcome = if result.error { "error" } else { "ok" };
            match result.status {
                Some(status) => format!("{outcome} ({status}): {}", result.message),
                None => format!("{outcome}: {}", result.message),
            }
        }
    })
}

pub async fn run(
    client: &SendGridClient,
    api_key: Option<&str>,
    args: &SendArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let request = match &args.payload {
        Some(raw) => {
            let value: Value = serde_json::from_str(&read_arg(raw)?)?;
            EmailRequest::from_json(&with_api_key(value, api_key))
        }
        None => Ok(request_from_flags(api_key, args)?),
    };

    let result = match request {
        Ok(request) => client.send(&request).await,
        Err(err) => err.into(),
    };

    println!("{}", render(&result, format)?);

    if result.error {
        std::process::exit(1);
    }
    Ok(())
}
