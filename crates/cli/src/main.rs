//! SendGrid mail CLI
//!
//! Sends a single transactional HTML email through the SendGrid Mail Send API.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sendgrid_mail::SendGridClient;
use tracing_subscriber::{EnvFilter, fmt};

/// Send transactional email through SendGrid.
#[derive(Parser, Debug)]
#[command(name = "sendgrid-mail", version, about)]
struct Cli {
    /// Path to a TOML client configuration file.
    #[arg(long, env = "SENDGRID_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// SendGrid API key.
    #[arg(long, env = "SENDGRID_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send an HTML email.
    Send(commands::send::SendArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut client_config = config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Send(args) => {
            if let Some(secs) = args.timeout_secs {
                client_config = client_config.with_timeout_secs(secs);
            }
            let client = SendGridClient::new(client_config)?;
            commands::send::run(&client, cli.api_key.as_deref(), &args, &cli.format).await
        }
    }
}
