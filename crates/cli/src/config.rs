use std::path::Path;

use anyhow::Context;
use sendgrid_mail::SendGridConfig;
use tracing::debug;

/// Load the client configuration from a TOML file, or fall back to the
/// defaults when no file is given.
pub fn load(path: Option<&Path>) -> anyhow::Result<SendGridConfig> {
    let Some(path) = path else {
        return Ok(SendGridConfig::default());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = parse(&raw).with_context(|| format!("invalid config file {}", path.display()))?;

    debug!(path = %path.display(), ?config, "loaded client configuration");
    Ok(config)
}

fn parse(raw: &str) -> anyhow::Result<SendGridConfig> {
    Ok(toml::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_gives_defaults() {
        assert_eq!(load(None).unwrap(), SendGridConfig::default());
    }

    #[test]
    fn parses_partial_toml() {
        let config = parse(
            r#"
            api_base_url = "http://localhost:3030"
            timeout_secs = 5
            max_redirects = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:3030");
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.max_redirects, 0);
        assert!(!config.danger_accept_invalid_certs);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(parse("").unwrap(), SendGridConfig::default());
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(parse("timeout_secs = \"soon\"").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/sendgrid.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
