use lettre::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single recipient entry as it appears in a SendGrid personalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// The bare email address.
    pub email: String,

    /// Display name, present only when one was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Recipient {
    /// Parse `user@example.com` or `Display Name <user@example.com>`.
    ///
    /// Returns `None` when the entry holds no valid address. Entries with
    /// more than one `<` or `>`, or with the brackets out of order, are
    /// rejected rather than guessed at.
    ///
    /// # Examples
    ///
    /// ```
    /// use sendgrid_mail::Recipient;
    ///
    /// let r = Recipient::parse("Jane Doe <jane@example.com>").unwrap();
    /// assert_eq!(r.email, "jane@example.com");
    /// assert_eq!(r.name.as_deref(), Some("Jane Doe"));
    ///
    /// assert!(Recipient::parse("not-an-email").is_none());
    /// ```
    pub fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        if is_valid_email(entry) {
            return Some(Self {
                email: entry.to_owned(),
                name: None,
            });
        }

        if entry.matches('<').count() != 1 || entry.matches('>').count() != 1 {
            return None;
        }
        let open = entry.find('<')?;
        let close = entry.find('>')?;
        if close < open {
            return None;
        }

        let email = entry[open + 1..close].trim();
        if !is_valid_email(email) {
            return None;
        }

        let name = [entry[..open].trim(), entry[close + 1..].trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Some(Self {
            email: email.to_owned(),
            name: (!name.is_empty()).then_some(name),
        })
    }
}

/// Check address syntax with `lettre`'s RFC 5321 address parser.
pub fn is_valid_email(candidate: &str) -> bool {
    candidate.parse::<Address>().is_ok()
}

/// Parse every non-empty entry of a recipient list, silently dropping the
/// ones that hold no valid address.
pub(crate) fn normalize_list(field: &'static str, entries: &[String]) -> Vec<Recipient> {
    entries
        .iter()
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let parsed = Recipient::parse(entry);
            if parsed.is_none() {
                debug!(field, entry = %entry, "dropping unparseable address");
            }
            parsed
        })
        .collect()
}
