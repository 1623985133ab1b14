//! Splitting header mailboxes into display name and bare address.

use lettre::Address;

use crate::error::{MailError, Result};

/// A mailbox as written in a header, borrowed from the original text.
///
/// # Examples
/// - `"Juan García <juan@ejemplo.com>"` → `display_name = "Juan García"`, `address = "juan@ejemplo.com"`
/// - `"user@example.com"` → `display_name = ""`, `address = "user@example.com"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxRef<'a> {
    /// Display name with surrounding quotes removed (may be empty).
    pub display_name: &'a str,
    /// The bare `user@domain` part.
    pub address: &'a str,
}

impl<'a> MailboxRef<'a> {
    /// Split `"Name <addr>"`, `"<addr>"` or a bare `addr`.
    ///
    /// Anything that does not look like `Name <addr>` is taken as a bare
    /// address; validation is left to [`to_envelope_address`].
    pub fn parse(raw: &'a str) -> Self {
        let trimmed = raw.trim();

        if let (Some(open), Some(close)) = (trimmed.rfind('<'), trimmed.rfind('>')) {
            if close > open {
                return Self {
                    display_name: strip_quotes(&trimmed[..open]),
                    address: trimmed[open + 1..close].trim(),
                };
            }
        }

        Self {
            display_name: "",
            address: trimmed,
        }
    }
}

/// Parse the bare address of a header mailbox into an SMTP envelope address.
pub fn to_envelope_address(raw: &str) -> Result<Address> {
    let bare = MailboxRef::parse(raw).address;
    bare.parse::<Address>()
        .map_err(|source| MailError::InvalidAddress {
            address: raw.to_string(),
            source,
        })
}

fn strip_quotes(s: &str) -> &str {
    let trimmed = s.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare() {
        let m = MailboxRef::parse("  user@example.com ");
        assert_eq!(m.display_name, "");
        assert_eq!(m.address, "user@example.com");
    }

    #[test]
    fn test_parse_named() {
        let m = MailboxRef::parse("Juan García <juan@ejemplo.com>");
        assert_eq!(m.display_name, "Juan García");
        assert_eq!(m.address, "juan@ejemplo.com");
    }

    #[test]
    fn test_parse_quoted_name() {
        let m = MailboxRef::parse("\"Doe, John\" <john@example.com>");
        assert_eq!(m.display_name, "Doe, John");
        assert_eq!(m.address, "john@example.com");
    }

    #[test]
    fn test_parse_angle_only() {
        let m = MailboxRef::parse("<a@b.com>");
        assert_eq!(m.display_name, "");
        assert_eq!(m.address, "a@b.com");
    }

    #[test]
    fn test_envelope_address() {
        let addr = to_envelope_address("Alice <alice@example.com>").unwrap();
        assert_eq!(addr.to_string(), "alice@example.com");
        assert!(to_envelope_address("no-at-sign").is_err());
        assert!(to_envelope_address("").is_err());
    }
}
