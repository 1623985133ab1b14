//! Centralized error types for hashmail.

use lettre::address::AddressError;
use thiserror::Error;

/// A message could not be delivered.
///
/// Every variant renders as `unable to send message: <cause>` and keeps the
/// underlying failure reachable through [`std::error::Error::source`].
#[derive(Error, Debug)]
pub enum MailError {
    /// A sender or recipient could not be turned into an SMTP envelope address.
    #[error("unable to send message: invalid address '{address}': {source}")]
    InvalidAddress {
        address: String,
        source: AddressError,
    },

    /// The SMTP envelope could not be built (for example, no recipients).
    #[error("unable to send message: {0}")]
    Envelope(#[source] lettre::error::Error),

    /// The transport failed: DNS, connect, TLS, authentication, or a
    /// rejection by the server.
    #[error("unable to send message: {0}")]
    Transport(#[source] lettre::transport::smtp::Error),
}

/// Convenience alias for `Result<T, MailError>`.
pub type Result<T> = std::result::Result<T, MailError>;

/// Coarse classification of a [`MailError`], for callers that need to decide
/// whether a retry makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Malformed sender or recipient, or an empty recipient list.
    Address,
    /// TLS handshake or certificate failure.
    Tls,
    /// A network operation exceeded the configured timeout.
    Timeout,
    /// The server answered with a permanent (5xx) error, e.g. bad credentials.
    Rejected,
    /// The server answered with a transient (4xx) error.
    Transient,
    /// The exchange broke down on the client side or with an unexpected reply.
    Protocol,
    /// The server could not be reached or the connection dropped.
    Connection,
}

impl MailError {
    /// Classify the underlying failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidAddress { .. } | Self::Envelope(_) => FailureKind::Address,
            Self::Transport(e) => {
                if e.is_timeout() {
                    FailureKind::Timeout
                } else if e.is_tls() {
                    FailureKind::Tls
                } else if e.is_permanent() {
                    FailureKind::Rejected
                } else if e.is_transient() {
                    FailureKind::Transient
                } else if e.is_client() || e.is_response() {
                    FailureKind::Protocol
                } else {
                    FailureKind::Connection
                }
            }
        }
    }

    /// Whether sending the same message again later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::Timeout | FailureKind::Transient | FailureKind::Connection
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_address_message() {
        let source = "not an address"
            .parse::<lettre::Address>()
            .expect_err("should not parse");
        let err = MailError::InvalidAddress {
            address: "not an address".to_string(),
            source,
        };
        let text = err.to_string();
        assert!(text.starts_with("unable to send message: "), "{text}");
        assert!(text.contains("not an address"));
        assert_eq!(err.kind(), FailureKind::Address);
        assert!(!err.is_retryable());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_envelope_error_message() {
        let err = MailError::Envelope(
            lettre::address::Envelope::new(None, Vec::new()).expect_err("no recipients"),
        );
        assert!(err.to_string().starts_with("unable to send message: "));
        assert_eq!(err.kind(), FailureKind::Address);
    }
}
