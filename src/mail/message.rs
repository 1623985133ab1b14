//! Outbound message description and its RFC 5322 rendering.

use chrono::{DateTime, Utc};
use lettre::address::Envelope;
use serde::{Deserialize, Serialize};

use super::address::to_envelope_address;
use super::encoding::{encode_body, encode_header_text, encode_mailbox};
use crate::error::{MailError, Result};

/// Separator between recipients in the `To` header.
pub const RECIPIENT_SEPARATOR: &str = ";";

/// Preferred header line length (RFC 5322 §2.1.1); the hard limit is 998.
const MAX_LINE_LEN: usize = 78;

/// A single outbound email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    /// Sender, written verbatim into the `From` header.
    pub from: String,
    /// Recipients, joined with `;` into one `To` header value.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body. Takes precedence over `body_html` when non-empty.
    pub body_text: String,
    /// HTML body, used only when `body_text` is empty.
    pub body_html: String,
}

/// The one body representation that is actually transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body<'a> {
    Text(&'a str),
    Html(&'a str),
}

impl Body<'_> {
    /// MIME type without parameters.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Body::Text(_) => "text/plain",
            Body::Html(_) => "text/html",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Body::Text(s) | Body::Html(s) => s,
        }
    }
}

impl Message {
    /// Select the body: plain text if non-empty, HTML otherwise (even if empty).
    pub fn body(&self) -> Body<'_> {
        if self.body_text.is_empty() {
            Body::Html(&self.body_html)
        } else {
            Body::Text(&self.body_text)
        }
    }

    /// Value of the `To` header.
    pub fn to_header(&self) -> String {
        self.to.join(RECIPIENT_SEPARATOR)
    }

    /// Header fields in wire order, values already encoded for transmission.
    pub fn headers(&self, date: DateTime<Utc>) -> Vec<(&'static str, String)> {
        let to = fold_recipients(self.to.iter().map(|r| encode_mailbox(r)), "To: ".len());

        vec![
            ("From", encode_mailbox(&self.from).into_owned()),
            ("To", to),
            ("Subject", encode_header_text(&self.subject).into_owned()),
            ("Date", date.to_rfc2822()),
            ("MIME-Version", "1.0".to_string()),
            (
                "Content-Type",
                format!("{}; charset=UTF-8", self.body().mime_type()),
            ),
            ("Content-Transfer-Encoding", "quoted-printable".to_string()),
        ]
    }

    /// Render the complete message (headers, blank line, encoded body) with CRLF line endings.
    ///
    /// The terminating CRLF before the SMTP end-of-data marker is added by the transport.
    pub fn format(&self, date: DateTime<Utc>) -> String {
        let mut out = String::new();
        for (name, value) in self.headers(date) {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(&value);
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        out.push_str(&encode_body(self.body().content()));
        out
    }

    /// SMTP envelope: bare address of `from` as reverse-path, every entry of `to` as forward-path.
    pub fn envelope(&self) -> Result<Envelope> {
        let from = to_envelope_address(&self.from)?;
        let recipients = self
            .to
            .iter()
            .map(|r| to_envelope_address(r))
            .collect::<Result<Vec<_>>>()?;
        Envelope::new(Some(from), recipients).map_err(MailError::Envelope)
    }
}

/// Join recipients with [`RECIPIENT_SEPARATOR`], folding after a separator
/// whenever the next entry would push the line past [`MAX_LINE_LEN`].
///
/// `start` is the length of the line before the value (the field name and
/// `": "`). Unfolding the result yields the entries joined by `;`.
fn fold_recipients<I, S>(recipients: I, start: usize) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    let mut line_len = start;

    for (i, entry) in recipients.into_iter().enumerate() {
        let entry = entry.as_ref();
        if i > 0 {
            out.push_str(RECIPIENT_SEPARATOR);
            line_len += RECIPIENT_SEPARATOR.len();
            let first_line = entry.split("\r\n").next().unwrap_or(entry);
            // Leave room for the separator that may follow this entry.
            if line_len + first_line.len() + RECIPIENT_SEPARATOR.len() > MAX_LINE_LEN {
                out.push_str("\r\n ");
                line_len = 1;
            }
        }
        out.push_str(entry);
        // Encoded display names may already be folded.
        line_len = match entry.rfind("\r\n") {
            Some(pos) => entry.len() - pos - 2,
            None => line_len + entry.len(),
        };
    }
    out
}
