//! Wire encodings for composed messages: RFC 2047 encoded-words for header
//! text and quoted-printable for bodies.

use std::borrow::Cow;

use base64::Engine;

use super::address::MailboxRef;

/// Maximum UTF-8 bytes per encoded-word, keeping each word within the
/// 75-character limit of RFC 2047 §2 (`=?UTF-8?B?` + 60 base64 chars + `?=`).
const MAX_WORD_BYTES: usize = 45;

/// Whether `value` can be written into a header line as is: printable
/// ASCII and tab only, so no CR or LF can start a new header.
pub fn is_header_safe(value: &str) -> bool {
    value.bytes().all(|b| b == b'\t' || (0x20..0x7f).contains(&b))
}

/// Encode header text as RFC 2047 encoded-words unless it is printable ASCII.
///
/// Printable input is returned unchanged. Anything else, including control
/// characters, is encoded, split on character boundaries into several words
/// joined by folding whitespace.
pub fn encode_header_text(value: &str) -> Cow<'_, str> {
    if is_header_safe(value) {
        return Cow::Borrowed(value);
    }

    let words: Vec<String> = utf8_chunks(value, MAX_WORD_BYTES)
        .map(|chunk| {
            let b64 = base64::engine::general_purpose::STANDARD.encode(chunk.as_bytes());
            format!("=?UTF-8?B?{b64}?=")
        })
        .collect();

    Cow::Owned(words.join("\r\n "))
}

/// Encode the display name of a mailbox header value, leaving the address as is.
///
/// `"José <jose@example.com>"` becomes `"=?UTF-8?B?Sm9zw6k=?= <jose@example.com>"`.
/// A value whose address part holds control characters is encoded whole.
pub fn encode_mailbox(value: &str) -> Cow<'_, str> {
    if is_header_safe(value) {
        return Cow::Borrowed(value);
    }

    let mailbox = MailboxRef::parse(value);
    if mailbox.address.chars().any(char::is_control) {
        return Cow::Owned(encode_header_text(value).into_owned());
    }
    if mailbox.display_name.is_empty() {
        // Bare address, possibly non-ASCII (SMTPUTF8); passed through trimmed.
        return Cow::Borrowed(mailbox.address);
    }

    Cow::Owned(format!(
        "{} <{}>",
        encode_header_text(mailbox.display_name),
        mailbox.address
    ))
}

/// Encode a body as quoted-printable after normalizing line endings to CRLF.
pub fn encode_body(text: &str) -> String {
    quoted_printable::encode_to_str(normalize_crlf(text).as_bytes())
}

/// Convert bare `\n` and bare `\r` line endings to `\r\n`.
fn normalize_crlf(text: &str) -> Cow<'_, str> {
    if !text.contains(['\r', '\n']) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\r\n");
            }
            '\n' => out.push_str("\r\n"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Split `s` into pieces of at most `max_bytes`, never inside a character.
fn utf8_chunks(s: &str, max_bytes: usize) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let mut end = rest.len().min(max_bytes);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some(chunk)
    })
}
