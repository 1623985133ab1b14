//! `hashmail` — hex digest helpers and a small SMTP sender.
//!
//! The [`hash`] module turns bytes into lowercase hex MD5, SHA-1, SHA-256 or
//! SHA-512 digests. The [`mail`] module composes a plain-text or HTML message
//! and hands it to an SMTP server, one connection per send.

pub mod config;
pub mod error;
pub mod hash;
pub mod mail;
