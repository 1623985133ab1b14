//! Sending plain-text or HTML mail through a configured SMTP server.
//!
//! ```no_run
//! use hashmail::mail::{Message, Server, ServerOptions};
//!
//! let server = Server::new(
//!     "smtp.example.com",
//!     587,
//!     "user",
//!     "secret",
//!     ServerOptions::default().skip_ssl_verify(),
//! );
//!
//! let message = Message {
//!     from: "noreply@example.com".to_string(),
//!     to: vec!["alice@example.com".to_string()],
//!     subject: "Build finished".to_string(),
//!     body_text: "All green.".to_string(),
//!     ..Default::default()
//! };
//!
//! server.send(&message)?;
//! # Ok::<(), hashmail::error::MailError>(())
//! ```

pub mod address;
pub mod encoding;
pub mod message;
pub mod server;

pub use message::{Body, Message};
pub use server::{Server, ServerOptions};
