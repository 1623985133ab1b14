//! SMTP server connection settings and synchronous delivery.

use std::time::Duration;

use chrono::Utc;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::{SmtpTransport, Transport};
use tracing::{debug, info, warn};

use super::message::Message;
use crate::error::{MailError, Result};

/// Port on which SSL means implicit TLS (SMTPS) rather than STARTTLS.
pub const SMTPS_PORT: u16 = 465;

/// Connection options for a [`Server`].
///
/// The defaults are SSL on and certificate verification on. The two
/// toggles are independent: [`without_ssl`](Self::without_ssl) never touches
/// verification and [`skip_ssl_verify`](Self::skip_ssl_verify) never turns SSL off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    /// Negotiate TLS: implicit on port 465, STARTTLS elsewhere.
    pub ssl: bool,
    /// Accept invalid certificates and host names during the TLS handshake.
    /// Only meant for self-signed or test servers.
    pub skip_ssl_verify: bool,
    /// Timeout for each network operation; `None` keeps the transport default.
    pub timeout: Option<Duration>,
    /// Name sent with `EHLO`; `None` uses the local host name.
    pub hello_name: Option<String>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            ssl: true,
            skip_ssl_verify: false,
            timeout: None,
            hello_name: None,
        }
    }
}

impl ServerOptions {
    /// Disable SSL: no encryption is negotiated.
    pub fn without_ssl(mut self) -> Self {
        self.ssl = false;
        self
    }

    /// Keep SSL but do not verify the server certificate chain or host name.
    pub fn skip_ssl_verify(mut self) -> Self {
        self.skip_ssl_verify = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn hello_name(mut self, name: impl Into<String>) -> Self {
        self.hello_name = Some(name.into());
        self
    }
}

/// A configured mail server, reusable across any number of sends.
///
/// Construction never fails; bad hosts or ports surface on the first
/// [`send`](Self::send). Each send opens and closes its own connection, so a
/// `Server` can be shared between threads.
#[derive(Clone)]
pub struct Server {
    host: String,
    port: u16,
    username: String,
    password: String,
    options: ServerOptions,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl Server {
    /// Create a server. Empty `username` means no authentication is attempted.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
        options: ServerOptions,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            options,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    pub fn ssl_enabled(&self) -> bool {
        self.options.ssl
    }

    pub fn ssl_verify_skipped(&self) -> bool {
        self.options.skip_ssl_verify
    }

    /// Compose `message` and deliver it over a fresh connection.
    ///
    /// Blocks until the server accepts the message or the exchange fails.
    /// There is no retry.
    pub fn send(&self, message: &Message) -> Result<()> {
        let envelope = message.envelope()?;
        let raw = message.format(Utc::now());
        debug!(
            from = %message.from,
            recipients = envelope.to().len(),
            content_type = message.body().mime_type(),
            bytes = raw.len(),
            "Composed message"
        );

        let transport = self.transport()?;
        match transport.send_raw(&envelope, raw.as_bytes()) {
            Ok(_) => {
                info!(host = %self.host, port = self.port, "Message sent");
                Ok(())
            }
            Err(e) => {
                warn!(host = %self.host, port = self.port, error = %e, "Failed to send message");
                Err(MailError::Transport(e))
            }
        }
    }

    /// TLS posture derived from the options.
    fn tls(&self) -> Result<Tls> {
        if !self.options.ssl {
            return Ok(Tls::None);
        }

        let params = TlsParameters::builder(self.host.clone())
            .dangerous_accept_invalid_certs(self.options.skip_ssl_verify)
            .dangerous_accept_invalid_hostnames(self.options.skip_ssl_verify)
            .build()
            .map_err(MailError::Transport)?;

        if self.port == SMTPS_PORT {
            Ok(Tls::Wrapper(params))
        } else {
            Ok(Tls::Opportunistic(params))
        }
    }

    /// Build the per-send transport. Without the `pool` feature every send
    /// dials a new connection and closes it afterwards.
    fn transport(&self) -> Result<SmtpTransport> {
        let mut builder = SmtpTransport::builder_dangerous(self.host.as_str())
            .port(self.port)
            .tls(self.tls()?);

        if !self.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.username.clone(),
                self.password.clone(),
            ));
        }
        if let Some(timeout) = self.options.timeout {
            builder = builder.timeout(Some(timeout));
        }
        if let Some(ref name) = self.options.hello_name {
            builder = builder.hello_name(ClientId::Domain(name.clone()));
        }

        Ok(builder.build())
    }
}
