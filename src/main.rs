//! CLI entry point for `hashmail`.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use hashmail::config::{self, Config};
use hashmail::hash::{self, Algorithm};
use hashmail::mail::Message;

#[derive(Parser)]
#[command(name = "hashmail", version, about = "Hex digests and plain SMTP sending")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print hex digests of files (or stdin)
    Hash {
        /// Files to hash; `-` or nothing reads stdin
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Algorithm::Sha256)]
        algorithm: Algorithm,
        #[arg(long)]
        json: bool,
    },
    /// Send a plain-text or HTML message
    Send(SendArgs),
    /// Show the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

#[derive(clap::Args)]
struct SendArgs {
    /// Read the message from a JSON file (fields: from, to, subject, body_text, body_html)
    #[arg(long, value_name = "FILE")]
    message: Option<PathBuf>,
    /// Sender (defaults to `message.from` in the config)
    #[arg(long)]
    from: Option<String>,
    /// Recipient; repeat for several
    #[arg(long, value_name = "ADDR")]
    to: Vec<String>,
    #[arg(short, long)]
    subject: Option<String>,
    /// Plain-text body
    #[arg(long, conflicts_with = "text_file")]
    text: Option<String>,
    #[arg(long, value_name = "FILE")]
    text_file: Option<PathBuf>,
    /// HTML body, used when no plain-text body is given
    #[arg(long, conflicts_with = "html_file")]
    html: Option<String>,
    #[arg(long, value_name = "FILE")]
    html_file: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long, env = "HASHMAIL_SMTP_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Do not negotiate TLS
    #[arg(long)]
    without_ssl: bool,
    /// Accept invalid server certificates (test servers only)
    #[arg(long)]
    skip_ssl_verify: bool,
    /// Network timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Hash {
            files,
            algorithm,
            json,
        } => cmd_hash(&files, algorithm, json),
        Commands::Send(args) => cmd_send(args, &config),
        Commands::Config { init } => cmd_config(&config, init),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "hashmail.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

#[derive(serde::Serialize)]
struct DigestLine {
    path: String,
    algorithm: &'static str,
    digest: String,
}

/// Hash each input and print `<digest>  <name>` lines or a JSON array.
fn cmd_hash(files: &[PathBuf], algorithm: Algorithm, json: bool) -> anyhow::Result<()> {
    let stdin_only = [PathBuf::from("-")];
    let inputs = if files.is_empty() { &stdin_only[..] } else { files };

    let mut lines = Vec::with_capacity(inputs.len());
    for path in inputs {
        let digest = if path.as_os_str() == "-" {
            hash::digest_reader(algorithm, std::io::stdin().lock(), None)
                .context("Failed to read stdin")?
        } else {
            hash_file(path, algorithm)?
        };
        lines.push(DigestLine {
            path: path.display().to_string(),
            algorithm: algorithm.name(),
            digest,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
    } else {
        for line in &lines {
            println!("{}  {}", line.digest, line.path);
        }
    }
    Ok(())
}

/// Hash one file with a progress bar on stderr.
fn hash_file(path: &Path, algorithm: Algorithm) -> anyhow::Result<String> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let file_size = file.metadata().map(|m| m.len()).unwrap_or(0);

    let pb = ProgressBar::new(file_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Hashing [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let digest = hash::digest_reader(algorithm, file, Some(&|n| pb.set_position(n)))
        .with_context(|| format!("Failed to read {}", path.display()))?;
    pb.finish_and_clear();

    tracing::debug!(path = %path.display(), %algorithm, "Hashed file");
    Ok(digest)
}

/// Build the message from `--message` and flags, then send it.
fn cmd_send(args: SendArgs, config: &Config) -> anyhow::Result<()> {
    let mut message = match args.message {
        Some(ref path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<Message>(&raw)
                .with_context(|| format!("Invalid message file {}", path.display()))?
        }
        None => Message::default(),
    };

    if let Some(from) = args.from {
        message.from = from;
    }
    if message.from.is_empty() {
        message.from = config.message.from.clone();
    }
    if !args.to.is_empty() {
        message.to = args.to;
    }
    if let Some(subject) = args.subject {
        message.subject = subject;
    }
    if let Some(text) = read_body(args.text, args.text_file.as_deref())? {
        message.body_text = text;
    }
    if let Some(html) = read_body(args.html, args.html_file.as_deref())? {
        message.body_html = html;
    }

    let mut smtp = config.smtp.clone();
    if let Some(host) = args.host {
        smtp.host = host;
    }
    if let Some(port) = args.port {
        smtp.port = port;
    }
    if let Some(username) = args.username {
        smtp.username = username;
    }
    if let Some(password) = args.password {
        smtp.password = password;
    }
    if args.without_ssl {
        smtp.ssl = false;
    }
    if args.skip_ssl_verify {
        smtp.skip_ssl_verify = true;
    }
    if let Some(secs) = args.timeout {
        smtp.timeout_secs = secs;
    }

    let server = smtp.to_server();
    tracing::info!(host = %server.host(), port = server.port(), recipients = message.to.len(), "Sending message");
    server.send(&message)?;

    eprintln!("  Sent to {}", message.to_header());
    Ok(())
}

/// Inline body text wins over a body file.
fn read_body(inline: Option<String>, file: Option<&Path>) -> anyhow::Result<Option<String>> {
    match (inline, file) {
        (Some(text), _) => Ok(Some(text)),
        (None, Some(path)) => {
            let mut text = String::new();
            std::fs::File::open(path)
                .and_then(|mut f| f.read_to_string(&mut text))
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(Some(text))
        }
        (None, None) => Ok(None),
    }
}

/// Print the effective configuration, or write the defaults with `--init`.
fn cmd_config(config: &Config, init: bool) -> anyhow::Result<()> {
    if init {
        let path = config::save_config(&Config::default())?;
        println!("  Wrote {}", path.display());
        return Ok(());
    }

    match config::config_file_path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# (no config path on this platform)"),
    }
    let mut shown = config.clone();
    if !shown.smtp.password.is_empty() {
        shown.smtp.password = "<redacted>".to_string();
    }
    print!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "hashmail", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
