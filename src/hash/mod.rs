//! Hex digest helpers for MD5, SHA-1, SHA-256 and SHA-512.
//!
//! Every function returns the digest as a lowercase hexadecimal string.
//! Hashing a byte slice cannot fail; only [`digest_reader`] can, and only
//! because the underlying reader can.

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use ::md5::Md5;
use ::sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

/// Read buffer size for streaming digests (128 KB).
const READ_BUFFER_SIZE: usize = 128 * 1024;

/// MD5 digest of `data` (32 hex characters).
pub fn md5(data: &[u8]) -> String {
    hex_digest::<Md5>(data)
}

/// SHA-1 digest of `data` (40 hex characters).
pub fn sha1(data: &[u8]) -> String {
    hex_digest::<Sha1>(data)
}

/// SHA-256 digest of `data` (64 hex characters).
pub fn sha256(data: &[u8]) -> String {
    hex_digest::<Sha256>(data)
}

/// SHA-512 digest of `data` (128 hex characters).
pub fn sha512(data: &[u8]) -> String {
    hex_digest::<Sha512>(data)
}

fn hex_digest<D: Digest>(data: &[u8]) -> String
where
    sha2::digest::Output<D>: fmt::LowerHex,
{
    format!("{:x}", D::digest(data))
}

/// The supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl Algorithm {
    /// All algorithms, in ascending digest size.
    pub const ALL: [Algorithm; 4] = [Self::Md5, Self::Sha1, Self::Sha256, Self::Sha512];

    /// Hash `data` with this algorithm.
    pub fn digest(self, data: &[u8]) -> String {
        match self {
            Self::Md5 => md5(data),
            Self::Sha1 => sha1(data),
            Self::Sha256 => sha256(data),
            Self::Sha512 => sha512(data),
        }
    }

    /// Length of the hex digest in characters.
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Sha256 => 64,
            Self::Sha512 => 128,
        }
    }

    /// Canonical lowercase name (`"md5"`, `"sha1"`, `"sha256"`, `"sha512"`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when an algorithm name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hash algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    /// Accepts `md5`, `sha1`, `sha256`, `sha512`, case-insensitively,
    /// with or without a dash or underscore (`SHA-256`, `sha_512`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|a| a.name() == normalized)
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

/// Hash everything `reader` yields without buffering it whole.
///
/// The optional progress callback receives the number of bytes consumed so
/// far after every chunk.
pub fn digest_reader<R: Read>(
    algorithm: Algorithm,
    reader: R,
    progress: Option<&dyn Fn(u64)>,
) -> std::io::Result<String> {
    match algorithm {
        Algorithm::Md5 => stream::<Md5, R>(reader, progress),
        Algorithm::Sha1 => stream::<Sha1, R>(reader, progress),
        Algorithm::Sha256 => stream::<Sha256, R>(reader, progress),
        Algorithm::Sha512 => stream::<Sha512, R>(reader, progress),
    }
}

fn stream<D: Digest, R: Read>(
    mut reader: R,
    progress: Option<&dyn Fn(u64)>,
) -> std::io::Result<String>
where
    sha2::digest::Output<D>: fmt::LowerHex,
{
    let mut hasher = D::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        total += n as u64;
        if let Some(cb) = progress {
            cb(total);
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}
