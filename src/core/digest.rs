//! Purpose: SHA-512 digests rendered as lowercase hex.
//! Exports: `sha512_hex`, `DEMO_LINES`.
//! Role: Backs the `sha512` CLI command.
use std::fmt::Write as _;

use sha2::{Digest, Sha512};

/// Default input of the `sha512` command.
pub const DEMO_LINES: [&str; 2] = ["The fog is getting thicker!", "And Leon's getting laaarger!"];

/// Hashes `parts` as one concatenated stream.
pub fn sha512_hex<I, T>(parts: I) -> String
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part.as_ref());
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
