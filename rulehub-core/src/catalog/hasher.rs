//! Content fingerprints used for taint detection
//!
//! The index declares a hex SHA-256 digest per item version; installed
//! content is hashed the same way and compared against it.

use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Hash a byte slice, hex encoded
pub fn hash_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Hash a file's contents, following symlinks
///
/// The raw `io::Error` is returned so callers can tell "not found" apart
/// from real I/O failures.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;

    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compare a declared digest with a computed one
///
/// Accepts an optional `sha256:` prefix and ignores hex case.
pub fn digest_matches(declared: &str, actual: &str) -> bool {
    let declared = declared.strip_prefix("sha256:").unwrap_or(declared);
    !declared.is_empty() && declared.eq_ignore_ascii_case(actual)
}
