//! SHA-256 content digests.
//!
//! Digests are the only integrity signal a consumer has for a published
//! file, so every digest in a manifest is a lowercase hex SHA-256.

use std::io::Read;
use std::io::{self};

use sha2::Digest;
use sha2::Sha256;

use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Computes the lowercase hex SHA-256 digest of `bytes`.
///
/// # Examples
///
/// ```
/// use kawa_core::digest::digest;
///
/// assert_eq!(
///     digest(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Computes the digest of everything `reader` yields, reading to completion.
///
/// # Errors
///
/// Returns the first read error; no partial digest is produced.
pub fn digest_reader<R: Read + ?Sized>(reader: &mut R, buffer: &mut CopyBuffer) -> io::Result<String> {
    let mut hasher = Sha256::new();
    copy_with_buffer(reader, &mut hasher, buffer)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Returns whether `value` is a well-formed digest: 64 lowercase hex
/// characters.
#[must_use]
pub fn is_valid_digest(value: &str) -> bool {
    value.len() == DIGEST_HEX_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        assert_eq!(
            digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_reader_matches_slice() {
        let data: Vec<u8> = (0..150_000u32).map(|i| (i % 7) as u8).collect();
        let mut buffer = CopyBuffer::new();
        let streamed = digest_reader(&mut data.as_slice(), &mut buffer).unwrap();
        assert_eq!(streamed, digest(&data));
    }

    #[test]
    fn test_different_content_different_digest() {
        assert_ne!(digest(b"widget 1.0.0"), digest(b"widget 1.0.1"));
    }

    #[test]
    fn test_digest_is_valid_format() {
        let value = digest(b"print('hello')");
        assert_eq!(value.len(), DIGEST_HEX_LEN);
        assert!(is_valid_digest(&value));
    }

    #[test]
    fn test_is_valid_digest_rejects_bad_values() {
        assert!(!is_valid_digest("abcdef"));
        assert!(!is_valid_digest(&"A".repeat(64)));
        assert!(!is_valid_digest(&"g".repeat(64)));
        assert!(!is_valid_digest(&"a".repeat(65)));
        assert!(is_valid_digest(&"0".repeat(64)));
    }
}
