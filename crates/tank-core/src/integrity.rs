//! SRI-style integrity digests: `sha512-<base64(raw hash)>`.

use base64::Engine;
use sha2::{Digest, Sha512};

use crate::error::IntegrityError;

const PREFIX: &str = "sha512-";

/// Compute the SRI digest of `bytes`.
pub fn compute(bytes: &[u8]) -> String {
    let digest = Sha512::digest(bytes);
    format!("{PREFIX}{}", base64::engine::general_purpose::STANDARD.encode(digest))
}

/// Verify `bytes` against an `expected` SRI digest, fatal on mismatch.
pub fn verify(name: &str, expected: &str, bytes: &[u8]) -> Result<(), IntegrityError> {
    let actual = compute(bytes);
    if actual == expected {
        Ok(())
    } else {
        Err(IntegrityError::Mismatch {
            name: name.to_string(),
            expected: expected.to_string(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_is_deterministic_and_prefixed() {
        let a = compute(b"hello world");
        let b = compute(b"hello world");
        assert_eq!(a, b);
        assert!(a.starts_with(PREFIX));
    }

    #[test]
    fn verify_detects_mismatch() {
        let bytes = b"tarball bytes";
        let good = compute(bytes);
        assert!(verify("pkg", &good, bytes).is_ok());
        assert!(verify("pkg", "sha512-not-the-right-hash", bytes).is_err());
    }
}
