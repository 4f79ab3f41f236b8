//! PIN digests.
//!
//! Stored messages never keep the PIN itself, only `SHA-256(salt || pin)`.
//! Comparison goes through `subtle` so a mismatch costs the same regardless
//! of how many leading bytes agree.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SALT_LEN: usize = 16;

/// Salted digest of a PIN.
#[derive(Clone)]
pub struct PinDigest {
    salt: [u8; SALT_LEN],
    hash: [u8; 32],
}

impl PinDigest {
    /// Hash `pin` under a fresh random salt.
    pub fn new(pin: &str) -> Self {
        let salt: [u8; SALT_LEN] = rand::random();
        Self {
            salt,
            hash: hash(&salt, pin),
        }
    }

    /// Constant-time check of a candidate PIN.
    pub fn verify(&self, candidate: &str) -> bool {
        let candidate = hash(&self.salt, candidate);
        self.hash[..].ct_eq(&candidate[..]).into()
    }
}

impl std::fmt::Debug for PinDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PinDigest(..)")
    }
}

fn hash(salt: &[u8], pin: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(pin.as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_matches_only_same_pin() {
        let digest = PinDigest::new("12345");
        assert!(digest.verify("12345"));
        assert!(!digest.verify("12346"));
        assert!(!digest.verify("1234"));
        assert!(!digest.verify(""));
    }

    #[test]
    fn test_salt_differs_per_digest() {
        let a = PinDigest::new("0000");
        let b = PinDigest::new("0000");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_debug_hides_material() {
        assert_eq!(format!("{:?}", PinDigest::new("9999")), "PinDigest(..)");
    }
}
