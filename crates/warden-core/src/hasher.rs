//! Credential hashing
//!
//! Lock credentials are stored as a single unsalted SHA-256 digest. This is
//! the format existing client records already use, so it is kept as the wire
//! contract; changing it would invalidate every stored credential hash.

use sha2::{Digest, Sha256};

use crate::types::CredentialHash;

/// Hash a credential with a single SHA-256 round
pub fn hash_credential(secret: &str) -> CredentialHash {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    CredentialHash::new(hasher.finalize().into())
}

/// Verify a credential against a stored hash
///
/// Pure comparison with no side effects; attempt counters are managed by the
/// caller after the verdict.
pub fn verify_credential(secret: &str, stored: &CredentialHash) -> bool {
    hash_credential(secret) == *stored
}
