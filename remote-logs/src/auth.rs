//! Caller authentication.
//!
//! Credential checking sits behind [`CredentialValidator`] so the shared
//! secret scheme can be replaced without touching the query path.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::SecretKey;

/// Decides whether a caller-supplied credential is acceptable.
pub trait CredentialValidator: Send + Sync {
    /// Returns true if `candidate` authenticates the caller.
    fn validate(&self, candidate: &str) -> bool;
}

/// Validates callers against a single process-wide shared secret.
///
/// Both sides are reduced to SHA-256 digests and compared with
/// [`ConstantTimeEq`], so the time taken depends neither on the position of
/// the first differing byte nor on the candidate's length.
pub struct SharedSecretValidator {
    digest: [u8; 32],
}

impl SharedSecretValidator {
    pub fn new(secret: &SecretKey) -> Self {
        Self {
            digest: Sha256::digest(secret.expose()).into(),
        }
    }
}

impl CredentialValidator for SharedSecretValidator {
    fn validate(&self, candidate: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        candidate.as_slice().ct_eq(self.digest.as_slice()).into()
    }
}
