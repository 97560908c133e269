//! One-way derivation of stored credentials from plaintext passwords.
//!
//! The derivation is Argon2id keyed by a deployment-wide pepper: the salt is
//! the SHA-256 digest of the pepper, so the same password always maps to the
//! same credential within a deployment while the output stays slow to brute
//! force and unusable without the pepper.

use argon2::{Algorithm, Argon2, Params, Version};
use base64ct::{Base64Unpadded, Encoding};
use sha2::{Digest, Sha256};

const OUTPUT_LEN: usize = 32;
const SALT_DOMAIN: &[u8] = b"forum.credential.v1";

#[derive(Debug, thiserror::Error)]
#[error("credential derivation failed: {0}")]
pub struct CredentialError(String);

#[derive(Clone)]
pub struct CredentialCodec {
    salt: [u8; 32],
    params: Params,
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .finish_non_exhaustive()
    }
}

impl CredentialCodec {
    /// Build a codec using the default Argon2id cost parameters.
    #[must_use]
    pub fn new(pepper: &str) -> Self {
        let salt: [u8; 32] = Sha256::new()
            .chain_update(SALT_DOMAIN)
            .chain_update(pepper.as_bytes())
            .finalize()
            .into();
        Self {
            salt,
            params: Params::default(),
        }
    }

    /// Override the Argon2id cost parameters.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Derive the storable credential for `plaintext`.
    ///
    /// # Errors
    /// Returns an error if Argon2 rejects the input or parameters.
    pub fn derive(&self, plaintext: &str) -> Result<String, CredentialError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let mut output = [0u8; OUTPUT_LEN];
        argon2
            .hash_password_into(plaintext.as_bytes(), &self.salt, &mut output)
            .map_err(|e| CredentialError(e.to_string()))?;
        Ok(Base64Unpadded::encode_string(&output))
    }

    /// Check `plaintext` against a stored credential.
    ///
    /// # Errors
    /// Returns an error if the derivation itself fails.
    pub fn matches(&self, plaintext: &str, stored: &str) -> Result<bool, CredentialError> {
        let derived = self.derive(plaintext)?;
        Ok(constant_time_eq(derived.as_bytes(), stored.as_bytes()))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
