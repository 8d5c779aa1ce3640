//! API key generation
//!
//! Draws random key material, hex-encodes it as the plaintext credential and
//! derives the SHA-256 digest that is the only form ever persisted.

use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::domain::{DomainError, KeyDigest};

/// Number of random bytes behind every issued key
pub const KEY_BYTES: usize = 32;

/// Result of generating a new API key
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    /// The plaintext key (only shown once at creation)
    pub plaintext: SecretString,
    /// The digest for storage and lookup
    pub digest: KeyDigest,
}

/// Generator for API keys
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    key_bytes: usize,
}

impl ApiKeyGenerator {
    pub fn new() -> Self {
        Self {
            key_bytes: KEY_BYTES,
        }
    }

    /// Set the number of random bytes
    pub fn with_key_bytes(mut self, bytes: usize) -> Self {
        self.key_bytes = bytes;
        self
    }

    /// Generate a new API key from the operating system's entropy source
    pub fn generate(&self) -> Result<GeneratedApiKey, DomainError> {
        self.generate_with(&mut OsRng)
    }

    /// Generate a new API key from the given random source
    pub fn generate_with<R: RngCore + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<GeneratedApiKey, DomainError> {
        let mut random_bytes = vec![0u8; self.key_bytes];
        rng.try_fill_bytes(&mut random_bytes).map_err(|e| {
            DomainError::random_source(format!("Failed to generate random bytes: {}", e))
        })?;

        let plaintext = hex::encode(&random_bytes);
        let digest = digest_key(&plaintext);

        Ok(GeneratedApiKey {
            plaintext: SecretString::from(plaintext),
            digest,
        })
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a plaintext key for storage and lookup
pub fn digest_key(plaintext: &str) -> KeyDigest {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    KeyDigest::from_hex(hex::encode(hasher.finalize()))
}

/// Digest a secret-wrapped plaintext key
pub fn digest_secret(plaintext: &SecretString) -> KeyDigest {
    digest_key(plaintext.expose_secret())
}
