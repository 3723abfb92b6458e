//! RSA key operations.
//!
//! This module provides functions for generating RSA keypairs used to sign
//! certificate requests.

use crate::config::KeyPolicy;
use crate::error::{CsrError, Result};
use rand::rngs::OsRng;
use rsa::pkcs8::EncodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::debug;

/// An RSA keypair consisting of a private key and the public key derived from it.
#[derive(Clone)]
pub struct RsaKeypair {
    pub secret: RsaPrivateKey,
    pub public: RsaPublicKey,
}

// Only public material is shown; RsaPrivateKey's own Debug prints d and the primes.
impl fmt::Debug for RsaKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeypair")
            .field("bits", &self.bits())
            .field("fingerprint", &self.fingerprint().ok())
            .finish_non_exhaustive()
    }
}

impl RsaKeypair {
    /// Create a new keypair from a private key.
    pub fn from_secret(secret: RsaPrivateKey) -> Self {
        let public = secret.to_public_key();
        Self { secret, public }
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.public.n().bits()
    }

    /// The public key as a DER-encoded SubjectPublicKeyInfo.
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        public_key_der(&self.public)
    }

    /// Hex-encoded SHA-256 of the SubjectPublicKeyInfo.
    pub fn fingerprint(&self) -> Result<String> {
        let der = self.public_key_der()?;
        Ok(hex::encode(Sha256::digest(&der)))
    }
}

/// Encode an RSA public key as a DER SubjectPublicKeyInfo.
pub fn public_key_der(public: &RsaPublicKey) -> Result<Vec<u8>> {
    public
        .to_public_key_der()
        .map(|doc| doc.as_bytes().to_vec())
        .map_err(|e| CsrError::EncodingError(format!("Failed to encode public key: {}", e)))
}

/// Generate a new RSA keypair of `bits` bits under the default [`KeyPolicy`].
///
/// # Example
///
/// ```no_run
/// use csrgen::crypto::rsa_key::generate_rsa_keypair;
///
/// let keypair = generate_rsa_keypair(2048).unwrap();
/// assert_eq!(keypair.bits(), 2048);
/// ```
pub fn generate_rsa_keypair(bits: usize) -> Result<RsaKeypair> {
    generate_rsa_keypair_with_policy(bits, &KeyPolicy::default())
}

/// Generate a new RSA keypair, rejecting sizes outside `policy`.
///
/// ```
/// use csrgen::config::KeyPolicy;
/// use csrgen::crypto::rsa_key::generate_rsa_keypair_with_policy;
///
/// assert!(generate_rsa_keypair_with_policy(1024, &KeyPolicy::default()).is_err());
/// ```
pub fn generate_rsa_keypair_with_policy(bits: usize, policy: &KeyPolicy) -> Result<RsaKeypair> {
    check_key_size(bits, policy)?;

    debug!(bits, "generating RSA keypair");
    let secret = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| CsrError::KeyGenerationError(format!("RSA key generation failed: {}", e)))?;

    Ok(RsaKeypair::from_secret(secret))
}

fn check_key_size(bits: usize, policy: &KeyPolicy) -> Result<()> {
    if bits == 0 {
        return Err(CsrError::KeyGenerationError(
            "Key size must be positive".to_string(),
        ));
    }

    if bits < policy.min_bits {
        return Err(CsrError::KeyGenerationError(format!(
            "Key size {} is below the minimum of {} bits",
            bits, policy.min_bits
        )));
    }

    if bits > policy.max_bits {
        return Err(CsrError::KeyGenerationError(format!(
            "Key size {} exceeds the maximum of {} bits",
            bits, policy.max_bits
        )));
    }

    if bits % 2 != 0 {
        return Err(CsrError::KeyGenerationError(format!(
            "Key size must be even, got {}",
            bits
        )));
    }

    Ok(())
}
