//! Generation options and JSON request profiles.
//!
//! [`CsrOptions`] tunes the pipeline (key size, digest, key policy).
//! [`CsrProfile`] is the on-disk form of a request: identity, SAN list and
//! optional overrides, read from JSON so the same request can be replayed.

use crate::cert::identity::Identity;
use crate::cert::signer::DigestAlgorithm;
use crate::error::{CsrError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// RSA modulus size used when nothing else is requested.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Bounds on acceptable RSA modulus sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPolicy {
    /// Smallest modulus accepted, in bits.
    pub min_bits: usize,

    /// Largest modulus accepted, in bits.
    pub max_bits: usize,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self {
            min_bits: 2048,
            max_bits: 16384,
        }
    }
}

/// Options for a single CSR generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsrOptions {
    /// RSA modulus size; `None` means [`DEFAULT_KEY_BITS`].
    pub key_bits: Option<usize>,

    /// Digest used for the request signature.
    pub digest: DigestAlgorithm,

    /// Limits applied to `key_bits`.
    pub key_policy: KeyPolicy,
}

impl CsrOptions {
    /// The modulus size this run will generate.
    pub fn effective_key_bits(&self) -> usize {
        self.key_bits.unwrap_or(DEFAULT_KEY_BITS)
    }
}

/// A CSR request as stored in a JSON profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CsrProfile {
    pub common_name: Option<String>,
    pub organization_name: Option<String>,
    pub organization_unit_name: Option<String>,
    pub city_name: Option<String>,
    pub state_name: Option<String>,
    pub country_code: Option<String>,
    pub email_address: Option<String>,

    /// DNS names for the subjectAltName extension, in order.
    pub san: Vec<String>,

    pub key_bits: Option<usize>,

    /// Digest name such as `"SHA256"`.
    pub digest: Option<String>,
}

impl CsrProfile {
    /// Parse a profile from JSON text.
    ///
    /// # Example
    ///
    /// ```
    /// use csrgen::config::CsrProfile;
    ///
    /// let profile = CsrProfile::from_json(r#"{"common_name": "example.com", "san": ["www.example.com"]}"#).unwrap();
    /// assert_eq!(profile.san.len(), 1);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a profile from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Build the identity described by this profile.
    pub fn identity(&self) -> Result<Identity> {
        let common_name = self
            .common_name
            .clone()
            .ok_or_else(|| CsrError::invalid_field("common_name", "missing from profile"))?;

        Ok(Identity {
            common_name,
            organization_name: self.organization_name.clone(),
            organization_unit_name: self.organization_unit_name.clone(),
            city_name: self.city_name.clone(),
            state_name: self.state_name.clone(),
            country_code: self.country_code.clone(),
            email_address: self.email_address.clone(),
        })
    }

    /// Build generation options from this profile on top of the defaults.
    pub fn options(&self) -> Result<CsrOptions> {
        let digest = match &self.digest {
            Some(name) => name.parse()?,
            None => DigestAlgorithm::default(),
        };

        Ok(CsrOptions {
            key_bits: self.key_bits,
            digest,
            key_policy: KeyPolicy::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_options() {
        let options = CsrOptions::default();
        assert_eq!(options.effective_key_bits(), 2048);
        assert_eq!(options.digest, DigestAlgorithm::Sha256);
        assert_eq!(options.key_policy.min_bits, 2048);
    }

    #[test]
    fn test_profile_full() {
        let json = r#"{
            "common_name": "example.com",
            "organization_name": "Acme",
            "country_code": "US",
            "san": ["www.example.com", "mail.example.com"],
            "key_bits": 3072,
            "digest": "SHA384"
        }"#;
        let profile = CsrProfile::from_json(json).unwrap();

        let identity = profile.identity().unwrap();
        assert_eq!(identity.common_name, "example.com");
        assert_eq!(identity.organization_name.as_deref(), Some("Acme"));
        assert!(identity.organization_unit_name.is_none());

        let options = profile.options().unwrap();
        assert_eq!(options.effective_key_bits(), 3072);
        assert_eq!(options.digest, DigestAlgorithm::Sha384);
    }

    #[test]
    fn test_profile_missing_common_name() {
        let profile = CsrProfile::from_json(r#"{"san": ["a.example.com"]}"#).unwrap();
        let err = profile.identity().unwrap_err();
        assert!(matches!(err, CsrError::InvalidFieldError { ref field, .. } if field == "common_name"));
    }

    #[test]
    fn test_profile_weak_digest_rejected() {
        let profile = CsrProfile::from_json(r#"{"common_name": "x", "digest": "SHA1"}"#).unwrap();
        assert!(matches!(profile.options(), Err(CsrError::SigningError(_))));
    }

    #[test]
    fn test_profile_invalid_json() {
        let result = CsrProfile::from_json("{not json");
        assert!(matches!(result, Err(CsrError::JsonError(_))));
    }

    #[test]
    fn test_profile_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"common_name": "files.example.com"}}"#).unwrap();

        let profile = CsrProfile::load(file.path()).unwrap();
        assert_eq!(profile.common_name.as_deref(), Some("files.example.com"));
        assert!(profile.san.is_empty());
    }
}
