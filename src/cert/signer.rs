//! Certificate request signing.
//!
//! Requests are signed with RSASSA-PKCS1-v1_5 over the DER encoding of the
//! `CertificationRequestInfo`. Signing is deterministic for a given key and
//! request. Only SHA-2 digests are accepted.

use crate::crypto::rsa_key::public_key_der;
use crate::error::{CsrError, Result};
use const_oid::ObjectIdentifier;
use der::asn1::{Any, BitString};
use der::{Encode, Tag};
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};
use spki::AlgorithmIdentifierOwned;
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use x509_cert::request::{CertReq, CertReqInfo};

/// Digest used for the request signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// OID of the matching `shaXXXWithRSAEncryption` signature algorithm.
    pub fn signature_oid(self) -> ObjectIdentifier {
        use const_oid::db::rfc5912;

        match self {
            DigestAlgorithm::Sha256 => rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
            DigestAlgorithm::Sha384 => rfc5912::SHA_384_WITH_RSA_ENCRYPTION,
            DigestAlgorithm::Sha512 => rfc5912::SHA_512_WITH_RSA_ENCRYPTION,
        }
    }

    pub fn from_signature_oid(oid: &ObjectIdentifier) -> Option<Self> {
        [
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ]
        .into_iter()
        .find(|digest| digest.signature_oid() == *oid)
    }

    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "SHA256",
            DigestAlgorithm::Sha384 => "SHA384",
            DigestAlgorithm::Sha512 => "SHA512",
        }
    }

    fn hash(self, message: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Sha256 => Sha256::digest(message).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(message).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(message).to_vec(),
        }
    }

    fn padding(self) -> Pkcs1v15Sign {
        match self {
            DigestAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            DigestAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            DigestAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
        }
    }

    fn algorithm_identifier(self) -> Result<AlgorithmIdentifierOwned> {
        let null = Any::new(Tag::Null, Vec::<u8>::new())
            .map_err(|e| CsrError::EncodingError(format!("Failed to encode NULL: {}", e)))?;

        Ok(AlgorithmIdentifierOwned {
            oid: self.signature_oid(),
            parameters: Some(null),
        })
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CsrError;

    /// Accepts `SHA256`, `sha-256`, `sha_256` and the like. MD5 and SHA-1 are refused.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();

        match normalized.as_str() {
            "SHA256" => Ok(DigestAlgorithm::Sha256),
            "SHA384" => Ok(DigestAlgorithm::Sha384),
            "SHA512" => Ok(DigestAlgorithm::Sha512),
            "MD5" | "SHA1" => Err(CsrError::SigningError(format!(
                "Digest '{}' is insecure and not permitted",
                s
            ))),
            _ => Err(CsrError::SigningError(format!(
                "Unsupported digest algorithm '{}'",
                s
            ))),
        }
    }
}

/// A signed certificate request.
///
/// The signature always covers the DER encoding of the request info as it was
/// at signing time; the request cannot be mutated afterwards.
#[derive(Debug, Clone)]
pub struct SignedCsr {
    request: CertReq,
    digest: DigestAlgorithm,
}

impl SignedCsr {
    /// Wrap a decoded request, e.g. one read back from PEM.
    ///
    /// Fails with `SigningError` if its signature algorithm is not one we produce.
    pub fn from_request(request: CertReq) -> Result<Self> {
        let digest = DigestAlgorithm::from_signature_oid(&request.algorithm.oid).ok_or_else(|| {
            CsrError::SigningError(format!(
                "Unsupported signature algorithm {}",
                request.algorithm.oid
            ))
        })?;

        Ok(Self { request, digest })
    }

    pub fn request(&self) -> &CertReq {
        &self.request
    }

    pub fn info(&self) -> &CertReqInfo {
        &self.request.info
    }

    pub fn digest(&self) -> DigestAlgorithm {
        self.digest
    }

    pub fn into_request(self) -> CertReq {
        self.request
    }

    /// DER encoding of the complete `CertificationRequest`.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.request
            .to_der()
            .map_err(|e| CsrError::EncodingError(format!("Failed to encode CSR: {}", e)))
    }

    /// Check the signature against the public key embedded in the request.
    pub fn verify(&self) -> Result<()> {
        let spki_der = self
            .request
            .info
            .public_key
            .to_der()
            .map_err(|e| CsrError::EncodingError(format!("Failed to encode public key: {}", e)))?;
        let public_key = RsaPublicKey::from_public_key_der(&spki_der)
            .map_err(|e| CsrError::SigningError(format!("Embedded key is not RSA: {}", e)))?;

        let info_der = encode_info(&self.request.info)?;
        public_key
            .verify(
                self.digest.padding(),
                &self.digest.hash(&info_der),
                self.request.signature.raw_bytes(),
            )
            .map_err(|e| CsrError::SigningError(format!("Signature verification failed: {}", e)))
    }
}

/// Sign `info` with `private_key` using `digest`.
///
/// The private key must belong to the public key embedded in `info`.
///
/// # Example
///
/// ```no_run
/// use csrgen::cert::builder::build_csr_info;
/// use csrgen::cert::identity::Identity;
/// use csrgen::cert::signer::{sign_csr, DigestAlgorithm};
/// use csrgen::crypto::rsa_key::generate_rsa_keypair;
///
/// # fn example() -> csrgen::error::Result<()> {
/// let keypair = generate_rsa_keypair(2048)?;
/// let info = build_csr_info::<&str>(&Identity::new("example.com"), &[], &keypair.public)?;
/// let signed = sign_csr(info, &keypair.secret, DigestAlgorithm::Sha256)?;
/// signed.verify()?;
/// # Ok(())
/// # }
/// ```
pub fn sign_csr(
    info: CertReqInfo,
    private_key: &RsaPrivateKey,
    digest: DigestAlgorithm,
) -> Result<SignedCsr> {
    check_key_matches(&info, private_key)?;

    let info_der = encode_info(&info)?;
    let signature = private_key
        .sign(digest.padding(), &digest.hash(&info_der))
        .map_err(|e| CsrError::SigningError(format!("RSA signing failed: {}", e)))?;

    let signature = BitString::from_bytes(&signature).map_err(|e| {
        CsrError::EncodingError(format!("Failed to create signature bitstring: {}", e))
    })?;

    debug!(digest = %digest, "signed certificate request");

    Ok(SignedCsr {
        request: CertReq {
            info,
            algorithm: digest.algorithm_identifier()?,
            signature,
        },
        digest,
    })
}

fn check_key_matches(info: &CertReqInfo, private_key: &RsaPrivateKey) -> Result<()> {
    let embedded = info
        .public_key
        .to_der()
        .map_err(|e| CsrError::EncodingError(format!("Failed to encode public key: {}", e)))?;
    let derived = public_key_der(&private_key.to_public_key())?;

    if embedded != derived {
        return Err(CsrError::SigningError(
            "Private key does not match the public key in the request".to_string(),
        ));
    }

    Ok(())
}

fn encode_info(info: &CertReqInfo) -> Result<Vec<u8>> {
    info.to_der()
        .map_err(|e| CsrError::EncodingError(format!("Failed to encode request info: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::builder::build_csr_info;
    use crate::cert::identity::Identity;
    use crate::crypto::rsa_key::{generate_rsa_keypair, RsaKeypair};
    use der::Tagged;
    use std::sync::OnceLock;

    fn keypair() -> &'static RsaKeypair {
        static KEYPAIR: OnceLock<RsaKeypair> = OnceLock::new();
        KEYPAIR.get_or_init(|| generate_rsa_keypair(2048).unwrap())
    }

    fn other_keypair() -> &'static RsaKeypair {
        static KEYPAIR: OnceLock<RsaKeypair> = OnceLock::new();
        KEYPAIR.get_or_init(|| generate_rsa_keypair(2048).unwrap())
    }

    fn info() -> CertReqInfo {
        build_csr_info(
            &Identity::new("example.com"),
            &["www.example.com"],
            &keypair().public,
        )
        .unwrap()
    }

    #[test]
    fn test_digest_parsing() {
        assert_eq!("SHA256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert_eq!("sha-384".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha384);
        assert_eq!("sha_512".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha512);
    }

    #[test]
    fn test_weak_digests_rejected() {
        for name in ["SHA1", "sha-1", "MD5", "md5"] {
            let result = name.parse::<DigestAlgorithm>();
            assert!(matches!(result, Err(CsrError::SigningError(_))), "{}", name);
        }
    }

    #[test]
    fn test_unknown_digest_rejected() {
        let err = "whirlpool".parse::<DigestAlgorithm>().unwrap_err();
        assert!(err.to_string().contains("whirlpool"));
    }

    #[test]
    fn test_default_digest_is_sha256() {
        assert_eq!(DigestAlgorithm::default(), DigestAlgorithm::Sha256);
        assert_eq!(DigestAlgorithm::default().to_string(), "SHA256");
    }

    #[test]
    fn test_sign_and_verify_each_digest() {
        for digest in [
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ] {
            let signed = sign_csr(info(), &keypair().secret, digest).unwrap();
            assert_eq!(signed.digest(), digest);
            assert_eq!(signed.request().algorithm.oid, digest.signature_oid());
            signed.verify().unwrap();
        }
    }

    #[test]
    fn test_signature_algorithm_has_null_parameters() {
        let signed = sign_csr(info(), &keypair().secret, DigestAlgorithm::Sha256).unwrap();
        let params = signed.request().algorithm.parameters.as_ref().unwrap();
        assert_eq!(params.tag(), Tag::Null);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let a = sign_csr(info(), &keypair().secret, DigestAlgorithm::Sha256).unwrap();
        let b = sign_csr(info(), &keypair().secret, DigestAlgorithm::Sha256).unwrap();
        assert_eq!(a.to_der().unwrap(), b.to_der().unwrap());
    }

    #[test]
    fn test_key_mismatch_rejected() {
        let result = sign_csr(info(), &other_keypair().secret, DigestAlgorithm::Sha256);
        assert!(matches!(result, Err(CsrError::SigningError(_))));
    }

    #[test]
    fn test_tampered_request_fails_verification() {
        let signed = sign_csr(info(), &keypair().secret, DigestAlgorithm::Sha256).unwrap();
        let mut request = signed.into_request();
        request.info.subject = build_csr_info::<&str>(&Identity::new("evil.example.com"), &[], &keypair().public)
            .unwrap()
            .subject;

        let tampered = SignedCsr::from_request(request).unwrap();
        assert!(matches!(tampered.verify(), Err(CsrError::SigningError(_))));
    }
}
