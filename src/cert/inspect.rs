//! Read-back of certificate requests.
//!
//! [`summarize`] decodes the parts of a request a caller usually wants to
//! check: subject attributes, requested DNS names, digest and key size.

use crate::cert::builder::EXTENSION_REQUEST;
use crate::cert::identity::DnField;
use crate::cert::signer::{DigestAlgorithm, SignedCsr};
use crate::error::{CsrError, Result};
use der::{Decode, Encode};
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::SubjectAltName;
use x509_cert::ext::Extension;
use x509_cert::request::CertReq;

/// Decoded view of a certificate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrSummary {
    /// Recognised subject attributes in encoded order.
    pub subject: Vec<(DnField, String)>,

    /// Subject attributes with an OID outside [`DnField`].
    pub unrecognized_attributes: usize,

    /// Whether a subjectAltName extension was requested at all.
    pub has_san_extension: bool,

    pub san_critical: bool,

    /// dNSName entries of the subjectAltName extension, in order.
    pub dns_names: Vec<String>,

    pub digest: Option<DigestAlgorithm>,

    /// RSA modulus size, `None` for non-RSA keys.
    pub key_bits: Option<usize>,

    pub signature_valid: bool,
}

impl CsrSummary {
    /// First value of `field` in the subject.
    pub fn get(&self, field: DnField) -> Option<&str> {
        self.subject
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value.as_str())
    }

    /// Subject rendered as `CN=..., O=...` in encoded order.
    pub fn subject_string(&self) -> String {
        self.subject
            .iter()
            .map(|(field, value)| format!("{}={}", field.short_name(), value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Decode the interesting parts of `request`.
pub fn summarize(request: &CertReq) -> Result<CsrSummary> {
    let mut subject = Vec::new();
    let mut unrecognized_attributes = 0;

    for atv in request.info.subject.0.iter().flat_map(|rdn| rdn.0.iter()) {
        match DnField::from_oid(&atv.oid) {
            Some(field) => {
                let value = String::from_utf8(atv.value.value().to_vec()).map_err(|e| {
                    CsrError::EncodingError(format!("Subject {} is not text: {}", field.short_name(), e))
                })?;
                subject.push((field, value));
            }
            None => unrecognized_attributes += 1,
        }
    }

    let san = find_san_extension(request)?;
    let (has_san_extension, san_critical, dns_names) = match san {
        Some(ext) => (true, ext.critical, dns_names(&ext)?),
        None => (false, false, Vec::new()),
    };

    let digest = DigestAlgorithm::from_signature_oid(&request.algorithm.oid);
    let key_bits = rsa_key_bits(request);
    let signature_valid = match SignedCsr::from_request(request.clone()) {
        Ok(signed) => signed.verify().is_ok(),
        Err(_) => false,
    };

    Ok(CsrSummary {
        subject,
        unrecognized_attributes,
        has_san_extension,
        san_critical,
        dns_names,
        digest,
        key_bits,
        signature_valid,
    })
}

/// Requested extensions, empty when the request has no extensionRequest attribute.
pub fn requested_extensions(request: &CertReq) -> Result<Vec<Extension>> {
    let mut extensions = Vec::new();

    for attr in request.info.attributes.iter().filter(|a| a.oid == EXTENSION_REQUEST) {
        for value in attr.values.iter() {
            let decoded: Vec<Extension> = value.decode_as().map_err(|e| {
                CsrError::EncodingError(format!("Failed to decode extensionRequest: {}", e))
            })?;
            extensions.extend(decoded);
        }
    }

    Ok(extensions)
}

fn find_san_extension(request: &CertReq) -> Result<Option<Extension>> {
    Ok(requested_extensions(request)?
        .into_iter()
        .find(|ext| ext.extn_id == const_oid::db::rfc5280::ID_CE_SUBJECT_ALT_NAME))
}

fn dns_names(ext: &Extension) -> Result<Vec<String>> {
    let san = SubjectAltName::from_der(ext.extn_value.as_bytes())
        .map_err(|e| CsrError::EncodingError(format!("Failed to decode subjectAltName: {}", e)))?;

    Ok(san
        .0
        .into_iter()
        .filter_map(|name| match name {
            GeneralName::DnsName(dns) => Some(dns.to_string()),
            _ => None,
        })
        .collect())
}

fn rsa_key_bits(request: &CertReq) -> Option<usize> {
    let der = request.info.public_key.to_der().ok()?;
    let key = RsaPublicKey::from_public_key_der(&der).ok()?;
    Some(key.n().bits())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::builder::build_csr_info;
    use crate::cert::identity::Identity;
    use crate::cert::signer::sign_csr;
    use crate::crypto::rsa_key::generate_rsa_keypair;

    #[test]
    fn test_summarize_signed_request() {
        let keypair = generate_rsa_keypair(2048).unwrap();
        let identity = Identity::new("example.com")
            .organization("Acme")
            .country("US");
        let info = build_csr_info(&identity, &["www.example.com", "api.example.com"], &keypair.public)
            .unwrap();
        let signed = sign_csr(info, &keypair.secret, DigestAlgorithm::Sha384).unwrap();

        let summary = summarize(signed.request()).unwrap();

        assert_eq!(summary.subject_string(), "CN=example.com, O=Acme, C=US");
        assert_eq!(summary.get(DnField::Organization), Some("Acme"));
        assert_eq!(summary.get(DnField::OrganizationalUnit), None);
        assert_eq!(summary.unrecognized_attributes, 0);
        assert!(summary.has_san_extension);
        assert!(!summary.san_critical);
        assert_eq!(summary.dns_names, vec!["www.example.com", "api.example.com"]);
        assert_eq!(summary.digest, Some(DigestAlgorithm::Sha384));
        assert_eq!(summary.key_bits, Some(2048));
        assert!(summary.signature_valid);
    }

    #[test]
    fn test_summarize_without_sans() {
        let keypair = generate_rsa_keypair(2048).unwrap();
        let info = build_csr_info::<&str>(&Identity::new("bare.example.com"), &[], &keypair.public)
            .unwrap();
        let signed = sign_csr(info, &keypair.secret, DigestAlgorithm::Sha256).unwrap();

        let summary = summarize(signed.request()).unwrap();
        assert!(!summary.has_san_extension);
        assert!(summary.dns_names.is_empty());
        assert!(requested_extensions(signed.request()).unwrap().is_empty());
    }
}
