//! Certificate request builder.
//!
//! This module assembles the unsigned `CertificationRequestInfo`: subject
//! name, public key, and the extensionRequest attribute carrying the
//! subjectAltName list.

use crate::cert::identity::{DnField, Identity};
use crate::crypto::rsa_key::public_key_der;
use crate::error::{CsrError, Result};
use const_oid::ObjectIdentifier;
use der::asn1::{Any, Ia5String, Ia5StringRef, OctetString, PrintableStringRef, SetOfVec, Utf8StringRef};
use der::{Decode, Encode};
use rsa::RsaPublicKey;
use spki::SubjectPublicKeyInfoOwned;
use tracing::debug;
use x509_cert::attr::{Attribute, AttributeTypeAndValue};
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::SubjectAltName;
use x509_cert::ext::Extension;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};
use x509_cert::request::{CertReqInfo, Version};

/// PKCS#9 extensionRequest (1.2.840.113549.1.9.14).
pub const EXTENSION_REQUEST: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.14");

/// Longest DNS name accepted in a SAN entry.
pub const MAX_DNS_NAME_LEN: usize = 253;

/// Build the unsigned request for `identity`, `san_list` and `public_key`.
///
/// A subjectAltName extension is requested only when `san_list` is non-empty.
///
/// # Example
///
/// ```no_run
/// use csrgen::cert::builder::build_csr_info;
/// use csrgen::cert::identity::Identity;
/// use csrgen::crypto::rsa_key::generate_rsa_keypair;
///
/// # fn example() -> csrgen::error::Result<()> {
/// let keypair = generate_rsa_keypair(2048)?;
/// let identity = Identity::new("example.com").organization("Acme");
/// let info = build_csr_info(&identity, &["www.example.com"], &keypair.public)?;
/// assert_eq!(info.subject.0.len(), 2);
/// # Ok(())
/// # }
/// ```
pub fn build_csr_info<S: AsRef<str>>(
    identity: &Identity,
    san_list: &[S],
    public_key: &RsaPublicKey,
) -> Result<CertReqInfo> {
    // Self-validating so direct callers get the same checks as the pipeline.
    identity.validate()?;
    validate_san_list(san_list)?;

    let subject = build_subject(identity)?;
    let public_key = build_public_key_info(public_key)?;

    let attributes = if san_list.is_empty() {
        SetOfVec::new()
    } else {
        let san = build_san_extension(san_list)?;
        SetOfVec::try_from(vec![extension_request(vec![san])?])
            .map_err(|e| CsrError::EncodingError(format!("Failed to add attribute: {}", e)))?
    };

    debug!(
        subject_attributes = subject.0.len(),
        san_entries = san_list.len(),
        "built certificate request info"
    );

    Ok(CertReqInfo {
        version: Version::V1,
        subject,
        public_key,
        attributes,
    })
}

/// Check every SAN entry looks like a DNS name.
///
/// Entries must be non-empty ASCII without whitespace or control characters.
/// Duplicates are allowed.
pub fn validate_san_list<S: AsRef<str>>(san_list: &[S]) -> Result<()> {
    for (index, entry) in san_list.iter().enumerate() {
        let entry = entry.as_ref();
        let field = || format!("san_list[{}]", index);

        if entry.is_empty() {
            return Err(CsrError::invalid_field(field(), "DNS name must not be empty"));
        }
        if entry.chars().any(char::is_whitespace) {
            return Err(CsrError::invalid_field(
                field(),
                format!("DNS name '{}' contains whitespace", entry),
            ));
        }
        if !entry.is_ascii() {
            return Err(CsrError::invalid_field(
                field(),
                format!("DNS name '{}' is not ASCII", entry),
            ));
        }
        if entry.bytes().any(|b| b.is_ascii_control()) {
            return Err(CsrError::invalid_field(
                field(),
                format!("DNS name '{}' contains control characters", entry.escape_debug()),
            ));
        }
        if entry.len() > MAX_DNS_NAME_LEN {
            return Err(CsrError::invalid_field(
                field(),
                format!("DNS name exceeds {} characters", MAX_DNS_NAME_LEN),
            ));
        }
    }

    Ok(())
}

/// Build the subject name, one RDN per present attribute.
pub fn build_subject(identity: &Identity) -> Result<Name> {
    let mut rdns = Vec::new();

    for (field, value) in identity.attributes() {
        let attr = AttributeTypeAndValue {
            oid: field.oid(),
            value: attribute_value(field, value)?,
        };

        let set = SetOfVec::try_from(vec![attr])
            .map_err(|e| CsrError::EncodingError(format!("Failed to add attribute: {}", e)))?;
        rdns.push(RelativeDistinguishedName::from(set));
    }

    Ok(RdnSequence(rdns))
}

/// Build a non-critical subjectAltName extension with one dNSName per entry.
pub fn build_san_extension<S: AsRef<str>>(san_list: &[S]) -> Result<Extension> {
    let names = san_list
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            Ia5String::new(entry.as_ref())
                .map(GeneralName::DnsName)
                .map_err(|e| CsrError::invalid_field(format!("san_list[{}]", index), e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    let der = SubjectAltName(names)
        .to_der()
        .map_err(|e| CsrError::EncodingError(format!("Failed to encode SAN: {}", e)))?;

    Ok(Extension {
        extn_id: const_oid::db::rfc5280::ID_CE_SUBJECT_ALT_NAME,
        critical: false,
        extn_value: OctetString::new(der)
            .map_err(|e| CsrError::EncodingError(format!("Failed to wrap SAN: {}", e)))?,
    })
}

fn extension_request(extensions: Vec<Extension>) -> Result<Attribute> {
    let value = Any::encode_from(&extensions)
        .map_err(|e| CsrError::EncodingError(format!("Failed to encode extensions: {}", e)))?;
    let values = SetOfVec::try_from(vec![value])
        .map_err(|e| CsrError::EncodingError(format!("Failed to build attribute: {}", e)))?;

    Ok(Attribute {
        oid: EXTENSION_REQUEST,
        values,
    })
}

fn build_public_key_info(public_key: &RsaPublicKey) -> Result<SubjectPublicKeyInfoOwned> {
    let der = public_key_der(public_key)?;
    SubjectPublicKeyInfoOwned::from_der(&der)
        .map_err(|e| CsrError::EncodingError(format!("Failed to decode public key info: {}", e)))
}

// C is a PrintableString, emailAddress an IA5String, everything else UTF8String.
fn attribute_value(field: DnField, value: &str) -> Result<Any> {
    let invalid = |e: der::Error| CsrError::invalid_field(field.field_name(), e.to_string());

    let encoded = match field {
        DnField::Country => Any::encode_from(&PrintableStringRef::new(value).map_err(invalid)?),
        DnField::EmailAddress => Any::encode_from(&Ia5StringRef::new(value).map_err(invalid)?),
        _ => Any::encode_from(&Utf8StringRef::new(value).map_err(invalid)?),
    };

    encoded.map_err(|e| CsrError::EncodingError(format!("Failed to encode {}: {}", field.short_name(), e)))
}
