//! PEM encoding of certificate requests.

use crate::cert::signer::SignedCsr;
use crate::error::{CsrError, Result};
use der::Decode;
use pem::{EncodeConfig, LineEnding, Pem};
use x509_cert::request::CertReq;

/// PEM label for PKCS#10 requests.
pub const CSR_PEM_TAG: &str = "CERTIFICATE REQUEST";

/// Convert a signed request to PEM.
///
/// Output uses LF line endings, 64-column base64 and a trailing newline.
/// Encoding the same [`SignedCsr`] twice yields identical bytes.
pub fn csr_to_pem(csr: &SignedCsr) -> Result<String> {
    let der = csr.to_der()?;
    Ok(der_to_pem(der))
}

fn der_to_pem(der: Vec<u8>) -> String {
    let config = EncodeConfig::new().set_line_ending(LineEnding::LF);
    pem::encode_config(&Pem::new(CSR_PEM_TAG, der), config)
}

/// Load a certificate request from PEM format.
pub fn csr_from_pem(pem_str: &str) -> Result<CertReq> {
    let pem = pem::parse(pem_str)
        .map_err(|e| CsrError::PemError(format!("Failed to parse PEM: {}", e)))?;

    if pem.tag() != CSR_PEM_TAG {
        return Err(CsrError::PemError(format!(
            "Expected {}, got {}",
            CSR_PEM_TAG,
            pem.tag()
        )));
    }

    CertReq::from_der(pem.contents())
        .map_err(|e| CsrError::EncodingError(format!("Failed to decode CSR: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::builder::build_csr_info;
    use crate::cert::identity::Identity;
    use crate::cert::signer::{sign_csr, DigestAlgorithm};
    use crate::crypto::rsa_key::generate_rsa_keypair;
    use der::Encode;

    fn signed() -> SignedCsr {
        let keypair = generate_rsa_keypair(2048).unwrap();
        let info = build_csr_info(
            &Identity::new("example.com").organization("Acme"),
            &["www.example.com"],
            &keypair.public,
        )
        .unwrap();
        sign_csr(info, &keypair.secret, DigestAlgorithm::Sha256).unwrap()
    }

    #[test]
    fn test_pem_framing() {
        let pem = csr_to_pem(&signed()).unwrap();

        assert!(pem.starts_with("-----BEGIN CERTIFICATE REQUEST-----\n"));
        assert!(pem.ends_with("-----END CERTIFICATE REQUEST-----\n"));
        assert!(!pem.contains('\r'));

        let body: Vec<&str> = pem.lines().filter(|l| !l.starts_with("-----")).collect();
        assert!(body.iter().all(|line| line.len() <= 64));
        assert!(body[..body.len() - 1].iter().all(|line| line.len() == 64));
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let csr = signed();
        assert_eq!(csr_to_pem(&csr).unwrap(), csr_to_pem(&csr).unwrap());
    }

    #[test]
    fn test_pem_roundtrip() {
        let csr = signed();
        let pem = csr_to_pem(&csr).unwrap();
        let decoded = csr_from_pem(&pem).unwrap();
        assert_eq!(decoded.to_der().unwrap(), csr.to_der().unwrap());
    }

    #[test]
    fn test_rejects_wrong_label() {
        let pem = pem::encode(&Pem::new("CERTIFICATE", vec![0x30, 0x00]));
        let result = csr_from_pem(&pem);
        assert!(matches!(result, Err(CsrError::PemError(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(csr_from_pem("not a pem").is_err());
        let pem = der_to_pem(vec![0x01, 0x02, 0x03]);
        assert!(matches!(csr_from_pem(&pem), Err(CsrError::EncodingError(_))));
    }
}
