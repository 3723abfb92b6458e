//! Certificate signing request generation.
//!
//! The pipeline is strictly linear: generate a key, build the request info,
//! sign it, encode it as PEM. Any failure aborts the run and nothing partial
//! is returned.

pub mod builder;
pub mod encoder;
pub mod identity;
pub mod inspect;
pub mod signer;

use crate::config::CsrOptions;
use crate::crypto::rsa_key::{generate_rsa_keypair_with_policy, RsaKeypair};
use crate::error::Result;
use builder::build_csr_info;
use encoder::csr_to_pem;
use identity::Identity;
use signer::sign_csr;
use tracing::debug;

/// Output of a generation run: the fresh keypair and the PEM request.
///
/// The private key is never written anywhere by this crate; storing it is up
/// to the caller.
#[derive(Debug, Clone)]
pub struct GeneratedCsr {
    pub keypair: RsaKeypair,
    pub pem: String,
}

/// Generate an RSA-2048 keypair and return a SHA-256 signed CSR in PEM form.
///
/// The keypair is discarded. Use [`generate_csr_with_options`] to keep it.
///
/// # Example
///
/// ```no_run
/// use csrgen::cert::identity::Identity;
/// use csrgen::generate_csr;
///
/// # fn example() -> csrgen::error::Result<()> {
/// let identity = Identity::new("example.com").organization("Acme").country("US");
/// let pem = generate_csr(&identity, &["www.example.com"])?;
/// assert!(pem.starts_with("-----BEGIN CERTIFICATE REQUEST-----"));
/// # Ok(())
/// # }
/// ```
pub fn generate_csr<S: AsRef<str>>(identity: &Identity, san_list: &[S]) -> Result<String> {
    generate_csr_with_options(identity, san_list, &CsrOptions::default()).map(|out| out.pem)
}

/// Generate a keypair and CSR with explicit key size, digest and key policy.
pub fn generate_csr_with_options<S: AsRef<str>>(
    identity: &Identity,
    san_list: &[S],
    options: &CsrOptions,
) -> Result<GeneratedCsr> {
    // Fail on bad input before paying for key generation. build_csr_info
    // repeats these checks for callers that use it directly.
    identity.validate()?;
    builder::validate_san_list(san_list)?;

    let keypair =
        generate_rsa_keypair_with_policy(options.effective_key_bits(), &options.key_policy)?;
    let info = build_csr_info(identity, san_list, &keypair.public)?;
    let signed = sign_csr(info, &keypair.secret, options.digest)?;
    let pem = csr_to_pem(&signed)?;

    debug!(
        common_name = %identity.common_name,
        bits = keypair.bits(),
        digest = %options.digest,
        "generated certificate request"
    );

    Ok(GeneratedCsr { keypair, pem })
}
