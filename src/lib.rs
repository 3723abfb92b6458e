//! csrgen: PKCS#10 certificate signing requests with RSA keys
//!
//! This library builds certificate signing requests ready to submit to a CA:
//!
//! - Generate an RSA keypair (2048 bits by default, bounded by a key policy)
//! - Populate the subject DN, omitting optional fields that were not supplied
//! - Request a non-critical subjectAltName extension listing DNS names
//! - Sign with SHA-256 (or SHA-384/512) and encode as PEM
//!
//! # Architecture
//!
//! Generation is a linear pipeline of small functions: key generation
//! ([`crypto::rsa_key`]), request assembly ([`cert::builder`]), signing
//! ([`cert::signer`]) and PEM encoding ([`cert::encoder`]). Every step
//! returns `Result` and nothing here performs file or network I/O; the
//! `csrgen` binary is the only place output is written to disk.
//!
//! # Example
//!
//! ```rust,no_run
//! use csrgen::cert::identity::Identity;
//! use csrgen::error::Result;
//! use csrgen::generate_csr;
//!
//! fn example() -> Result<()> {
//!     let identity = Identity::new("example.com")
//!         .organization("Acme")
//!         .country("US");
//!     let pem = generate_csr(&identity, &["www.example.com", "mail.example.com"])?;
//!     println!("{}", pem);
//!     Ok(())
//! }
//! ```

pub mod cert;
pub mod config;
pub mod crypto;
pub mod error;

// Re-export commonly used types
pub use cert::identity::Identity;
pub use cert::signer::{DigestAlgorithm, SignedCsr};
pub use cert::{generate_csr, generate_csr_with_options, GeneratedCsr};
pub use config::{CsrOptions, KeyPolicy};
pub use error::{CsrError, Result};
