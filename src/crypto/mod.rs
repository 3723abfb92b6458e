//! Cryptographic operations module.
//!
//! This module provides the key material for CSR generation:
//!
//! - RSA key pair generation bounded by a [`KeyPolicy`](crate::config::KeyPolicy)
//! - Public key DER export and fingerprints
//!
//! Key generation draws from the operating system RNG and may block briefly
//! when the platform is short on entropy.
//!
//! # Example
//!
//! ```rust,no_run
//! use csrgen::crypto::rsa_key::generate_rsa_keypair;
//!
//! # fn example() -> csrgen::error::Result<()> {
//! let keypair = generate_rsa_keypair(2048)?;
//! assert_eq!(keypair.bits(), 2048);
//! println!("fingerprint: {}", keypair.fingerprint()?);
//! # Ok(())
//! # }
//! ```

pub mod rsa_key;
