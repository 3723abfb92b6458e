//! csrgen CLI application.
//!
//! This binary generates certificate signing requests and writes them, and
//! optionally the new private key, to disk.

use clap::{Parser, Subcommand};
use csrgen::cert::encoder::csr_from_pem;
use csrgen::cert::inspect::summarize;
use csrgen::config::CsrProfile;
use csrgen::error::{CsrError, Result};
use csrgen::generate_csr_with_options;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "csrgen")]
#[command(about = "Generate PKCS#10 certificate signing requests with RSA keys", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new keypair and certificate signing request
    Generate {
        /// Common name (e.g. the primary domain)
        #[arg(long)]
        cn: Option<String>,

        /// Subject alternative DNS name (repeatable)
        #[arg(long = "san")]
        sans: Vec<String>,

        /// Organization name
        #[arg(long)]
        org: Option<String>,

        /// Organizational unit name
        #[arg(long)]
        ou: Option<String>,

        /// City / locality name
        #[arg(long)]
        city: Option<String>,

        /// State or province name
        #[arg(long)]
        state: Option<String>,

        /// Two-letter country code, e.g. US
        #[arg(long)]
        country: Option<String>,

        /// Contact email address
        #[arg(long)]
        email: Option<String>,

        /// JSON profile with request fields (flags override it)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// RSA key size in bits
        #[arg(long)]
        key_bits: Option<usize>,

        /// Signature digest: SHA256, SHA384 or SHA512
        #[arg(long)]
        digest: Option<String>,

        /// Output CSR file
        #[arg(long)]
        output: PathBuf,

        /// Optional output file for the PKCS#8 private key
        #[arg(long)]
        key_out: Option<PathBuf>,
    },

    /// Print the contents of a CSR and check its signature
    Inspect {
        /// CSR file in PEM format
        #[arg(long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            cn,
            sans,
            org,
            ou,
            city,
            state,
            country,
            email,
            profile,
            key_bits,
            digest,
            output,
            key_out,
        } => {
            let mut request = match profile {
                Some(path) => CsrProfile::load(&path)?,
                None => CsrProfile::default(),
            };

            // Flags win over the profile.
            overlay(&mut request.common_name, cn);
            overlay(&mut request.organization_name, org);
            overlay(&mut request.organization_unit_name, ou);
            overlay(&mut request.city_name, city);
            overlay(&mut request.state_name, state);
            overlay(&mut request.country_code, country);
            overlay(&mut request.email_address, email);
            overlay(&mut request.key_bits, key_bits);
            overlay(&mut request.digest, digest);
            if !sans.is_empty() {
                request.san = sans;
            }

            handle_generate(&request, output, key_out)
        }
        Commands::Inspect { file } => handle_inspect(file),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn handle_generate(request: &CsrProfile, output: PathBuf, key_out: Option<PathBuf>) -> Result<()> {
    let identity = request.identity()?;
    let options = request.options()?;

    info!(
        common_name = %identity.common_name,
        sans = request.san.len(),
        bits = options.effective_key_bits(),
        "generating certificate request"
    );
    let generated = generate_csr_with_options(&identity, &request.san, &options)?;

    fs::write(&output, generated.pem.as_bytes())?;

    if let Some(key_path) = &key_out {
        let key_pem = generated
            .keypair
            .secret
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CsrError::EncodingError(format!("Failed to encode private key: {}", e)))?;
        write_private_key(key_path, key_pem.as_bytes())?;
    }

    println!("✓ Created certificate request: {}", output.display());
    println!("  Subject CN: {}", identity.common_name);
    if !request.san.is_empty() {
        println!("  SANs: {}", request.san.join(", "));
    }
    println!("  Key fingerprint: {}", generated.keypair.fingerprint()?);
    match key_out {
        Some(key_path) => println!("  Private key: {}", key_path.display()),
        None => println!("  Private key was not saved (use --key-out to keep it)"),
    }

    Ok(())
}

#[cfg(unix)]
fn write_private_key(path: &std::path::Path, contents: &[u8]) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private_key(path: &std::path::Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents)?;
    Ok(())
}

fn handle_inspect(file: PathBuf) -> Result<()> {
    let pem = fs::read_to_string(&file)?;
    let request = csr_from_pem(&pem)?;
    let summary = summarize(&request)?;

    println!("Certificate request: {}", file.display());
    println!("  Subject: {}", summary.subject_string());
    if summary.has_san_extension {
        println!("  SANs: {}", summary.dns_names.join(", "));
    } else {
        println!("  SANs: (none)");
    }
    match summary.key_bits {
        Some(bits) => println!("  Key: RSA {} bits", bits),
        None => println!("  Key: not RSA"),
    }
    match summary.digest {
        Some(digest) => println!("  Digest: {}", digest),
        None => println!("  Digest: unsupported ({})", request.algorithm.oid),
    }
    println!(
        "  Signature: {}",
        if summary.signature_valid { "valid" } else { "INVALID" }
    );

    Ok(())
}
