use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tufkeys_core::{
    metadata_key_from_json, storage_key_from_json, supported_for, BackendRegistry,
    BackendSelection, CryptoConfig, Key, KeyFactory, KeyType, Signature, SignatureEngine,
};
use tufkeys_proto::encode_canonical_value;

/// Manage TUF signing keys.
#[derive(Parser)]
#[command(name = "tufkeys", version)]
struct Cli {
    /// JSON config file. Defaults to $TUFKEYS_CONFIG, then the per-user config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON on a single line.
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List supported and loaded crypto backends.
    Backends,

    /// Generate a new key and print it in storage form.
    Generate {
        #[command(subcommand)]
        kind: GenerateKind,
    },

    /// Print the keyid of a stored key.
    Keyid { key: PathBuf },

    /// Print a key in metadata form.
    Export {
        key: PathBuf,
        /// Keep the private half.
        #[arg(long)]
        private: bool,
    },

    /// Read a metadata-form key and print it in storage form.
    Ingest { metadata: PathBuf },

    /// Sign data (stdin unless --data is given).
    Sign {
        key: PathBuf,
        #[arg(long)]
        data: Option<PathBuf>,
        /// Parse the data as JSON and sign its canonical encoding.
        #[arg(long)]
        canonical: bool,
    },

    /// Verify a signature. Exits with status 1 when it does not match.
    Verify {
        key: PathBuf,
        signature: PathBuf,
        #[arg(long)]
        data: Option<PathBuf>,
        /// Parse the data as JSON and verify against its canonical encoding.
        #[arg(long)]
        canonical: bool,
    },

    /// Print the RSA private key of a stored key as an encrypted PEM.
    Encrypt {
        key: PathBuf,
        /// Environment variable holding the password.
        #[arg(long)]
        password_env: String,
    },

    /// Import an encrypted RSA private key PEM.
    Import {
        pem: PathBuf,
        /// Environment variable holding the password.
        #[arg(long)]
        password_env: String,
    },

    /// Wrap an RSA public key PEM as a public-only key.
    PublicPem { pem: PathBuf },
}

#[derive(Subcommand)]
enum GenerateKind {
    Rsa {
        /// Modulus size. Defaults to the configured size.
        #[arg(long)]
        bits: Option<usize>,
    },
    Ed25519,
}

#[derive(Serialize)]
struct BackendReport<'a> {
    rsa: FamilyReport,
    ed25519: FamilyReport,
    selection: &'a BackendSelection,
}

#[derive(Serialize)]
struct FamilyReport {
    supported: &'static [&'static str],
    available: Vec<&'static str>,
}

#[derive(Serialize)]
struct Verdict<'a> {
    keyid: &'a str,
    valid: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = CryptoConfig::load(cli.config.as_deref())?;
    let registry = Arc::new(BackendRegistry::detect());
    let factory = KeyFactory::from_config(registry.clone(), &config)?;
    let engine = SignatureEngine::from_config(registry.clone(), &config);
    let compact = cli.compact;

    match cli.command {
        Command::Backends => {
            let report = BackendReport {
                rsa: family_report(&registry, KeyType::Rsa),
                ed25519: family_report(&registry, KeyType::Ed25519),
                selection: factory.selection(),
            };
            write_json(&report, compact)?;
        }
        Command::Generate { kind } => {
            let key = match kind {
                GenerateKind::Rsa { bits: Some(bits) } => factory.generate_rsa_key(bits)?,
                GenerateKind::Rsa { bits: None } => factory.generate_default_rsa_key()?,
                GenerateKind::Ed25519 => factory.generate_ed25519_key()?,
            };
            write_json(&key, compact)?;
        }
        Command::Keyid { key } => {
            let key = load_key(&key)?;
            println!("{}", key.keyid());
        }
        Command::Export { key, private } => {
            let key = load_key(&key)?;
            write_json(&key.to_metadata(private), compact)?;
        }
        Command::Ingest { metadata } => {
            let bytes = read_file(&metadata)?;
            let key = metadata_key_from_json(&bytes)?;
            write_json(&key, compact)?;
        }
        Command::Sign {
            key,
            data,
            canonical,
        } => {
            let key = load_key(&key)?;
            let payload = read_payload(data.as_deref(), canonical)?;
            let signature = engine.sign(&key, &payload)?;
            write_json(&signature, compact)?;
        }
        Command::Verify {
            key,
            signature,
            data,
            canonical,
        } => {
            let key = load_key(&key)?;
            let signature: Signature = serde_json::from_slice(&read_file(&signature)?)
                .context("signature file is not a {keyid, method, sig} object")?;
            let payload = read_payload(data.as_deref(), canonical)?;
            let valid = engine.verify(&key, &signature, &payload)?;
            write_json(
                &Verdict {
                    keyid: key.keyid(),
                    valid,
                },
                compact,
            )?;
            if !valid {
                return Ok(ExitCode::from(1));
            }
        }
        Command::Encrypt { key, password_env } => {
            let key = load_key(&key)?;
            if key.keytype() != KeyType::Rsa {
                bail!("only rsa keys can be exported as encrypted PEM");
            }
            let Some(private) = key.private() else {
                bail!("key {} has no private half", key.keyid());
            };
            let password = password_from_env(&password_env, |name| std::env::var(name).ok())?;
            let pem = factory.create_rsa_encrypted_pem(private, &password)?;
            print!("{pem}");
        }
        Command::Import { pem, password_env } => {
            let pem = read_text(&pem)?;
            let password = password_from_env(&password_env, |name| std::env::var(name).ok())?;
            let key = factory.import_rsa_key_from_encrypted_pem(&pem, &password)?;
            write_json(&key, compact)?;
        }
        Command::PublicPem { pem } => {
            let key = factory.key_from_public_pem(&read_text(&pem)?)?;
            write_json(&key, compact)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn family_report(registry: &BackendRegistry, family: KeyType) -> FamilyReport {
    FamilyReport {
        supported: supported_for(family),
        available: registry.available(family),
    }
}

/// Accepts either the storage form or the metadata form.
fn load_key(path: &Path) -> Result<Key> {
    let bytes = read_file(path)?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not JSON", path.display()))?;
    let key = if value.get("keyid").is_some() {
        storage_key_from_json(&bytes)?
    } else {
        metadata_key_from_json(&bytes)?
    };
    debug!(keyid = key.keyid(), path = %path.display(), "loaded key");
    Ok(key)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read {}", path.display()))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn read_data(path: Option<&Path>) -> Result<Vec<u8>> {
    if let Some(path) = path {
        return read_file(path);
    }
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf)?;
    Ok(buf)
}

fn read_payload(path: Option<&Path>, canonical: bool) -> Result<Vec<u8>> {
    let data = read_data(path)?;
    if !canonical {
        return Ok(data);
    }
    let value: serde_json::Value =
        serde_json::from_slice(&data).context("--canonical data is not JSON")?;
    Ok(encode_canonical_value(&value)?.to_vec())
}

/// `lookup` resolves a variable name; the binary passes `std::env::var`.
fn password_from_env(name: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    let password = lookup(name).with_context(|| format!("password variable {name} is not set"))?;
    if password.is_empty() {
        bail!("password variable {name} is empty");
    }
    Ok(password)
}

fn write_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if compact {
        serde_json::to_writer(&mut handle, value)?;
    } else {
        serde_json::to_writer_pretty(&mut handle, value)?;
    }
    writeln!(handle)?;
    Ok(())
}
