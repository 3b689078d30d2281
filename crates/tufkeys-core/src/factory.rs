use std::sync::Arc;

use tracing::debug;
use zeroize::Zeroizing;

use crate::config::{BackendSelection, CryptoConfig};
use crate::key::is_pem_block;
use crate::pem::PemEncryptor;
use crate::registry::BackendRegistry;
use crate::{Key, KeyError, KeyType, Result};

pub const DEFAULT_RSA_KEY_BITS: usize = 3072;
pub const MIN_RSA_KEY_BITS: usize = 2048;
pub const MAX_RSA_KEY_BITS: usize = 16384;
pub const RSA_KEY_BITS_STEP: usize = 256;

/// Creates keys through the configured backends.
#[derive(Clone)]
pub struct KeyFactory {
    registry: Arc<BackendRegistry>,
    selection: BackendSelection,
    default_rsa_bits: usize,
    pem: PemEncryptor,
}

impl KeyFactory {
    pub fn new(registry: Arc<BackendRegistry>, selection: BackendSelection) -> Self {
        Self {
            registry,
            selection,
            default_rsa_bits: DEFAULT_RSA_KEY_BITS,
            pem: PemEncryptor::default(),
        }
    }

    pub fn from_config(registry: Arc<BackendRegistry>, config: &CryptoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry,
            selection: config.selection(),
            default_rsa_bits: config.rsa_default_bits,
            pem: PemEncryptor::new(config.pem_kdf_iterations)?,
        })
    }

    pub fn selection(&self) -> &BackendSelection {
        &self.selection
    }

    pub fn generate_rsa_key(&self, bits: usize) -> Result<Key> {
        check_rsa_bits(bits)?;
        self.assert_usable()?;
        let backend = self.registry.rsa(&self.selection.rsa)?;
        let pair = backend.generate_key_pair(bits)?;
        let key = Key::new(KeyType::Rsa, pair.public_pem, Some(pair.private_pem))?;
        debug!(keyid = key.keyid(), bits, backend = backend.name(), "generated rsa key");
        Ok(key)
    }

    pub fn generate_default_rsa_key(&self) -> Result<Key> {
        self.generate_rsa_key(self.default_rsa_bits)
    }

    pub fn generate_ed25519_key(&self) -> Result<Key> {
        self.assert_usable()?;
        let backend = self.registry.select_ed25519(&self.selection.ed25519)?;
        let pair = backend.generate_key_pair()?;
        let public = hex::encode(pair.public);
        let private = Zeroizing::new(hex::encode(&pair.private[..]));
        let key = Key::new(KeyType::Ed25519, public, Some(private))?;
        debug!(keyid = key.keyid(), backend = backend.name(), "generated ed25519 key");
        Ok(key)
    }

    /// Decrypt a password-protected RSA private key into a full key.
    pub fn import_rsa_key_from_encrypted_pem(&self, pem: &str, password: &str) -> Result<Key> {
        self.assert_usable()?;
        let backend = self.registry.rsa(&self.selection.rsa)?;
        let pair = self.pem.decrypt(backend.as_ref(), pem, password)?;
        let key = Key::new(KeyType::Rsa, pair.public_pem, Some(pair.private_pem))?;
        debug!(keyid = key.keyid(), "imported encrypted rsa key");
        Ok(key)
    }

    /// Wrap an RSA public key PEM. The text is kept verbatim.
    pub fn key_from_public_pem(&self, pem: &str) -> Result<Key> {
        self.assert_usable()?;
        if is_pem_block(pem, "PRIVATE KEY") {
            return Err(KeyError::MalformedInput(
                "expected a public key PEM, got a private key".into(),
            ));
        }
        if !is_pem_block(pem, "PUBLIC KEY") {
            return Err(KeyError::MalformedInput("not a PEM public key block".into()));
        }
        let key = Key::new(KeyType::Rsa, pem.to_string(), None)?;
        debug!(keyid = key.keyid(), "rsa key from public pem");
        Ok(key)
    }

    /// Password-protect an RSA private key PEM.
    pub fn create_rsa_encrypted_pem(&self, private_pem: &str, password: &str) -> Result<String> {
        self.assert_usable()?;
        let backend = self.registry.rsa(&self.selection.rsa)?;
        let encrypted = self.pem.encrypt(backend.as_ref(), private_pem, password)?;
        debug!(iterations = self.pem.iterations(), "encrypted rsa private key");
        Ok(encrypted)
    }

    fn assert_usable(&self) -> Result<()> {
        self.registry
            .assert_usable(&self.selection.rsa, &self.selection.ed25519)
    }
}

pub fn check_rsa_bits(bits: usize) -> Result<()> {
    if !(MIN_RSA_KEY_BITS..=MAX_RSA_KEY_BITS).contains(&bits) || bits % RSA_KEY_BITS_STEP != 0 {
        return Err(KeyError::InvalidKeySize(bits));
    }
    Ok(())
}
