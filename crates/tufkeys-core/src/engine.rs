use std::sync::Arc;

use tracing::debug;
use zeroize::Zeroizing;

use crate::config::{BackendSelection, CryptoConfig};
use crate::key::decode_ed25519_half;
use crate::registry::BackendRegistry;
use crate::{Key, KeyError, KeyType, RawSignature, Result};

pub use tufkeys_proto::SignatureShape as Signature;

/// Signs and verifies payloads with [`Key`]s, dispatching on key type.
#[derive(Clone)]
pub struct SignatureEngine {
    registry: Arc<BackendRegistry>,
    selection: BackendSelection,
}

impl SignatureEngine {
    pub fn new(registry: Arc<BackendRegistry>, selection: BackendSelection) -> Self {
        Self {
            registry,
            selection,
        }
    }

    pub fn from_config(registry: Arc<BackendRegistry>, config: &CryptoConfig) -> Self {
        Self::new(registry, config.selection())
    }

    pub fn sign(&self, key: &Key, payload: &[u8]) -> Result<Signature> {
        let Some(private) = key.private() else {
            return Err(KeyError::PrivateKeyRequired {
                keyid: key.keyid().to_string(),
            });
        };
        self.assert_usable()?;

        let raw: RawSignature = match key.keytype() {
            KeyType::Rsa => self
                .registry
                .rsa(&self.selection.rsa)?
                .sign(private, payload)?,
            KeyType::Ed25519 => {
                let public = decode_ed25519_half(key.public())?;
                let seed = Zeroizing::new(decode_ed25519_half(private)?);
                self.registry
                    .select_ed25519(&self.selection.ed25519)?
                    .sign(&public, &seed, payload)?
            }
        };

        debug!(keyid = key.keyid(), method = raw.method, "signed payload");
        Ok(Signature {
            keyid: key.keyid().to_string(),
            method: raw.method.to_string(),
            sig: hex::encode(raw.bytes),
        })
    }

    /// `Ok(false)` means the signature is well formed and does not match.
    pub fn verify(&self, key: &Key, signature: &Signature, payload: &[u8]) -> Result<bool> {
        let sig = hex::decode(&signature.sig)
            .map_err(|err| KeyError::MalformedInput(format!("signature is not hex: {err}")))?;
        self.assert_usable()?;

        let valid = match key.keytype() {
            KeyType::Rsa => self.registry.rsa(&self.selection.rsa)?.verify(
                key.public(),
                &signature.method,
                &sig,
                payload,
            )?,
            KeyType::Ed25519 => {
                let public = decode_ed25519_half(key.public())?;
                self.registry
                    .select_ed25519(&self.selection.ed25519)?
                    .verify(&public, &signature.method, &sig, payload)?
            }
        };

        debug!(
            keyid = key.keyid(),
            method = %signature.method,
            valid,
            "verified signature"
        );
        Ok(valid)
    }

    fn assert_usable(&self) -> Result<()> {
        self.registry
            .assert_usable(&self.selection.rsa, &self.selection.ed25519)
    }
}
