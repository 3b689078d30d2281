use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;
use tracing::{debug, info, warn};

use crate::dalek_backend::DalekBackend;
use crate::ring_backend::RingBackend;
use crate::rustcrypto_backend::RustCryptoBackend;
use crate::{Ed25519Backend, KeyError, KeyType, Result, RsaBackend};

pub const RUSTCRYPTO: &str = "rustcrypto";
pub const DALEK: &str = "dalek";
pub const RING: &str = "ring";

pub const SUPPORTED_RSA_BACKENDS: &[&str] = &[RUSTCRYPTO];
pub const SUPPORTED_ED25519_BACKENDS: &[&str] = &[DALEK, RING];

/// Portable ed25519 implementation, always compiled in.
pub const PORTABLE_ED25519_BACKEND: &str = DALEK;
/// Accelerated ed25519 implementation, present with the `ring` feature.
pub const ACCELERATED_ED25519_BACKEND: &str = RING;

type RsaMap = HashMap<&'static str, Arc<dyn RsaBackend>, RandomState>;
type Ed25519Map = HashMap<&'static str, Arc<dyn Ed25519Backend>, RandomState>;

/// Snapshot of the backends loaded in this process.
///
/// Build it once at startup with [`BackendRegistry::detect`] (or by
/// registering backends on [`BackendRegistry::new`]), then share it behind an
/// `Arc`. Nothing mutates it afterwards.
#[derive(Default)]
pub struct BackendRegistry {
    rsa: RsaMap,
    ed25519: Ed25519Map,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every compiled-in backend.
    pub fn detect() -> Self {
        let mut registry = Self::new();
        registry.register_rsa(Arc::new(RustCryptoBackend::new()));
        registry.register_ed25519(Arc::new(DalekBackend::new()));
        match RingBackend::load() {
            Ok(backend) => registry.register_ed25519(Arc::new(backend)),
            Err(err) => debug!(?err, "ring backend not loaded"),
        }

        info!(
            rsa = ?registry.available(KeyType::Rsa),
            ed25519 = ?registry.available(KeyType::Ed25519),
            "crypto backends loaded"
        );
        registry
    }

    pub fn register_rsa(&mut self, backend: Arc<dyn RsaBackend>) {
        self.rsa.insert(backend.name(), backend);
    }

    pub fn register_ed25519(&mut self, backend: Arc<dyn Ed25519Backend>) {
        self.ed25519.insert(backend.name(), backend);
    }

    /// Whether `name` is a backend this crate knows how to use, in any family.
    pub fn is_supported(&self, name: &str) -> bool {
        KeyType::ALL
            .iter()
            .any(|family| supported_for(*family).contains(&name))
    }

    /// Whether `name` was loaded, in any family.
    pub fn is_available(&self, name: &str) -> bool {
        self.rsa.contains_key(name) || self.ed25519.contains_key(name)
    }

    /// Names of the loaded backends of one family, sorted.
    pub fn available(&self, family: KeyType) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = match family {
            KeyType::Rsa => self.rsa.keys().copied().collect(),
            KeyType::Ed25519 => self.ed25519.keys().copied().collect(),
        };
        names.sort_unstable();
        names
    }

    /// Fail unless both configured backends are supported and loaded.
    pub fn assert_usable(&self, rsa: &str, ed25519: &str) -> Result<()> {
        self.check(KeyType::Rsa, rsa)?;
        self.check(KeyType::Ed25519, ed25519)
    }

    fn check(&self, family: KeyType, name: &str) -> Result<()> {
        let supported = supported_for(family);
        if !supported.contains(&name) {
            return Err(KeyError::UnsupportedBackend {
                family,
                name: name.to_string(),
                supported: supported.join(", "),
            });
        }
        let loaded = match family {
            KeyType::Rsa => self.rsa.contains_key(name),
            KeyType::Ed25519 => self.ed25519.contains_key(name),
        };
        if !loaded {
            return Err(KeyError::BackendUnavailable {
                family,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn rsa(&self, name: &str) -> Result<Arc<dyn RsaBackend>> {
        self.check(KeyType::Rsa, name)?;
        self.rsa
            .get(name)
            .cloned()
            .ok_or_else(|| KeyError::BackendUnavailable {
                family: KeyType::Rsa,
                name: name.to_string(),
            })
    }

    /// Pick the ed25519 implementation for `configured`.
    ///
    /// The accelerated backend is used only when it is both the configured
    /// one and loaded; every other case falls back to the portable backend.
    /// Generation, signing and verification all go through here.
    pub fn select_ed25519(&self, configured: &str) -> Result<Arc<dyn Ed25519Backend>> {
        if configured == ACCELERATED_ED25519_BACKEND {
            if let Some(backend) = self.ed25519.get(ACCELERATED_ED25519_BACKEND) {
                return Ok(backend.clone());
            }
            warn!(
                backend = ACCELERATED_ED25519_BACKEND,
                "accelerated ed25519 backend configured but not loaded"
            );
        }
        self.ed25519
            .get(PORTABLE_ED25519_BACKEND)
            .cloned()
            .ok_or_else(|| KeyError::BackendUnavailable {
                family: KeyType::Ed25519,
                name: PORTABLE_ED25519_BACKEND.to_string(),
            })
    }
}

pub fn supported_for(family: KeyType) -> &'static [&'static str] {
    match family {
        KeyType::Rsa => SUPPORTED_RSA_BACKENDS,
        KeyType::Ed25519 => SUPPORTED_ED25519_BACKENDS,
    }
}
