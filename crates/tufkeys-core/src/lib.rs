//! Key identity, key and signature model, and crypto backend dispatch for
//! TUF-style trust metadata.
//!
//! ```
//! use std::sync::Arc;
//! use tufkeys_core::{BackendRegistry, BackendSelection, KeyFactory, SignatureEngine};
//!
//! let registry = Arc::new(BackendRegistry::detect());
//! let factory = KeyFactory::new(registry.clone(), BackendSelection::default());
//! let engine = SignatureEngine::new(registry, BackendSelection::default());
//!
//! let key = factory.generate_ed25519_key()?;
//! let sig = engine.sign(&key, b"root.json")?;
//! assert_eq!(sig.keyid, key.keyid());
//! assert!(engine.verify(&key, &sig, b"root.json")?);
//! # Ok::<(), tufkeys_core::KeyError>(())
//! ```

mod codec;
mod config;
mod dalek_backend;
mod engine;
mod factory;
mod identity;
mod key;
mod pem;
mod registry;
mod ring_backend;
mod rustcrypto_backend;
#[cfg(test)]
mod testing;
mod types;

pub use codec::{metadata_key_from_json, storage_key_from_json, to_metadata, to_storage};
pub use config::{
    default_config_path, BackendSelection, CryptoConfig, CONFIG_PATH_ENV, ED25519_BACKEND_ENV,
    RSA_BACKEND_ENV,
};
pub use dalek_backend::{DalekBackend, ED25519_METHOD};
pub use engine::{Signature, SignatureEngine};
pub use factory::{
    check_rsa_bits, KeyFactory, DEFAULT_RSA_KEY_BITS, MAX_RSA_KEY_BITS, MIN_RSA_KEY_BITS,
    RSA_KEY_BITS_STEP,
};
pub use identity::{compute_keyid, KEYID_HASH_ALGORITHM};
pub use key::Key;
pub use pem::{PemEncryptor, DEFAULT_PBKDF2_ITERATIONS, MIN_PBKDF2_ITERATIONS};
pub use registry::{
    supported_for, BackendRegistry, ACCELERATED_ED25519_BACKEND, DALEK, PORTABLE_ED25519_BACKEND,
    RING, RUSTCRYPTO, SUPPORTED_ED25519_BACKENDS, SUPPORTED_RSA_BACKENDS,
};
pub use ring_backend::RingBackend;
pub use rustcrypto_backend::{RustCryptoBackend, RSA_PSS_METHOD};
pub use types::{
    Ed25519Backend, Ed25519KeyPair, KeyError, KeyType, PemKdfParams, RawSignature, Result,
    RsaBackend, RsaKeyPair,
};
