#[cfg(not(feature = "ring"))]
use crate::{Ed25519Backend, Ed25519KeyPair, KeyError, KeyType, RawSignature, Result};

#[cfg(not(feature = "ring"))]
#[derive(Clone, Debug)]
pub struct RingBackend {
    _private: (),
}

#[cfg(not(feature = "ring"))]
impl RingBackend {
    pub fn load() -> Result<Self> {
        Err(unavailable())
    }
}

#[cfg(not(feature = "ring"))]
fn unavailable() -> KeyError {
    KeyError::BackendUnavailable {
        family: KeyType::Ed25519,
        name: crate::registry::RING.to_string(),
    }
}

#[cfg(not(feature = "ring"))]
impl Ed25519Backend for RingBackend {
    fn name(&self) -> &'static str {
        crate::registry::RING
    }

    fn generate_key_pair(&self) -> Result<Ed25519KeyPair> {
        Err(unavailable())
    }

    fn sign(&self, _public: &[u8; 32], _private: &[u8; 32], _data: &[u8]) -> Result<RawSignature> {
        Err(unavailable())
    }

    fn verify(&self, _public: &[u8; 32], _method: &str, _sig: &[u8], _data: &[u8]) -> Result<bool> {
        Err(unavailable())
    }
}

#[cfg(feature = "ring")]
mod enabled {
    use ring::rand::{SecureRandom, SystemRandom};
    use ring::signature::{Ed25519KeyPair as RingKeyPair, KeyPair, UnparsedPublicKey, ED25519};
    use zeroize::Zeroizing;

    use crate::dalek_backend::ED25519_METHOD;
    use crate::registry::RING;
    use crate::{Ed25519Backend, Ed25519KeyPair, KeyError, RawSignature, Result};

    /// Accelerated ed25519 backend on `ring`.
    pub struct RingBackend {
        rng: SystemRandom,
    }

    impl RingBackend {
        pub fn load() -> Result<Self> {
            let rng = SystemRandom::new();
            // Loading fails if the system RNG cannot produce bytes.
            let mut probe = [0u8; 1];
            rng.fill(&mut probe)
                .map_err(|_| KeyError::Crypto("ring system rng unavailable"))?;
            Ok(Self { rng })
        }
    }

    impl Ed25519Backend for RingBackend {
        fn name(&self) -> &'static str {
            RING
        }

        fn generate_key_pair(&self) -> Result<Ed25519KeyPair> {
            let mut seed = Zeroizing::new([0u8; 32]);
            self.rng
                .fill(&mut seed[..])
                .map_err(|_| KeyError::Crypto("ring rng"))?;
            let pair = RingKeyPair::from_seed_unchecked(&seed[..])
                .map_err(|_| KeyError::Crypto("ring ed25519 seed"))?;
            let public: [u8; 32] = pair
                .public_key()
                .as_ref()
                .try_into()
                .map_err(|_| KeyError::Crypto("ring ed25519 public key length"))?;
            Ok(Ed25519KeyPair {
                public,
                private: seed,
            })
        }

        fn sign(
            &self,
            public: &[u8; 32],
            private: &[u8; 32],
            data: &[u8],
        ) -> Result<RawSignature> {
            let pair = RingKeyPair::from_seed_and_public_key(private, public).map_err(|_| {
                KeyError::MalformedKey(
                    "ed25519 public key does not belong to the private seed".into(),
                )
            })?;
            Ok(RawSignature {
                bytes: pair.sign(data).as_ref().to_vec(),
                method: ED25519_METHOD,
            })
        }

        fn verify(
            &self,
            public: &[u8; 32],
            method: &str,
            sig: &[u8],
            data: &[u8],
        ) -> Result<bool> {
            if method != ED25519_METHOD {
                return Err(KeyError::UnknownSigningMethod {
                    method: method.to_string(),
                    backend: RING,
                });
            }
            if sig.len() != 64 {
                return Err(KeyError::MalformedInput(format!(
                    "ed25519 signature must be 64 bytes, got {}",
                    sig.len()
                )));
            }
            let key = UnparsedPublicKey::new(&ED25519, public);
            Ok(key.verify(data, sig).is_ok())
        }
    }

}

#[cfg(feature = "ring")]
pub use enabled::RingBackend;
