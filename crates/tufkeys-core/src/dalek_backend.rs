use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::registry::DALEK;
use crate::{Ed25519Backend, Ed25519KeyPair, KeyError, RawSignature, Result};

pub const ED25519_METHOD: &str = "ed25519";

/// Portable ed25519 backend on `ed25519-dalek`.
#[derive(Clone, Debug, Default)]
pub struct DalekBackend;

impl DalekBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Ed25519Backend for DalekBackend {
    fn name(&self) -> &'static str {
        DALEK
    }

    fn generate_key_pair(&self) -> Result<Ed25519KeyPair> {
        let signing_key = SigningKey::generate(&mut OsRng);
        Ok(Ed25519KeyPair {
            public: signing_key.verifying_key().to_bytes(),
            private: Zeroizing::new(signing_key.to_bytes()),
        })
    }

    fn sign(&self, public: &[u8; 32], private: &[u8; 32], data: &[u8]) -> Result<RawSignature> {
        let signing_key = SigningKey::from_bytes(private);
        if signing_key.verifying_key().as_bytes() != public {
            return Err(KeyError::MalformedKey(
                "ed25519 public key does not belong to the private seed".into(),
            ));
        }
        let signature = signing_key.sign(data);
        Ok(RawSignature {
            bytes: signature.to_bytes().to_vec(),
            method: ED25519_METHOD,
        })
    }

    fn verify(&self, public: &[u8; 32], method: &str, sig: &[u8], data: &[u8]) -> Result<bool> {
        if method != ED25519_METHOD {
            return Err(KeyError::UnknownSigningMethod {
                method: method.to_string(),
                backend: DALEK,
            });
        }
        let sig: &[u8; 64] = sig.try_into().map_err(|_| {
            KeyError::MalformedInput(format!(
                "ed25519 signature must be 64 bytes, got {}",
                sig.len()
            ))
        })?;
        // A 32-byte string that is not a curve point cannot have signed
        // anything.
        let Ok(verifying_key) = VerifyingKey::from_bytes(public) else {
            return Ok(false);
        };
        let signature = Signature::from_bytes(sig);
        Ok(verifying_key.verify(data, &signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let backend = DalekBackend::new();
        let pair = backend.generate_key_pair().unwrap();
        let sig = backend.sign(&pair.public, &pair.private, b"payload").unwrap();
        assert_eq!(sig.method, ED25519_METHOD);
        assert_eq!(sig.bytes.len(), 64);
        assert!(backend
            .verify(&pair.public, ED25519_METHOD, &sig.bytes, b"payload")
            .unwrap());
        assert!(!backend
            .verify(&pair.public, ED25519_METHOD, &sig.bytes, b"payloae")
            .unwrap());
    }

    #[test]
    fn mismatched_halves_are_rejected() {
        let backend = DalekBackend::new();
        let a = backend.generate_key_pair().unwrap();
        let b = backend.generate_key_pair().unwrap();
        let err = backend.sign(&a.public, &b.private, b"x").unwrap_err();
        assert!(matches!(err, KeyError::MalformedKey(_)));
    }

    #[test]
    fn rfc8032_test_vector_one() {
        let seed: [u8; 32] =
            hex::decode("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60")
                .unwrap()
                .try_into()
                .unwrap();
        let public: [u8; 32] =
            hex::decode("d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a")
                .unwrap()
                .try_into()
                .unwrap();
        let sig = DalekBackend::new().sign(&public, &seed, b"").unwrap();
        assert_eq!(
            hex::encode(&sig.bytes),
            "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155\
             5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
        );
    }

    #[test]
    fn wrong_method_and_length_fail_loudly() {
        let backend = DalekBackend::new();
        let pair = backend.generate_key_pair().unwrap();
        let sig = backend.sign(&pair.public, &pair.private, b"x").unwrap();
        assert!(matches!(
            backend.verify(&pair.public, "RSASSA-PSS", &sig.bytes, b"x"),
            Err(KeyError::UnknownSigningMethod { .. })
        ));
        assert!(matches!(
            backend.verify(&pair.public, ED25519_METHOD, &sig.bytes[..63], b"x"),
            Err(KeyError::MalformedInput(_))
        ));
    }
}
