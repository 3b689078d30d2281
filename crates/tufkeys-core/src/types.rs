use std::fmt;
use std::str::FromStr;

use zeroize::Zeroizing;

#[derive(thiserror::Error, Debug)]
pub enum KeyError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("malformed key: {0}")]
    MalformedKey(String),
    #[error("unsupported {family} backend {name:?} (supported: {supported})")]
    UnsupportedBackend {
        family: KeyType,
        name: String,
        supported: String,
    },
    #[error("{family} backend {name:?} is supported but was not loaded")]
    BackendUnavailable { family: KeyType, name: String },
    #[error("invalid RSA key size {0}: must be 2048 to 16384 bits and a multiple of 256")]
    InvalidKeySize(usize),
    #[error("unsupported key type: {0:?}")]
    UnsupportedKeyType(String),
    #[error("unknown signing method {method:?} for backend {backend}")]
    UnknownSigningMethod {
        method: String,
        backend: &'static str,
    },
    #[error("private key required to sign with key {keyid}")]
    PrivateKeyRequired { keyid: String },
    #[error("failed to decrypt private key: wrong password or corrupt container")]
    DecryptionFailed,
    /// A backend failed internally (rng, keygen, encoding). Bad keys, bad
    /// signatures and bad passwords never map here.
    #[error("crypto error: {0}")]
    Crypto(&'static str),
    #[error("config error: {0}")]
    Config(String),
}

impl From<tufkeys_proto::FormatError> for KeyError {
    fn from(err: tufkeys_proto::FormatError) -> Self {
        KeyError::MalformedInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KeyError>;

/// Key algorithm tag. Also names the backend family serving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyType {
    Rsa,
    Ed25519,
}

impl KeyType {
    pub const ALL: [KeyType; 2] = [KeyType::Rsa, KeyType::Ed25519];

    pub const fn as_str(self) -> &'static str {
        match self {
            KeyType::Rsa => "rsa",
            KeyType::Ed25519 => "ed25519",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rsa" => Ok(KeyType::Rsa),
            "ed25519" => Ok(KeyType::Ed25519),
            other => Err(KeyError::UnsupportedKeyType(other.to_string())),
        }
    }
}

/// PEM-encoded RSA key pair as produced by an [`RsaBackend`].
pub struct RsaKeyPair {
    /// SubjectPublicKeyInfo PEM (`BEGIN PUBLIC KEY`).
    pub public_pem: String,
    /// PKCS#1 PEM (`BEGIN RSA PRIVATE KEY`).
    pub private_pem: Zeroizing<String>,
}

/// Raw ed25519 key pair: the 32-byte public point and the 32-byte seed.
pub struct Ed25519KeyPair {
    pub public: [u8; 32],
    pub private: Zeroizing<[u8; 32]>,
}

/// Signature bytes plus the scheme identifier the backend used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSignature {
    pub bytes: Vec<u8>,
    pub method: &'static str,
}

/// Password-based key derivation inputs for one PEM encryption.
#[derive(Clone)]
pub struct PemKdfParams {
    pub iterations: u32,
    pub salt: [u8; 16],
    pub iv: [u8; 16],
}

impl fmt::Debug for PemKdfParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PemKdfParams")
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}

pub trait RsaBackend: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate_key_pair(&self, bits: usize) -> Result<RsaKeyPair>;
    fn sign(&self, private_pem: &str, data: &[u8]) -> Result<RawSignature>;
    /// `Ok(false)` when the signature is well formed but does not match.
    fn verify(&self, public_pem: &str, method: &str, sig: &[u8], data: &[u8]) -> Result<bool>;
    fn encrypt_pem(&self, private_pem: &str, password: &[u8], kdf: &PemKdfParams)
        -> Result<String>;
    fn decrypt_pem(&self, encrypted_pem: &str, password: &[u8]) -> Result<RsaKeyPair>;
}

pub trait Ed25519Backend: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate_key_pair(&self) -> Result<Ed25519KeyPair>;
    fn sign(&self, public: &[u8; 32], private: &[u8; 32], data: &[u8]) -> Result<RawSignature>;
    /// `Ok(false)` when the signature is well formed but does not match.
    fn verify(&self, public: &[u8; 32], method: &str, sig: &[u8], data: &[u8]) -> Result<bool>;
}
