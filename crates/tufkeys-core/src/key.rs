use std::fmt;

use zeroize::Zeroizing;

use crate::identity::compute_keyid;
use crate::{KeyError, KeyType, Result};

/// An asymmetric key with its derived identifier.
///
/// A `Key` can only be built through [`crate::KeyFactory`] or the codec
/// ingestion functions, all of which derive `keyid` from `keytype` and
/// `public`. There are no setters, so the identifier always matches the
/// material it names.
#[derive(Clone, PartialEq, Eq)]
pub struct Key {
    keytype: KeyType,
    keyid: String,
    public: String,
    private: Option<Zeroizing<String>>,
}

impl Key {
    pub(crate) fn new(
        keytype: KeyType,
        public: String,
        private: Option<Zeroizing<String>>,
    ) -> Result<Self> {
        check_material(keytype, &public, private.as_deref().map(String::as_str))?;
        let keyid = compute_keyid(keytype, &public)?;
        Ok(Self {
            keytype,
            keyid,
            public,
            private,
        })
    }

    pub fn keytype(&self) -> KeyType {
        self.keytype
    }

    pub fn keyid(&self) -> &str {
        &self.keyid
    }

    pub fn public(&self) -> &str {
        &self.public
    }

    pub fn private(&self) -> Option<&str> {
        self.private.as_deref().map(String::as_str)
    }

    pub fn has_private(&self) -> bool {
        self.private.is_some()
    }

    /// The same key with its private half dropped. The keyid is unchanged.
    pub fn public_only(&self) -> Key {
        Key {
            keytype: self.keytype,
            keyid: self.keyid.clone(),
            public: self.public.clone(),
            private: None,
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("keytype", &self.keytype)
            .field("keyid", &self.keyid)
            .field("public", &self.public)
            .field("private", &self.private.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Shape checks on key material for its declared type.
pub(crate) fn check_material(keytype: KeyType, public: &str, private: Option<&str>) -> Result<()> {
    if public.is_empty() {
        return Err(KeyError::MalformedKey("public key material is empty".into()));
    }
    if matches!(private, Some("")) {
        return Err(KeyError::MalformedKey("private key material is empty".into()));
    }

    match keytype {
        KeyType::Rsa => {
            if !is_pem_block(public, "PUBLIC KEY") {
                return Err(KeyError::MalformedKey(
                    "rsa public key is not a PEM public key block".into(),
                ));
            }
            if let Some(private) = private {
                if !is_pem_block(private, "PRIVATE KEY") {
                    return Err(KeyError::MalformedKey(
                        "rsa private key is not a PEM private key block".into(),
                    ));
                }
            }
        }
        KeyType::Ed25519 => {
            check_ed25519_hex(public, "public")?;
            if let Some(private) = private {
                check_ed25519_hex(private, "private")?;
            }
        }
    }
    Ok(())
}

/// True when `pem` holds a `-----BEGIN ...<label>-----` block.
pub(crate) fn is_pem_block(pem: &str, label: &str) -> bool {
    let trimmed = pem.trim_start();
    let Some(rest) = trimmed.strip_prefix("-----BEGIN ") else {
        return false;
    };
    let Some(header_end) = rest.find("-----") else {
        return false;
    };
    rest[..header_end].ends_with(label) && rest[header_end..].contains("-----END ")
}

fn check_ed25519_hex(value: &str, half: &str) -> Result<()> {
    if value.len() != 64 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(KeyError::MalformedKey(format!(
            "ed25519 {half} key must be 64 hex characters"
        )));
    }
    Ok(())
}

/// Decode one hex-encoded 32-byte ed25519 half.
pub(crate) fn decode_ed25519_half(value: &str) -> Result<[u8; 32]> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(value, &mut out)
        .map_err(|_| KeyError::MalformedKey("ed25519 key material is not 32 hex bytes".into()))?;
    Ok(out)
}
