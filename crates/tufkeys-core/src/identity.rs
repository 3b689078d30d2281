//! Content-addressed key identifiers.
//!
//! A keyid is the lowercase hex SHA-256 digest of the canonical JSON form of
//! the key's public-only metadata shape:
//!
//! ```text
//! {"keytype":"<type>","keyval":{"private":"","public":"<public>"}}
//! ```
//!
//! Private material never participates, so a key and its public half share
//! one identifier.

use sha2::{Digest, Sha256};
use tufkeys_proto::{encode_canonical, MetadataKey, MetadataKeyVal};

use crate::{KeyType, Result};

pub const KEYID_HASH_ALGORITHM: &str = "sha256";

pub fn compute_keyid(keytype: KeyType, public: &str) -> Result<String> {
    let shape = MetadataKey {
        keytype: keytype.as_str().to_string(),
        keyval: MetadataKeyVal {
            public: public.to_string(),
            private: String::new(),
        },
    };
    let canonical = encode_canonical(&shape)?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}
