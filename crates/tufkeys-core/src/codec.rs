//! Conversions between the storage form and the metadata form of a key.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tufkeys_proto::{KeyVal, MetadataKey, MetadataKeyVal, StorageKey};
use zeroize::Zeroizing;

use crate::{Key, KeyError, KeyType, Result};

/// Build the metadata shape for `keyval`.
///
/// The private half is carried only when `include_private` is set and the
/// key actually has one; otherwise `private` is the empty string.
pub fn to_metadata(keytype: KeyType, keyval: &KeyVal, include_private: bool) -> MetadataKey {
    let private = match (&keyval.private, include_private) {
        (Some(private), true) if !private.is_empty() => private.clone(),
        _ => String::new(),
    };
    MetadataKey {
        keytype: keytype.as_str().to_string(),
        keyval: MetadataKeyVal {
            public: keyval.public.clone(),
            private,
        },
    }
}

/// Turn a metadata-form key into a [`Key`], deriving its keyid.
pub fn to_storage(metadata: &MetadataKey) -> Result<Key> {
    let keytype: KeyType = metadata.keytype.parse()?;
    let private = match metadata.keyval.private.as_str() {
        "" => None,
        private => Some(Zeroizing::new(private.to_string())),
    };
    Key::new(keytype, metadata.keyval.public.clone(), private)
}

/// Parse a metadata-form key from JSON.
pub fn metadata_key_from_json(bytes: &[u8]) -> Result<Key> {
    let metadata: MetadataKey = serde_json::from_slice(bytes)
        .map_err(|err| KeyError::MalformedKey(format!("invalid metadata key: {err}")))?;
    to_storage(&metadata)
}

/// Parse a storage-form key from JSON.
pub fn storage_key_from_json(bytes: &[u8]) -> Result<Key> {
    let storage: StorageKey = serde_json::from_slice(bytes)
        .map_err(|err| KeyError::MalformedKey(format!("invalid storage key: {err}")))?;
    Key::from_storage(storage)
}

impl Key {
    pub fn keyval(&self) -> KeyVal {
        KeyVal {
            public: self.public().to_string(),
            private: self.private().map(str::to_string),
        }
    }

    pub fn to_metadata(&self, include_private: bool) -> MetadataKey {
        to_metadata(self.keytype(), &self.keyval(), include_private)
    }

    pub fn from_metadata(metadata: &MetadataKey) -> Result<Key> {
        to_storage(metadata)
    }

    pub fn to_storage(&self) -> StorageKey {
        StorageKey {
            keytype: self.keytype().as_str().to_string(),
            keyid: self.keyid().to_string(),
            keyval: self.keyval(),
        }
    }

    /// Ingest a storage-form key. The carried keyid is recomputed and must
    /// match.
    pub fn from_storage(storage: StorageKey) -> Result<Key> {
        let keytype: KeyType = storage.keytype.parse()?;
        let private = match storage.keyval.private {
            Some(private) if private.is_empty() => None,
            other => other.map(Zeroizing::new),
        };
        let key = Key::new(keytype, storage.keyval.public, private)?;
        if key.keyid() != storage.keyid {
            return Err(KeyError::MalformedKey(format!(
                "keyid {:?} does not match key material (expected {})",
                storage.keyid,
                key.keyid()
            )));
        }
        Ok(key)
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_storage().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let storage = StorageKey::deserialize(deserializer)?;
        Key::from_storage(storage).map_err(D::Error::custom)
    }
}
