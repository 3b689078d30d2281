use serde::{Deserialize, Serialize};

/// Key material as carried in the storage form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyVal {
    pub public: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<String>,
}

/// `{ keytype, keyid, keyval: { public, private? } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKey {
    pub keytype: String,
    pub keyid: String,
    pub keyval: KeyVal,
}

/// Key material as carried in trust metadata. An absent private half is
/// written as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataKeyVal {
    pub public: String,
    #[serde(default)]
    pub private: String,
}

/// `{ keytype, keyval: { public, private } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataKey {
    pub keytype: String,
    pub keyval: MetadataKeyVal,
}

/// `{ keyid, method, sig }`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureShape {
    pub keyid: String,
    pub method: String,
    pub sig: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_form_omits_absent_private() {
        let key = StorageKey {
            keytype: "ed25519".into(),
            keyid: "00".into(),
            keyval: KeyVal {
                public: "ab".into(),
                private: None,
            },
        };
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(
            json,
            r#"{"keytype":"ed25519","keyid":"00","keyval":{"public":"ab"}}"#
        );
    }

    #[test]
    fn metadata_form_defaults_missing_private_to_empty() {
        let key: MetadataKey =
            serde_json::from_str(r#"{"keytype":"rsa","keyval":{"public":"pem"}}"#).unwrap();
        assert_eq!(key.keyval.private, "");
    }

    #[test]
    fn metadata_form_requires_public() {
        let result = serde_json::from_str::<MetadataKey>(r#"{"keytype":"rsa","keyval":{}}"#);
        assert!(result.is_err());
    }
}
