mod canonical;
mod shapes;

pub use canonical::{encode_canonical, encode_canonical_value, MAX_DEPTH};
pub use shapes::{KeyVal, MetadataKey, MetadataKeyVal, SignatureShape, StorageKey};

pub type Result<T> = std::result::Result<T, FormatError>;

#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("floating point numbers have no canonical form: {0}")]
    NonCanonicalNumber(String),
    #[error("value nested deeper than {0} levels")]
    TooDeep(usize),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
