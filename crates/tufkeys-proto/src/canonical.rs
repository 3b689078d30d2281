use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use serde_json::Value;

use crate::{FormatError, Result};

pub const MAX_DEPTH: usize = 64;

/// Serialize `value` and encode it as canonical JSON.
///
/// The encoding matches the one trust metadata is hashed and signed over:
/// object keys sorted by code point, no insignificant whitespace, strings
/// escaping only `\` and `"`, and integers only.
pub fn encode_canonical<T>(value: &T) -> Result<Bytes>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value)?;
    encode_canonical_value(&value)
}

pub fn encode_canonical_value(value: &Value) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(256);
    write_value(&mut buf, value, 0)?;
    Ok(buf.freeze())
}

fn write_value(buf: &mut BytesMut, value: &Value, depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(FormatError::TooDeep(MAX_DEPTH));
    }
    match value {
        Value::Null => buf.put_slice(b"null"),
        Value::Bool(true) => buf.put_slice(b"true"),
        Value::Bool(false) => buf.put_slice(b"false"),
        Value::Number(number) => {
            if let Some(n) = number.as_i64() {
                buf.put_slice(n.to_string().as_bytes());
            } else if let Some(n) = number.as_u64() {
                buf.put_slice(n.to_string().as_bytes());
            } else {
                return Err(FormatError::NonCanonicalNumber(number.to_string()));
            }
        }
        Value::String(s) => write_string(buf, s),
        Value::Array(items) => {
            buf.put_u8(b'[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    buf.put_u8(b',');
                }
                write_value(buf, item, depth + 1)?;
            }
            buf.put_u8(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            buf.put_u8(b'{');
            for (idx, (key, item)) in entries.into_iter().enumerate() {
                if idx > 0 {
                    buf.put_u8(b',');
                }
                write_string(buf, key);
                buf.put_u8(b':');
                write_value(buf, item, depth + 1)?;
            }
            buf.put_u8(b'}');
        }
    }
    Ok(())
}

fn write_string(buf: &mut BytesMut, s: &str) {
    buf.reserve(s.len() + 2);
    buf.put_u8(b'"');
    for byte in s.bytes() {
        match byte {
            b'\\' => buf.put_slice(b"\\\\"),
            b'"' => buf.put_slice(b"\\\""),
            other => buf.put_u8(other),
        }
    }
    buf.put_u8(b'"');
}
