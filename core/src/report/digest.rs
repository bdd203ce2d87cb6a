use crate::error::CoreResult;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compact JSON with object keys in sorted order. serde_json's default map is
/// ordered by key, so a round trip through `Value` is enough.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> CoreResult<Vec<u8>> {
    let v = serde_json::to_value(value)?;
    Ok(serde_json::to_vec(&v)?)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

pub fn canonical_sha256<T: Serialize>(value: &T) -> CoreResult<String> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}
