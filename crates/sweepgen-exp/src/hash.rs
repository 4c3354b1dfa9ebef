use serde::Serialize;
use sha2::{Digest, Sha256};
use sweepgen_core::SweepError;

use crate::serde::to_canonical_json_bytes;

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, SweepError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(digest_hex(&bytes))
}

/// Hex encoded SHA-256 of a generated document.
pub fn document_hash(document: &str) -> String {
    digest_hex(document.as_bytes())
}

fn digest_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
