//! Base64 helpers for the persisted string forms

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use traveal_core::{TravealError, TravealResult};

pub fn b64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn b64_decode(field: &str, s: &str) -> TravealResult<Vec<u8>> {
    STANDARD
        .decode(s)
        .map_err(|e| TravealError::Format(format!("{field}: base64 decode: {e}")))
}

/// Decode a field that must be exactly `N` bytes long.
pub fn b64_decode_array<const N: usize>(field: &str, s: &str) -> TravealResult<[u8; N]> {
    let bytes = b64_decode(field, s)?;
    bytes.as_slice().try_into().map_err(|_| {
        TravealError::Format(format!(
            "{field}: expected {N} bytes, got {}",
            bytes.len()
        ))
    })
}
