//! Salted PBKDF2-HMAC-SHA-512 hashing with constant-time verification

use serde::{Deserialize, Serialize};
use sha2::Sha512;
use subtle::ConstantTimeEq;
use traveal_core::{TravealError, TravealResult};
use zeroize::Zeroizing;

use crate::encoding::{b64_decode, b64_encode};
use crate::random::random_bytes;
use crate::SALT_SIZE;

/// Output length of the secure hash
pub const HASH_SIZE: usize = 64;

/// Default PBKDF2 iteration count
pub const DEFAULT_HASH_ITERATIONS: u32 = 100_000;

/// Ceiling on the work a stored record can demand from `verify`
pub const MAX_HASH_ITERATIONS: u32 = 10_000_000;

/// Persisted hash: base64 `hash` and `salt`, decimal `iterations`.
///
/// Kept in its stored string form so that a malformed record is only ever
/// observed by [`verify`], which turns it into `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRecord {
    pub hash: String,
    pub salt: String,
    pub iterations: String,
}

/// Hash `data` with `salt` (fresh 32 random bytes when `None`).
pub fn hash(data: &str, salt: Option<[u8; SALT_SIZE]>, iterations: u32) -> TravealResult<HashRecord> {
    if iterations == 0 || iterations > MAX_HASH_ITERATIONS {
        return Err(TravealError::InvalidParams(format!(
            "hash iterations must be in 1..={MAX_HASH_ITERATIONS}, got {iterations}"
        )));
    }
    let salt = match salt {
        Some(salt) => salt,
        None => random_bytes()?,
    };

    let mut out = Zeroizing::new([0u8; HASH_SIZE]);
    pbkdf2::pbkdf2_hmac::<Sha512>(data.as_bytes(), &salt, iterations, &mut out[..]);

    Ok(HashRecord {
        hash: b64_encode(&out[..]),
        salt: b64_encode(&salt),
        iterations: iterations.to_string(),
    })
}

/// Check `data` against `record` using the record's own salt and
/// iteration count. Returns `false` for a mismatch and for any malformed
/// record; never errors.
pub fn verify(data: &str, record: &HashRecord) -> bool {
    match recompute(data, record) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::debug!("hash record rejected: {e}");
            false
        }
    }
}

fn recompute(data: &str, record: &HashRecord) -> TravealResult<bool> {
    let iterations: u32 = record
        .iterations
        .trim()
        .parse()
        .map_err(|e| TravealError::Format(format!("iterations: {e}")))?;
    if iterations == 0 || iterations > MAX_HASH_ITERATIONS {
        return Err(TravealError::Format(format!(
            "iterations out of range: {iterations}"
        )));
    }

    let salt = b64_decode("salt", &record.salt)?;
    let stored = b64_decode("hash", &record.hash)?;
    if stored.len() != HASH_SIZE {
        return Err(TravealError::Format(format!(
            "hash: expected {HASH_SIZE} bytes, got {}",
            stored.len()
        )));
    }

    let mut computed = Zeroizing::new([0u8; HASH_SIZE]);
    pbkdf2::pbkdf2_hmac::<Sha512>(data.as_bytes(), &salt, iterations, &mut computed[..]);

    Ok(computed[..].ct_eq(&stored[..]).into())
}
