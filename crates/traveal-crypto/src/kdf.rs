//! Key derivation: password/master secret + salt → 256-bit symmetric key

use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use traveal_core::{KdfMethod, TravealError, TravealResult};
use zeroize::Zeroize;

use crate::{KEY_SIZE, SALT_SIZE};

/// Per-envelope AES-256 key; the salt stored beside the ciphertext is
/// all that is needed to rebuild it from the master secret.
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
}

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Cost parameters for both KDF methods.
///
/// Envelopes record the method but not its cost, so anything sealed for
/// storage must use [`KdfParams::default`]. Other values exist for tests
/// and benchmarks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdfParams {
    /// PBKDF2-HMAC-SHA-512 iterations (default: 100000)
    pub pbkdf2_iterations: u32,
    /// scrypt log2(N) (default: 14)
    pub scrypt_log_n: u8,
    /// scrypt block size (default: 8)
    pub scrypt_r: u32,
    /// scrypt parallelism (default: 1)
    pub scrypt_p: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: 100_000,
            scrypt_log_n: 14,
            scrypt_r: 8,
            scrypt_p: 1,
        }
    }
}

/// Derive a 256-bit key from `secret` and `salt`.
///
/// Deterministic for identical inputs, so the same `method` and `params`
/// must be used again to decrypt anything encrypted under the result.
pub fn derive_key(
    secret: &SecretString,
    salt: &[u8; SALT_SIZE],
    method: KdfMethod,
    params: &KdfParams,
) -> TravealResult<SymmetricKey> {
    let password = secret.expose_secret().as_bytes();
    if password.is_empty() {
        return Err(TravealError::MissingSecret);
    }

    // derive straight into the key so no unwiped copy is left behind
    let mut key = SymmetricKey::from_bytes([0u8; KEY_SIZE]);
    match method {
        KdfMethod::Pbkdf2 => {
            if params.pbkdf2_iterations == 0 {
                return Err(TravealError::InvalidParams(
                    "PBKDF2 iterations must be non-zero".into(),
                ));
            }
            pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, params.pbkdf2_iterations, &mut key.bytes);
        }
        KdfMethod::Scrypt => {
            let scrypt_params =
                scrypt::Params::new(params.scrypt_log_n, params.scrypt_r, params.scrypt_p, KEY_SIZE)
                    .map_err(|e| TravealError::InvalidParams(format!("scrypt params: {e}")))?;
            scrypt::scrypt(password, salt, &scrypt_params, &mut key.bytes)
                .map_err(|e| TravealError::InvalidParams(format!("scrypt: {e}")))?;
        }
    }

    Ok(key)
}

/// Cheap parameters for tests.
#[cfg(test)]
pub(crate) fn fast_params() -> KdfParams {
    KdfParams {
        pbkdf2_iterations: 1_000,
        scrypt_log_n: 4,
        scrypt_r: 8,
        scrypt_p: 1,
    }
}
