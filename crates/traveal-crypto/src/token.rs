//! Low-security token codec: one static key for every message
//!
//! The key is `SHA-256(master secret)`, with no salt and no per-message
//! derivation, so anyone holding the master secret can open every token
//! ever produced and there is no forward secrecy. Use it only for short
//! values whose exposure is already bounded by the master secret.
//!
//! Token layout (Fernet), URL-safe base64, then wrapped in standard base64:
//! ```text
//! [1: 0x80][8: created_at, u64 BE seconds][16: IV][N: AES-128-CBC ciphertext][32: HMAC-SHA-256]
//! ```
//! The first 16 key bytes sign, the last 16 encrypt. The HMAC covers
//! everything before it.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use traveal_core::{TravealError, TravealResult};
use zeroize::{Zeroize, Zeroizing};

use crate::cipher::{aes128_cbc_decrypt, aes128_cbc_encrypt, BLOCK_SIZE};
use crate::random::random_bytes;
use crate::IV_SIZE;

const TOKEN_VERSION: u8 = 0x80;
const HEADER_LEN: usize = 1 + 8 + IV_SIZE;
const HMAC_LEN: usize = 32;
const MAX_CLOCK_SKEW_SECS: i64 = 60;

type HmacSha256 = Hmac<Sha256>;

/// Deterministic-key token codec. See the module docs for its limits.
pub struct LowSecurityTokenCodec {
    signing_key: [u8; 16],
    encryption_key: [u8; 16],
}

impl LowSecurityTokenCodec {
    /// Bind the codec to `master_secret`. An empty secret is `MissingSecret`.
    pub fn new(master_secret: &SecretString) -> TravealResult<Self> {
        let secret = master_secret.expose_secret();
        if secret.is_empty() {
            return Err(TravealError::MissingSecret);
        }

        let mut digest: [u8; 32] = Sha256::digest(secret.as_bytes()).into();
        let mut signing_key = [0u8; 16];
        let mut encryption_key = [0u8; 16];
        signing_key.copy_from_slice(&digest[..16]);
        encryption_key.copy_from_slice(&digest[16..]);
        digest.zeroize();

        Ok(Self {
            signing_key,
            encryption_key,
        })
    }

    pub fn encrypt_token(&self, payload: &[u8]) -> TravealResult<String> {
        self.encrypt_token_at(payload, Utc::now().timestamp())
    }

    pub fn encrypt_token_json<T: Serialize + ?Sized>(&self, value: &T) -> TravealResult<String> {
        let plaintext = Zeroizing::new(
            serde_json::to_vec(value)
                .map_err(|e| TravealError::Format(format!("payload serialization: {e}")))?,
        );
        self.encrypt_token(&plaintext)
    }

    fn encrypt_token_at(&self, payload: &[u8], created_at: i64) -> TravealResult<String> {
        let iv: [u8; IV_SIZE] = random_bytes()?;
        let ciphertext = aes128_cbc_encrypt(&self.encryption_key, &iv, payload);

        let mut body = Vec::with_capacity(HEADER_LEN + ciphertext.len() + HMAC_LEN);
        body.push(TOKEN_VERSION);
        body.extend_from_slice(&(created_at as u64).to_be_bytes());
        body.extend_from_slice(&iv);
        body.extend_from_slice(&ciphertext);

        let mut mac = self.mac()?;
        mac.update(&body);
        body.extend_from_slice(&mac.finalize().into_bytes());

        Ok(STANDARD.encode(URL_SAFE.encode(&body)))
    }

    /// Open a token of any age.
    pub fn decrypt_token(&self, token: &str) -> TravealResult<Vec<u8>> {
        self.open(token, None)
    }

    /// Open a token, rejecting it with `TokenExpired` when older than `ttl`
    /// or dated more than a minute in the future.
    pub fn decrypt_token_with_ttl(&self, token: &str, ttl: Duration) -> TravealResult<Vec<u8>> {
        self.open(token, Some(ttl))
    }

    pub fn decrypt_token_json<T: DeserializeOwned>(&self, token: &str) -> TravealResult<T> {
        let plaintext = Zeroizing::new(self.decrypt_token(token)?);
        serde_json::from_slice(&plaintext)
            .map_err(|e| TravealError::Format(format!("decrypted payload is not valid JSON: {e}")))
    }

    fn open(&self, token: &str, ttl: Option<Duration>) -> TravealResult<Vec<u8>> {
        let inner = STANDARD
            .decode(token.trim())
            .map_err(|e| TravealError::Format(format!("token: base64 decode: {e}")))?;
        let data = URL_SAFE
            .decode(&inner)
            .map_err(|e| TravealError::Format(format!("token body: base64 decode: {e}")))?;

        if data.len() < HEADER_LEN + BLOCK_SIZE + HMAC_LEN {
            return Err(TravealError::Format(format!(
                "token too short: {} bytes",
                data.len()
            )));
        }
        if data[0] != TOKEN_VERSION {
            return Err(TravealError::Format(format!(
                "unsupported token version 0x{:02x}",
                data[0]
            )));
        }

        let (body, tag) = data.split_at(data.len() - HMAC_LEN);
        let mut mac = self.mac()?;
        mac.update(body);
        if mac.verify_slice(tag).is_err() {
            tracing::warn!("token authentication failed");
            return Err(TravealError::Authentication);
        }

        let mut created = [0u8; 8];
        created.copy_from_slice(&body[1..9]);
        let created_at = u64::from_be_bytes(created) as i64;
        if let Some(ttl) = ttl {
            let now = Utc::now().timestamp();
            if created_at + ttl.num_seconds() < now || created_at > now + MAX_CLOCK_SKEW_SECS {
                return Err(TravealError::TokenExpired);
            }
        }

        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&body[9..HEADER_LEN]);
        let ciphertext = &body[HEADER_LEN..];
        if ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(TravealError::Authentication);
        }

        aes128_cbc_decrypt(&self.encryption_key, &iv, ciphertext)
            .map_err(TravealError::into_external)
    }

    fn mac(&self) -> TravealResult<HmacSha256> {
        <HmacSha256 as Mac>::new_from_slice(&self.signing_key)
            .map_err(|e| TravealError::InvalidParams(format!("HMAC key: {e}")))
    }
}

impl Drop for LowSecurityTokenCodec {
    fn drop(&mut self) {
        self.signing_key.zeroize();
        self.encryption_key.zeroize();
    }
}

impl std::fmt::Debug for LowSecurityTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LowSecurityTokenCodec")
            .field("keys", &"[REDACTED]")
            .finish()
    }
}
