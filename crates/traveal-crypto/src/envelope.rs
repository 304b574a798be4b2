//! Authenticated envelope: AES-256-CBC under a KDF-derived key, encrypt-then-tag
//!
//! Persisted shape (all binary fields standard base64):
//! ```text
//! { "encrypted": ..., "salt": 32 B, "iv": 16 B, "auth_tag": 32 B,
//!   "method": "pbkdf2" | "scrypt", "version": "1.0" | "2.0" }
//! ```
//!
//! The tag always covers `ciphertext || salt || iv` and is checked in
//! constant time before any decryption or unpadding happens.
//!
//! Version "1.0" tags are PBKDF2-HMAC-SHA-256 (password = tagged bytes,
//! salt = derived key, 10,000 iterations), matching envelopes already in
//! storage. Version "2.0" tags are HMAC-SHA-256 under a MAC key expanded
//! from the derived key with HKDF (domain "traveal-envelope-mac").

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use traveal_core::config::CryptoConfig;
use traveal_core::{KdfMethod, TagScheme, TravealError, TravealResult};
use zeroize::{Zeroize, Zeroizing};

use crate::cipher::{aes256_cbc_decrypt, aes256_cbc_encrypt, BLOCK_SIZE};
use crate::encoding::{b64_decode, b64_decode_array, b64_encode};
use crate::kdf::{derive_key, KdfParams, SymmetricKey};
use crate::random::{random_bytes, random_u32};
use crate::{IV_SIZE, KEY_SIZE, SALT_SIZE, TAG_SIZE};

const LEGACY_TAG_ITERATIONS: u32 = 10_000;
const MAC_KEY_INFO: &[u8] = b"traveal-envelope-mac";

fn default_version() -> String {
    TagScheme::Legacy.version().to_string()
}

/// The persisted/transmitted unit of encrypted data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// AES-256-CBC ciphertext
    pub encrypted: String,
    pub salt: String,
    pub iv: String,
    pub auth_tag: String,
    #[serde(default)]
    pub method: KdfMethod,
    #[serde(default = "default_version")]
    pub version: String,
}

impl Envelope {
    pub fn to_json(&self) -> TravealResult<String> {
        serde_json::to_string(self).map_err(|e| TravealError::Format(format!("envelope: {e}")))
    }

    pub fn from_json(s: &str) -> TravealResult<Self> {
        serde_json::from_str(s).map_err(|e| TravealError::Format(format!("envelope: {e}")))
    }
}

#[derive(Serialize, Deserialize)]
struct LocationPayload {
    lat: f64,
    lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nonce: Option<u32>,
}

/// Encrypts and decrypts [`Envelope`]s.
///
/// Holds only cost parameters and the tag scheme for new envelopes; it is
/// `Send + Sync` and can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeCodec {
    params: KdfParams,
    tag_scheme: TagScheme,
}

impl EnvelopeCodec {
    /// Codec with non-default KDF cost. Envelopes it seals open only
    /// under the same `params`; storage paths use [`EnvelopeCodec::from_config`].
    pub fn new(params: KdfParams) -> Self {
        Self {
            params,
            tag_scheme: TagScheme::Legacy,
        }
    }

    /// Production KDF cost with the configured tag scheme.
    pub fn from_config(config: &CryptoConfig) -> Self {
        Self::new(KdfParams::default()).with_tag_scheme(config.tag_scheme)
    }

    /// Tag scheme used for newly sealed envelopes. Decryption always
    /// follows the envelope's own `version`.
    pub fn with_tag_scheme(mut self, tag_scheme: TagScheme) -> Self {
        self.tag_scheme = tag_scheme;
        self
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Encrypt raw bytes under a fresh salt and IV.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        secret: &SecretString,
        method: KdfMethod,
    ) -> TravealResult<Envelope> {
        let salt: [u8; SALT_SIZE] = random_bytes()?;
        let iv: [u8; IV_SIZE] = random_bytes()?;
        let key = derive_key(secret, &salt, method, &self.params)?;

        let ciphertext = aes256_cbc_encrypt(key.as_bytes(), &iv, plaintext);
        let tag = compute_tag(self.tag_scheme, &key, &ciphertext, &salt, &iv)?;

        tracing::debug!(
            method = %method,
            version = self.tag_scheme.version(),
            plaintext_len = plaintext.len(),
            "envelope sealed"
        );

        Ok(Envelope {
            encrypted: b64_encode(&ciphertext),
            salt: b64_encode(&salt),
            iv: b64_encode(&iv),
            auth_tag: b64_encode(&tag),
            method,
            version: self.tag_scheme.version().to_string(),
        })
    }

    /// Serialize `value` as compact JSON and encrypt it.
    pub fn encrypt_json<T: Serialize + ?Sized>(
        &self,
        value: &T,
        secret: &SecretString,
        method: KdfMethod,
    ) -> TravealResult<Envelope> {
        let mut plaintext = serde_json::to_vec(value)
            .map_err(|e| TravealError::Format(format!("payload serialization: {e}")))?;
        let envelope = self.encrypt(&plaintext, secret, method);
        plaintext.zeroize();
        envelope
    }

    /// Verify the tag, then decrypt. Wrong secrets, tampering and bad
    /// padding all surface as `Authentication`.
    pub fn decrypt(&self, envelope: &Envelope, secret: &SecretString) -> TravealResult<Vec<u8>> {
        let scheme = TagScheme::from_version(&envelope.version)?;

        let ciphertext = b64_decode("encrypted", &envelope.encrypted)?;
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(TravealError::Format(format!(
                "encrypted: length {} is not a positive multiple of {BLOCK_SIZE}",
                ciphertext.len()
            )));
        }
        let salt: [u8; SALT_SIZE] = b64_decode_array("salt", &envelope.salt)?;
        let iv: [u8; IV_SIZE] = b64_decode_array("iv", &envelope.iv)?;
        let tag: [u8; TAG_SIZE] = b64_decode_array("auth_tag", &envelope.auth_tag)?;

        let key = derive_key(secret, &salt, envelope.method, &self.params)?;
        let expected = compute_tag(scheme, &key, &ciphertext, &salt, &iv)?;

        if !bool::from(expected[..].ct_eq(&tag[..])) {
            tracing::warn!(method = %envelope.method, "envelope authentication failed");
            return Err(TravealError::Authentication);
        }

        let plaintext = aes256_cbc_decrypt(key.as_bytes(), &iv, &ciphertext)
            .map_err(TravealError::into_external)?;

        tracing::debug!(method = %envelope.method, "envelope opened");
        Ok(plaintext)
    }

    /// Decrypt and parse the plaintext as JSON.
    pub fn decrypt_json<T: DeserializeOwned>(
        &self,
        envelope: &Envelope,
        secret: &SecretString,
    ) -> TravealResult<T> {
        let plaintext = Zeroizing::new(self.decrypt(envelope, secret)?);
        serde_json::from_slice(&plaintext)
            .map_err(|e| TravealError::Format(format!("decrypted payload is not valid JSON: {e}")))
    }

    /// Encrypt a coordinate pair. A random nonce is mixed into the payload
    /// so identical coordinates never produce related ciphertexts.
    pub fn encrypt_location(
        &self,
        lat: f64,
        lng: f64,
        secret: &SecretString,
        method: KdfMethod,
    ) -> TravealResult<Envelope> {
        let payload = LocationPayload {
            lat,
            lng,
            nonce: Some(random_u32()?),
        };
        self.encrypt_json(&payload, secret, method)
    }

    /// Returns `(lat, lng)`; the nonce is discarded.
    pub fn decrypt_location(
        &self,
        envelope: &Envelope,
        secret: &SecretString,
    ) -> TravealResult<(f64, f64)> {
        let payload: LocationPayload = self.decrypt_json(envelope, secret)?;
        Ok((payload.lat, payload.lng))
    }
}

fn compute_tag(
    scheme: TagScheme,
    key: &SymmetricKey,
    ciphertext: &[u8],
    salt: &[u8; SALT_SIZE],
    iv: &[u8; IV_SIZE],
) -> TravealResult<[u8; TAG_SIZE]> {
    let mut tagged = Vec::with_capacity(ciphertext.len() + SALT_SIZE + IV_SIZE);
    tagged.extend_from_slice(ciphertext);
    tagged.extend_from_slice(salt);
    tagged.extend_from_slice(iv);

    let mut tag = [0u8; TAG_SIZE];
    match scheme {
        TagScheme::Legacy => {
            pbkdf2::pbkdf2_hmac::<Sha256>(&tagged, key.as_bytes(), LEGACY_TAG_ITERATIONS, &mut tag);
        }
        TagScheme::Hmac => {
            let mut mac_key = Zeroizing::new([0u8; KEY_SIZE]);
            Hkdf::<Sha256>::new(None, key.as_bytes())
                .expand(MAC_KEY_INFO, &mut mac_key[..])
                .map_err(|e| TravealError::InvalidParams(format!("HKDF expand failed: {e}")))?;

            let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(&mac_key[..])
                .map_err(|e| TravealError::InvalidParams(format!("HMAC key: {e}")))?;
            mac.update(&tagged);
            tag.copy_from_slice(&mac.finalize().into_bytes());
        }
    }
    Ok(tag)
}
