//! traveal-crypto: envelope encryption and secure hashing for trip data
//!
//! Envelope pipeline:
//! ```text
//! secret + fresh salt ──KDF (PBKDF2-SHA-512 | scrypt)──> 256-bit key
//! payload ──PKCS7──> AES-256-CBC(key, fresh IV) ──> ciphertext
//! tag = TAG(key, ciphertext || salt || iv), checked in constant time before decrypting
//! ```
//!
//! Alongside it:
//! - [`token`]: static-key Fernet-layout tokens (explicitly low-security)
//! - [`hash`]: salted PBKDF2-SHA-512 hash records with constant-time verify
//! - [`apikey`]: opaque API keys with a corruption checksum, session tokens

pub mod apikey;
pub mod cipher;
pub mod encoding;
pub mod envelope;
pub mod hash;
pub mod kdf;
pub mod random;
pub mod token;

pub use apikey::{
    generate_api_key, generate_session_token, verify_api_key_checksum, verify_session_token,
    SessionToken,
};
pub use envelope::{Envelope, EnvelopeCodec};
pub use hash::{hash, verify, HashRecord};
pub use kdf::{derive_key, KdfParams, SymmetricKey};
pub use token::LowSecurityTokenCodec;

/// Size of a derived symmetric key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of a KDF salt
pub const SALT_SIZE: usize = 32;

/// Size of an AES-CBC initialization vector
pub const IV_SIZE: usize = 16;

/// Size of an envelope authentication tag
pub const TAG_SIZE: usize = 32;
