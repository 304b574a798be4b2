//! Opaque API keys and session tokens
//!
//! API key layout:
//! ```text
//! tk_<timestamp hex>_<64 hex random>_<8 hex checksum>
//! checksum = SHA-256(timestamp hex || random hex)[..8]
//! ```
//! The checksum only catches accidental corruption. It is an unkeyed
//! digest of public fields and proves nothing about who minted the key.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;
use traveal_core::TravealResult;

use crate::random::{random_bytes, random_u32};

pub const API_KEY_PREFIX: &str = "tk_";

const RANDOM_PART_BYTES: usize = 32;
const CHECKSUM_HEX_LEN: usize = 8;
const SESSION_TOKEN_BYTES: usize = 64;

/// Default session lifetime
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Generate a new API key.
pub fn generate_api_key() -> TravealResult<String> {
    let timestamp = format!("{:x}", random_u32()?);
    let random_part = hex::encode(random_bytes::<RANDOM_PART_BYTES>()?);
    let checksum = api_key_checksum(&timestamp, &random_part);

    Ok(format!("{API_KEY_PREFIX}{timestamp}_{random_part}_{checksum}"))
}

/// Recompute the checksum from the visible parts of `key`. Malformed keys
/// return `false`.
pub fn verify_api_key_checksum(key: &str) -> bool {
    let Some(body) = key.strip_prefix(API_KEY_PREFIX) else {
        return false;
    };
    let parts: Vec<&str> = body.split('_').collect();
    let [timestamp, random_part, checksum] = parts.as_slice() else {
        return false;
    };

    let well_formed = !timestamp.is_empty()
        && is_lower_hex(timestamp)
        && random_part.len() == RANDOM_PART_BYTES * 2
        && is_lower_hex(random_part)
        && checksum.len() == CHECKSUM_HEX_LEN
        && is_lower_hex(checksum);
    if !well_formed {
        return false;
    }

    let expected = api_key_checksum(timestamp, random_part);
    expected.as_bytes().ct_eq(checksum.as_bytes()).into()
}

fn api_key_checksum(timestamp: &str, random_part: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.as_bytes());
    hasher.update(random_part.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..CHECKSUM_HEX_LEN].to_string()
}

fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// A bearer session token with the hash to store server-side.
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// 128 hex chars; hand to the client, never store
    pub token: String,
    /// SHA-512 of `token`, hex
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Mint a session token valid for `ttl`.
pub fn generate_session_token(ttl: Duration) -> TravealResult<SessionToken> {
    let token = hex::encode(random_bytes::<SESSION_TOKEN_BYTES>()?);
    let hash = hex::encode(Sha512::digest(token.as_bytes()));

    Ok(SessionToken {
        token,
        hash,
        expires_at: Utc::now() + ttl,
    })
}

/// Constant-time check of a presented token against its stored hash.
/// A malformed stored hash yields `false`.
pub fn verify_session_token(token: &str, stored_hash: &str) -> bool {
    let Ok(stored) = hex::decode(stored_hash) else {
        return false;
    };
    let computed = Sha512::digest(token.as_bytes());
    computed[..].ct_eq(&stored[..]).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn split(key: &str) -> (String, String, String) {
        let body = key.strip_prefix(API_KEY_PREFIX).unwrap();
        let parts: Vec<&str> = body.split('_').collect();
        (parts[0].into(), parts[1].into(), parts[2].into())
    }

    #[test]
    fn test_api_key_format() {
        let key = generate_api_key().unwrap();
        let (timestamp, random_part, checksum) = split(&key);

        assert!(!timestamp.is_empty() && timestamp.len() <= 8);
        assert!(is_lower_hex(&timestamp));
        assert_eq!(random_part.len(), 64);
        assert!(is_lower_hex(&random_part));
        assert_eq!(checksum.len(), 8);
        assert!(is_lower_hex(&checksum));
    }

    #[test]
    fn test_checksum_matches_sha256_prefix() {
        // Known value: SHA-256("abcd" || "00" * 32)[..8]
        assert_eq!(api_key_checksum("abcd", &"00".repeat(32)), "92d1f24b");
    }

    #[test]
    fn test_api_keys_unique() {
        assert_ne!(generate_api_key().unwrap(), generate_api_key().unwrap());
    }

    #[test]
    fn test_verify_generated_key() {
        let key = generate_api_key().unwrap();
        assert!(verify_api_key_checksum(&key));
    }

    #[test]
    fn test_verify_detects_corruption() {
        let key = generate_api_key().unwrap();
        let (timestamp, random_part, checksum) = split(&key);

        let flipped = if random_part.starts_with('0') { '1' } else { '0' };
        let corrupted = format!("tk_{timestamp}_{flipped}{}_{checksum}", &random_part[1..]);
        assert!(!verify_api_key_checksum(&corrupted));
    }

    #[test]
    fn test_verify_rejects_malformed() {
        for key in [
            "",
            "tk_",
            "xx_abc_def_01234567",
            "tk_abc_def",
            "tk_abc_def_01234567",
            "tk_ABCD_0000000000000000000000000000000000000000000000000000000000000000_92d1f24b",
            "tk__0000000000000000000000000000000000000000000000000000000000000000_92d1f24b",
        ] {
            assert!(!verify_api_key_checksum(key), "accepted {key:?}");
        }
        assert!(verify_api_key_checksum(&format!("tk_abcd_{}_92d1f24b", "00".repeat(32))));
    }

    #[test]
    fn test_session_token_shape() {
        let session = generate_session_token(Duration::hours(DEFAULT_SESSION_TTL_HOURS)).unwrap();
        assert_eq!(session.token.len(), 128);
        assert_eq!(session.hash.len(), 128);
        assert!(session.expires_at > Utc::now() + Duration::hours(23));
    }

    #[test]
    fn test_session_token_verify() {
        let session = generate_session_token(Duration::hours(1)).unwrap();
        assert!(verify_session_token(&session.token, &session.hash));

        let other = generate_session_token(Duration::hours(1)).unwrap();
        assert!(!verify_session_token(&other.token, &session.hash));
        assert!(!verify_session_token(&session.token, "not-hex"));
        assert!(!verify_session_token(&session.token, ""));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn generated_keys_match_layout(_seed in any::<u8>()) {
            let key = generate_api_key().unwrap();
            let (timestamp, random_part, checksum) = split(&key);
            prop_assert!(key.starts_with("tk_"));
            prop_assert!(is_lower_hex(&timestamp) && !timestamp.is_empty());
            prop_assert_eq!(random_part.len(), 64);
            prop_assert_eq!(&checksum, &api_key_checksum(&timestamp, &random_part));
        }
    }
}
