//! AES-CBC with PKCS7 padding

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use traveal_core::{TravealError, TravealResult};

use crate::{IV_SIZE, KEY_SIZE};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

pub fn aes256_cbc_encrypt(key: &[u8; KEY_SIZE], iv: &[u8; IV_SIZE], plaintext: &[u8]) -> Vec<u8> {
    Aes256CbcEnc::new(key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Returns `Padding` when the final block does not carry a valid pad.
pub fn aes256_cbc_decrypt(
    key: &[u8; KEY_SIZE],
    iv: &[u8; IV_SIZE],
    ciphertext: &[u8],
) -> TravealResult<Vec<u8>> {
    Aes256CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| TravealError::Padding)
}

pub fn aes128_cbc_encrypt(key: &[u8; 16], iv: &[u8; IV_SIZE], plaintext: &[u8]) -> Vec<u8> {
    Aes128CbcEnc::new(key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

pub fn aes128_cbc_decrypt(
    key: &[u8; 16],
    iv: &[u8; IV_SIZE],
    ciphertext: &[u8],
) -> TravealResult<Vec<u8>> {
    Aes128CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| TravealError::Padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_to_block_boundary() {
        let key = [3u8; KEY_SIZE];
        let iv = [4u8; IV_SIZE];

        assert_eq!(aes256_cbc_encrypt(&key, &iv, b"").len(), BLOCK_SIZE);
        assert_eq!(aes256_cbc_encrypt(&key, &iv, &[0u8; 15]).len(), BLOCK_SIZE);
        // a full block gains a whole block of padding
        assert_eq!(aes256_cbc_encrypt(&key, &iv, &[0u8; 16]).len(), 2 * BLOCK_SIZE);
    }

    #[test]
    fn test_aes256_roundtrip() {
        let key = [9u8; KEY_SIZE];
        let iv = [1u8; IV_SIZE];
        let ct = aes256_cbc_encrypt(&key, &iv, b"trip data");
        assert_eq!(aes256_cbc_decrypt(&key, &iv, &ct).unwrap(), b"trip data");
    }

    #[test]
    fn test_aes128_roundtrip() {
        let key = [9u8; 16];
        let iv = [1u8; IV_SIZE];
        let ct = aes128_cbc_encrypt(&key, &iv, b"token body");
        assert_eq!(aes128_cbc_decrypt(&key, &iv, &ct).unwrap(), b"token body");
    }

    #[test]
    fn test_wrong_key_reports_padding() {
        let iv = [1u8; IV_SIZE];
        // Pick a plaintext whose decryption under the wrong key almost
        // surely ends in an invalid pad; scan keys until one does.
        let ct = aes256_cbc_encrypt(&[1u8; KEY_SIZE], &iv, b"0123456789");
        let failed = (2u8..=64)
            .map(|k| aes256_cbc_decrypt(&[k; KEY_SIZE], &iv, &ct))
            .any(|r| matches!(r, Err(TravealError::Padding)));
        assert!(failed);
    }

    #[test]
    fn test_truncated_ciphertext_rejected() {
        let key = [9u8; KEY_SIZE];
        let iv = [1u8; IV_SIZE];
        let ct = aes256_cbc_encrypt(&key, &iv, b"trip data");
        assert!(aes256_cbc_decrypt(&key, &iv, &ct[..ct.len() - 1]).is_err());
    }
}
