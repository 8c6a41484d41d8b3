//! Per-bucket authenticated encryption: AES-128-GCM with a 96-bit nonce and
//! associated data binding each ciphertext to its flat tree index.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes128Gcm, Key, Nonce,
};
use rand::{CryptoRng, RngCore};

use crate::error::OramError;

const KEY_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// A per-bucket AES-128-GCM key.
#[derive(Clone)]
pub struct BucketKey([u8; KEY_LEN]);

impl std::fmt::Debug for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BucketKey").field(&"<redacted>").finish()
    }
}

impl BucketKey {
    /// Samples a fresh key from a cryptographically strong source.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    fn cipher(&self) -> Aes128Gcm {
        Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(&self.0))
    }
}

/// A fresh 96-bit nonce, sampled uniformly on every bucket write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce96([u8; NONCE_LEN]);

impl Nonce96 {
    /// Samples a fresh nonce from a cryptographically strong source.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

/// Builds the associated-data tag `"bucket_<i>"` for node `index`.
pub fn associated_data(index: usize) -> Vec<u8> {
    format!("bucket_{index}").into_bytes()
}

/// Authenticate-encrypts `plaintext` under `key`/`nonce` with associated
/// data `"bucket_<index>"`.
pub fn encrypt_bucket(key: &BucketKey, nonce: Nonce96, plaintext: &[u8], index: usize) -> Vec<u8> {
    let cipher = key.cipher();
    let aad = associated_data(index);
    cipher
        .encrypt(
            Nonce::from_slice(&nonce.0),
            aes_gcm::aead::Payload {
                msg: plaintext,
                aad: &aad,
            },
        )
        .expect("AES-GCM encryption of a fixed-width bucket payload cannot fail")
}

/// Authenticate-decrypts `ciphertext` under `key`/`nonce` with associated
/// data `"bucket_<index>"`. Returns [`OramError::IntegrityError`] on
/// authentication failure.
pub fn decrypt_bucket(
    key: &BucketKey,
    nonce: Nonce96,
    ciphertext: &[u8],
    index: usize,
) -> Result<Vec<u8>, OramError> {
    let cipher = key.cipher();
    let aad = associated_data(index);
    cipher
        .decrypt(
            Nonce::from_slice(&nonce.0),
            aes_gcm::aead::Payload {
                msg: ciphertext,
                aad: &aad,
            },
        )
        .map_err(|_| OramError::IntegrityError { index })
}
