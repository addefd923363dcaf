//! # Session decryption
//!
//! Sensitive user data returned to the mini-app front end is AES-CBC encrypted with the `session_key` issued by
//! `code2session`. The front end hands the server three base64 strings (ciphertext, key, IV); this module turns them
//! into a [`UserProfile`].
//!
//! The decrypted profile carries a [`Watermark`] naming the app it was minted for and when. This module exposes the
//! watermark but does not enforce freshness; replay protection is the caller's job.
use aes::{
    cipher::{block_padding::Pkcs7, BlockCipher, BlockDecryptMut, KeyInit, KeyIvInit},
    Aes128,
    Aes192,
    Aes256,
};
use chrono::{DateTime, Utc};
use dpg_common::Secret;
use log::*;
use serde::{Deserialize, Serialize};

use crate::DecryptionError;

pub const BLOCK_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub nick_name: String,
    #[serde(default)]
    pub gender: i64,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub language: String,
    pub watermark: Watermark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    pub appid: String,
    /// Unix timestamp, in seconds
    pub timestamp: i64,
}

impl Watermark {
    pub fn is_for_app(&self, app_id: &str) -> bool {
        self.appid == app_id
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// The key material from one login exchange. It lives for one decrypt flow and is never persisted.
#[derive(Debug, Clone)]
pub struct SessionCredential {
    pub session_key: Secret<String>,
    pub iv: String,
}

impl SessionCredential {
    pub fn new(session_key: Secret<String>, iv: &str) -> Self {
        Self { session_key, iv: iv.to_string() }
    }

    pub fn decrypt(&self, encrypted_data: &str) -> Result<UserProfile, DecryptionError> {
        decrypt_user_profile(encrypted_data, self.session_key.reveal(), &self.iv)
    }
}

/// Decrypt a base64, AES-CBC (PKCS#7) encrypted user profile.
///
/// Either a complete profile is returned or an error describing why the payload was rejected.
pub fn decrypt_user_profile(encrypted_data: &str, session_key: &str, iv: &str) -> Result<UserProfile, DecryptionError> {
    let data = decode_base64("encrypted data", encrypted_data)?;
    let key = decode_base64("session key", session_key)?;
    let iv = decode_base64("initialization vector", iv)?;
    let plaintext = cbc_decrypt(&key, &iv, &data)?;
    let profile = serde_json::from_slice::<UserProfile>(&plaintext).map_err(|e| {
        debug!("🔑️ Decrypted {} bytes, but they are not a user profile. {e}", plaintext.len());
        DecryptionError::InvalidPayload(e.to_string())
    })?;
    trace!("🔑️ Decrypted user profile for app {}", profile.watermark.appid);
    Ok(profile)
}

fn decode_base64(field: &'static str, value: &str) -> Result<Vec<u8>, DecryptionError> {
    base64::decode(value.trim()).map_err(|e| DecryptionError::InvalidBase64 { field, reason: e.to_string() })
}

fn cbc_decrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, DecryptionError> {
    if iv.len() != BLOCK_SIZE {
        return Err(DecryptionError::InvalidIvLength(iv.len()));
    }
    if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
        return Err(DecryptionError::InvalidCiphertext(format!(
            "length must be a non-zero multiple of {BLOCK_SIZE}, but was {}",
            data.len()
        )));
    }
    match key.len() {
        16 => decrypt_with::<Aes128>(key, iv, data),
        24 => decrypt_with::<Aes192>(key, iv, data),
        32 => decrypt_with::<Aes256>(key, iv, data),
        n => Err(DecryptionError::InvalidKeyLength(n)),
    }
}

fn decrypt_with<C>(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, DecryptionError>
where C: BlockDecryptMut + BlockCipher + KeyInit {
    let decryptor =
        cbc::Decryptor::<C>::new_from_slices(key, iv).map_err(|_| DecryptionError::InvalidKeyLength(key.len()))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(|_| DecryptionError::InvalidCiphertext("invalid padding".into()))
}
