//! AES-256-GCM encryption/decryption
//!
//! Provides authenticated encryption of secret strings and the JSON
//! interchange record shared with the other vault clients.
//!
//! The cipher produces `ciphertext || tag`. Records store the two halves in
//! separate fields, so every encryption goes through [`split_tag`] and every
//! decryption through [`join_tag`]. Those two functions are the
//! interoperability contract; clients that get them wrong fail silently.

use std::sync::Arc;

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};

use super::key_derivation::{derive_key, DerivedKey};
use super::params::{IV_LEN, SALT_LEN, TAG_LEN};
use super::random::{self, random_array, SecureRandom};

/// AES-256-GCM with the vault's 16-byte IV
type VaultCipher = AesGcm<Aes256, U16>;

const _: () = assert!(IV_LEN == 16, "VaultCipher nonce size must track IV_LEN");

/// An encrypted secret, the unit exchanged between clients and persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    ciphertext: Vec<u8>,
    iv: [u8; IV_LEN],
    tag: [u8; TAG_LEN],
    salt: Option<[u8; SALT_LEN]>,
}

/// Wire form of [`EncryptedBlob`]: four base64 fields
#[derive(Debug, Serialize, Deserialize)]
struct BlobRecord {
    encrypted: String,
    iv: String,
    tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    salt: Option<String>,
}

impl EncryptedBlob {
    /// Ciphertext with the tag removed
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// The IV used for this encryption
    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    /// The GCM authentication tag
    pub fn tag(&self) -> &[u8; TAG_LEN] {
        &self.tag
    }

    /// The KDF salt, present only for password-derived records
    pub fn salt(&self) -> Option<&[u8; SALT_LEN]> {
        self.salt.as_ref()
    }

    /// Serialize to the interchange JSON object
    pub fn to_json(&self) -> VaultResult<String> {
        let record = BlobRecord {
            encrypted: STANDARD.encode(&self.ciphertext),
            iv: STANDARD.encode(self.iv),
            tag: STANDARD.encode(self.tag),
            salt: self.salt.map(|s| STANDARD.encode(s)),
        };
        serde_json::to_string(&record)
            .map_err(|e| VaultError::Json(format!("Failed to serialize record: {}", e)))
    }

    /// Parse the interchange JSON object
    ///
    /// A missing field, bad base64, or a field of the wrong length is a
    /// [`VaultError::MalformedRecord`]. An empty `salt` string is treated as
    /// absent.
    pub fn from_json(json: &str) -> VaultResult<Self> {
        let record: BlobRecord = serde_json::from_str(json)
            .map_err(|e| VaultError::malformed(format!("invalid record JSON: {}", e)))?;

        let ciphertext = decode_field("encrypted", &record.encrypted)?;
        let iv = decode_fixed::<IV_LEN>("iv", &record.iv)?;
        let tag = decode_fixed::<TAG_LEN>("tag", &record.tag)?;
        let salt = match record.salt.as_deref() {
            None | Some("") => None,
            Some(s) => Some(decode_fixed::<SALT_LEN>("salt", s)?),
        };

        Ok(Self {
            ciphertext,
            iv,
            tag,
            salt,
        })
    }
}

fn decode_field(name: &str, value: &str) -> VaultResult<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| VaultError::malformed(format!("invalid base64 in `{}`: {}", name, e)))
}

fn decode_fixed<const N: usize>(name: &str, value: &str) -> VaultResult<[u8; N]> {
    let bytes = decode_field(name, value)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        VaultError::malformed(format!("`{}` must be {} bytes, got {}", name, N, len))
    })
}

/// Split raw cipher output into ciphertext and its trailing tag
pub fn split_tag(mut combined: Vec<u8>) -> VaultResult<(Vec<u8>, [u8; TAG_LEN])> {
    if combined.len() < TAG_LEN {
        return Err(VaultError::invalid_argument(format!(
            "cipher output shorter than the {}-byte tag",
            TAG_LEN
        )));
    }
    let tag_bytes = combined.split_off(combined.len() - TAG_LEN);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&tag_bytes);
    Ok((combined, tag))
}

/// Rebuild raw cipher input: ciphertext followed by tag
pub fn join_tag(ciphertext: &[u8], tag: &[u8; TAG_LEN]) -> Vec<u8> {
    let mut combined = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);
    combined
}

fn cipher_for(key: &DerivedKey) -> VaultResult<VaultCipher> {
    VaultCipher::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::invalid_argument(format!("Failed to create cipher: {}", e)))
}

/// Encrypt under a fixed key and IV, returning ciphertext and tag separately
pub fn seal_detached(
    key: &DerivedKey,
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
) -> VaultResult<(Vec<u8>, [u8; TAG_LEN])> {
    let cipher = cipher_for(key)?;
    let combined = cipher
        .encrypt(Nonce::<U16>::from_slice(iv), plaintext)
        .map_err(|_| VaultError::invalid_argument("AES-256-GCM encryption failed"))?;
    split_tag(combined)
}

/// Verify and decrypt a detached ciphertext/tag pair
pub fn open_detached(
    key: &DerivedKey,
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
) -> VaultResult<Vec<u8>> {
    let cipher = cipher_for(key)?;
    let combined = join_tag(ciphertext, tag);
    cipher
        .decrypt(Nonce::<U16>::from_slice(iv), combined.as_slice())
        .map_err(|_| VaultError::AuthenticationFailure)
}

/// Encrypts secrets with salts and IVs drawn from an injected random source
#[derive(Clone)]
pub struct Codec {
    random: Arc<dyn SecureRandom>,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    /// Create a codec on the process-wide random source
    pub fn new() -> Self {
        Self {
            random: random::global(),
        }
    }

    /// Create a codec on a specific random source
    pub fn with_random(random: Arc<dyn SecureRandom>) -> Self {
        Self { random }
    }

    /// Encrypt a string under a password-derived key
    ///
    /// Draws a fresh 32-byte salt, then a fresh 16-byte IV.
    pub fn encrypt(&self, plaintext: &str, password: &str) -> VaultResult<EncryptedBlob> {
        let salt: [u8; SALT_LEN] = random_array(self.random.as_ref())?;
        let key = derive_key(password, &salt)?;
        let mut blob = self.encrypt_with_key(plaintext, &key)?;
        blob.salt = Some(salt);
        Ok(blob)
    }

    /// Encrypt a string under a raw 256-bit key; the record carries no salt
    pub fn encrypt_with_key(
        &self,
        plaintext: &str,
        key: &DerivedKey,
    ) -> VaultResult<EncryptedBlob> {
        let iv: [u8; IV_LEN] = random_array(self.random.as_ref())?;
        let (ciphertext, tag) = seal_detached(key, &iv, plaintext.as_bytes())?;
        Ok(EncryptedBlob {
            ciphertext,
            iv,
            tag,
            salt: None,
        })
    }
}

/// Encrypt a string under a password using the process-wide random source
pub fn encrypt(plaintext: &str, password: &str) -> VaultResult<EncryptedBlob> {
    Codec::new().encrypt(plaintext, password)
}

/// Encrypt a string under a raw key using the process-wide random source
pub fn encrypt_with_key(plaintext: &str, key: &DerivedKey) -> VaultResult<EncryptedBlob> {
    Codec::new().encrypt_with_key(plaintext, key)
}

/// Decrypt a password-derived record
///
/// Fails with [`VaultError::AuthenticationFailure`] for a wrong password or
/// any tampering, and [`VaultError::MalformedRecord`] if the record has no
/// salt.
pub fn decrypt(blob: &EncryptedBlob, password: &str) -> VaultResult<String> {
    let salt = blob
        .salt
        .as_ref()
        .ok_or_else(|| VaultError::malformed("record has no salt; it was sealed with a raw key"))?;
    let key = derive_key(password, salt)?;
    decrypt_with_key(blob, &key)
}

/// Decrypt a record under a raw key; any salt on the record is ignored
pub fn decrypt_with_key(blob: &EncryptedBlob, key: &DerivedKey) -> VaultResult<String> {
    let plaintext = open_detached(key, &blob.iv, &blob.ciphertext, &blob.tag)?;
    String::from_utf8(plaintext)
        .map_err(|e| VaultError::malformed(format!("Invalid UTF-8 in decrypted data: {}", e)))
}
