//! Key derivation using PBKDF2-HMAC-SHA-256
//!
//! Turns a user password and a per-blob salt into an AES-256 key. The
//! iteration count comes from [`CryptoConfig::INTEROP`] and must match every
//! other client, so it is never taken from user settings.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{VaultError, VaultResult};

use super::params::{CryptoConfig, KEY_LEN, SALT_LEN};

/// A derived or raw 256-bit encryption key, zeroed on drop
#[derive(Clone)]
pub struct DerivedKey {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl DerivedKey {
    /// Wrap raw key bytes
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            key: Zeroizing::new(bytes),
        }
    }

    /// Wrap a key slice, rejecting anything that is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> VaultResult<Self> {
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            VaultError::invalid_argument(format!(
                "key must be {} bytes, got {}",
                KEY_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self::from_bytes(key))
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive an encryption key from a password and a 32-byte salt
///
/// Deterministic for identical inputs; recomputed on every call.
pub fn derive_key(password: &str, salt: &[u8]) -> VaultResult<DerivedKey> {
    if salt.len() != SALT_LEN {
        return Err(VaultError::invalid_argument(format!(
            "salt must be {} bytes, got {}",
            SALT_LEN,
            salt.len()
        )));
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt,
        CryptoConfig::INTEROP.kdf_iterations,
        &mut *key,
    );

    Ok(DerivedKey { key })
}
