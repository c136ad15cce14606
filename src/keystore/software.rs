// hostvault: Software enclave
//
// An in-process EnclaveBackend. Keys live inside this object and are only
// ever used, never returned. It behaves like a platform keystore where it
// matters to the custodian: duplicate aliases are rejected, the enclave
// picks its own IVs, and a tag mismatch is reported as such.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use parking_lot::Mutex;
use zeroize::Zeroizing;

use super::backend::{EnclaveBackend, EnclaveError, KeyHandle, KeySpec, SealedPayload};
use crate::crypto::random::{self, SecureRandom};

// ─── Constants ───────────────────────────────────────────────────────────────

/// IV length this enclave generates (the standard 96-bit GCM nonce).
pub const ENCLAVE_IV_LEN: usize = 12;

const ENCLAVE_KEY_LEN: usize = 32;

// ─── Implementation ──────────────────────────────────────────────────────────

struct StoredKey {
    id: u64,
    material: Zeroizing<[u8; ENCLAVE_KEY_LEN]>,
}

pub struct SoftwareEnclave {
    keys: Mutex<HashMap<String, StoredKey>>,
    next_id: AtomicU64,
    random: Arc<dyn SecureRandom>,
}

impl SoftwareEnclave {
    pub fn new() -> Self {
        Self::with_random(random::global())
    }

    pub fn with_random(random: Arc<dyn SecureRandom>) -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            random,
        }
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.keys.lock().contains_key(alias)
    }

    fn cipher_for(&self, handle: &KeyHandle) -> Result<Aes256Gcm, EnclaveError> {
        let keys = self.keys.lock();
        let stored = keys
            .get(handle.alias())
            .filter(|k| k.id == handle.key_id())
            .ok_or_else(|| EnclaveError::KeyNotFound(handle.alias().to_string()))?;
        Aes256Gcm::new_from_slice(&*stored.material)
            .map_err(|e| EnclaveError::Platform(format!("failed to load key: {}", e)))
    }

    fn fill(&self, dest: &mut [u8]) -> Result<(), EnclaveError> {
        self.random
            .fill(dest)
            .map_err(|e| EnclaveError::Platform(e.to_string()))
    }
}

impl Default for SoftwareEnclave {
    fn default() -> Self {
        Self::new()
    }
}

impl EnclaveBackend for SoftwareEnclave {
    fn fetch_key(&self, alias: &str) -> Result<Option<KeyHandle>, EnclaveError> {
        Ok(self
            .keys
            .lock()
            .get(alias)
            .map(|k| KeyHandle::new(alias, k.id)))
    }

    fn generate_key(&self, alias: &str, spec: &KeySpec) -> Result<KeyHandle, EnclaveError> {
        if *spec != KeySpec::AES_256_GCM {
            return Err(EnclaveError::Platform(format!(
                "unsupported key spec: {:?}",
                spec
            )));
        }

        let mut material = Zeroizing::new([0u8; ENCLAVE_KEY_LEN]);
        self.fill(&mut *material)?;

        let mut keys = self.keys.lock();
        if keys.contains_key(alias) {
            return Err(EnclaveError::AlreadyExists(alias.to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        keys.insert(alias.to_string(), StoredKey { id, material });
        tracing::debug!(alias, key_id = id, "Generated enclave key");
        Ok(KeyHandle::new(alias, id))
    }

    fn seal(&self, handle: &KeyHandle, plaintext: &[u8]) -> Result<SealedPayload, EnclaveError> {
        let cipher = self.cipher_for(handle)?;

        let mut iv = [0u8; ENCLAVE_IV_LEN];
        self.fill(&mut iv)?;

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext)
            .map_err(|_| EnclaveError::Platform("AES-256-GCM encryption failed".to_string()))?;

        Ok(SealedPayload {
            ciphertext,
            iv: iv.to_vec(),
        })
    }

    fn unseal(
        &self,
        handle: &KeyHandle,
        ciphertext: &[u8],
        iv: &[u8],
    ) -> Result<Vec<u8>, EnclaveError> {
        if iv.len() != ENCLAVE_IV_LEN {
            return Err(EnclaveError::Platform(format!(
                "IV must be {} bytes, got {}",
                ENCLAVE_IV_LEN,
                iv.len()
            )));
        }
        let cipher = self.cipher_for(handle)?;
        cipher
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|_| EnclaveError::AuthenticationFailed)
    }

    fn delete_key(&self, alias: &str) -> Result<bool, EnclaveError> {
        let removed = self.keys.lock().remove(alias).is_some();
        if removed {
            tracing::warn!(alias, "Enclave key deleted; data sealed under it is unrecoverable");
        }
        Ok(removed)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_then_fetch() {
        let enclave = SoftwareEnclave::new();
        assert!(enclave.fetch_key("db").unwrap().is_none());

        let handle = enclave.generate_key("db", &KeySpec::AES_256_GCM).unwrap();
        assert_eq!(enclave.fetch_key("db").unwrap(), Some(handle));
        assert_eq!(enclave.len(), 1);
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let enclave = SoftwareEnclave::new();
        enclave.generate_key("db", &KeySpec::AES_256_GCM).unwrap();
        let err = enclave.generate_key("db", &KeySpec::AES_256_GCM).unwrap_err();
        assert_eq!(err, EnclaveError::AlreadyExists("db".into()));
    }

    #[test]
    fn test_seal_unseal_round_trip() {
        let enclave = SoftwareEnclave::new();
        let handle = enclave.generate_key("db", &KeySpec::AES_256_GCM).unwrap();

        let sealed = enclave.seal(&handle, b"sqlcipher passphrase").unwrap();
        assert_eq!(sealed.iv.len(), ENCLAVE_IV_LEN);
        assert_eq!(sealed.ciphertext.len(), b"sqlcipher passphrase".len() + 16);

        let opened = enclave.unseal(&handle, &sealed.ciphertext, &sealed.iv).unwrap();
        assert_eq!(opened, b"sqlcipher passphrase");
    }

    #[test]
    fn test_tampered_payload_fails_authentication() {
        let enclave = SoftwareEnclave::new();
        let handle = enclave.generate_key("db", &KeySpec::AES_256_GCM).unwrap();
        let mut sealed = enclave.seal(&handle, b"payload").unwrap();
        sealed.ciphertext[0] ^= 0x01;

        let err = enclave
            .unseal(&handle, &sealed.ciphertext, &sealed.iv)
            .unwrap_err();
        assert_eq!(err, EnclaveError::AuthenticationFailed);
    }

    #[test]
    fn test_wrong_iv_length_is_platform_error() {
        let enclave = SoftwareEnclave::new();
        let handle = enclave.generate_key("db", &KeySpec::AES_256_GCM).unwrap();
        let sealed = enclave.seal(&handle, b"payload").unwrap();
        let err = enclave.unseal(&handle, &sealed.ciphertext, &[0u8; 16]).unwrap_err();
        assert!(matches!(err, EnclaveError::Platform(_)));
    }

    #[test]
    fn test_stale_handle_after_recreate() {
        let enclave = SoftwareEnclave::new();
        let old = enclave.generate_key("db", &KeySpec::AES_256_GCM).unwrap();
        assert!(enclave.delete_key("db").unwrap());
        let new = enclave.generate_key("db", &KeySpec::AES_256_GCM).unwrap();
        assert_ne!(old, new);

        let err = enclave.seal(&old, b"x").unwrap_err();
        assert_eq!(err, EnclaveError::KeyNotFound("db".into()));
    }

    #[test]
    fn test_delete_nonexistent_is_ok() {
        let enclave = SoftwareEnclave::new();
        assert!(!enclave.delete_key("missing").unwrap());
        assert!(enclave.is_empty());
    }
}
