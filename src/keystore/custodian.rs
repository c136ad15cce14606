// hostvault: Secure key custodian
//
// Get-or-create for enclave-resident master keys, plus seal/unseal through
// the handles it returns. The alias registry is the only shared mutable
// state in the vault.
//
// Flow:
//   1. `get_or_create_key()`: a registry hit is confirmed against the
//      enclave, since another client or the platform may have deleted the
//      key; on a miss or a stale hit, fetch from the enclave, else generate.
//      An "already exists" from generate means another caller won the race,
//      so re-fetch their key
//   2. `seal()` / `unseal()`: delegate to the enclave; tag mismatch surfaces
//      as VaultError::AuthenticationFailure, anything else unchanged. A
//      "key not found" also evicts the handle from the registry

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::backend::{EnclaveBackend, EnclaveError, KeyHandle, KeySpec, SealedPayload};
use super::software::SoftwareEnclave;
use crate::error::{VaultError, VaultResult};

pub struct KeyCustodian {
    backend: Arc<dyn EnclaveBackend>,
    registry: RwLock<HashMap<String, KeyHandle>>,
    create_lock: Mutex<()>,
}

impl KeyCustodian {
    pub fn new(backend: Arc<dyn EnclaveBackend>) -> Self {
        Self {
            backend,
            registry: RwLock::new(HashMap::new()),
            create_lock: Mutex::new(()),
        }
    }

    /// Custodian over a fresh in-process [`SoftwareEnclave`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(SoftwareEnclave::new()))
    }

    /// Return the key for `alias`, generating it on first use.
    pub fn get_or_create_key(&self, alias: &str) -> VaultResult<KeyHandle> {
        if alias.is_empty() {
            return Err(VaultError::invalid_argument("key alias must not be empty"));
        }
        let cached = self.registry.read().get(alias).cloned();
        if let Some(handle) = cached {
            if self.backend.fetch_key(alias)?.as_ref() == Some(&handle) {
                return Ok(handle);
            }
            tracing::debug!(alias, "Cached key handle is stale; refreshing");
        }

        let _guard = self.create_lock.lock();
        let handle = match self.backend.fetch_key(alias)? {
            Some(handle) => {
                tracing::debug!(alias, "Found existing enclave key");
                handle
            }
            None => self.create(alias)?,
        };

        self.registry
            .write()
            .insert(alias.to_string(), handle.clone());
        Ok(handle)
    }

    fn create(&self, alias: &str) -> VaultResult<KeyHandle> {
        match self.backend.generate_key(alias, &KeySpec::AES_256_GCM) {
            Ok(handle) => {
                tracing::info!(alias, "Generated new enclave master key");
                Ok(handle)
            }
            Err(EnclaveError::AlreadyExists(_)) => {
                tracing::debug!(alias, "Lost key creation race; using the winner's key");
                self.backend
                    .fetch_key(alias)?
                    .ok_or_else(|| EnclaveError::KeyNotFound(alias.to_string()).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Encrypt `plaintext` under the handle's key; the enclave picks the IV.
    pub fn seal(&self, handle: &KeyHandle, plaintext: &[u8]) -> VaultResult<SealedPayload> {
        self.backend
            .seal(handle, plaintext)
            .map_err(|e| self.map_enclave_error(handle, e))
    }

    /// Inverse of [`KeyCustodian::seal`].
    pub fn unseal(
        &self,
        handle: &KeyHandle,
        ciphertext: &[u8],
        iv: &[u8],
    ) -> VaultResult<Vec<u8>> {
        self.backend
            .unseal(handle, ciphertext, iv)
            .map_err(|e| self.map_enclave_error(handle, e))
    }

    /// Delete the key for `alias` from the enclave and forget its handle.
    /// WARNING: anything sealed under it becomes unrecoverable.
    pub fn delete_key(&self, alias: &str) -> VaultResult<bool> {
        let _guard = self.create_lock.lock();
        self.registry.write().remove(alias);
        Ok(self.backend.delete_key(alias)?)
    }

    fn map_enclave_error(&self, handle: &KeyHandle, err: EnclaveError) -> VaultError {
        match err {
            EnclaveError::AuthenticationFailed => VaultError::AuthenticationFailure,
            EnclaveError::KeyNotFound(alias) => {
                let mut registry = self.registry.write();
                if registry.get(handle.alias()) == Some(handle) {
                    tracing::debug!(alias = handle.alias(), "Evicting deleted enclave key");
                    registry.remove(handle.alias());
                }
                VaultError::Enclave(EnclaveError::KeyNotFound(alias))
            }
            other => VaultError::Enclave(other),
        }
    }

    #[cfg(test)]
    fn is_cached(&self, alias: &str) -> bool {
        self.registry.read().contains_key(alias)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
