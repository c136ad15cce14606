// hostvault: Enclave capability
//
// The custodian talks to whatever secure-storage primitive the host platform
// exposes through this trait. Implementations hold key material themselves
// and hand out opaque handles; raw key bytes never cross this boundary.

use thiserror::Error;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnclaveError {
    #[error("key alias already exists: {0}")]
    AlreadyExists(String),

    #[error("no key for alias: {0}")]
    KeyNotFound(String),

    #[error("authentication tag mismatch")]
    AuthenticationFailed,

    #[error("platform keystore failure: {0}")]
    Platform(String),
}

// ─── Types ───────────────────────────────────────────────────────────────────

/// What kind of key the enclave should generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub key_bits: u32,
    pub block_mode: BlockMode,
    pub padding: Padding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    Gcm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    None,
}

impl KeySpec {
    /// AES-256, GCM, no padding: the only spec the custodian requests.
    pub const AES_256_GCM: KeySpec = KeySpec {
        key_bits: 256,
        block_mode: BlockMode::Gcm,
        padding: Padding::None,
    };
}

/// Opaque reference to an enclave-resident key.
///
/// `key_id` distinguishes a key from a later one generated under the same
/// alias after deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyHandle {
    alias: String,
    key_id: u64,
}

impl KeyHandle {
    pub fn new(alias: impl Into<String>, key_id: u64) -> Self {
        Self {
            alias: alias.into(),
            key_id,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn key_id(&self) -> u64 {
        self.key_id
    }
}

/// Output of an enclave seal: the ciphertext still carries its GCM tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A platform keystore that generates and uses keys without exporting them.
pub trait EnclaveBackend: Send + Sync {
    /// Look up the key stored under `alias`.
    fn fetch_key(&self, alias: &str) -> Result<Option<KeyHandle>, EnclaveError>;

    /// Generate a new key under `alias`.
    ///
    /// Must fail with [`EnclaveError::AlreadyExists`] if the alias is taken.
    fn generate_key(&self, alias: &str, spec: &KeySpec) -> Result<KeyHandle, EnclaveError>;

    /// Encrypt with an IV chosen by the enclave.
    fn seal(&self, handle: &KeyHandle, plaintext: &[u8]) -> Result<SealedPayload, EnclaveError>;

    /// Decrypt and verify a payload produced by [`EnclaveBackend::seal`].
    fn unseal(
        &self,
        handle: &KeyHandle,
        ciphertext: &[u8],
        iv: &[u8],
    ) -> Result<Vec<u8>, EnclaveError>;

    /// Remove the key under `alias`; returns whether one existed.
    fn delete_key(&self, alias: &str) -> Result<bool, EnclaveError>;
}
