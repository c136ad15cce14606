//! Protocol parameters shared by every client of the vault
//!
//! Desktop and mobile clients decrypt each other's records, so these values
//! are a wire contract rather than tuning knobs. Both the key-derivation and
//! encryption paths read them from [`CryptoConfig::INTEROP`].

/// Lengths and work factors for the vault's cryptographic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoConfig {
    /// PBKDF2-HMAC-SHA-256 rounds for encryption keys
    pub kdf_iterations: u32,
    /// AES-256 key length in bytes
    pub key_len: usize,
    /// Per-blob salt length in bytes
    pub salt_len: usize,
    /// GCM IV length in bytes.
    ///
    /// 16, not the conventional 12. Existing stored data and the other
    /// clients depend on it; verify against production records before
    /// ever changing it.
    pub iv_len: usize,
    /// GCM authentication tag length in bytes
    pub tag_len: usize,
    /// PBKDF2-HMAC-SHA-512 rounds for password records
    pub hash_iterations: u32,
    /// Password-record salt length in bytes
    pub hash_salt_len: usize,
    /// Password-record digest length in bytes
    pub hash_len: usize,
}

impl CryptoConfig {
    /// The parameter set every participating client agrees on
    pub const INTEROP: CryptoConfig = CryptoConfig {
        kdf_iterations: 100_000,
        key_len: 32,
        salt_len: 32,
        iv_len: 16,
        tag_len: 16,
        hash_iterations: 100_000,
        hash_salt_len: 16,
        hash_len: 64,
    };
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self::INTEROP
    }
}

/// AES-256 key length in bytes
pub const KEY_LEN: usize = CryptoConfig::INTEROP.key_len;
/// Per-blob salt length in bytes
pub const SALT_LEN: usize = CryptoConfig::INTEROP.salt_len;
/// GCM IV length in bytes
pub const IV_LEN: usize = CryptoConfig::INTEROP.iv_len;
/// GCM tag length in bytes
pub const TAG_LEN: usize = CryptoConfig::INTEROP.tag_len;
/// Password-record salt length in bytes
pub const HASH_SALT_LEN: usize = CryptoConfig::INTEROP.hash_salt_len;
/// Password-record digest length in bytes
pub const HASH_LEN: usize = CryptoConfig::INTEROP.hash_len;
