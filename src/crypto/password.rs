//! Master-password hashing and verification
//!
//! Records are `saltHex:hashHex` with a 16-byte salt and a 64-byte
//! PBKDF2-HMAC-SHA-512 digest. This path is only for login checks; it never
//! produces encryption keys.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;

use crate::error::{VaultError, VaultResult};

use super::params::{CryptoConfig, HASH_LEN, HASH_SALT_LEN};
use super::random::{self, random_array, SecureRandom};

/// A salted password digest
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordRecord {
    salt: [u8; HASH_SALT_LEN],
    hash: [u8; HASH_LEN],
}

impl PasswordRecord {
    /// Check a candidate password against this record in constant time
    pub fn verify(&self, password: &str) -> bool {
        let candidate = digest(password, &self.salt);
        constant_time_eq(&candidate, &self.hash)
    }
}

impl fmt::Display for PasswordRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", hex::encode(self.salt), hex::encode(self.hash))
    }
}

impl fmt::Debug for PasswordRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordRecord")
            .field("salt", &hex::encode(self.salt))
            .finish_non_exhaustive()
    }
}

impl FromStr for PasswordRecord {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (salt_hex, hash_hex) = s
            .split_once(':')
            .ok_or_else(|| VaultError::malformed("password record has no ':' separator"))?;
        if hash_hex.contains(':') {
            return Err(VaultError::malformed("password record has more than one ':'"));
        }

        Ok(Self {
            salt: decode_hex::<HASH_SALT_LEN>("salt", salt_hex)?,
            hash: decode_hex::<HASH_LEN>("hash", hash_hex)?,
        })
    }
}

fn decode_hex<const N: usize>(name: &str, value: &str) -> VaultResult<[u8; N]> {
    let mut out = [0u8; N];
    hex::decode_to_slice(value, &mut out).map_err(|e| {
        VaultError::malformed(format!("password record {} is not {}-byte hex: {}", name, N, e))
    })?;
    Ok(out)
}

fn digest(password: &str, salt: &[u8; HASH_SALT_LEN]) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha512>(
        password.as_bytes(),
        salt,
        CryptoConfig::INTEROP.hash_iterations,
        &mut out,
    );
    out
}

/// Compare two byte strings without short-circuiting on the first mismatch
///
/// Every byte pair is visited; the result is true iff the OR of all XORs is
/// zero and the lengths match.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    std::hint::black_box(diff) == 0 && a.len() == b.len()
}

/// Produces password records with salts from an injected random source
#[derive(Clone)]
pub struct PasswordHasher {
    random: Arc<dyn SecureRandom>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    /// Create a hasher on the process-wide random source
    pub fn new() -> Self {
        Self {
            random: random::global(),
        }
    }

    /// Create a hasher on a specific random source
    pub fn with_random(random: Arc<dyn SecureRandom>) -> Self {
        Self { random }
    }

    /// Hash a password under a fresh 16-byte salt
    pub fn hash(&self, password: &str) -> VaultResult<PasswordRecord> {
        let salt: [u8; HASH_SALT_LEN] = random_array(self.random.as_ref())?;
        Ok(PasswordRecord {
            hash: digest(password, &salt),
            salt,
        })
    }
}

/// Hash a password using the process-wide random source
pub fn hash_password(password: &str) -> VaultResult<PasswordRecord> {
    PasswordHasher::new().hash(password)
}

/// Verify a password against record text
///
/// Malformed records fail closed: they return `false`, never an error.
pub fn verify_password(password: &str, record: &str) -> bool {
    match record.parse::<PasswordRecord>() {
        Ok(parsed) => parsed.verify(password),
        Err(e) => {
            tracing::debug!(error = %e, "Rejecting malformed password record");
            false
        }
    }
}
