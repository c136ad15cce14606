//! Cryptographic core of hostvault
//!
//! PBKDF2-HMAC-SHA-256 key derivation, AES-256-GCM interchange records,
//! PBKDF2-HMAC-SHA-512 password records, and the shared random source.

pub mod encryption;
pub mod key_derivation;
pub mod params;
pub mod password;
pub mod random;
pub mod secure_memory;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{VaultError, VaultResult};

pub use encryption::{
    decrypt, decrypt_with_key, encrypt, encrypt_with_key, Codec, EncryptedBlob,
};
pub use key_derivation::{derive_key, DerivedKey};
pub use params::CryptoConfig;
pub use password::{hash_password, verify_password, PasswordHasher, PasswordRecord};
pub use random::{SecureRandom, SystemRandom};
pub use secure_memory::SecureString;

/// Generate a random 256-bit bootstrap master key
///
/// For flows that keep the key outside an enclave; the caller owns storing
/// it. Enclave-resident keys come from the keystore custodian instead.
pub fn generate_master_key() -> VaultResult<DerivedKey> {
    let bytes = random::random_array(random::global().as_ref())?;
    Ok(DerivedKey::from_bytes(bytes))
}

/// Encode a key as standard base64
pub fn encode_key(key: &DerivedKey) -> String {
    STANDARD.encode(key.as_bytes())
}

/// Decode a base64 key, requiring exactly 32 bytes
pub fn decode_key(encoded: &str) -> VaultResult<DerivedKey> {
    let bytes = zeroize::Zeroizing::new(
        STANDARD
            .decode(encoded.trim())
            .map_err(|e| VaultError::invalid_argument(format!("key is not valid base64: {}", e)))?,
    );
    DerivedKey::from_slice(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_keys_are_random() {
        let a = generate_master_key().unwrap();
        let b = generate_master_key().unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_key_encoding_round_trip() {
        let key = generate_master_key().unwrap();
        let encoded = encode_key(&key);
        assert_eq!(encoded.len(), 44);
        assert_eq!(decode_key(&encoded).unwrap().as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_decode_key_rejects_wrong_length() {
        let short = STANDARD.encode([0u8; 16]);
        assert!(decode_key(&short).unwrap_err().is_invalid_argument());
        assert!(decode_key("%%%").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_bootstrap_key_encrypts() {
        let key = generate_master_key().unwrap();
        let blob = encrypt_with_key("ssh-ed25519 AAAA", &key).unwrap();
        assert_eq!(decrypt_with_key(&blob, &key).unwrap(), "ssh-ed25519 AAAA");
    }
}
