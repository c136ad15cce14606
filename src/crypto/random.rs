//! Secure random source
//!
//! Every salt, IV and bootstrap key in the vault is drawn through the
//! [`SecureRandom`] trait. The process holds one shared source, initialized
//! on first use and never reseeded by hand; [`install`] lets a platform swap
//! in its own CSPRNG before anything else runs.

use std::sync::{Arc, OnceLock};

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;

use crate::error::{VaultError, VaultResult};

/// A thread-safe source of cryptographically secure bytes
pub trait SecureRandom: Send + Sync {
    /// Fill `dest` entirely with random bytes
    fn fill(&self, dest: &mut [u8]) -> VaultResult<()>;
}

/// The operating system CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRandom;

impl SecureRandom for SystemRandom {
    fn fill(&self, dest: &mut [u8]) -> VaultResult<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| VaultError::Random(format!("OS random source failed: {}", e)))
    }
}

static PROCESS_RANDOM: OnceLock<Arc<dyn SecureRandom>> = OnceLock::new();

/// The process-wide random source, initializing it to [`SystemRandom`] if
/// nothing was installed
pub fn global() -> Arc<dyn SecureRandom> {
    PROCESS_RANDOM
        .get_or_init(|| {
            tracing::debug!("Initializing process random source from the OS");
            Arc::new(SystemRandom)
        })
        .clone()
}

/// Install the process-wide random source
///
/// Must run before the first call to [`global`]; fails once a source exists.
pub fn install(source: Arc<dyn SecureRandom>) -> VaultResult<()> {
    PROCESS_RANDOM
        .set(source)
        .map_err(|_| VaultError::Config("secure random source is already initialized".into()))
}

/// Draw a fixed-size array of random bytes
pub fn random_array<const N: usize>(source: &dyn SecureRandom) -> VaultResult<[u8; N]> {
    let mut out = [0u8; N];
    source.fill(&mut out)?;
    Ok(out)
}
