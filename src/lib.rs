//! hostvault - at-rest credential vault for connection-manager clients
//!
//! Host credentials, secrets and serial/SSH settings are stored as
//! self-contained JSON records that the desktop and mobile clients decrypt
//! interchangeably.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `crypto`: key derivation, AES-256-GCM records, password records,
//!   and the shared secure random source
//! - `keystore`: master-key custody through a platform secure enclave
//! - `config`: path resolution and CLI settings
//! - `cli`: command handlers for the `hostvault` binary
//! - `error`: custom error types
//!
//! # Example
//!
//! ```rust,no_run
//! use hostvault::crypto::{decrypt, encrypt, EncryptedBlob};
//!
//! let blob = encrypt("hunter2-api-token", "correct horse battery staple")?;
//! let json = blob.to_json()?;
//!
//! let restored = EncryptedBlob::from_json(&json)?;
//! assert_eq!(decrypt(&restored, "correct horse battery staple")?, "hunter2-api-token");
//! # Ok::<(), hostvault::VaultError>(())
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod keystore;

pub use error::{VaultError, VaultResult};
