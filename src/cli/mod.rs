//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the vault core.

pub mod master;
pub mod secrets;

pub use master::{
    handle_hash_password, handle_master_command, handle_verify_password, MasterCommands,
};
pub use secrets::{handle_decrypt, handle_encrypt, handle_generate_key, KeySource};
