//! Configuration module for hostvault
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::VaultPaths;
pub use settings::Settings;
