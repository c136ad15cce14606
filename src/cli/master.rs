//! Master-password CLI commands
//!
//! Provides commands for hashing and verifying passwords, and for managing
//! the master-password record kept in settings.

use clap::Subcommand;

use crate::config::{paths::VaultPaths, settings::Settings};
use crate::crypto::{hash_password, verify_password, SecureString};
use crate::error::{VaultError, VaultResult};

use super::secrets::{password_or_prompt, prompt_password};

/// Minimum length accepted for a new master password
const MIN_MASTER_PASSWORD_LEN: usize = 8;

/// Master-password management commands
#[derive(Subcommand)]
pub enum MasterCommands {
    /// Set or replace the master password
    Set {
        /// New master password (prompted with confirmation if omitted)
        #[arg(long, env = "HOSTVAULT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Check a password against the stored master password
    Verify {
        /// Password to check (prompted if omitted)
        #[arg(long, env = "HOSTVAULT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Remove the stored master password
    Clear,

    /// Show whether a master password is set
    Status,
}

/// Handle master-password commands
pub fn handle_master_command(
    paths: &VaultPaths,
    settings: &mut Settings,
    cmd: MasterCommands,
) -> VaultResult<()> {
    match cmd {
        MasterCommands::Set { password } => set_master_password(paths, settings, password),
        MasterCommands::Verify { password } => verify_master_password(settings, password),
        MasterCommands::Clear => clear_master_password(paths, settings),
        MasterCommands::Status => show_status(settings),
    }
}

fn set_master_password(
    paths: &VaultPaths,
    settings: &mut Settings,
    password: Option<String>,
) -> VaultResult<()> {
    let password = match password {
        Some(p) if p.len() < MIN_MASTER_PASSWORD_LEN => {
            return Err(VaultError::invalid_argument(format!(
                "master password must be at least {} characters",
                MIN_MASTER_PASSWORD_LEN
            )));
        }
        Some(p) => SecureString::new(p),
        None => prompt_new_password()?,
    };

    let record = hash_password(&password)?;
    settings.set_master_password(&record);
    settings.save(paths)?;

    tracing::info!("Master password record updated");
    println!("Master password set.");
    Ok(())
}

fn verify_master_password(settings: &Settings, password: Option<String>) -> VaultResult<()> {
    let record = settings
        .master_password
        .as_deref()
        .ok_or_else(|| {
            VaultError::Config("No master password set. Run 'hostvault master set'.".into())
        })?;

    let password = password_or_prompt(password, "Master password: ")?;
    if verify_password(&password, record) {
        println!("Master password is correct.");
        Ok(())
    } else {
        println!("Master password is incorrect.");
        Err(VaultError::AuthenticationFailure)
    }
}

fn clear_master_password(paths: &VaultPaths, settings: &mut Settings) -> VaultResult<()> {
    if settings.master_password.take().is_none() {
        println!("No master password is set.");
        return Ok(());
    }
    settings.save(paths)?;
    println!("Master password cleared.");
    Ok(())
}

fn show_status(settings: &Settings) -> VaultResult<()> {
    if settings.has_master_password() {
        println!("Master password: SET");
    } else {
        println!("Master password: NOT SET");
    }
    Ok(())
}

/// Hash a password and print its record
pub fn handle_hash_password(password: Option<String>) -> VaultResult<()> {
    let password = password_or_prompt(password, "Password: ")?;
    println!("{}", hash_password(&password)?);
    Ok(())
}

/// Verify a password against a record given on the command line
pub fn handle_verify_password(record: &str, password: Option<String>) -> VaultResult<()> {
    let password = password_or_prompt(password, "Password: ")?;
    if verify_password(&password, record.trim()) {
        println!("Password matches.");
        Ok(())
    } else {
        println!("Password does not match.");
        Err(VaultError::AuthenticationFailure)
    }
}

/// Prompt for a new password with confirmation
fn prompt_new_password() -> VaultResult<SecureString> {
    loop {
        let pass1 = prompt_password("Enter new master password: ")?;

        if pass1.len() < MIN_MASTER_PASSWORD_LEN {
            println!(
                "Master password must be at least {} characters. Please try again.",
                MIN_MASTER_PASSWORD_LEN
            );
            continue;
        }

        let pass2 = prompt_password("Confirm master password: ")?;

        if pass1.as_str() != pass2.as_str() {
            println!("Passwords do not match. Please try again.");
            continue;
        }

        return Ok(pass1);
    }
}
