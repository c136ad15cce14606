//! Secret encryption CLI commands
//!
//! Encrypts and decrypts secrets to and from the interchange JSON record,
//! using either a password or a base64 raw master key.

use std::io::Read;

use clap::Args;

use crate::crypto::{
    decode_key, decrypt, decrypt_with_key, encode_key, encrypt, encrypt_with_key,
    generate_master_key, EncryptedBlob, SecureString,
};
use crate::error::{VaultError, VaultResult};

/// How the encryption key is obtained
#[derive(Args, Debug, Default)]
pub struct KeySource {
    /// Password to derive the key from (prompted if neither this nor --key is given)
    #[arg(long, env = "HOSTVAULT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Base64 256-bit master key; takes precedence over any password
    #[arg(long, env = "HOSTVAULT_MASTER_KEY", hide_env_values = true)]
    pub key: Option<String>,
}

/// Encrypt a secret and print its JSON record
pub fn handle_encrypt(text: Option<String>, source: KeySource) -> VaultResult<()> {
    let plaintext = SecureString::new(text_or_stdin(text)?);

    let blob = if let Some(encoded) = source.key {
        let key = decode_key(&encoded)?;
        encrypt_with_key(&plaintext, &key)?
    } else {
        let password = password_or_prompt(source.password, "Password: ")?;
        encrypt(&plaintext, &password)?
    };

    println!("{}", blob.to_json()?);
    Ok(())
}

/// Decrypt a JSON record and print the secret
pub fn handle_decrypt(record: Option<String>, source: KeySource) -> VaultResult<()> {
    let json = text_or_stdin(record)?;
    let blob = EncryptedBlob::from_json(json.trim())?;

    let plaintext = if let Some(encoded) = source.key {
        let key = decode_key(&encoded)?;
        decrypt_with_key(&blob, &key)?
    } else {
        let password = password_or_prompt(source.password, "Password: ")?;
        decrypt(&blob, &password)?
    };

    println!("{}", SecureString::new(plaintext).as_str());
    Ok(())
}

/// Generate and print a bootstrap master key
pub fn handle_generate_key() -> VaultResult<()> {
    let key = generate_master_key()?;
    println!("{}", encode_key(&key));
    Ok(())
}

/// Use the argument if given, otherwise read stdin minus one trailing newline
fn text_or_stdin(text: Option<String>) -> VaultResult<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| VaultError::Io(format!("Failed to read stdin: {}", e)))?;
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(buf)
}

/// Use the given password, or prompt for one with hidden input
pub(crate) fn password_or_prompt(
    password: Option<String>,
    prompt: &str,
) -> VaultResult<SecureString> {
    match password {
        Some(p) => Ok(SecureString::new(p)),
        None => prompt_password(prompt),
    }
}

/// Prompt for a password (hidden input)
pub(crate) fn prompt_password(prompt: &str) -> VaultResult<SecureString> {
    rpassword::prompt_password(prompt)
        .map(SecureString::new)
        .map_err(|e| VaultError::Io(format!("Failed to read password: {}", e)))
}
