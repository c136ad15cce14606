use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hostvault::cli::{
    handle_decrypt, handle_encrypt, handle_generate_key, handle_hash_password,
    handle_master_command, handle_verify_password, KeySource, MasterCommands,
};
use hostvault::config::{paths::VaultPaths, settings::Settings};
use hostvault::crypto::CryptoConfig;

#[derive(Parser)]
#[command(
    name = "hostvault",
    author = "Kaylee Beyene",
    version,
    about = "At-rest credential vault for connection-manager clients",
    long_about = "hostvault encrypts host credentials and other secrets into \
                  portable JSON records (PBKDF2-HMAC-SHA-256 + AES-256-GCM) that \
                  every client of the connection manager can decrypt, and manages \
                  the master-password record used to unlock them."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a secret and print its JSON record (reads stdin if TEXT is omitted)
    Encrypt {
        /// Secret to encrypt
        text: Option<String>,
        #[command(flatten)]
        source: KeySource,
    },

    /// Decrypt a JSON record and print the secret (reads stdin if RECORD is omitted)
    Decrypt {
        /// JSON record to decrypt
        record: Option<String>,
        #[command(flatten)]
        source: KeySource,
    },

    /// Generate a random base64 master key for use with --key
    GenerateKey,

    /// Hash a password into a `salt:hash` record
    HashPassword {
        /// Password to hash (prompted if omitted)
        #[arg(long, env = "HOSTVAULT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Check a password against a `salt:hash` record
    VerifyPassword {
        /// The stored record
        record: String,
        /// Password to check (prompted if omitted)
        #[arg(long, env = "HOSTVAULT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Master-password management
    #[command(subcommand)]
    Master(MasterCommands),

    /// Show current configuration and paths
    Config,
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = VaultPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings);

    match cli.command {
        Some(Commands::Encrypt { text, source }) => handle_encrypt(text, source)?,
        Some(Commands::Decrypt { record, source }) => handle_decrypt(record, source)?,
        Some(Commands::GenerateKey) => handle_generate_key()?,
        Some(Commands::HashPassword { password }) => handle_hash_password(password)?,
        Some(Commands::VerifyPassword { record, password }) => {
            handle_verify_password(&record, password)?
        }
        Some(Commands::Master(cmd)) => handle_master_command(&paths, &mut settings, cmd)?,
        Some(Commands::Config) => {
            let params = CryptoConfig::INTEROP;
            println!("hostvault Configuration");
            println!("=======================");
            println!("Config directory: {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Log level:       {}", settings.log_level);
            println!(
                "  Master password: {}",
                if settings.has_master_password() { "set" } else { "not set" }
            );
            println!();
            println!("Protocol:");
            println!(
                "  Encryption: AES-256-GCM, {}-byte IV, {}-byte tag",
                params.iv_len, params.tag_len
            );
            println!(
                "  Key derivation: PBKDF2-HMAC-SHA-256, {} iterations, {}-byte salt",
                params.kdf_iterations, params.salt_len
            );
            println!(
                "  Password hashing: PBKDF2-HMAC-SHA-512, {} iterations, {}-byte salt",
                params.hash_iterations, params.hash_salt_len
            );
        }
        None => {
            println!("hostvault - credential vault for connection-manager clients");
            println!();
            println!("Run 'hostvault --help' for usage information.");
        }
    }

    Ok(())
}
