//! sealcrypt CLI - password-based file encryption
//!
//! Command-line interface for sealing files into AES-256-GCM envelopes with
//! PBKDF2-HMAC-SHA-256 key derivation, and opening them again.

use clap::{Parser, Subcommand};
use log::debug;
use std::error::Error as _;
use std::path::PathBuf;
use std::process;

use sealcrypt::file_ops;
use sealcrypt::kdf::{DEFAULT_ITERATIONS, KdfParams};
use sealcrypt::secret::{
    NonEmptySecretReader, ReaderSecretReader, SecretReader, TerminalSecretReader,
};

#[derive(Parser)]
#[command(name = "sealcrypt")]
#[command(version)]
#[command(about = "Password-based file encryption.", long_about = None)]
struct Cli {
    /// Read the secret from stdin instead of from the terminal
    #[arg(long, global = true, env = "SEALCRYPT_SECRET_STDIN")]
    secret_stdin: bool,

    /// PBKDF2 iteration count; must match the value used when encrypting
    #[arg(
        long,
        global = true,
        env = "SEALCRYPT_ITERATIONS",
        default_value_t = DEFAULT_ITERATIONS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    iterations: u32,

    /// Log diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the envelope to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Decrypt a file
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file holding the envelope
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the plaintext to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Update an encrypted file with new content, while validating
    /// that the secret is not accidentally changed.
    #[command(alias = "u")]
    Update {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the existing envelope file to replace
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = KdfParams::new(cli.iterations).and_then(|params| {
        let mut reader = get_secret_reader(cli.secret_stdin);
        match cli.command {
            Commands::Encrypt { input, output } => {
                file_ops::encrypt_file(&input, &output, &mut *reader, &params)
            }
            Commands::Decrypt { input, output } => {
                file_ops::decrypt_file(&input, &output, &mut *reader, &params)
            }
            Commands::Update { input, output } => {
                file_ops::update_file(&input, &output, &mut *reader, &params)
            }
        }
    });

    if let Err(e) = result {
        let mut cause = e.source();
        while let Some(err) = cause {
            debug!("caused by: {}", err);
            cause = err.source();
        }
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn get_secret_reader(use_stdin: bool) -> Box<dyn SecretReader> {
    let upstream: Box<dyn SecretReader> = if use_stdin {
        Box::new(ReaderSecretReader::new(Box::new(std::io::stdin())))
    } else {
        Box::new(TerminalSecretReader::new())
    };
    Box::new(NonEmptySecretReader::new(upstream))
}
