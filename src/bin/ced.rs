//! ced - encrypt and decrypt text files with a password
//!
//! Command-line interface over the cedcrypt engine: PBKDF2-HMAC-SHA512
//! key derivation and AES-256 block encryption.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use cedcrypt::file_ops::{self, DecryptMode};
use cedcrypt::passphrase::{
    MIN_PASSPHRASE_LEN, MinLengthPassphraseReader, PassphraseReader, ReaderPassphraseReader,
    TerminalPassphraseReader,
};
use cedcrypt::{CipherEngine, EngineOptions};

#[derive(Parser)]
#[command(name = "ced")]
#[command(version)]
#[command(about = "Password-based file encryption.", long_about = None)]
struct Cli {
    /// Read passphrase from stdin instead of from terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Do not lock derived keys into memory
    #[arg(long, global = true)]
    insecure_memory: bool,

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

        /// Path to the file to write the encrypted data to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Decrypt a file
    ///
    /// A wrong passphrase is not detected; it produces garbage output.
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file whose contents is to be decrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the decrypted text to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Keep the trailing zero bytes added to fill the last cipher block
        #[arg(long)]
        keep_padding: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let engine = CipherEngine::with_options(EngineOptions {
        secure_memory: !cli.insecure_memory,
    });

    let result = match cli.command {
        Commands::Encrypt { input, output } => {
            let mut reader = MinLengthPassphraseReader::new(
                get_passphrase_reader(cli.passphrase_stdin),
                MIN_PASSPHRASE_LEN,
            );
            file_ops::encrypt_file(&input, &output, &engine, &mut reader)
        }
        Commands::Decrypt {
            input,
            output,
            keep_padding,
        } => {
            let mut reader = file_ops::non_empty(get_passphrase_reader(cli.passphrase_stdin));
            let mode = if keep_padding {
                DecryptMode::KeepPadding
            } else {
                DecryptMode::StripPadding
            };
            file_ops::decrypt_file(&input, &output, &engine, &mut reader, mode)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        let mut source = e.source_error().map(|s| s as &dyn std::error::Error);
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cedcrypt={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn get_passphrase_reader(use_stdin: bool) -> Box<dyn PassphraseReader> {
    if use_stdin {
        Box::new(ReaderPassphraseReader::new(Box::new(std::io::stdin())))
    } else {
        Box::new(TerminalPassphraseReader::new())
    }
}
