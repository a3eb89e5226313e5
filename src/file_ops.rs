//! File encryption/decryption operations
//!
//! This module provides high-level file operations for encrypting and
//! decrypting whole files. Encrypted files hold a raw envelope; there is no
//! armoring or header.

use crate::document::Document;
use crate::engine::CipherEngine;
use crate::error::{CedError, ErrorCategory, ErrorKind, Result};
use crate::padding;
use crate::passphrase::{MinLengthPassphraseReader, PassphraseReader};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;
use zeroize::Zeroizing;

/// What to do with trailing filler bytes after decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecryptMode {
    /// Drop trailing zero bytes; right for text.
    #[default]
    StripPadding,
    /// Write every decrypted byte, including filler.
    KeepPadding,
}

/// Encrypt a file with a passphrase
///
/// Reads plaintext from `input_path`, pads it to the block length, encrypts
/// it using a passphrase from `passphrase_reader`, and writes the envelope to
/// `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    engine: &CipherEngine,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    debug!(input = %input_path.display(), bytes = plaintext.len(), "encrypting file");
    let mut document = Document::from_text(plaintext);
    document.save_as(output_path, engine, passphrase_reader)
}

/// Decrypt a file with a passphrase
///
/// Reads an envelope from `input_path`, decrypts it using a passphrase from
/// `passphrase_reader`, and writes the plaintext to `output_path`.
///
/// A wrong passphrase is not detected: the output will simply be garbage.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    engine: &CipherEngine,
    passphrase_reader: &mut dyn PassphraseReader,
    mode: DecryptMode,
) -> Result<()> {
    let envelope = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let passphrase = passphrase_reader.read_passphrase()?;
    let plaintext = Zeroizing::new(
        engine
            .decrypt(&envelope, &passphrase)
            .map_err(|e| e.with_context("failed to decrypt"))?,
    );
    let plaintext = match mode {
        DecryptMode::StripPadding => padding::strip_filler(&plaintext),
        DecryptMode::KeepPadding => &plaintext[..],
    };
    debug!(
        input = %input_path.display(),
        envelope_bytes = envelope.len(),
        plaintext_bytes = plaintext.len(),
        "decrypted file"
    );
    write_file_secure(output_path, plaintext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    Ok(())
}

/// Wrap `upstream` so that empty passphrases are refused.
///
/// Used for decryption, where the longer policy for new files does not apply.
pub fn non_empty(upstream: Box<dyn PassphraseReader>) -> MinLengthPassphraseReader {
    MinLengthPassphraseReader::new(upstream, 1)
}

/// Atomically replace `path` with `contents` (tempfile + fsync + rename)
///
/// Either the old file or the new file exists afterwards, never a
/// partially written one. The new file has mode 0o600 on Unix systems.
pub(crate) fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        Some(_) => Path::new("."),
        None => {
            return Err(CedError::with_kind(
                ErrorCategory::User,
                ErrorKind::Io,
                format!("{} has no parent directory", path.display()),
            ));
        }
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| CedError::io(ErrorCategory::Internal, "failed to create tempfile", e))?;

    temp_file
        .write_all(contents)
        .map_err(|e| CedError::io(ErrorCategory::Internal, "failed to write to tempfile", e))?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file
        .flush()
        .map_err(|e| CedError::io(ErrorCategory::Internal, "failed to flush tempfile", e))?;
    temp_file.as_file().sync_all().map_err(|e| {
        CedError::io(
            ErrorCategory::Internal,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = temp_file
            .as_file()
            .metadata()
            .map_err(|e| {
                CedError::io(
                    ErrorCategory::Internal,
                    "failed to get tempfile metadata",
                    e,
                )
            })?
            .permissions();
        perms.set_mode(0o600);
        temp_file.as_file().set_permissions(perms).map_err(|e| {
            CedError::io(
                ErrorCategory::Internal,
                "failed to set tempfile permissions",
                e,
            )
        })?;
    }
    temp_file.persist(path).map_err(|e| {
        CedError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| {
                CedError::io(
                    ErrorCategory::User,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })?;

        file.write_all(contents).map_err(|e| {
            CedError::io(
                ErrorCategory::Internal,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).map_err(|e| {
            CedError::io(
                ErrorCategory::User,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

pub(crate) fn read_error(path: &Path, err: io::Error) -> CedError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    CedError::io(category, format!("failed to read from {}", path.display()), err)
}
