//! Editable text document backed by an encrypted file
//!
//! A `Document` owns everything an editor window needs to load and save
//! one file: its path, the current text, whether it has unsaved changes,
//! and the passphrase it was opened with so that saving does not prompt
//! again.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use zeroize::Zeroizing;

use crate::engine::CipherEngine;
use crate::error::{CedError, ErrorCategory, ErrorKind, Result};
use crate::file_ops::{read_error, write_file_atomic};
use crate::padding;
use crate::passphrase::PassphraseReader;

#[derive(Default)]
pub struct Document {
    path: Option<PathBuf>,
    text: Zeroizing<Vec<u8>>,
    passphrase: Option<Zeroizing<Vec<u8>>>,
    changed: bool,
}

impl Document {
    /// An empty, unnamed document.
    pub fn new() -> Self {
        Self::default()
    }

    /// An unnamed document holding `text`, marked as changed.
    pub fn from_text(text: impl Into<Vec<u8>>) -> Self {
        Self {
            text: Zeroizing::new(text.into()),
            changed: true,
            ..Self::default()
        }
    }

    /// Load an unencrypted file as-is.
    pub fn open_plain(path: &Path) -> Result<Self> {
        let text = fs::read(path).map_err(|e| read_error(path, e))?;
        debug!(path = %path.display(), bytes = text.len(), "opened plain document");
        Ok(Self {
            path: Some(path.to_path_buf()),
            text: Zeroizing::new(text),
            passphrase: None,
            changed: false,
        })
    }

    /// Load and decrypt an encrypted file.
    ///
    /// Trailing filler bytes left over from padding are stripped. A wrong
    /// passphrase is not detected and yields unreadable text.
    pub fn open_encrypted(
        path: &Path,
        engine: &CipherEngine,
        passphrase_reader: &mut dyn PassphraseReader,
    ) -> Result<Self> {
        let envelope = fs::read(path).map_err(|e| read_error(path, e))?;
        let passphrase = passphrase_reader.read_passphrase()?;
        let mut text = Zeroizing::new(
            engine
                .decrypt(&envelope, &passphrase)
                .map_err(|e| e.with_context(format!("failed to decrypt {}", path.display())))?,
        );
        let decrypted_len = text.len();
        let text_len = padding::strip_filler(&text).len();
        text.truncate(text_len);
        debug!(
            path = %path.display(),
            envelope_bytes = envelope.len(),
            filler_bytes = decrypted_len - text_len,
            "opened encrypted document"
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            text,
            passphrase: Some(passphrase),
            changed: false,
        })
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Replace the text and mark the document as changed.
    pub fn set_text(&mut self, text: impl Into<Vec<u8>>) {
        self.text = Zeroizing::new(text.into());
        self.changed = true;
    }

    /// Whether there are modifications not yet written by `save`.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether a passphrase is remembered for the next save.
    pub fn has_passphrase(&self) -> bool {
        self.passphrase.is_some()
    }

    /// Drop the remembered passphrase; the next save reads a new one.
    pub fn forget_passphrase(&mut self) {
        self.passphrase = None;
    }

    /// Encrypt and write the document to its current path.
    pub fn save(
        &mut self,
        engine: &CipherEngine,
        passphrase_reader: &mut dyn PassphraseReader,
    ) -> Result<()> {
        let path = self.path.clone().ok_or_else(|| {
            CedError::with_kind(
                ErrorCategory::User,
                ErrorKind::NoPath,
                "document has no path; use save-as",
            )
        })?;
        self.save_as(&path, engine, passphrase_reader)
    }

    /// Encrypt and atomically write the document to `path`, which becomes
    /// the document's path.
    ///
    /// The passphrase is taken from `passphrase_reader` only if none is
    /// remembered yet.
    pub fn save_as(
        &mut self,
        path: &Path,
        engine: &CipherEngine,
        passphrase_reader: &mut dyn PassphraseReader,
    ) -> Result<()> {
        let passphrase = match self.passphrase.take() {
            Some(passphrase) => passphrase,
            None => passphrase_reader.read_passphrase()?,
        };

        let mut padded = Zeroizing::new(self.text.to_vec());
        engine.pad(&mut padded);
        let result = engine
            .encrypt(&padded, &passphrase)
            .map_err(|e| e.with_context("encryption failed"));
        // Remember the passphrase even if encryption fails so a retry does not prompt.
        self.passphrase = Some(passphrase);
        let envelope = result?;

        write_file_atomic(path, &envelope)?;
        debug!(
            path = %path.display(),
            text_bytes = self.text.len(),
            envelope_bytes = envelope.len(),
            "saved encrypted document"
        );

        self.path = Some(path.to_path_buf());
        self.changed = false;
        Ok(())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("text_len", &self.text.len())
            .field("has_passphrase", &self.passphrase.is_some())
            .field("changed", &self.changed)
            .finish()
    }
}
