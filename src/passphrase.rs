//! Passphrase reading functionality

use crate::error::{CedError, ErrorCategory, ErrorKind, Result};
use std::io::{self, IsTerminal, Read, Write};
use zeroize::Zeroizing;

/// Shortest passphrase accepted when encrypting a document.
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// Trait for reading passphrases from various sources
pub trait PassphraseReader {
    /// Read a passphrase as arbitrary bytes (not necessarily UTF-8)
    ///
    /// Returns the passphrase wrapped in `Zeroizing` to ensure it is securely
    /// wiped from memory when dropped.
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>>;
}

/// Returns a fixed passphrase (for testing)
pub struct ConstantPassphraseReader {
    passphrase: Zeroizing<Vec<u8>>,
}

impl ConstantPassphraseReader {
    pub fn new(passphrase: Vec<u8>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase),
        }
    }
}

impl PassphraseReader for ConstantPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new((*self.passphrase).clone()))
    }
}

/// Reads passphrase from any io::Read source
///
/// A single trailing newline (`\n` or `\r\n`) is dropped so that
/// `echo secret | ced ...` behaves as expected.
pub struct ReaderPassphraseReader {
    reader: Box<dyn Read>,
}

impl ReaderPassphraseReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl PassphraseReader for ReaderPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut data).map_err(|e| {
            CedError::io(
                ErrorCategory::Internal,
                format!("error reading passphrase: {}", e),
                e,
            )
        })?;
        if data.ends_with(b"\n") {
            data.pop();
            if data.ends_with(b"\r") {
                data.pop();
            }
        }
        Ok(data)
    }
}

/// Reads passphrase from terminal with no echo
pub struct TerminalPassphraseReader {
    prompt: String,
}

impl TerminalPassphraseReader {
    pub fn new() -> Self {
        Self::with_prompt("Passphrase (ced): ")
    }

    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for TerminalPassphraseReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PassphraseReader for TerminalPassphraseReader {
    /// Read passphrase from terminal.
    ///
    /// Note: Terminal input is limited to UTF-8 due to rpassword library constraints.
    /// For non-UTF-8 passphrases, use --passphrase-stdin instead.
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if !io::stdin().is_terminal() {
            return Err(CedError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "cannot read passphrase from terminal - stdin is not a terminal",
            ));
        }

        let mut stderr = io::stderr();
        stderr
            .write_all(self.prompt.as_bytes())
            .and_then(|()| stderr.flush())
            .map_err(|e| {
                CedError::io(
                    ErrorCategory::Internal,
                    format!("failed to write prompt: {}", e),
                    e,
                )
            })?;

        // rpassword returns a String that is not zeroized; move its bytes
        // straight into a Zeroizing buffer.
        let passphrase = rpassword::read_password().map_err(|e| {
            CedError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PassphraseUnavailable,
                format!("failure reading passphrase: {}", e),
                e,
            )
        })?;

        Ok(Zeroizing::new(passphrase.into_bytes()))
    }
}

/// Wraps another PassphraseReader and caches the result
///
/// Provides "at most once" semantics - the upstream reader is called
/// only on the first successful invocation, and subsequent calls return
/// the cached value.
pub struct CachingPassphraseReader {
    upstream: Box<dyn PassphraseReader>,
    cached: Option<Zeroizing<Vec<u8>>>,
}

impl CachingPassphraseReader {
    pub fn new(upstream: Box<dyn PassphraseReader>) -> Self {
        Self {
            upstream,
            cached: None,
        }
    }
}

impl PassphraseReader for CachingPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let cached = match self.cached.take() {
            Some(cached) => cached,
            None => self.upstream.read_passphrase()?,
        };
        let copy = Zeroizing::new((*cached).clone());
        self.cached = Some(cached);
        Ok(copy)
    }
}

/// Rejects passphrases shorter than a minimum length
///
/// The encryption engine accepts any password; this is where the
/// application's policy lives.
pub struct MinLengthPassphraseReader {
    upstream: Box<dyn PassphraseReader>,
    min_len: usize,
}

impl MinLengthPassphraseReader {
    pub fn new(upstream: Box<dyn PassphraseReader>, min_len: usize) -> Self {
        Self { upstream, min_len }
    }
}

impl PassphraseReader for MinLengthPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let passphrase = self.upstream.read_passphrase()?;
        if passphrase.len() < self.min_len {
            return Err(CedError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseRejected,
                format!(
                    "passphrase must be at least {} bytes long",
                    self.min_len
                ),
            ));
        }
        Ok(passphrase)
    }
}
