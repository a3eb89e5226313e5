//! Envelope layout
//!
//! An envelope is the single opaque blob written to storage:
//!
//! ```text
//! [ ciphertext: N bytes, N % block_len == 0 ]
//! [ iv:         block_len bytes             ]
//! [ salt:       salt_len bytes              ]
//! ```
//!
//! There is no header, version marker or length field; the trailer widths
//! are fixed by the cipher configuration and parsing works back from the
//! end of the buffer.

use crate::engine::CipherConfig;
use crate::error::{CedError, ErrorCategory, ErrorKind, Result};

/// Bytes an envelope carries beyond its ciphertext.
pub fn overhead(config: &CipherConfig) -> usize {
    config.block_len() + config.salt_len()
}

/// Concatenate `ciphertext || iv || salt`, reusing the ciphertext allocation.
pub fn assemble(mut ciphertext: Vec<u8>, iv: &[u8], salt: &[u8]) -> Vec<u8> {
    ciphertext.reserve_exact(iv.len() + salt.len());
    ciphertext.extend_from_slice(iv);
    ciphertext.extend_from_slice(salt);
    ciphertext
}

/// Borrowed view of the three regions of a serialized envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    ciphertext: &'a [u8],
    iv: &'a [u8],
    salt: &'a [u8],
}

impl<'a> Envelope<'a> {
    /// Split `bytes` into its regions.
    ///
    /// Fails with `MalformedEnvelope` if the buffer cannot hold the IV and
    /// salt trailer, and with `BlockLength` if the ciphertext region is not
    /// block-aligned.
    pub fn parse(bytes: &'a [u8], config: &CipherConfig) -> Result<Self> {
        let trailer = overhead(config);
        if bytes.len() < trailer {
            return Err(CedError::with_kind(
                ErrorCategory::User,
                ErrorKind::MalformedEnvelope,
                format!(
                    "envelope of {} bytes is shorter than the {} byte IV and salt trailer; likely truncated",
                    bytes.len(),
                    trailer
                ),
            ));
        }

        let (ciphertext, rest) = bytes.split_at(bytes.len() - trailer);
        let (iv, salt) = rest.split_at(config.block_len());

        if ciphertext.len() % config.block_len() != 0 {
            return Err(CedError::block_length(config.block_len())
                .with_context("ciphertext region of envelope is not block-aligned"));
        }

        Ok(Self {
            ciphertext,
            iv,
            salt,
        })
    }

    pub fn ciphertext(&self) -> &'a [u8] {
        self.ciphertext
    }

    pub fn iv(&self) -> &'a [u8] {
        self.iv
    }

    pub fn salt(&self) -> &'a [u8] {
        self.salt
    }

    pub fn len(&self) -> usize {
        self.ciphertext.len() + self.iv.len() + self.salt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        assemble(self.ciphertext.to_vec(), self.iv, self.salt)
    }
}
