//! Password-based AES-256 envelope encryption
//!
//! This module implements the encryption engine using:
//! - PBKDF2-HMAC-SHA512 (500,000 rounds, 128-byte random salt) to derive a
//!   256-bit key from the password
//! - AES-256 in ECB mode, each block encrypted independently
//!
//! The envelope format is described in [`crate::envelope`].
//!
//! Known limitation: there is no authentication tag. Decrypting with the
//! wrong password succeeds and returns garbage of the right length. ECB
//! also leaks equality of plaintext blocks. The IV is stored in every
//! envelope but has no influence on the ciphertext.

use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, BlockSizeUser, KeyInit, KeySizeUser};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::envelope::{self, Envelope};
use crate::error::{CedError, ErrorCategory, ErrorKind, Result};
use crate::kdf;
use crate::padding;

/// Length of salt in bytes
pub const SALT_LEN: usize = 128;

/// Fixed sizes of the cipher suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherConfig {
    block_len: usize,
    key_len: usize,
    salt_len: usize,
}

impl CipherConfig {
    pub fn aes256() -> Self {
        Self {
            block_len: Aes256::block_size(),
            key_len: Aes256::key_size(),
            salt_len: SALT_LEN,
        }
    }

    /// Bytes per cipher block.
    pub fn block_len(&self) -> usize {
        self.block_len
    }

    /// Bytes in a derived key.
    pub fn key_len(&self) -> usize {
        self.key_len
    }

    /// Bytes of random salt per envelope.
    pub fn salt_len(&self) -> usize {
        self.salt_len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Lock derived keys into RAM so they are never swapped to disk.
    /// Best-effort: ignored where the OS refuses.
    pub secure_memory: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            secure_memory: true,
        }
    }
}

/// Encrypts byte buffers into envelopes and back.
///
/// The engine is immutable once built. Keys are derived and dropped within
/// each call, so a single engine can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct CipherEngine {
    config: CipherConfig,
    options: EngineOptions,
    iv: Vec<u8>,
}

impl CipherEngine {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    /// Build an engine with a fresh random IV.
    pub fn with_options(options: EngineOptions) -> Self {
        let config = CipherConfig::aes256();
        let mut iv = vec![0u8; config.block_len()];
        OsRng.fill_bytes(&mut iv);
        Self {
            config,
            options,
            iv,
        }
    }

    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn block_len(&self) -> usize {
        self.config.block_len()
    }

    pub fn key_len(&self) -> usize {
        self.config.key_len()
    }

    /// The IV written into every envelope this engine produces.
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Zero-fill `buf` up to the next block boundary.
    pub fn pad(&self, buf: &mut Vec<u8>) {
        padding::pad(buf, self.block_len());
    }

    /// Encrypt `plaintext` with a password using a random salt.
    ///
    /// `plaintext.len()` must be a multiple of the block length; see [`Self::pad`].
    /// Returns the envelope `ciphertext || iv || salt`.
    pub fn encrypt(&self, plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>> {
        let mut salt = vec![0u8; self.config.salt_len()];
        OsRng.fill_bytes(&mut salt);

        self.encrypt_deterministic(plaintext, password, &self.iv, &salt)
    }

    /// Encrypt `plaintext` with a password using the provided IV and salt.
    ///
    /// This function is ONLY for testing purposes to generate deterministic output.
    /// NEVER use this in production - always use `encrypt()` which generates a random salt.
    pub fn encrypt_deterministic(
        &self,
        plaintext: &[u8],
        password: &[u8],
        iv: &[u8],
        salt: &[u8],
    ) -> Result<Vec<u8>> {
        self.check_aligned(plaintext)?;
        check_width("IV", iv, self.config.block_len())?;
        check_width("salt", salt, self.config.salt_len())?;

        let cipher = self.keyed_cipher(password, salt)?;
        let mut data = plaintext.to_vec();
        for block in data.chunks_exact_mut(self.block_len()) {
            cipher.encrypt_block(GenericArray::from_mut_slice(block));
        }

        Ok(envelope::assemble(data, iv, salt))
    }

    /// Decrypt an envelope with a password.
    ///
    /// Any filler bytes added before encryption are returned as-is. A wrong
    /// password is not detected; the result is simply garbage.
    pub fn decrypt(&self, envelope: &[u8], password: &[u8]) -> Result<Vec<u8>> {
        let parsed = Envelope::parse(envelope, &self.config)?;

        let cipher = self.keyed_cipher(password, parsed.salt())?;
        let mut data = parsed.ciphertext().to_vec();
        for block in data.chunks_exact_mut(self.block_len()) {
            cipher.decrypt_block(GenericArray::from_mut_slice(block));
        }

        Ok(data)
    }

    fn check_aligned(&self, data: &[u8]) -> Result<()> {
        if data.len() % self.block_len() != 0 {
            return Err(CedError::block_length(self.block_len()));
        }
        Ok(())
    }

    fn keyed_cipher(&self, password: &[u8], salt: &[u8]) -> Result<Aes256> {
        let key = kdf::derive_key(
            password,
            salt,
            self.config.key_len(),
            self.options.secure_memory,
        )?;
        Aes256::new_from_slice(&key).map_err(|e| {
            CedError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::PrimitiveFailure,
                format!("failed to key AES-256: {}", e),
            )
        })
    }
}

impl Default for CipherEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn check_width(what: &str, value: &[u8], expected: usize) -> Result<()> {
    if value.len() != expected {
        return Err(CedError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::InvalidParameter,
            format!(
                "{} must be {} bytes, got {}",
                what,
                expected,
                value.len()
            ),
        ));
    }
    Ok(())
}
