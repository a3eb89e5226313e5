//! Password-based key derivation (PBKDF2-HMAC-SHA512)

use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha512;

use crate::error::{CedError, ErrorCategory, ErrorKind, Result};
use crate::secmem::SecretBytes;

/// PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: u32 = 500_000;

/// Derive a `key_len`-byte key from a password and salt.
///
/// The key is returned in a buffer that is wiped on drop and, if
/// `lock_memory` is set, locked into RAM for its lifetime.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    key_len: usize,
    lock_memory: bool,
) -> Result<SecretBytes> {
    let mut key = SecretBytes::zeroed(key_len, lock_memory);
    pbkdf2::<Hmac<Sha512>>(password, salt, PBKDF2_ITERATIONS, &mut key).map_err(|e| {
        CedError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::PrimitiveFailure,
            format!("PBKDF2 key derivation failed: {}", e),
        )
    })?;
    Ok(key)
}
