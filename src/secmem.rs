//! Fixed-length secret buffers
//!
//! Contents are wiped on drop. When requested, the backing pages are also
//! locked into RAM so they are not written to swap. Locking is best-effort:
//! a failed `mlock` (e.g. RLIMIT_MEMLOCK exhausted) leaves the buffer
//! usable but unlocked.

use std::ops::{Deref, DerefMut};

use zeroize::{Zeroize, Zeroizing};

pub struct SecretBytes {
    buf: Zeroizing<Vec<u8>>,
    locked: bool,
}

impl SecretBytes {
    /// Allocate `len` zero bytes, locking them into memory if `lock` is set.
    pub fn zeroed(len: usize, lock: bool) -> Self {
        let buf = Zeroizing::new(vec![0u8; len]);
        let locked = lock && !buf.is_empty() && lock_region(&buf);
        Self { buf, locked }
    }

    /// Whether the backing memory was successfully locked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Deref for SecretBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for SecretBytes {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for SecretBytes {
    fn drop(&mut self) {
        // Wipe in place before unlocking; the pages may be swapped out right
        // after, and munlock needs the original length.
        self.buf.as_mut_slice().zeroize();
        if self.locked {
            unlock_region(&self.buf);
        }
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBytes")
            .field("len", &self.buf.len())
            .field("locked", &self.locked)
            .finish()
    }
}

#[cfg(unix)]
fn lock_region(buf: &[u8]) -> bool {
    // SAFETY: the pointer and length describe a live allocation owned by the caller.
    unsafe { libc::mlock(buf.as_ptr().cast(), buf.len()) == 0 }
}

#[cfg(unix)]
fn unlock_region(buf: &[u8]) {
    // SAFETY: same region that was passed to mlock; buffer is still alive.
    unsafe {
        libc::munlock(buf.as_ptr().cast(), buf.len());
    }
}

#[cfg(not(unix))]
fn lock_region(_buf: &[u8]) -> bool {
    false
}

#[cfg(not(unix))]
fn unlock_region(_buf: &[u8]) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_and_writable() {
        let mut secret = SecretBytes::zeroed(32, false);
        assert_eq!(&*secret, &[0u8; 32]);
        assert!(!secret.is_locked());

        secret.copy_from_slice(&[0xAB; 32]);
        assert_eq!(&*secret, &[0xAB; 32]);
    }

    #[test]
    fn test_lock_request_is_best_effort() {
        // Whether mlock succeeds depends on the environment; either way the
        // buffer must behave the same.
        let mut secret = SecretBytes::zeroed(64, true);
        secret[0] = 1;
        assert_eq!(secret.len(), 64);
        assert_eq!(secret[0], 1);
    }

    #[test]
    fn test_empty_is_never_locked() {
        let secret = SecretBytes::zeroed(0, true);
        assert!(!secret.is_locked());
    }

    #[test]
    fn test_debug_hides_contents() {
        let mut secret = SecretBytes::zeroed(4, false);
        secret.copy_from_slice(b"key!");
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains("key!"));
        assert!(rendered.contains("len: 4"));
    }
}
