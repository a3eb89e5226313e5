//! Zero-fill padding up to the cipher block length
//!
//! Padding is not reversible: the number of filler bytes is not recorded
//! anywhere, so decryption hands the filler back to the caller.

/// Byte appended to bring a buffer up to a block boundary.
pub const FILLER_BYTE: u8 = 0;

/// Number of filler bytes `pad` would append to a buffer of `len` bytes.
pub fn padding_len(len: usize, block_len: usize) -> usize {
    match len % block_len {
        0 => 0,
        rem => block_len - rem,
    }
}

/// Append filler bytes until `buf.len()` is a multiple of `block_len`.
///
/// No-op if the buffer is already aligned (including when empty).
pub fn pad(buf: &mut Vec<u8>, block_len: usize) {
    let n = padding_len(buf.len(), block_len);
    buf.resize(buf.len() + n, FILLER_BYTE);
}

/// Slice of `data` with all trailing filler bytes removed.
///
/// Only meaningful for payloads that never legitimately end in
/// `FILLER_BYTE`, such as text.
pub fn strip_filler(data: &[u8]) -> &[u8] {
    let end = data
        .iter()
        .rposition(|&b| b != FILLER_BYTE)
        .map_or(0, |i| i + 1);
    &data[..end]
}
