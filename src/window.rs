//! Child array window arithmetic.
//!
//! A node's children cover the byte range `[base, base + len)`. `len` is a
//! power of two (1..=256) and `base` is a multiple of `len`, so the window
//! never wraps past `0xFF` and a slot lookup is one subtraction and one
//! compare.

/// Index of `byte` within the window, if it falls inside it.
#[inline]
pub(crate) fn slot(base: u8, len: usize, byte: u8) -> Option<usize> {
    // With an aligned window, `byte < base` wraps to at least `256 - base`,
    // which is never below `len`.
    let idx = byte.wrapping_sub(base) as usize;
    (idx < len).then_some(idx)
}

/// Smallest aligned window that contains both `[base, base + len)` and `byte`,
/// reached by doubling `len` and masking `base` down to a multiple of it.
///
/// `len` must be a power of two and `base` a multiple of it.
#[inline]
pub(crate) fn grow(mut base: u8, mut len: usize, byte: u8) -> (u8, usize) {
    debug_assert!(is_aligned(base, len));
    while slot(base, len, byte).is_none() {
        len *= 2;
        // len <= 256, so len - 1 fits in a byte.
        base &= !((len - 1) as u8);
    }
    (base, len)
}

#[inline]
pub(crate) fn is_aligned(base: u8, len: usize) -> bool {
    len.is_power_of_two() && len <= 256 && (base as usize) % len == 0
}
