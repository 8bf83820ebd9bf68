//! Constant-time byte operations shared by the MAC, KEM and signature
//! layers.
//!
//! Every function here runs in time independent of the *contents* of its
//! inputs; only lengths may influence timing.

use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// Compares two byte slices in constant time.
///
/// Slices of unequal length compare unequal without inspecting contents.
pub fn ct_eq(a: &[u8], b: &[u8]) -> Choice {
    if a.len() != b.len() {
        return Choice::from(0);
    }
    a.ct_eq(b)
}

/// Convenience wrapper returning a `bool`; use only where the result is
/// about to become public anyway (e.g. an AEAD accept/reject decision).
pub fn verify(a: &[u8], b: &[u8]) -> bool {
    ct_eq(a, b).into()
}

/// Conditionally overwrites `dst` with `src` when `flag` is set.
///
/// `dst` and `src` must have equal length. The move is performed as
/// `dst[i] ^= mask & (dst[i] ^ src[i])` with `mask = 0 - flag`, so the
/// memory access pattern does not depend on `flag`.
pub fn cmov(dst: &mut [u8], src: &[u8], flag: Choice) {
    debug_assert_eq!(dst.len(), src.len());
    let mask = 0u8.wrapping_sub(flag.unwrap_u8());
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= mask & (*d ^ *s);
    }
}

/// Selects `a` when `choice` is set and `b` otherwise, in constant time.
pub fn ct_select(a: &[u8], b: &[u8], choice: Choice) -> Vec<u8> {
    debug_assert_eq!(a.len(), b.len());
    let mut out = b.to_vec();
    cmov(&mut out, a, choice);
    out
}

/// Securely zeros a byte buffer.
pub fn clear(buf: &mut [u8]) {
    buf.zeroize();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_and_select() {
        let a = [0xA5u8; 32];
        let b = [0x5Au8; 32];
        assert!(verify(&a, &a));
        assert!(!verify(&a, &b));
        assert!(!verify(&a[..16], &a));

        assert_eq!(ct_select(&a, &b, Choice::from(1)), a);
        assert_eq!(ct_select(&a, &b, Choice::from(0)), b);
    }

    #[test]
    fn conditional_move() {
        let src = [7u8; 8];
        let mut dst = [1u8; 8];
        cmov(&mut dst, &src, Choice::from(0));
        assert_eq!(dst, [1u8; 8]);
        cmov(&mut dst, &src, Choice::from(1));
        assert_eq!(dst, [7u8; 8]);
    }

    #[test]
    fn clearing() {
        let mut buf = [0xFFu8; 16];
        clear(&mut buf);
        assert_eq!(buf, [0u8; 16]);
    }
}
