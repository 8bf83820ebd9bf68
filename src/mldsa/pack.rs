//! Bit-packed encodings of the signature scheme (FIPS 204 layouts).
//!
//! Signed coefficients are shifted into their unsigned ranges before
//! packing: t0 as 2^12 − c (13 bits), secrets as η − c, the response as
//! γ1 − c (18 or 20 bits). t1 and w1 pack directly. The hint vector is the
//! sparse ω + k byte encoding with strict monotonicity on decode.

use super::params::{DsaParams, D, N};
use super::poly::{Poly, PolyVec};

fn pack_fields<I: Iterator<Item = u32>>(values: I, d: usize, out: &mut Vec<u8>) {
    let mut acc = 0u64;
    let mut bits = 0usize;
    for v in values {
        debug_assert!(d == 32 || v < (1u32 << d));
        acc |= (v as u64) << bits;
        bits += d;
        while bits >= 8 {
            out.push(acc as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    debug_assert_eq!(bits, 0);
}

fn unpack_fields(bytes: &[u8], d: usize, count: usize) -> Vec<u32> {
    let mut values = Vec::with_capacity(count);
    let mut acc = 0u64;
    let mut bits = 0usize;
    let mut iter = bytes.iter();
    for _ in 0..count {
        while bits < d {
            acc |= (*iter.next().expect("input too short") as u64) << bits;
            bits += 8;
        }
        values.push((acc & ((1u64 << d) - 1)) as u32);
        acc >>= d;
        bits -= d;
    }
    values
}

/// Packs the high bits t1 (canonical, 10 bits each).
pub fn pack_t1(p: &Poly, out: &mut Vec<u8>) {
    pack_fields(p.coeffs.iter().map(|&c| c as u32), 10, out);
}

pub fn unpack_t1(bytes: &[u8]) -> Poly {
    let mut p = Poly::zero();
    for (c, v) in p.coeffs.iter_mut().zip(unpack_fields(bytes, 10, N)) {
        *c = v as i32;
    }
    p
}

/// Packs the low bits t0 ∈ (−2^12, 2^12] as 2^12 − c (13 bits).
pub fn pack_t0(p: &Poly, out: &mut Vec<u8>) {
    pack_fields(
        p.coeffs.iter().map(|&c| ((1 << (D - 1)) - c) as u32),
        13,
        out,
    );
}

pub fn unpack_t0(bytes: &[u8]) -> Poly {
    let mut p = Poly::zero();
    for (c, v) in p.coeffs.iter_mut().zip(unpack_fields(bytes, 13, N)) {
        *c = (1 << (D - 1)) - v as i32;
    }
    p
}

/// Packs a secret polynomial with coefficients in [−η, η] as η − c.
pub fn pack_eta(p: &Poly, eta: usize, out: &mut Vec<u8>) {
    let d = if eta == 2 { 3 } else { 4 };
    pack_fields(p.coeffs.iter().map(|&c| (eta as i32 - c) as u32), d, out);
}

pub fn unpack_eta(bytes: &[u8], eta: usize) -> Poly {
    let d = if eta == 2 { 3 } else { 4 };
    let mut p = Poly::zero();
    for (c, v) in p.coeffs.iter_mut().zip(unpack_fields(bytes, d, N)) {
        *c = eta as i32 - v as i32;
    }
    p
}

/// Packs a response polynomial with coefficients in (−γ1, γ1] as γ1 − c
/// (18 bits for γ1 = 2^17, 20 bits for γ1 = 2^19).
pub fn pack_z(p: &Poly, gamma1: i32, out: &mut Vec<u8>) {
    let d = if gamma1 == 1 << 17 { 18 } else { 20 };
    pack_fields(p.coeffs.iter().map(|&c| (gamma1 - c) as u32), d, out);
}

pub fn unpack_z(bytes: &[u8], gamma1: i32) -> Poly {
    let d = if gamma1 == 1 << 17 { 18 } else { 20 };
    let mut p = Poly::zero();
    for (c, v) in p.coeffs.iter_mut().zip(unpack_fields(bytes, d, N)) {
        *c = gamma1 - v as i32;
    }
    p
}

/// Packs the high-bits commitment w1 (6 bits for γ2 = (q−1)/88, 4 bits for
/// γ2 = (q−1)/32).
pub fn pack_w1(p: &Poly, gamma2: i32, out: &mut Vec<u8>) {
    let d = if gamma2 == (super::params::Q - 1) / 88 {
        6
    } else {
        4
    };
    pack_fields(p.coeffs.iter().map(|&c| c as u32), d, out);
}

/// Encodes the hint vector as ω index bytes plus k cumulative counts.
pub fn pack_hints<P: DsaParams>(hints: &PolyVec, out: &mut Vec<u8>) {
    let base = out.len();
    out.resize(base + P::OMEGA + P::K, 0);
    let mut count = 0usize;
    for (i, poly) in hints.polys.iter().enumerate() {
        for (j, &h) in poly.coeffs.iter().enumerate() {
            if h != 0 {
                out[base + count] = j as u8;
                count += 1;
            }
        }
        out[base + P::OMEGA + i] = count as u8;
    }
}

/// Decodes a hint vector, rejecting any non-canonical encoding: counts out
/// of range or non-monotone, unsorted indices, or nonzero trailing bytes.
pub fn unpack_hints<P: DsaParams>(bytes: &[u8]) -> Option<PolyVec> {
    debug_assert_eq!(bytes.len(), P::OMEGA + P::K);
    let mut hints = PolyVec::zero(P::K);
    let mut offset = 0usize;
    for i in 0..P::K {
        let count = bytes[P::OMEGA + i] as usize;
        if count < offset || count > P::OMEGA {
            return None;
        }
        for j in offset..count {
            // Indices must be strictly increasing inside a polynomial.
            if j > offset && bytes[j] <= bytes[j - 1] {
                return None;
            }
            hints.polys[i].coeffs[bytes[j] as usize] = 1;
        }
        offset = count;
    }
    if bytes[offset..P::OMEGA].iter().any(|&b| b != 0) {
        return None;
    }
    Some(hints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mldsa::params::{Dsa44Params, Dsa65Params, Q};

    #[test]
    fn t1_t0_round_trip() {
        let mut p = Poly::zero();
        for (i, c) in p.coeffs.iter_mut().enumerate() {
            *c = (i as i32 * 7) % 1024;
        }
        let mut bytes = Vec::new();
        pack_t1(&p, &mut bytes);
        assert_eq!(bytes.len(), 320);
        assert_eq!(unpack_t1(&bytes), p);

        let mut p = Poly::zero();
        for (i, c) in p.coeffs.iter_mut().enumerate() {
            *c = ((i as i32 * 37) % 8192) - 4095;
        }
        let mut bytes = Vec::new();
        pack_t0(&p, &mut bytes);
        assert_eq!(bytes.len(), 416);
        assert_eq!(unpack_t0(&bytes), p);
    }

    #[test]
    fn eta_and_z_round_trip() {
        for eta in [2usize, 4] {
            let mut p = Poly::zero();
            for (i, c) in p.coeffs.iter_mut().enumerate() {
                *c = (i as i32 % (2 * eta as i32 + 1)) - eta as i32;
            }
            let mut bytes = Vec::new();
            pack_eta(&p, eta, &mut bytes);
            assert_eq!(bytes.len(), if eta == 2 { 96 } else { 128 });
            assert_eq!(unpack_eta(&bytes, eta), p);
        }

        for gamma1 in [1i32 << 17, 1 << 19] {
            let mut p = Poly::zero();
            for (i, c) in p.coeffs.iter_mut().enumerate() {
                *c = gamma1 - (i as i32 * 991) % (2 * gamma1);
            }
            let mut bytes = Vec::new();
            pack_z(&p, gamma1, &mut bytes);
            assert_eq!(bytes.len(), if gamma1 == 1 << 17 { 576 } else { 640 });
            assert_eq!(unpack_z(&bytes, gamma1), p);
        }
    }

    #[test]
    fn w1_sizes() {
        let p = Poly::zero();
        let mut a = Vec::new();
        pack_w1(&p, (Q - 1) / 88, &mut a);
        assert_eq!(a.len(), 192);
        let mut b = Vec::new();
        pack_w1(&p, (Q - 1) / 32, &mut b);
        assert_eq!(b.len(), 128);
    }

    #[test]
    fn hint_round_trip_and_rejection() {
        let mut hints = PolyVec::zero(Dsa65Params::K);
        hints.polys[0].coeffs[3] = 1;
        hints.polys[0].coeffs[200] = 1;
        hints.polys[4].coeffs[0] = 1;

        let mut bytes = Vec::new();
        pack_hints::<Dsa65Params>(&hints, &mut bytes);
        assert_eq!(bytes.len(), Dsa65Params::OMEGA + Dsa65Params::K);
        assert_eq!(unpack_hints::<Dsa65Params>(&bytes).unwrap(), hints);

        // Non-monotone cumulative count.
        let mut bad = bytes.clone();
        bad[Dsa65Params::OMEGA] = 3;
        bad[Dsa65Params::OMEGA + 1] = 1;
        assert!(unpack_hints::<Dsa65Params>(&bad).is_none());

        // Unsorted indices inside one polynomial.
        let mut bad = bytes.clone();
        bad.swap(0, 1);
        assert!(unpack_hints::<Dsa65Params>(&bad).is_none());

        // Nonzero padding after the last used index slot.
        let mut bad = bytes.clone();
        bad[10] = 42;
        assert!(unpack_hints::<Dsa65Params>(&bad).is_none());

        // An empty hint vector is canonical.
        let empty = PolyVec::zero(Dsa44Params::K);
        let mut bytes = Vec::new();
        pack_hints::<Dsa44Params>(&empty, &mut bytes);
        assert_eq!(unpack_hints::<Dsa44Params>(&bytes).unwrap(), empty);
    }
}
