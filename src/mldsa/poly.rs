//! Polynomial arithmetic over Z_8380417[X]/(X^256 + 1).
//!
//! Unlike the KEM ring this one admits a complete NTT (512th root of unity
//! 1753), so pointwise products are plain coefficient products. Montgomery
//! reduction uses R = 2^32; the twiddle table is computed at compile time
//! from the root, bit-reversed and in Montgomery form. The high/low
//! decomposition, hint arithmetic and norm checks implement the rounding
//! toolbox of the signature scheme.

use crate::sha3::{Shake128, Shake256};

use super::params::{CRH_BYTES, D, N, Q};

/// q⁻¹ mod 2^32.
const QINV: i32 = 58_728_449;
/// R²/256 mod q: the trailing scale factor of the inverse NTT.
const INV_NTT_SCALE: i32 = 41_978;

const fn bitrev8(x: usize) -> usize {
    let mut r = 0;
    let mut i = 0;
    while i < 8 {
        r |= ((x >> i) & 1) << (7 - i);
        i += 1;
    }
    r
}

const fn pow_mod(base: u64, exp: u64, modulus: u64) -> u64 {
    let mut result = 1u64;
    let mut b = base % modulus;
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result = (result * b) % modulus;
        }
        b = (b * b) % modulus;
        e >>= 1;
    }
    result
}

const fn build_zetas() -> [i32; N] {
    let mut table = [0i32; N];
    let mut i = 0;
    while i < N {
        let root = pow_mod(1753, bitrev8(i) as u64, Q as u64);
        table[i] = ((root << 32) % Q as u64) as i32;
        i += 1;
    }
    table
}

/// 1753^br(k)·R mod q.
const ZETAS: [i32; N] = build_zetas();

/// Montgomery reduction: `a·R⁻¹ mod q` for |a| ≤ 2^31·q. Branch-free; the
/// output magnitude is below q.
#[inline]
pub fn montgomery_reduce(a: i64) -> i32 {
    let u = (a as i32).wrapping_mul(QINV);
    ((a - (u as i64) * (Q as i64)) >> 32) as i32
}

/// Centers `a` into (−2^22 − 1, 2^22] modulo q for |a| ≤ 2^31 − 2^22.
#[inline]
pub fn reduce32(a: i32) -> i32 {
    let t = (a + (1 << 22)) >> 23;
    a - t * Q
}

/// Adds q when `a` is negative.
#[inline]
pub fn caddq(a: i32) -> i32 {
    a + ((a >> 31) & Q)
}

/// Canonical representative in [0, q).
#[inline]
pub fn freeze(a: i32) -> i32 {
    caddq(reduce32(a))
}

/// Splits a canonical `a` as `a = a1·2^d + a0` with a0 ∈ (−2^(d−1), 2^(d−1)].
#[inline]
pub fn power2round(a: i32) -> (i32, i32) {
    let a1 = (a + (1 << (D - 1)) - 1) >> D;
    (a1, a - (a1 << D))
}

/// Splits a canonical `a` as `a = a1·2γ2 + a0` with a0 ∈ (−γ2, γ2],
/// normalizing the wrap-around case a1 = (q−1)/2γ2 to zero.
#[inline]
pub fn decompose(a: i32, gamma2: i32) -> (i32, i32) {
    let mut a1 = (a + 127) >> 7;
    if gamma2 == (Q - 1) / 32 {
        a1 = (a1 * 1025 + (1 << 21)) >> 22;
        a1 &= 15;
    } else {
        a1 = (a1 * 11275 + (1 << 23)) >> 24;
        a1 ^= ((43 - a1) >> 31) & a1;
    }
    let mut a0 = a - a1 * 2 * gamma2;
    a0 -= (((Q - 1) / 2 - a0) >> 31) & Q;
    (a1, a0)
}

/// One hint bit: set when adding ct0 may change the high bits.
#[inline]
pub fn make_hint(a0: i32, a1: i32, gamma2: i32) -> u8 {
    (a0 > gamma2 || a0 < -gamma2 || (a0 == -gamma2 && a1 != 0)) as u8
}

/// Recomputes the high bits of `a` using a hint.
#[inline]
pub fn use_hint(a: i32, hint: u8, gamma2: i32) -> i32 {
    let (a1, a0) = decompose(a, gamma2);
    if hint == 0 {
        return a1;
    }
    if gamma2 == (Q - 1) / 32 {
        if a0 > 0 {
            (a1 + 1) & 15
        } else {
            (a1 - 1) & 15
        }
    } else if a0 > 0 {
        if a1 == 43 {
            0
        } else {
            a1 + 1
        }
    } else if a1 == 0 {
        43
    } else {
        a1 - 1
    }
}

/// An element of the signature ring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    pub coeffs: [i32; N],
}

impl Default for Poly {
    fn default() -> Self {
        Self::zero()
    }
}

impl Poly {
    pub fn zero() -> Self {
        Poly { coeffs: [0i32; N] }
    }

    pub fn add_assign(&mut self, rhs: &Poly) {
        for (a, b) in self.coeffs.iter_mut().zip(rhs.coeffs.iter()) {
            *a += b;
        }
    }

    pub fn sub_assign(&mut self, rhs: &Poly) {
        for (a, b) in self.coeffs.iter_mut().zip(rhs.coeffs.iter()) {
            *a -= b;
        }
    }

    pub fn reduce(&mut self) {
        for c in self.coeffs.iter_mut() {
            *c = reduce32(*c);
        }
    }

    pub fn caddq(&mut self) {
        for c in self.coeffs.iter_mut() {
            *c = caddq(*c);
        }
    }

    /// Multiplies every coefficient by 2^d (the t1 shift in verification).
    pub fn shift_left(&mut self) {
        for c in self.coeffs.iter_mut() {
            *c <<= D;
        }
    }

    /// Forward NTT, in place.
    pub fn ntt(&mut self) {
        let mut k = 0usize;
        let mut len = 128;
        while len > 0 {
            let mut start = 0;
            while start < N {
                k += 1;
                let zeta = ZETAS[k] as i64;
                for j in start..start + len {
                    let t = montgomery_reduce(zeta * self.coeffs[j + len] as i64);
                    self.coeffs[j + len] = self.coeffs[j] - t;
                    self.coeffs[j] += t;
                }
                start += 2 * len;
            }
            len >>= 1;
        }
    }

    /// Inverse NTT, in place; output carries the Montgomery factor R.
    /// Input coefficients must have magnitude below q.
    pub fn invntt_tomont(&mut self) {
        let mut k = N;
        let mut len = 1;
        while len < N {
            let mut start = 0;
            while start < N {
                k -= 1;
                let zeta = -(ZETAS[k] as i64);
                for j in start..start + len {
                    let t = self.coeffs[j];
                    self.coeffs[j] = t + self.coeffs[j + len];
                    self.coeffs[j + len] = t - self.coeffs[j + len];
                    self.coeffs[j + len] = montgomery_reduce(zeta * self.coeffs[j + len] as i64);
                }
                start += 2 * len;
            }
            len <<= 1;
        }
        for c in self.coeffs.iter_mut() {
            *c = montgomery_reduce(INV_NTT_SCALE as i64 * *c as i64);
        }
    }

    /// Full pointwise product in the NTT domain (Montgomery output).
    pub fn pointwise_montgomery(a: &Poly, b: &Poly) -> Poly {
        let mut r = Poly::zero();
        for i in 0..N {
            r.coeffs[i] = montgomery_reduce(a.coeffs[i] as i64 * b.coeffs[i] as i64);
        }
        r
    }

    /// True when some |coefficient| ≥ `bound` (taken on the centered
    /// representative). `bound` must be at most (q−1)/8.
    pub fn chknorm(&self, bound: i32) -> bool {
        debug_assert!(bound <= (Q - 1) / 8);
        for &a in self.coeffs.iter() {
            let t = a >> 31;
            let t = a - (t & (2 * a));
            if t >= bound {
                return true;
            }
        }
        false
    }

    /// Uniform sampling in [0, q) by 23-bit rejection from
    /// SHAKE-128(seed ‖ nonce), used for the matrix A.
    pub fn uniform(seed: &[u8; 32], nonce: u16) -> Poly {
        let mut xof = Shake128::new();
        xof.absorb(seed);
        xof.absorb(&nonce.to_le_bytes());

        let mut poly = Poly::zero();
        let mut filled = 0usize;
        let mut buf = [0u8; Shake128::RATE];
        while filled < N {
            xof.squeeze(&mut buf);
            for chunk in buf.chunks_exact(3) {
                if filled == N {
                    break;
                }
                let t = (chunk[0] as u32 | (chunk[1] as u32) << 8 | (chunk[2] as u32) << 16)
                    & 0x007F_FFFF;
                if t < Q as u32 {
                    poly.coeffs[filled] = t as i32;
                    filled += 1;
                }
            }
        }
        poly
    }

    /// Secret sampling in [−η, η] by nibble rejection from
    /// SHAKE-256(seed ‖ nonce).
    pub fn uniform_eta(seed: &[u8; CRH_BYTES], nonce: u16, eta: usize) -> Poly {
        let mut xof = Shake256::new();
        xof.absorb(seed);
        xof.absorb(&nonce.to_le_bytes());

        let mut poly = Poly::zero();
        let mut filled = 0usize;
        let mut buf = [0u8; Shake256::RATE];
        while filled < N {
            xof.squeeze(&mut buf);
            for &byte in buf.iter() {
                for t in [byte & 0x0F, byte >> 4] {
                    if filled == N {
                        break;
                    }
                    let t = t as u32;
                    if eta == 2 {
                        if t < 15 {
                            let t = t - (205 * t >> 10) * 5;
                            poly.coeffs[filled] = 2 - t as i32;
                            filled += 1;
                        }
                    } else if t < 9 {
                        poly.coeffs[filled] = 4 - t as i32;
                        filled += 1;
                    }
                }
            }
        }
        poly
    }

    /// Mask sampling in [−γ1 + 1, γ1] from SHAKE-256(seed ‖ nonce); the
    /// stream is the packed z encoding.
    pub fn uniform_gamma1(seed: &[u8; CRH_BYTES], nonce: u16, gamma1: i32) -> Poly {
        let polyz_bytes = if gamma1 == 1 << 17 { 576 } else { 640 };
        let mut xof = Shake256::new();
        xof.absorb(seed);
        xof.absorb(&nonce.to_le_bytes());
        let mut buf = vec![0u8; polyz_bytes];
        xof.squeeze(&mut buf);
        super::pack::unpack_z(&buf, gamma1)
    }

    /// The challenge polynomial: exactly τ coefficients set to ±1,
    /// positions and signs drawn from SHAKE-256(c̃).
    pub fn challenge(seed: &[u8; 32], tau: usize) -> Poly {
        let mut xof = Shake256::new();
        xof.absorb(seed);
        let mut buf = [0u8; Shake256::RATE];
        xof.squeeze(&mut buf);

        let mut signs = u64::from_le_bytes(buf[..8].try_into().unwrap());
        let mut pos = 8usize;

        let mut poly = Poly::zero();
        for i in (N - tau)..N {
            let b = loop {
                if pos == buf.len() {
                    xof.squeeze(&mut buf);
                    pos = 0;
                }
                let b = buf[pos] as usize;
                pos += 1;
                if b <= i {
                    break b;
                }
            };
            poly.coeffs[i] = poly.coeffs[b];
            poly.coeffs[b] = 1 - 2 * (signs & 1) as i32;
            signs >>= 1;
        }
        poly
    }
}

/// A length-`len` vector of polynomials (the l- and k-vectors of the
/// scheme share this type).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolyVec {
    pub polys: Vec<Poly>,
}

impl PolyVec {
    pub fn zero(len: usize) -> Self {
        PolyVec {
            polys: vec![Poly::zero(); len],
        }
    }

    pub fn add_assign(&mut self, rhs: &PolyVec) {
        for (a, b) in self.polys.iter_mut().zip(rhs.polys.iter()) {
            a.add_assign(b);
        }
    }

    pub fn sub_assign(&mut self, rhs: &PolyVec) {
        for (a, b) in self.polys.iter_mut().zip(rhs.polys.iter()) {
            a.sub_assign(b);
        }
    }

    pub fn reduce(&mut self) {
        for p in self.polys.iter_mut() {
            p.reduce();
        }
    }

    pub fn caddq(&mut self) {
        for p in self.polys.iter_mut() {
            p.caddq();
        }
    }

    pub fn ntt(&mut self) {
        for p in self.polys.iter_mut() {
            p.ntt();
        }
    }

    pub fn invntt_tomont(&mut self) {
        for p in self.polys.iter_mut() {
            p.invntt_tomont();
        }
    }

    pub fn chknorm(&self, bound: i32) -> bool {
        self.polys.iter().any(|p| p.chknorm(bound))
    }

    /// Multiplies every element by the NTT-domain polynomial `c`.
    pub fn pointwise_poly_montgomery(&self, c: &Poly) -> PolyVec {
        PolyVec {
            polys: self
                .polys
                .iter()
                .map(|p| Poly::pointwise_montgomery(c, p))
                .collect(),
        }
    }

    /// Inner product against another vector in the NTT domain.
    pub fn pointwise_acc_montgomery(a: &PolyVec, b: &PolyVec) -> Poly {
        debug_assert_eq!(a.polys.len(), b.polys.len());
        let mut acc = Poly::zero();
        for (x, y) in a.polys.iter().zip(b.polys.iter()) {
            acc.add_assign(&Poly::pointwise_montgomery(x, y));
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(p: &Poly) -> Vec<i32> {
        p.coeffs.iter().map(|&c| freeze(c)).collect()
    }

    #[test]
    fn zeta_table_properties() {
        // br(0) = 0: the first entry is R mod q.
        assert_eq!(ZETAS[0], 4_193_792);
        assert!(ZETAS.iter().all(|&z| (1..Q).contains(&z)));
        // 1753 has order 512: the br(128) entry squares to −R mod q.
        let z = ZETAS[1] as i64; // 1753^128·R
        let sq = montgomery_reduce(z * z); // 1753^256·R ≡ −R
        assert_eq!(freeze(sq + ZETAS[0]), 0);
    }

    #[test]
    fn reduction_helpers() {
        for a in [i32::MIN / 4, -Q, -1, 0, 1, Q - 1, Q, i32::MAX / 4] {
            assert_eq!(freeze(a) as i64, (a as i64).rem_euclid(Q as i64));
        }
        assert_eq!(montgomery_reduce(0), 0);
        // R·R⁻¹ ≡ 1.
        assert_eq!(freeze(montgomery_reduce(ZETAS[0] as i64)), 1);
    }

    #[test]
    fn power2round_identity() {
        for a in [0i32, 1, 4096, 8191, 8192, Q - 1, 123_456] {
            let (a1, a0) = power2round(a);
            assert_eq!(a1 * (1 << D) + a0, a);
            assert!(a0 > -(1 << (D - 1)) && a0 <= 1 << (D - 1));
        }
    }

    #[test]
    fn decompose_identity() {
        for gamma2 in [(Q - 1) / 88, (Q - 1) / 32] {
            for a in [0i32, 1, gamma2, 2 * gamma2, Q - 1, 3 * gamma2 + 7, Q - gamma2] {
                let (a1, a0) = decompose(a, gamma2);
                assert_eq!(
                    freeze(a1 * 2 * gamma2 + a0),
                    freeze(a),
                    "a = {a}, gamma2 = {gamma2}"
                );
                assert!(a0 > -gamma2 && a0 <= gamma2 || a0 == -gamma2);
            }
        }
    }

    #[test]
    fn hints_recover_high_bits() {
        for gamma2 in [(Q - 1) / 88, (Q - 1) / 32] {
            // use_hint(r + s, make_hint(s-part)) must equal the high bits
            // of r for small s; exercise the machinery over a value sweep.
            for r in [0i32, 77, gamma2 - 1, 2 * gamma2, 5 * gamma2 + 3, Q - 2] {
                for s in [-(gamma2 / 2), -3, 0, 3, gamma2 / 2] {
                    let sum = freeze(r + s);
                    let (r1, _) = decompose(r, gamma2);
                    let (w1, w0) = decompose(sum, gamma2);
                    let hint = make_hint(w0, w1, gamma2);
                    // Without perturbation no hint is needed.
                    if s == 0 {
                        assert_eq!(hint, 0);
                        assert_eq!(use_hint(sum, 0, gamma2), r1);
                    } else {
                        // The hint-corrected value differs from w1 by at
                        // most one step.
                        let fixed = use_hint(sum, hint, gamma2);
                        let max = (Q - 1) / (2 * gamma2);
                        let dist = (fixed - w1).rem_euclid(max);
                        assert!(dist <= 1 || dist == max - 1);
                    }
                }
            }
        }
    }

    #[test]
    fn ntt_round_trip() {
        let seed = [5u8; 32];
        let original = Poly::uniform(&seed, 0);
        let mut p = original.clone();
        p.ntt();
        p.invntt_tomont();
        // Undo the Montgomery factor.
        for c in p.coeffs.iter_mut() {
            *c = montgomery_reduce(*c as i64);
        }
        assert_eq!(canonical(&p), canonical(&original));
    }

    #[test]
    fn ntt_multiplication_matches_schoolbook() {
        let mut a = Poly::zero();
        let mut b = Poly::zero();
        a.coeffs[0] = 3;
        a.coeffs[200] = 1_000_000;
        b.coeffs[1] = 2;
        b.coeffs[100] = 8_000_000;

        let mut expected = [0i64; N];
        for i in 0..N {
            for j in 0..N {
                let prod = a.coeffs[i] as i64 * b.coeffs[j] as i64 % Q as i64;
                if i + j < N {
                    expected[i + j] += prod;
                } else {
                    expected[i + j - N] -= prod;
                }
            }
        }
        let expected: Vec<i32> = expected
            .iter()
            .map(|&v| v.rem_euclid(Q as i64) as i32)
            .collect();

        let (mut ah, mut bh) = (a.clone(), b.clone());
        ah.ntt();
        bh.ntt();
        let mut r = Poly::pointwise_montgomery(&ah, &bh);
        r.invntt_tomont();
        assert_eq!(canonical(&r), expected);
    }

    #[test]
    fn challenge_weight() {
        for tau in [39usize, 49, 60] {
            let c = Poly::challenge(&[9u8; 32], tau);
            let nonzero = c.coeffs.iter().filter(|&&x| x != 0).count();
            assert_eq!(nonzero, tau);
            assert!(c.coeffs.iter().all(|&x| x == 0 || x == 1 || x == -1));
        }
    }

    #[test]
    fn sampler_ranges() {
        let seed = [1u8; CRH_BYTES];
        for eta in [2usize, 4] {
            let p = Poly::uniform_eta(&seed, 3, eta);
            assert!(p
                .coeffs
                .iter()
                .all(|&c| (-(eta as i32)..=eta as i32).contains(&c)));
        }
        for gamma1 in [1 << 17, 1 << 19] {
            let p = Poly::uniform_gamma1(&seed, 7, gamma1);
            assert!(p.coeffs.iter().all(|&c| c > -gamma1 && c <= gamma1));
        }
    }
}
