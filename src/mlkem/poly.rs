//! Polynomial arithmetic over R_q = Z_3329[X]/(X^256 + 1).
//!
//! The NTT is the incomplete seven-layer transform with ζ = 17: it leaves
//! 128 degree-one residues, so products are 128 base multiplications
//! modulo X² − ζ^(2·br(i)+1). Reductions are branch-free Montgomery
//! (R = 2^16) and Barrett; the twiddle table is computed at compile time
//! from the root of unity, in bit-reversed order and Montgomery form.

use crate::sha3::Shake128;

use super::params::{N, POLY_BYTES, Q, SYM_BYTES};

/// q⁻¹ mod 2^16, as a signed 16-bit value.
const QINV: i16 = -3327;
/// R² mod q; multiplying with `fqmul` moves a value into Montgomery form.
const MONT_R2: i16 = 1353;
/// R²/128 mod q; the trailing scale factor of the inverse NTT.
const INV_NTT_SCALE: i16 = 1441;

const fn bitrev7(x: usize) -> usize {
    let mut r = 0;
    let mut i = 0;
    while i < 7 {
        r |= ((x >> i) & 1) << (6 - i);
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

const fn build_zetas() -> [i16; 128] {
    let mut table = [0i16; 128];
    let mut i = 0;
    while i < 128 {
        table[i] = ((pow_mod(17, bitrev7(i) as u64, Q as u64) * (1 << 16)) % Q as u64) as i16;
        i += 1;
    }
    table
}

/// ζ^br(i)·R mod q for the NTT butterflies and base multiplications.
const ZETAS: [i16; 128] = build_zetas();

/// Montgomery reduction: maps `a` to `a·R⁻¹ mod q` for |a| ≤ 2^15·q.
/// Branch-free; the output magnitude is below q.
#[inline]
pub fn montgomery_reduce(a: i32) -> i16 {
    let u = (a as i16).wrapping_mul(QINV);
    ((a - (u as i32) * (Q as i32)) >> 16) as i16
}

/// Barrett reduction: centers `a` into (−q/2, q/2]. Branch-free.
#[inline]
pub fn barrett_reduce(a: i16) -> i16 {
    const V: i32 = ((1 << 26) + (Q as i32) / 2) / (Q as i32);
    let t = ((V * a as i32 + (1 << 25)) >> 26) as i16;
    a.wrapping_sub(t.wrapping_mul(Q))
}

/// Montgomery-domain product `a·b·R⁻¹ mod q`.
#[inline]
fn fqmul(a: i16, b: i16) -> i16 {
    montgomery_reduce(a as i32 * b as i32)
}

/// Adds q when `a` is negative, yielding the canonical representative.
#[inline]
pub fn caddq(a: i16) -> i16 {
    a + ((a >> 15) & Q)
}

/// `Compress(c, d) = ⌊(2^d/q)·c⌉ mod 2^d` over a canonical coefficient.
#[inline]
pub fn compress(c: i16, d: usize) -> u16 {
    debug_assert!((0..Q).contains(&c));
    ((((c as u32) << d) + (Q as u32) / 2) / (Q as u32)) as u16 & ((1u16 << d) - 1)
}

/// `Decompress(c′, d) = ⌊(q/2^d)·c′⌉`.
#[inline]
pub fn decompress(c: u16, d: usize) -> i16 {
    (((c as u32 * Q as u32) + (1 << (d - 1))) >> d) as i16
}

/// Packs `values` as `d`-bit little-endian fields (FIPS 203 ByteEncode).
pub fn pack_bits(values: &[u16], d: usize, out: &mut Vec<u8>) {
    let mut acc = 0u32;
    let mut bits = 0usize;
    for &v in values {
        acc |= (v as u32) << bits;
        bits += d;
        while bits >= 8 {
            out.push(acc as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    debug_assert_eq!(bits, 0, "field count must fill whole bytes");
}

/// Inverse of [`pack_bits`] (FIPS 203 ByteDecode).
pub fn unpack_bits(bytes: &[u8], d: usize, count: usize) -> Vec<u16> {
    let mut values = Vec::with_capacity(count);
    let mut acc = 0u32;
    let mut bits = 0usize;
    let mut iter = bytes.iter();
    for _ in 0..count {
        while bits < d {
            acc |= (*iter.next().expect("input too short") as u32) << bits;
            bits += 8;
        }
        values.push((acc & ((1u32 << d) - 1)) as u16);
        acc >>= d;
        bits -= d;
    }
    values
}

/// An element of R_q: 256 coefficients, 16 bits each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    pub coeffs: [i16; N],
}

impl Default for Poly {
    fn default() -> Self {
        Self::zero()
    }
}

impl Poly {
    pub fn zero() -> Self {
        Poly { coeffs: [0i16; N] }
    }

    /// Coefficient-wise addition (no reduction).
    pub fn add_assign(&mut self, rhs: &Poly) {
        for (a, b) in self.coeffs.iter_mut().zip(rhs.coeffs.iter()) {
            *a += b;
        }
    }

    /// `self = rhs − self` coefficient-wise (no reduction).
    pub fn sub_from(&mut self, rhs: &Poly) {
        for (a, b) in self.coeffs.iter_mut().zip(rhs.coeffs.iter()) {
            *a = b - *a;
        }
    }

    /// Barrett-reduces every coefficient into (−q/2, q/2].
    pub fn reduce(&mut self) {
        for c in self.coeffs.iter_mut() {
            *c = barrett_reduce(*c);
        }
    }

    /// Moves every coefficient into the Montgomery domain.
    pub fn to_mont(&mut self) {
        for c in self.coeffs.iter_mut() {
            *c = fqmul(*c, MONT_R2);
        }
    }

    /// Forward NTT (in place), output Barrett-reduced.
    pub fn ntt(&mut self) {
        let mut k = 1;
        let mut len = 128;
        while len >= 2 {
            let mut start = 0;
            while start < N {
                let zeta = ZETAS[k];
                k += 1;
                for j in start..start + len {
                    let t = fqmul(zeta, self.coeffs[j + len]);
                    self.coeffs[j + len] = self.coeffs[j] - t;
                    self.coeffs[j] += t;
                }
                start += 2 * len;
            }
            len >>= 1;
        }
        self.reduce();
    }

    /// Inverse NTT (in place); the output carries the Montgomery factor R.
    pub fn invntt_tomont(&mut self) {
        let mut k = 127;
        let mut len = 2;
        while len <= 128 {
            let mut start = 0;
            while start < N {
                let zeta = ZETAS[k];
                k -= 1;
                for j in start..start + len {
                    let t = self.coeffs[j];
                    self.coeffs[j] = barrett_reduce(t + self.coeffs[j + len]);
                    self.coeffs[j + len] -= t;
                    self.coeffs[j + len] = fqmul(zeta, self.coeffs[j + len]);
                }
                start += 2 * len;
            }
            len <<= 1;
        }
        for c in self.coeffs.iter_mut() {
            *c = fqmul(*c, INV_NTT_SCALE);
        }
    }

    /// Pointwise product in the NTT domain: 128 products over
    /// X² − ζ^(2·br(i)+1), result in the Montgomery domain.
    pub fn basemul_montgomery(a: &Poly, b: &Poly) -> Poly {
        let mut r = Poly::zero();
        for i in 0..64 {
            let zeta = ZETAS[64 + i];
            base_product(
                &mut r.coeffs[4 * i..4 * i + 2],
                &a.coeffs[4 * i..4 * i + 2],
                &b.coeffs[4 * i..4 * i + 2],
                zeta,
            );
            base_product(
                &mut r.coeffs[4 * i + 2..4 * i + 4],
                &a.coeffs[4 * i + 2..4 * i + 4],
                &b.coeffs[4 * i + 2..4 * i + 4],
                -zeta,
            );
        }
        r
    }

    /// Samples a uniform NTT-domain polynomial by 12-bit rejection from a
    /// SHAKE-128 stream; values ≥ q are discarded.
    pub fn sample_ntt(xof: &mut Shake128) -> Poly {
        let mut poly = Poly::zero();
        let mut filled = 0usize;
        let mut buf = [0u8; Shake128::RATE];
        while filled < N {
            xof.squeeze(&mut buf);
            for chunk in buf.chunks_exact(3) {
                let v0 = (chunk[0] as u16 | ((chunk[1] as u16) << 8)) & 0x0FFF;
                let v1 = ((chunk[1] as u16 >> 4) | ((chunk[2] as u16) << 4)) & 0x0FFF;
                if v0 < Q as u16 && filled < N {
                    poly.coeffs[filled] = v0 as i16;
                    filled += 1;
                }
                if v1 < Q as u16 && filled < N {
                    poly.coeffs[filled] = v1 as i16;
                    filled += 1;
                }
            }
        }
        poly
    }

    /// Centered-binomial noise: each coefficient is the difference of two
    /// η-bit popcounts of the PRF stream.
    pub fn sample_cbd(buf: &[u8], eta: usize) -> Poly {
        debug_assert_eq!(buf.len(), 64 * eta);
        let mut poly = Poly::zero();
        match eta {
            2 => {
                for i in 0..N / 8 {
                    let t = u32::from_le_bytes(buf[4 * i..4 * i + 4].try_into().unwrap());
                    let d = (t & 0x5555_5555) + ((t >> 1) & 0x5555_5555);
                    for j in 0..8 {
                        let a = ((d >> (4 * j)) & 0x3) as i16;
                        let b = ((d >> (4 * j + 2)) & 0x3) as i16;
                        poly.coeffs[8 * i + j] = a - b;
                    }
                }
            }
            3 => {
                for i in 0..N / 4 {
                    let t = buf[3 * i] as u32
                        | ((buf[3 * i + 1] as u32) << 8)
                        | ((buf[3 * i + 2] as u32) << 16);
                    let d = (t & 0x0024_9249)
                        + ((t >> 1) & 0x0024_9249)
                        + ((t >> 2) & 0x0024_9249);
                    for j in 0..4 {
                        let a = ((d >> (6 * j)) & 0x7) as i16;
                        let b = ((d >> (6 * j + 3)) & 0x7) as i16;
                        poly.coeffs[4 * i + j] = a - b;
                    }
                }
            }
            _ => unreachable!("unsupported eta"),
        }
        poly
    }

    /// Canonical 12-bit serialization (384 bytes).
    pub fn to_bytes(&self, out: &mut Vec<u8>) {
        let canonical: Vec<u16> = self.coeffs.iter().map(|&c| caddq(c) as u16).collect();
        pack_bits(&canonical, 12, out);
    }

    /// Deserializes 384 bytes, reducing coefficients into [0, q).
    pub fn from_bytes(bytes: &[u8]) -> Poly {
        debug_assert_eq!(bytes.len(), POLY_BYTES);
        let mut poly = Poly::zero();
        for (c, v) in poly
            .coeffs
            .iter_mut()
            .zip(unpack_bits(bytes, 12, N).into_iter())
        {
            *c = caddq(barrett_reduce(v as i16));
        }
        poly
    }

    /// Compresses to `d` bits per coefficient and appends to `out`.
    pub fn compress_to(&self, d: usize, out: &mut Vec<u8>) {
        let compressed: Vec<u16> = self.coeffs.iter().map(|&c| compress(caddq(c), d)).collect();
        pack_bits(&compressed, d, out);
    }

    /// Inverse of [`Poly::compress_to`].
    pub fn decompress_from(bytes: &[u8], d: usize) -> Poly {
        let mut poly = Poly::zero();
        for (c, v) in poly
            .coeffs
            .iter_mut()
            .zip(unpack_bits(bytes, d, N).into_iter())
        {
            *c = decompress(v, d);
        }
        poly
    }

    /// Maps message bit i to coefficient i with value ⌈q/2⌋·b, branch-free.
    pub fn from_msg(msg: &[u8; SYM_BYTES]) -> Poly {
        let mut poly = Poly::zero();
        for i in 0..SYM_BYTES {
            for j in 0..8 {
                let mask = 0i16.wrapping_sub(((msg[i] >> j) & 1) as i16);
                poly.coeffs[8 * i + j] = mask & ((Q + 1) / 2);
            }
        }
        poly
    }

    /// Recovers the message by 1-bit compression of each coefficient.
    pub fn to_msg(&self) -> [u8; SYM_BYTES] {
        let mut msg = [0u8; SYM_BYTES];
        for i in 0..SYM_BYTES {
            for j in 0..8 {
                let bit = compress(caddq(self.coeffs[8 * i + j]), 1) as u8;
                msg[i] |= bit << j;
            }
        }
        msg
    }
}

fn base_product(r: &mut [i16], a: &[i16], b: &[i16], zeta: i16) {
    r[0] = fqmul(fqmul(a[1], b[1]), zeta);
    r[0] += fqmul(a[0], b[0]);
    r[1] = fqmul(a[0], b[1]);
    r[1] += fqmul(a[1], b[0]);
}

/// A vector of k polynomials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolyVec {
    pub polys: Vec<Poly>,
}

impl PolyVec {
    pub fn zero(k: usize) -> Self {
        PolyVec {
            polys: vec![Poly::zero(); k],
        }
    }

    pub fn add_assign(&mut self, rhs: &PolyVec) {
        for (a, b) in self.polys.iter_mut().zip(rhs.polys.iter()) {
            a.add_assign(b);
        }
    }

    pub fn reduce(&mut self) {
        for p in self.polys.iter_mut() {
            p.reduce();
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

    /// Inner product in the NTT domain; the accumulator is Barrett-reduced
    /// per term so the k = 5 extension stays inside i16.
    pub fn basemul_acc_montgomery(a: &PolyVec, b: &PolyVec) -> Poly {
        debug_assert_eq!(a.polys.len(), b.polys.len());
        let mut acc = Poly::zero();
        for (x, y) in a.polys.iter().zip(b.polys.iter()) {
            let product = Poly::basemul_montgomery(x, y);
            acc.add_assign(&product);
            acc.reduce();
        }
        acc
    }

    pub fn to_bytes(&self, out: &mut Vec<u8>) {
        for p in self.polys.iter() {
            p.to_bytes(out);
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> PolyVec {
        debug_assert_eq!(bytes.len() % POLY_BYTES, 0);
        PolyVec {
            polys: bytes.chunks_exact(POLY_BYTES).map(Poly::from_bytes).collect(),
        }
    }

    pub fn compress_to(&self, d: usize, out: &mut Vec<u8>) {
        for p in self.polys.iter() {
            p.compress_to(d, out);
        }
    }

    pub fn decompress_from(bytes: &[u8], d: usize, k: usize) -> PolyVec {
        let per_poly = d * N / 8;
        debug_assert_eq!(bytes.len(), per_poly * k);
        PolyVec {
            polys: bytes
                .chunks_exact(per_poly)
                .map(|chunk| Poly::decompress_from(chunk, d))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlkem::hash::xof;

    fn canonical(p: &Poly) -> Vec<i16> {
        p.coeffs.iter().map(|&c| caddq(barrett_reduce(c))).collect()
    }

    #[test]
    fn zeta_table_roots() {
        // ζ^br(0)·R = R mod q.
        assert_eq!(ZETAS[0], 2285);
        // Every entry is a power of ζ times R, hence nonzero mod q.
        assert!(ZETAS.iter().all(|&z| (1..Q).contains(&z)));
        // ζ^128 = −1: squaring the br(64) entry must give −R² → −R mod q.
        let z = ZETAS[1] as i32; // ζ^64·R
        let sq = montgomery_reduce(z * z); // ζ^128·R
        assert_eq!(caddq(barrett_reduce(sq + ZETAS[0])), 0);
    }

    #[test]
    fn reductions() {
        for a in [-32768i32, -12345, -1, 0, 1, 3328, 3329, 32767] {
            let m = montgomery_reduce(a << 8);
            assert!(m.unsigned_abs() < Q as u16 + 1);
        }
        for a in [-32768i16, -3329, -1, 0, 1, 1664, 3329, 32767] {
            let b = barrett_reduce(a);
            assert_eq!(caddq(b) as i32, (a as i32).rem_euclid(Q as i32));
        }
    }

    #[test]
    fn ntt_round_trip() {
        let seed = [11u8; 32];
        let mut stream = xof(&seed, 0, 0);
        let original = Poly::sample_ntt(&mut stream);

        let mut p = original.clone();
        p.ntt();
        p.invntt_tomont();
        // Undo the Montgomery factor introduced by the inverse transform.
        for c in p.coeffs.iter_mut() {
            *c = fqmul(*c, 1);
        }
        assert_eq!(canonical(&p), canonical(&original));
    }

    #[test]
    fn ntt_multiplication_matches_schoolbook() {
        let mut a = Poly::zero();
        let mut b = Poly::zero();
        a.coeffs[0] = 5;
        a.coeffs[3] = 1200;
        a.coeffs[255] = 77;
        b.coeffs[1] = 9;
        b.coeffs[100] = 3000;

        // Negacyclic schoolbook product.
        let mut expected = [0i64; N];
        for i in 0..N {
            for j in 0..N {
                let prod = a.coeffs[i] as i64 * b.coeffs[j] as i64;
                if i + j < N {
                    expected[i + j] += prod;
                } else {
                    expected[i + j - N] -= prod;
                }
            }
        }
        let expected: Vec<i16> = expected
            .iter()
            .map(|&v| v.rem_euclid(Q as i64) as i16)
            .collect();

        let (mut ah, mut bh) = (a.clone(), b.clone());
        ah.ntt();
        bh.ntt();
        let mut r = Poly::basemul_montgomery(&ah, &bh);
        r.invntt_tomont();
        assert_eq!(canonical(&r), expected);
    }

    #[test]
    fn cbd_bounds() {
        for eta in [2usize, 3] {
            let buf: Vec<u8> = (0..64 * eta).map(|i| (i * 37 % 256) as u8).collect();
            let p = Poly::sample_cbd(&buf, eta);
            assert!(p
                .coeffs
                .iter()
                .all(|&c| (-(eta as i16)..=eta as i16).contains(&c)));
        }
    }

    #[test]
    fn serialization_round_trips() {
        let seed = [42u8; 32];
        let mut stream = xof(&seed, 1, 2);
        let p = Poly::sample_ntt(&mut stream);

        let mut bytes = Vec::new();
        p.to_bytes(&mut bytes);
        assert_eq!(bytes.len(), POLY_BYTES);
        assert_eq!(Poly::from_bytes(&bytes), p);

        for d in [4usize, 5, 10, 11] {
            let mut packed = Vec::new();
            p.compress_to(d, &mut packed);
            assert_eq!(packed.len(), d * N / 8);
            let q = Poly::decompress_from(&packed, d);
            // Compression is lossy but must be stable under a second pass.
            let mut repacked = Vec::new();
            q.compress_to(d, &mut repacked);
            assert_eq!(packed, repacked);
        }
    }

    #[test]
    fn message_embedding_round_trips() {
        let mut msg = [0u8; SYM_BYTES];
        msg[0] = 0xA5;
        msg[31] = 0x3C;
        let p = Poly::from_msg(&msg);
        assert!(p.coeffs.iter().all(|&c| c == 0 || c == (Q + 1) / 2));
        assert_eq!(p.to_msg(), msg);
    }

    #[test]
    fn compress_decompress_scalars() {
        // Values survive a compress→decompress→compress cycle exactly.
        for d in [1usize, 4, 5, 10, 11] {
            for c in [0u16, 1, (1 << d) / 2, (1 << d) - 1] {
                let x = decompress(c, d);
                assert_eq!(compress(x, d), c);
            }
        }
    }
}
