//! ML-DSA: the module-lattice digital signature scheme (Dilithium).
//!
//! Signing is the Fiat–Shamir-with-aborts rejection loop: sample a mask y,
//! commit to the high bits of w = Ay, derive the challenge c, and retry
//! until the response z = y + cs1 and the low-order terms pass their norm
//! bounds, so the signature leaks nothing about the secret. Verification
//! recomputes the commitment from z and the hint vector. The 48-byte CRH
//! and 32-byte challenge seed follow the original library's layout.

pub mod pack;
pub mod params;
pub mod poly;

use std::marker::PhantomData;

use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::Error;
use crate::sha3::Shake256;

use self::params::{DsaParams, CRH_BYTES, POLYT0_BYTES, POLYT1_BYTES, SEED_BYTES};
use self::poly::{Poly, PolyVec};

pub use self::params::{Dsa44Params, Dsa65Params, Dsa87Params};

/// A verification (public) key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DsaVerifyKey(pub Vec<u8>);

/// A signing (secret) key; wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DsaSigningKey(pub Vec<u8>);

/// The signature scheme over a parameter level `P`.
pub struct MlDsa<P: DsaParams> {
    _marker: PhantomData<P>,
}

/// ML-DSA-44 (level 2).
pub type MlDsa44 = MlDsa<Dsa44Params>;
/// ML-DSA-65 (level 3).
pub type MlDsa65 = MlDsa<Dsa65Params>;
/// ML-DSA-87 (level 5).
pub type MlDsa87 = MlDsa<Dsa87Params>;

/// The 48-byte collision-resistant hash (SHAKE-256).
fn crh(parts: &[&[u8]]) -> [u8; CRH_BYTES] {
    let mut xof = Shake256::new();
    for part in parts {
        xof.absorb(part);
    }
    let mut out = [0u8; CRH_BYTES];
    xof.squeeze(&mut out);
    out
}

fn shake256_seed(parts: &[&[u8]]) -> [u8; SEED_BYTES] {
    let mut xof = Shake256::new();
    for part in parts {
        xof.absorb(part);
    }
    let mut out = [0u8; SEED_BYTES];
    xof.squeeze(&mut out);
    out
}

impl<P: DsaParams> Default for MlDsa<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: DsaParams> MlDsa<P> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Verification-key size in bytes.
    pub const fn publickey_size() -> usize {
        P::PUBLICKEY_BYTES
    }

    /// Signing-key size in bytes.
    pub const fn secretkey_size() -> usize {
        P::SECRETKEY_BYTES
    }

    /// Detached-signature size in bytes.
    pub const fn signature_size() -> usize {
        P::SIGNATURE_BYTES
    }

    /// A ∈ R_q^{k×l} expanded row-wise from ρ.
    fn expand_matrix(rho: &[u8; SEED_BYTES]) -> Vec<PolyVec> {
        (0..P::K)
            .map(|i| PolyVec {
                polys: (0..P::L)
                    .map(|j| Poly::uniform(rho, ((i as u16) << 8) + j as u16))
                    .collect(),
            })
            .collect()
    }

    /// Deterministic key generation from a 32-byte seed:
    /// (ρ, ρ′, K) ← SHAKE-256(seed); t = As1 + s2 split by `power2round`;
    /// pk = ρ ‖ t1, sk = ρ ‖ K ‖ tr ‖ s1 ‖ s2 ‖ t0.
    pub fn key_gen_internal(&self, seed: &[u8; SEED_BYTES]) -> (DsaVerifyKey, DsaSigningKey) {
        let mut expanded = [0u8; 2 * SEED_BYTES + CRH_BYTES];
        let mut xof = Shake256::new();
        xof.absorb(seed);
        xof.squeeze(&mut expanded);
        let rho: [u8; SEED_BYTES] = expanded[..SEED_BYTES].try_into().unwrap();
        let rhoprime: [u8; CRH_BYTES] = expanded[SEED_BYTES..SEED_BYTES + CRH_BYTES]
            .try_into()
            .unwrap();
        let key: [u8; SEED_BYTES] = expanded[SEED_BYTES + CRH_BYTES..].try_into().unwrap();

        let mat = Self::expand_matrix(&rho);

        let mut s1 = PolyVec::zero(P::L);
        for (j, p) in s1.polys.iter_mut().enumerate() {
            *p = Poly::uniform_eta(&rhoprime, j as u16, P::ETA);
        }
        let mut s2 = PolyVec::zero(P::K);
        for (i, p) in s2.polys.iter_mut().enumerate() {
            *p = Poly::uniform_eta(&rhoprime, (P::L + i) as u16, P::ETA);
        }

        let mut s1hat = s1.clone();
        s1hat.ntt();

        let mut t1 = PolyVec::zero(P::K);
        let mut t0 = PolyVec::zero(P::K);
        for i in 0..P::K {
            let mut t = PolyVec::pointwise_acc_montgomery(&mat[i], &s1hat);
            t.reduce();
            t.invntt_tomont();
            t.add_assign(&s2.polys[i]);
            t.caddq();
            for (j, &c) in t.coeffs.iter().enumerate() {
                let (high, low) = poly::power2round(c);
                t1.polys[i].coeffs[j] = high;
                t0.polys[i].coeffs[j] = low;
            }
        }

        let mut pk = Vec::with_capacity(P::PUBLICKEY_BYTES);
        pk.extend_from_slice(&rho);
        for p in t1.polys.iter() {
            pack::pack_t1(p, &mut pk);
        }

        let tr = crh(&[&pk]);

        let mut sk = Vec::with_capacity(P::SECRETKEY_BYTES);
        sk.extend_from_slice(&rho);
        sk.extend_from_slice(&key);
        sk.extend_from_slice(&tr);
        for p in s1.polys.iter() {
            pack::pack_eta(p, P::ETA, &mut sk);
        }
        for p in s2.polys.iter() {
            pack::pack_eta(p, P::ETA, &mut sk);
        }
        for p in t0.polys.iter() {
            pack::pack_t0(p, &mut sk);
        }

        expanded.zeroize();
        (DsaVerifyKey(pk), DsaSigningKey(sk))
    }

    /// Key generation with injected randomness.
    pub fn key_gen<R: RngCore + CryptoRng>(&self, rng: &mut R) -> (DsaVerifyKey, DsaSigningKey) {
        let mut seed = [0u8; SEED_BYTES];
        rng.fill_bytes(&mut seed);
        let keys = self.key_gen_internal(&seed);
        seed.zeroize();
        keys
    }

    fn sign_with_rhoprime(
        &self,
        sk: &DsaSigningKey,
        mu: &[u8; CRH_BYTES],
        rhoprime: &[u8; CRH_BYTES],
    ) -> Vec<u8> {
        let bytes = &sk.0;
        let rho: [u8; SEED_BYTES] = bytes[..SEED_BYTES].try_into().unwrap();
        let mut offset = 2 * SEED_BYTES + CRH_BYTES;

        let mut s1 = PolyVec::zero(P::L);
        for p in s1.polys.iter_mut() {
            *p = pack::unpack_eta(&bytes[offset..offset + P::POLYETA_BYTES], P::ETA);
            offset += P::POLYETA_BYTES;
        }
        let mut s2 = PolyVec::zero(P::K);
        for p in s2.polys.iter_mut() {
            *p = pack::unpack_eta(&bytes[offset..offset + P::POLYETA_BYTES], P::ETA);
            offset += P::POLYETA_BYTES;
        }
        let mut t0 = PolyVec::zero(P::K);
        for p in t0.polys.iter_mut() {
            *p = pack::unpack_t0(&bytes[offset..offset + POLYT0_BYTES]);
            offset += POLYT0_BYTES;
        }

        let mat = Self::expand_matrix(&rho);
        s1.ntt();
        s2.ntt();
        t0.ntt();

        let mut kappa = 0u16;
        loop {
            // Fresh mask for this attempt.
            let mut y = PolyVec::zero(P::L);
            for (i, p) in y.polys.iter_mut().enumerate() {
                *p = Poly::uniform_gamma1(rhoprime, P::L as u16 * kappa + i as u16, P::GAMMA1);
            }
            kappa += 1;

            let mut yhat = y.clone();
            yhat.ntt();

            let mut w = PolyVec::zero(P::K);
            for i in 0..P::K {
                let mut wi = PolyVec::pointwise_acc_montgomery(&mat[i], &yhat);
                wi.reduce();
                wi.invntt_tomont();
                w.polys[i] = wi;
            }
            w.caddq();

            let mut w1 = PolyVec::zero(P::K);
            let mut w0 = PolyVec::zero(P::K);
            for i in 0..P::K {
                for (j, &c) in w.polys[i].coeffs.iter().enumerate() {
                    let (high, low) = poly::decompose(c, P::GAMMA2);
                    w1.polys[i].coeffs[j] = high;
                    w0.polys[i].coeffs[j] = low;
                }
            }

            let mut w1_packed = Vec::with_capacity(P::K * P::POLYW1_BYTES);
            for p in w1.polys.iter() {
                pack::pack_w1(p, P::GAMMA2, &mut w1_packed);
            }
            let c_seed = shake256_seed(&[mu, &w1_packed]);

            let mut cp = Poly::challenge(&c_seed, P::TAU);
            cp.ntt();

            // z = y + c·s1, rejected when it leaks.
            let mut z = s1.pointwise_poly_montgomery(&cp);
            z.invntt_tomont();
            z.add_assign(&y);
            z.reduce();
            if z.chknorm(P::GAMMA1 - P::BETA) {
                continue;
            }

            // Low bits of w − c·s2.
            let mut cs2 = s2.pointwise_poly_montgomery(&cp);
            cs2.invntt_tomont();
            let mut r0 = w0.clone();
            r0.sub_assign(&cs2);
            r0.reduce();
            if r0.chknorm(P::GAMMA2 - P::BETA) {
                continue;
            }

            let mut ct0 = t0.pointwise_poly_montgomery(&cp);
            ct0.invntt_tomont();
            ct0.reduce();
            if ct0.chknorm(P::GAMMA2) {
                continue;
            }

            r0.add_assign(&ct0);
            let mut hints = PolyVec::zero(P::K);
            let mut weight = 0usize;
            for i in 0..P::K {
                for j in 0..params::N {
                    let h = poly::make_hint(
                        r0.polys[i].coeffs[j],
                        w1.polys[i].coeffs[j],
                        P::GAMMA2,
                    );
                    hints.polys[i].coeffs[j] = h as i32;
                    weight += h as usize;
                }
            }
            if weight > P::OMEGA {
                continue;
            }

            let mut signature = Vec::with_capacity(P::SIGNATURE_BYTES);
            signature.extend_from_slice(&c_seed);
            for p in z.polys.iter() {
                pack::pack_z(p, P::GAMMA1, &mut signature);
            }
            pack::pack_hints::<P>(&hints, &mut signature);
            return signature;
        }
    }

    /// Deterministic signing: ρ′ = CRH(K ‖ μ).
    pub fn sign_internal(&self, message: &[u8], sk: &DsaSigningKey) -> Result<Vec<u8>, Error> {
        if sk.0.len() != P::SECRETKEY_BYTES {
            return Err(Error::InvalidLength);
        }
        let key = &sk.0[SEED_BYTES..2 * SEED_BYTES];
        let tr = &sk.0[2 * SEED_BYTES..2 * SEED_BYTES + CRH_BYTES];
        let mu = crh(&[tr, message]);
        let rhoprime = crh(&[key, &mu]);
        Ok(self.sign_with_rhoprime(sk, &mu, &rhoprime))
    }

    /// Hedged signing: ρ′ drawn from the injected RNG.
    pub fn sign<R: RngCore + CryptoRng>(
        &self,
        message: &[u8],
        sk: &DsaSigningKey,
        rng: &mut R,
    ) -> Result<Vec<u8>, Error> {
        if sk.0.len() != P::SECRETKEY_BYTES {
            return Err(Error::InvalidLength);
        }
        let tr = &sk.0[2 * SEED_BYTES..2 * SEED_BYTES + CRH_BYTES];
        let mu = crh(&[tr, message]);
        let mut rhoprime = [0u8; CRH_BYTES];
        rng.fill_bytes(&mut rhoprime);
        let signature = self.sign_with_rhoprime(sk, &mu, &rhoprime);
        rhoprime.zeroize();
        Ok(signature)
    }

    /// Verifies a detached signature. Returns only a boolean; no
    /// diagnostics are exposed.
    pub fn verify(&self, message: &[u8], signature: &[u8], pk: &DsaVerifyKey) -> bool {
        if signature.len() != P::SIGNATURE_BYTES || pk.0.len() != P::PUBLICKEY_BYTES {
            return false;
        }

        let rho: [u8; SEED_BYTES] = pk.0[..SEED_BYTES].try_into().unwrap();
        let mut t1 = PolyVec::zero(P::K);
        for (i, p) in t1.polys.iter_mut().enumerate() {
            let start = SEED_BYTES + i * POLYT1_BYTES;
            *p = pack::unpack_t1(&pk.0[start..start + POLYT1_BYTES]);
        }

        let c_seed: [u8; SEED_BYTES] = signature[..SEED_BYTES].try_into().unwrap();
        let mut z = PolyVec::zero(P::L);
        for (i, p) in z.polys.iter_mut().enumerate() {
            let start = SEED_BYTES + i * P::POLYZ_BYTES;
            *p = pack::unpack_z(&signature[start..start + P::POLYZ_BYTES], P::GAMMA1);
        }
        let hints =
            match pack::unpack_hints::<P>(&signature[SEED_BYTES + P::L * P::POLYZ_BYTES..]) {
                Some(h) => h,
                None => return false,
            };

        if z.chknorm(P::GAMMA1 - P::BETA) {
            return false;
        }

        let tr = crh(&[&pk.0]);
        let mu = crh(&[&tr, message]);

        let mut cp = Poly::challenge(&c_seed, P::TAU);
        cp.ntt();
        let mat = Self::expand_matrix(&rho);
        z.ntt();

        let mut w1 = PolyVec::zero(P::K);
        for i in 0..P::K {
            let mut wi = PolyVec::pointwise_acc_montgomery(&mat[i], &z);

            let mut t1s = t1.polys[i].clone();
            t1s.shift_left();
            t1s.ntt();
            let ct1 = Poly::pointwise_montgomery(&cp, &t1s);
            wi.sub_assign(&ct1);
            wi.reduce();
            wi.invntt_tomont();
            w1.polys[i] = wi;
        }
        w1.caddq();

        let mut w1_packed = Vec::with_capacity(P::K * P::POLYW1_BYTES);
        for i in 0..P::K {
            let mut high = Poly::zero();
            for (j, &c) in w1.polys[i].coeffs.iter().enumerate() {
                high.coeffs[j] = poly::use_hint(
                    c,
                    hints.polys[i].coeffs[j] as u8,
                    P::GAMMA2,
                );
            }
            pack::pack_w1(&high, P::GAMMA2, &mut w1_packed);
        }

        shake256_seed(&[&mu, &w1_packed]) == c_seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drbg::NistCtrDrbg;

    fn seed32(tag: &[u8]) -> [u8; 32] {
        crate::sha3::Sha3_256::digest(tag)
    }

    #[test]
    fn sign_verify_round_trip_all_levels() {
        fn run<P: DsaParams>() {
            let dsa = MlDsa::<P>::new();
            let (pk, sk) = dsa.key_gen_internal(&crate::sha3::Sha3_256::digest(b"dsa seed"));
            assert_eq!(pk.0.len(), P::PUBLICKEY_BYTES);
            assert_eq!(sk.0.len(), P::SECRETKEY_BYTES);

            let message = b"a signed message of moderate length, 33b";
            let signature = dsa.sign_internal(message, &sk).unwrap();
            assert_eq!(signature.len(), P::SIGNATURE_BYTES);
            assert!(dsa.verify(message, &signature, &pk));
        }
        run::<Dsa44Params>();
        run::<Dsa65Params>();
        run::<Dsa87Params>();
    }

    #[test]
    fn deterministic_signatures_are_stable() {
        let dsa = MlDsa65::new();
        let (_, sk) = dsa.key_gen_internal(&seed32(b"stable"));
        let a = dsa.sign_internal(b"same message", &sk).unwrap();
        let b = dsa.sign_internal(b"same message", &sk).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hedged_signatures_verify() {
        let seed: [u8; 48] = hex::decode(
            "061550234d158c5ec95595fe04ef7a25767f2e24cc2bc479d09d86dc9abcfde7\
             056a8c266f9ef97ed08541dbd2e1ffa1",
        )
        .unwrap()
        .try_into()
        .unwrap();
        let mut rng = NistCtrDrbg::new(&seed, &[]).unwrap();

        let dsa = MlDsa65::new();
        let (pk, sk) = dsa.key_gen(&mut rng);
        let message = [0xC9u8; 33];
        let signature = dsa.sign(&message, &sk, &mut rng).unwrap();
        assert!(dsa.verify(&message, &signature, &pk));
    }

    #[test]
    fn tampering_is_rejected() {
        let dsa = MlDsa44::new();
        let (pk, sk) = dsa.key_gen_internal(&seed32(b"tamper"));
        let message = b"message under test";
        let signature = dsa.sign_internal(message, &sk).unwrap();

        // Flipped message.
        assert!(!dsa.verify(b"message under tesT", &signature, &pk));

        // Bit flips across every signature region: challenge seed, z, hints.
        for position in [0usize, 40, 1000, signature.len() - 3] {
            let mut bad = signature.clone();
            bad[position] ^= 0x01;
            assert!(!dsa.verify(message, &bad, &pk));
        }

        // Wrong key.
        let (other_pk, _) = dsa.key_gen_internal(&seed32(b"other"));
        assert!(!dsa.verify(message, &signature, &other_pk));

        // Truncation.
        assert!(!dsa.verify(message, &signature[..signature.len() - 1], &pk));
    }

    #[test]
    fn signatures_bind_the_message() {
        let dsa = MlDsa44::new();
        let (pk, sk) = dsa.key_gen_internal(&seed32(b"bind"));
        let s1 = dsa.sign_internal(b"first", &sk).unwrap();
        let s2 = dsa.sign_internal(b"second", &sk).unwrap();
        assert_ne!(s1, s2);
        assert!(!dsa.verify(b"second", &s1, &pk));
        assert!(!dsa.verify(b"first", &s2, &pk));
    }
}
