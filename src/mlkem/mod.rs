//! ML-KEM: the CCA-secure key-encapsulation mechanism (Kyber).
//!
//! The IND-CPA scheme in [`pke`] is lifted to CCA security with the
//! Fujisaki–Okamoto transform: decapsulation re-encrypts the recovered
//! message and selects, in constant time, between the real key and a
//! pseudorandom key derived from the rejection secret z. Decapsulation
//! therefore never fails: a tampered ciphertext yields a shared secret
//! that simply does not match the peer's, plus a success flag for callers
//! that want it.

pub mod hash;
pub mod params;
pub mod pke;
pub mod poly;

use std::marker::PhantomData;

use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::ctutils;
use crate::errors::Error;

use self::hash::{g, h, kdf};
use self::params::{KemParams, SYM_BYTES};
use self::pke::KPke;

pub use self::params::{Kem1024Params, Kem1280Params, Kem512Params, Kem768Params};

/// An encapsulation (public) key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KemEncapsKey(pub Vec<u8>);

/// A decapsulation (secret) key; wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KemDecapsKey(pub Vec<u8>);

/// A 32-byte shared secret; wiped from memory on drop.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KemSharedSecret(pub [u8; SYM_BYTES]);

/// The KEM over a parameter level `P`.
pub struct MlKem<P: KemParams> {
    _marker: PhantomData<P>,
}

/// ML-KEM-512.
pub type MlKem512 = MlKem<Kem512Params>;
/// ML-KEM-768.
pub type MlKem768 = MlKem<Kem768Params>;
/// ML-KEM-1024.
pub type MlKem1024 = MlKem<Kem1024Params>;
/// The non-standard k = 5 extension of the original library.
pub type MlKem1280 = MlKem<Kem1280Params>;

impl<P: KemParams> Default for MlKem<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: KemParams> MlKem<P> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Encapsulation-key size in bytes.
    pub const fn publickey_size() -> usize {
        P::PUBLICKEY_BYTES
    }

    /// Decapsulation-key size in bytes.
    pub const fn secretkey_size() -> usize {
        P::SECRETKEY_BYTES
    }

    /// Ciphertext size in bytes.
    pub const fn ciphertext_size() -> usize {
        P::CIPHERTEXT_BYTES
    }

    /// Deterministic key generation from the seeds d and z:
    /// dk = dk_pke ‖ ek ‖ H(ek) ‖ z.
    pub fn key_gen_internal(
        &self,
        d: &[u8; SYM_BYTES],
        z: &[u8; SYM_BYTES],
    ) -> (KemEncapsKey, KemDecapsKey) {
        let (ek_pke, mut dk) = KPke::<P>::key_gen(d);
        dk.extend_from_slice(&ek_pke);
        dk.extend_from_slice(&h(&ek_pke));
        dk.extend_from_slice(z);
        (KemEncapsKey(ek_pke), KemDecapsKey(dk))
    }

    /// Key generation with injected randomness.
    pub fn key_gen<R: RngCore + CryptoRng>(&self, rng: &mut R) -> (KemEncapsKey, KemDecapsKey) {
        let mut d = [0u8; SYM_BYTES];
        let mut z = [0u8; SYM_BYTES];
        rng.fill_bytes(&mut d);
        rng.fill_bytes(&mut z);
        let keys = self.key_gen_internal(&d, &z);
        d.zeroize();
        z.zeroize();
        keys
    }

    /// Deterministic encapsulation of the message m:
    /// (K̄, r) = G(m ‖ H(ek)), c = Enc(ek, m, r), K = KDF(K̄ ‖ H(c)).
    pub fn encaps_internal(
        &self,
        ek: &KemEncapsKey,
        m: &[u8; SYM_BYTES],
    ) -> Result<(KemSharedSecret, Vec<u8>), Error> {
        if ek.0.len() != P::PUBLICKEY_BYTES {
            return Err(Error::InvalidLength);
        }
        let mut buf = [0u8; 2 * SYM_BYTES];
        buf[..SYM_BYTES].copy_from_slice(m);
        buf[SYM_BYTES..].copy_from_slice(&h(&ek.0));
        let (kbar, coins) = g(&buf);

        let ciphertext = KPke::<P>::encrypt(&ek.0, m, &coins);

        let mut key_input = [0u8; 2 * SYM_BYTES];
        key_input[..SYM_BYTES].copy_from_slice(&kbar);
        key_input[SYM_BYTES..].copy_from_slice(&h(&ciphertext));
        let shared = kdf(&key_input);

        buf.zeroize();
        key_input.zeroize();
        Ok((KemSharedSecret(shared), ciphertext))
    }

    /// Encapsulation with injected randomness.
    pub fn encaps<R: RngCore + CryptoRng>(
        &self,
        ek: &KemEncapsKey,
        rng: &mut R,
    ) -> Result<(KemSharedSecret, Vec<u8>), Error> {
        let mut m = [0u8; SYM_BYTES];
        rng.fill_bytes(&mut m);
        let result = self.encaps_internal(ek, &m);
        m.zeroize();
        result
    }

    /// Decapsulation. Always returns a 32-byte secret: on a ciphertext
    /// mismatch the secret is KDF(z ‖ H(c)) and the flag is `false`. The
    /// selection between the two keys is constant time.
    pub fn decaps(
        &self,
        dk: &KemDecapsKey,
        ciphertext: &[u8],
    ) -> Result<(KemSharedSecret, bool), Error> {
        if dk.0.len() != P::SECRETKEY_BYTES || ciphertext.len() != P::CIPHERTEXT_BYTES {
            return Err(Error::InvalidLength);
        }
        let dk_pke = &dk.0[..P::INDCPA_SECRETKEY_BYTES];
        let ek_pke =
            &dk.0[P::INDCPA_SECRETKEY_BYTES..P::INDCPA_SECRETKEY_BYTES + P::INDCPA_PUBLICKEY_BYTES];
        let pk_hash = &dk.0[P::SECRETKEY_BYTES - 2 * SYM_BYTES..P::SECRETKEY_BYTES - SYM_BYTES];
        let z = &dk.0[P::SECRETKEY_BYTES - SYM_BYTES..];

        let m_prime = KPke::<P>::decrypt(dk_pke, ciphertext);

        let mut buf = [0u8; 2 * SYM_BYTES];
        buf[..SYM_BYTES].copy_from_slice(&m_prime);
        buf[SYM_BYTES..].copy_from_slice(pk_hash);
        let (kbar_prime, coins_prime) = g(&buf);

        let reencrypted = KPke::<P>::encrypt(ek_pke, &m_prime, &coins_prime);
        let matches = ctutils::ct_eq(&reencrypted, ciphertext);

        let ct_hash = h(ciphertext);
        let mut accept_input = [0u8; 2 * SYM_BYTES];
        accept_input[..SYM_BYTES].copy_from_slice(&kbar_prime);
        accept_input[SYM_BYTES..].copy_from_slice(&ct_hash);
        let accept_key = kdf(&accept_input);

        let mut reject_input = [0u8; 2 * SYM_BYTES];
        reject_input[..SYM_BYTES].copy_from_slice(z);
        reject_input[SYM_BYTES..].copy_from_slice(&ct_hash);
        let reject_key = kdf(&reject_input);

        let mut shared = [0u8; SYM_BYTES];
        shared.copy_from_slice(&ctutils::ct_select(&accept_key, &reject_key, matches));

        buf.zeroize();
        accept_input.zeroize();
        reject_input.zeroize();
        Ok((KemSharedSecret(shared), matches.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drbg::NistCtrDrbg;

    #[test]
    fn deterministic_round_trip() {
        let kem = MlKem768::new();
        let d = h(b"keygen seed d");
        let z = h(b"keygen seed z");
        let (ek, dk) = kem.key_gen_internal(&d, &z);
        assert_eq!(ek.0.len(), 1184);
        assert_eq!(dk.0.len(), 2400);

        let m = h(b"encapsulation message");
        let (ss_enc, ct) = kem.encaps_internal(&ek, &m).unwrap();
        assert_eq!(ct.len(), 1088);

        let (ss_dec, ok) = kem.decaps(&dk, &ct).unwrap();
        assert!(ok);
        assert_eq!(ss_enc.0, ss_dec.0);
    }

    #[test]
    fn drbg_driven_round_trip_all_levels() {
        let seed: [u8; 48] = hex::decode(
            "061550234d158c5ec95595fe04ef7a25767f2e24cc2bc479d09d86dc9abcfde7\
             056a8c266f9ef97ed08541dbd2e1ffa1",
        )
        .unwrap()
        .try_into()
        .unwrap();

        fn run<P: KemParams>(seed: &[u8; 48]) {
            let mut rng = NistCtrDrbg::new(seed, &[]).unwrap();
            let kem = MlKem::<P>::new();
            let (ek, dk) = kem.key_gen(&mut rng);
            let (ss_enc, ct) = kem.encaps(&ek, &mut rng).unwrap();
            let (ss_dec, ok) = kem.decaps(&dk, &ct).unwrap();
            assert!(ok);
            assert_eq!(ss_enc.0, ss_dec.0);
        }

        run::<Kem512Params>(&seed);
        run::<Kem768Params>(&seed);
        run::<Kem1024Params>(&seed);
        run::<Kem1280Params>(&seed);
    }

    #[test]
    fn tampered_ciphertext_rejects_implicitly() {
        let kem = MlKem768::new();
        let (ek, dk) = kem.key_gen_internal(&h(b"d"), &h(b"z"));
        let (ss, ct) = kem.encaps_internal(&ek, &h(b"m")).unwrap();

        for position in [0usize, 1, 15, 31] {
            let mut bad = ct.clone();
            bad[position] ^= 0x01;
            let (ss_bad, ok) = kem.decaps(&dk, &bad).unwrap();
            assert!(!ok);
            assert_ne!(ss.0, ss_bad.0, "rejection key must differ");
        }

        // Two different tampered ciphertexts give unrelated rejection keys.
        let mut bad1 = ct.clone();
        bad1[0] ^= 0x01;
        let mut bad2 = ct.clone();
        bad2[0] ^= 0x02;
        let (k1, _) = kem.decaps(&dk, &bad1).unwrap();
        let (k2, _) = kem.decaps(&dk, &bad2).unwrap();
        assert_ne!(k1.0, k2.0);
    }

    #[test]
    fn length_contracts() {
        let kem = MlKem512::new();
        let (ek, dk) = kem.key_gen_internal(&h(b"d"), &h(b"z"));
        let (_, ct) = kem.encaps_internal(&ek, &h(b"m")).unwrap();

        assert_eq!(
            kem.decaps(&dk, &ct[..ct.len() - 1]).unwrap_err(),
            Error::InvalidLength
        );
        let wrong_ek = KemEncapsKey(vec![0u8; 17]);
        assert_eq!(
            kem.encaps_internal(&wrong_ek, &h(b"m")).unwrap_err(),
            Error::InvalidLength
        );
    }
}
