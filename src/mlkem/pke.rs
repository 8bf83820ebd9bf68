//! The IND-CPA public-key encryption scheme underlying the KEM (K-PKE).

use std::marker::PhantomData;

use super::hash::{g, prf, xof};
use super::params::{KemParams, SYM_BYTES};
use super::poly::{Poly, PolyVec};

pub struct KPke<P: KemParams> {
    _marker: PhantomData<P>,
}

impl<P: KemParams> KPke<P> {
    /// Expands the public matrix A (or its transpose) from ρ by rejection
    /// sampling in the NTT domain: Â[i][j] ← SampleNTT(XOF(ρ ‖ j ‖ i)).
    fn gen_matrix(rho: &[u8; SYM_BYTES], transposed: bool) -> Vec<PolyVec> {
        let mut rows = Vec::with_capacity(P::K);
        for i in 0..P::K {
            let mut row = PolyVec::zero(P::K);
            for (j, slot) in row.polys.iter_mut().enumerate() {
                let mut stream = if transposed {
                    xof(rho, i as u8, j as u8)
                } else {
                    xof(rho, j as u8, i as u8)
                };
                *slot = Poly::sample_ntt(&mut stream);
            }
            rows.push(row);
        }
        rows
    }

    /// K-PKE.KeyGen(d): derive (ρ, σ) = G(d ‖ k), expand A, sample s and e
    /// with CBD_η1, and output ek = t̂ ‖ ρ, dk = ŝ with t = As + e.
    pub fn key_gen(d: &[u8; SYM_BYTES]) -> (Vec<u8>, Vec<u8>) {
        let mut seed = [0u8; SYM_BYTES + 1];
        seed[..SYM_BYTES].copy_from_slice(d);
        seed[SYM_BYTES] = P::K as u8;
        let (rho, sigma) = g(&seed);

        let a = Self::gen_matrix(&rho, false);

        let mut nonce = 0u8;
        let mut s = PolyVec::zero(P::K);
        for p in s.polys.iter_mut() {
            *p = Poly::sample_cbd(&prf(P::ETA1, &sigma, nonce), P::ETA1);
            nonce += 1;
        }
        let mut e = PolyVec::zero(P::K);
        for p in e.polys.iter_mut() {
            *p = Poly::sample_cbd(&prf(P::ETA1, &sigma, nonce), P::ETA1);
            nonce += 1;
        }

        s.ntt();
        e.ntt();

        let mut t = PolyVec::zero(P::K);
        for i in 0..P::K {
            let mut ti = PolyVec::basemul_acc_montgomery(&a[i], &s);
            ti.to_mont();
            ti.add_assign(&e.polys[i]);
            ti.reduce();
            t.polys[i] = ti;
        }

        let mut ek = Vec::with_capacity(P::INDCPA_PUBLICKEY_BYTES);
        t.to_bytes(&mut ek);
        ek.extend_from_slice(&rho);

        let mut dk = Vec::with_capacity(P::INDCPA_SECRETKEY_BYTES);
        s.to_bytes(&mut dk);

        (ek, dk)
    }

    /// K-PKE.Encrypt(ek, m, r): u = Aᵀr′ + e₁, v = tᵀr′ + e₂ + Decompress(m, 1);
    /// the ciphertext is Compress(u, d_u) ‖ Compress(v, d_v).
    pub fn encrypt(ek: &[u8], m: &[u8; SYM_BYTES], coins: &[u8; SYM_BYTES]) -> Vec<u8> {
        debug_assert_eq!(ek.len(), P::INDCPA_PUBLICKEY_BYTES);
        let t = PolyVec::from_bytes(&ek[..P::POLYVEC_BYTES]);
        let rho: [u8; SYM_BYTES] = ek[P::POLYVEC_BYTES..].try_into().unwrap();

        let at = Self::gen_matrix(&rho, true);

        let mut nonce = 0u8;
        let mut r = PolyVec::zero(P::K);
        for p in r.polys.iter_mut() {
            *p = Poly::sample_cbd(&prf(P::ETA1, coins, nonce), P::ETA1);
            nonce += 1;
        }
        let mut e1 = PolyVec::zero(P::K);
        for p in e1.polys.iter_mut() {
            *p = Poly::sample_cbd(&prf(super::params::ETA2, coins, nonce), super::params::ETA2);
            nonce += 1;
        }
        let e2 = Poly::sample_cbd(&prf(super::params::ETA2, coins, nonce), super::params::ETA2);

        r.ntt();

        let mut u = PolyVec::zero(P::K);
        for i in 0..P::K {
            let mut ui = PolyVec::basemul_acc_montgomery(&at[i], &r);
            ui.invntt_tomont();
            ui.add_assign(&e1.polys[i]);
            ui.reduce();
            u.polys[i] = ui;
        }

        let mut v = PolyVec::basemul_acc_montgomery(&t, &r);
        v.invntt_tomont();
        v.add_assign(&e2);
        v.add_assign(&Poly::from_msg(m));
        v.reduce();

        let mut ciphertext = Vec::with_capacity(P::CIPHERTEXT_BYTES);
        u.compress_to(P::DU, &mut ciphertext);
        v.compress_to(P::DV, &mut ciphertext);
        ciphertext
    }

    /// K-PKE.Decrypt(dk, c): m′ = Compress(v − sᵀu, 1).
    pub fn decrypt(dk: &[u8], c: &[u8]) -> [u8; SYM_BYTES] {
        debug_assert_eq!(dk.len(), P::INDCPA_SECRETKEY_BYTES);
        debug_assert_eq!(c.len(), P::CIPHERTEXT_BYTES);

        let mut u = PolyVec::decompress_from(&c[..P::CIPHERTEXT_U_BYTES], P::DU, P::K);
        let v = Poly::decompress_from(&c[P::CIPHERTEXT_U_BYTES..], P::DV);
        let s = PolyVec::from_bytes(dk);

        u.ntt();
        let mut w = PolyVec::basemul_acc_montgomery(&s, &u);
        w.invntt_tomont();
        w.sub_from(&v);
        w.reduce();
        w.to_msg()
    }
}
