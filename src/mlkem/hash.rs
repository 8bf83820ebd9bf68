//! The symmetric functions of the KEM, named after the FIPS 203 symbols.

use crate::sha3::{Sha3_256, Sha3_512, Shake128, Shake256};

use super::params::SYM_BYTES;

/// H : B* → B^32 (SHA3-256).
pub fn h(data: &[u8]) -> [u8; SYM_BYTES] {
    Sha3_256::digest(data)
}

/// G : B* → B^32 × B^32 (SHA3-512 split in halves).
pub fn g(data: &[u8]) -> ([u8; SYM_BYTES], [u8; SYM_BYTES]) {
    let digest = Sha3_512::digest(data);
    let mut a = [0u8; SYM_BYTES];
    let mut b = [0u8; SYM_BYTES];
    a.copy_from_slice(&digest[..SYM_BYTES]);
    b.copy_from_slice(&digest[SYM_BYTES..]);
    (a, b)
}

/// The final key-derivation function of the FO transform (SHAKE-256).
pub fn kdf(data: &[u8]) -> [u8; SYM_BYTES] {
    let mut out = [0u8; SYM_BYTES];
    Shake256::xof(data, &mut out);
    out
}

/// PRF : B^32 × B → B^(64·η) (SHAKE-256 of seed ‖ nonce).
pub fn prf(eta: usize, seed: &[u8; SYM_BYTES], nonce: u8) -> Vec<u8> {
    let mut xof = Shake256::new();
    xof.absorb(seed);
    xof.absorb(&[nonce]);
    let mut out = vec![0u8; 64 * eta];
    xof.squeeze(&mut out);
    out
}

/// XOF : B^32 × B × B → XOF stream (SHAKE-128 of ρ ‖ i ‖ j); drives the
/// rejection sampler for the matrix A.
pub fn xof(rho: &[u8; SYM_BYTES], i: u8, j: u8) -> Shake128 {
    let mut state = Shake128::new();
    state.absorb(rho);
    state.absorb(&[i, j]);
    state
}
