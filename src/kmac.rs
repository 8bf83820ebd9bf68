//! KMAC (SP800-185) and the reduced-round variants used by the RCS AEAD.
//!
//! KMAC is cSHAKE with the function name "KMAC", the key absorbed as a
//! `bytepad(encode_string(K), rate)` prefix and the requested output length
//! appended as a `right_encode` frame before squeezing. Requesting length
//! zero selects the arbitrary-length XOF mode.
//!
//! `Kmac512` (rate 72) and the 12-round `Kmac256R12`/`Kmac512R12` are NOT
//! NIST-standardized; they are retained for interoperability with the
//! wide-block cipher tags that use them.

use zeroize::Zeroize;

use crate::keccak::{Sponge, DOMAIN_CSHAKE, RATE_128, RATE_256, RATE_512};
use crate::sha3::{bytepad, encode_string};

/// Incremental KMAC over a fixed rate and round count.
#[derive(Clone, Debug)]
pub struct KmacState<const RATE: usize, const ROUNDS: usize> {
    sponge: Sponge<RATE, ROUNDS>,
}

impl<const RATE: usize, const ROUNDS: usize> KmacState<RATE, ROUNDS> {
    /// Initializes the MAC with `key` and an optional customization string.
    pub fn new(key: &[u8], custom: &[u8]) -> Self {
        let mut sponge = Sponge::new();
        let mut frame = encode_string(b"KMAC");
        frame.extend_from_slice(&encode_string(custom));
        sponge.absorb(&bytepad(&frame, RATE));
        sponge.absorb(&bytepad(&encode_string(key), RATE));
        Self { sponge }
    }

    /// Absorbs message bytes.
    pub fn update(&mut self, data: &[u8]) {
        self.sponge.absorb(data);
    }

    /// Emits a tag of `tag.len()` bytes and consumes the state.
    pub fn finalize(mut self, tag: &mut [u8]) {
        self.sponge
            .absorb(&crate::sha3::right_encode((tag.len() as u64) * 8));
        self.sponge.finalize(DOMAIN_CSHAKE);
        self.sponge.squeeze(tag);
        self.sponge.zeroize();
    }

    /// Emits a tag without consuming the state; the running absorb state
    /// continues unchanged. Used where successive tags must chain over a
    /// growing transcript.
    pub fn finalize_cloned(&self, tag: &mut [u8]) {
        self.clone().finalize(tag);
    }

    /// Finalizes in XOF mode (`right_encode(0)`) for arbitrary-length
    /// keyed output.
    pub fn into_xof(mut self) -> KmacXof<RATE, ROUNDS> {
        self.sponge.absorb(&crate::sha3::right_encode(0));
        self.sponge.finalize(DOMAIN_CSHAKE);
        KmacXof {
            sponge: self.sponge,
        }
    }

    /// One-shot MAC computation.
    pub fn compute(key: &[u8], custom: &[u8], data: &[u8], tag: &mut [u8]) {
        let mut state = Self::new(key, custom);
        state.update(data);
        state.finalize(tag);
    }
}

impl<const RATE: usize, const ROUNDS: usize> Zeroize for KmacState<RATE, ROUNDS> {
    fn zeroize(&mut self) {
        self.sponge.zeroize();
    }
}

/// Squeezing half of a KMAC used in XOF mode.
pub struct KmacXof<const RATE: usize, const ROUNDS: usize> {
    sponge: Sponge<RATE, ROUNDS>,
}

impl<const RATE: usize, const ROUNDS: usize> KmacXof<RATE, ROUNDS> {
    pub fn squeeze(&mut self, output: &mut [u8]) {
        self.sponge.squeeze(output);
    }
}

impl<const RATE: usize, const ROUNDS: usize> Zeroize for KmacXof<RATE, ROUNDS> {
    fn zeroize(&mut self) {
        self.sponge.zeroize();
    }
}

/// KMAC-128 (SP800-185).
pub type Kmac128 = KmacState<RATE_128, 24>;
/// KMAC-256 (SP800-185).
pub type Kmac256 = KmacState<RATE_256, 24>;
/// KMAC over the 512-bit-strength rate. Non-standard.
pub type Kmac512 = KmacState<RATE_512, 24>;
/// 12-round KMAC at the 256-bit rate. Non-standard; RCS interop only.
pub type Kmac256R12 = KmacState<RATE_256, 12>;
/// 12-round KMAC at the 512-bit rate. Non-standard; RCS interop only.
pub type Kmac512R12 = KmacState<RATE_512, 12>;
