//! The Keccak-p[1600] permutation and the sponge construction built on it.
//!
//! Two round counts are used by this crate: the full 24-round permutation
//! behind SHA-3, SHAKE, cSHAKE and KMAC, and the reduced 12-round
//! permutation behind the KMAC-R12 authentication option. The reduced
//! variant applies the *last* twelve round constants, the same window
//! KangarooTwelve uses.

use zeroize::Zeroize;

use crate::endian::{le_to_u64_lanes, u64_lanes_to_le};

/// Width of the permutation state in bytes.
pub const STATE_SIZE: usize = 200;

/// Sponge rate for 128-bit-strength constructions (SHAKE-128, KMAC-128).
pub const RATE_128: usize = 168;
/// Sponge rate for 256-bit-strength constructions (SHA3-256, SHAKE-256, KMAC-256).
pub const RATE_256: usize = 136;
/// Sponge rate for SHA3-384.
pub const RATE_384: usize = 104;
/// Sponge rate for 512-bit-strength constructions (SHA3-512, SHAKE-512, KMAC-512).
pub const RATE_512: usize = 72;

/// Domain-separation byte for the fixed-output SHA-3 digests.
pub const DOMAIN_SHA3: u8 = 0x06;
/// Domain-separation byte for the SHAKE XOFs.
pub const DOMAIN_SHAKE: u8 = 0x1F;
/// Domain-separation byte for cSHAKE and everything derived from it.
pub const DOMAIN_CSHAKE: u8 = 0x04;

const ROUND_CONSTANTS: [u64; 24] = [
    0x0000000000000001,
    0x0000000000008082,
    0x800000000000808A,
    0x8000000080008000,
    0x000000000000808B,
    0x0000000080000001,
    0x8000000080008081,
    0x8000000000008009,
    0x000000000000008A,
    0x0000000000000088,
    0x0000000080008009,
    0x000000008000000A,
    0x000000008000808B,
    0x800000000000008B,
    0x8000000000008089,
    0x8000000000008003,
    0x8000000000008002,
    0x8000000000000080,
    0x000000000000800A,
    0x800000008000000A,
    0x8000000080008081,
    0x8000000000008080,
    0x0000000080000001,
    0x8000000080008008,
];

/// Lane rotation offsets, indexed `x + 5*y`.
const ROTATION: [u32; 25] = [
    0, 1, 62, 28, 27, //
    36, 44, 6, 55, 20, //
    3, 10, 43, 25, 39, //
    41, 45, 15, 21, 8, //
    18, 2, 61, 56, 14,
];

/// Applies Keccak-p[1600, ROUNDS] in place.
///
/// `ROUNDS` must be at most 24; the permutation runs the last `ROUNDS`
/// entries of the round-constant table.
pub fn permute<const ROUNDS: usize>(lanes: &mut [u64; 25]) {
    for &rc in &ROUND_CONSTANTS[24 - ROUNDS..] {
        // theta
        let mut c = [0u64; 5];
        for x in 0..5 {
            c[x] = lanes[x] ^ lanes[x + 5] ^ lanes[x + 10] ^ lanes[x + 15] ^ lanes[x + 20];
        }
        let mut d = [0u64; 5];
        for x in 0..5 {
            d[x] = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);
        }
        for (i, lane) in lanes.iter_mut().enumerate() {
            *lane ^= d[i % 5];
        }

        // rho and pi
        let mut b = [0u64; 25];
        for x in 0..5 {
            for y in 0..5 {
                let i = x + 5 * y;
                b[y + 5 * ((2 * x + 3 * y) % 5)] = lanes[i].rotate_left(ROTATION[i]);
            }
        }

        // chi
        for y in 0..5 {
            for x in 0..5 {
                lanes[x + 5 * y] =
                    b[x + 5 * y] ^ (!b[(x + 1) % 5 + 5 * y] & b[(x + 2) % 5 + 5 * y]);
            }
        }

        // iota
        lanes[0] ^= rc;
    }
}

/// A Keccak sponge with a fixed byte rate and round count.
///
/// The lifecycle is `absorb*` → `finalize(domain)` → `squeeze*`; `position`
/// stays below the rate between calls. States created for keyed use are
/// zeroed on drop by their owners.
#[derive(Clone, Debug)]
pub struct Sponge<const RATE: usize, const ROUNDS: usize> {
    lanes: [u64; 25],
    position: usize,
}

impl<const RATE: usize, const ROUNDS: usize> Default for Sponge<RATE, ROUNDS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const RATE: usize, const ROUNDS: usize> Sponge<RATE, ROUNDS> {
    pub fn new() -> Self {
        Sponge {
            lanes: [0u64; 25],
            position: 0,
        }
    }

    #[inline]
    fn xor_byte(&mut self, index: usize, value: u8) {
        self.lanes[index / 8] ^= (value as u64) << ((index % 8) * 8);
    }

    #[inline]
    fn read_byte(&self, index: usize) -> u8 {
        (self.lanes[index / 8] >> ((index % 8) * 8)) as u8
    }

    /// Absorbs `input`, permuting after every full rate block.
    pub fn absorb(&mut self, input: &[u8]) {
        for &byte in input {
            self.xor_byte(self.position, byte);
            self.position += 1;
            if self.position == RATE {
                permute::<ROUNDS>(&mut self.lanes);
                self.position = 0;
            }
        }
    }

    /// Pads the current block with `domain .. 0x80` and permutes once,
    /// leaving the sponge ready to squeeze.
    pub fn finalize(&mut self, domain: u8) {
        self.xor_byte(self.position, domain);
        self.xor_byte(RATE - 1, 0x80);
        permute::<ROUNDS>(&mut self.lanes);
        self.position = 0;
    }

    /// Squeezes `output.len()` bytes, permuting between rate blocks.
    /// May be called repeatedly for streaming output.
    pub fn squeeze(&mut self, output: &mut [u8]) {
        for byte in output.iter_mut() {
            if self.position == RATE {
                permute::<ROUNDS>(&mut self.lanes);
                self.position = 0;
            }
            *byte = self.read_byte(self.position);
            self.position += 1;
        }
    }

    /// Raw state access for byte-exact imports (test support).
    pub fn state_bytes(&self) -> [u8; STATE_SIZE] {
        let mut out = [0u8; STATE_SIZE];
        u64_lanes_to_le(&self.lanes, &mut out);
        out
    }

    /// Loads the full 200-byte state (test support).
    pub fn load_state(&mut self, bytes: &[u8; STATE_SIZE]) {
        le_to_u64_lanes(bytes, &mut self.lanes);
        self.position = 0;
    }
}

impl<const RATE: usize, const ROUNDS: usize> Zeroize for Sponge<RATE, ROUNDS> {
    fn zeroize(&mut self) {
        self.lanes.zeroize();
        self.position = 0;
    }
}
