//! The Poly1305 one-time authenticator over GF(2^130 − 5).
//!
//! The accumulator is held in five 26-bit limbs; each 16-byte block gains
//! the 2^128 marker bit (0x01 appended for short final blocks) and is
//! folded in as `acc = (acc + block) · r mod p`, with `r` clamped at key
//! load. The final tag is `acc + s mod 2^128`.
//!
//! The key is single-use; authenticating two messages under one key
//! forfeits all security.

use byteorder::{ByteOrder, LittleEndian};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Authenticator block size in bytes.
pub const BLOCK_SIZE: usize = 16;
/// Key size in bytes (r ‖ s).
pub const KEY_SIZE: usize = 32;
/// Tag size in bytes.
pub const TAG_SIZE: usize = 16;

const MASK26: u32 = 0x03FF_FFFF;

/// Streaming Poly1305 state.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Poly1305 {
    r: [u32; 5],
    s: [u32; 4],
    h: [u32; 5],
    buffer: [u8; BLOCK_SIZE],
    position: usize,
}

impl Poly1305 {
    /// Loads and clamps the 32-byte one-time key.
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        let r = [
            LittleEndian::read_u32(&key[0..4]) & 0x03FF_FFFF,
            (LittleEndian::read_u32(&key[3..7]) >> 2) & 0x03FF_FF03,
            (LittleEndian::read_u32(&key[6..10]) >> 4) & 0x03FF_C0FF,
            (LittleEndian::read_u32(&key[9..13]) >> 6) & 0x03F0_3FFF,
            (LittleEndian::read_u32(&key[12..16]) >> 8) & 0x000F_FFFF,
        ];
        let s = [
            LittleEndian::read_u32(&key[16..20]),
            LittleEndian::read_u32(&key[20..24]),
            LittleEndian::read_u32(&key[24..28]),
            LittleEndian::read_u32(&key[28..32]),
        ];
        Self {
            r,
            s,
            h: [0u32; 5],
            buffer: [0u8; BLOCK_SIZE],
            position: 0,
        }
    }

    fn process_block(&mut self, block: &[u8; BLOCK_SIZE], hibit: u32) {
        let [r0, r1, r2, r3, r4] = self.r;
        let s1 = r1 * 5;
        let s2 = r2 * 5;
        let s3 = r3 * 5;
        let s4 = r4 * 5;

        let h0 = (self.h[0] + (LittleEndian::read_u32(&block[0..4]) & MASK26)) as u64;
        let h1 = (self.h[1] + ((LittleEndian::read_u32(&block[3..7]) >> 2) & MASK26)) as u64;
        let h2 = (self.h[2] + ((LittleEndian::read_u32(&block[6..10]) >> 4) & MASK26)) as u64;
        let h3 = (self.h[3] + ((LittleEndian::read_u32(&block[9..13]) >> 6) & MASK26)) as u64;
        let h4 = (self.h[4] + ((LittleEndian::read_u32(&block[12..16]) >> 8) | hibit)) as u64;

        let d0 = h0 * r0 as u64 + h1 * s4 as u64 + h2 * s3 as u64 + h3 * s2 as u64 + h4 * s1 as u64;
        let d1 = h0 * r1 as u64 + h1 * r0 as u64 + h2 * s4 as u64 + h3 * s3 as u64 + h4 * s2 as u64;
        let d2 = h0 * r2 as u64 + h1 * r1 as u64 + h2 * r0 as u64 + h3 * s4 as u64 + h4 * s3 as u64;
        let d3 = h0 * r3 as u64 + h1 * r2 as u64 + h2 * r1 as u64 + h3 * r0 as u64 + h4 * s4 as u64;
        let d4 = h0 * r4 as u64 + h1 * r3 as u64 + h2 * r2 as u64 + h3 * r1 as u64 + h4 * r0 as u64;

        let mut carry = d0 >> 26;
        let mut h = [0u32; 5];
        h[0] = (d0 as u32) & MASK26;
        let d1 = d1 + carry;
        carry = d1 >> 26;
        h[1] = (d1 as u32) & MASK26;
        let d2 = d2 + carry;
        carry = d2 >> 26;
        h[2] = (d2 as u32) & MASK26;
        let d3 = d3 + carry;
        carry = d3 >> 26;
        h[3] = (d3 as u32) & MASK26;
        let d4 = d4 + carry;
        carry = d4 >> 26;
        h[4] = (d4 as u32) & MASK26;
        h[0] += (carry as u32) * 5;
        let carry = h[0] >> 26;
        h[0] &= MASK26;
        h[1] += carry;

        self.h = h;
    }

    /// Absorbs message bytes.
    pub fn update(&mut self, mut data: &[u8]) {
        if self.position > 0 {
            let take = (BLOCK_SIZE - self.position).min(data.len());
            self.buffer[self.position..self.position + take].copy_from_slice(&data[..take]);
            self.position += take;
            data = &data[take..];
            if self.position == BLOCK_SIZE {
                let block = self.buffer;
                self.process_block(&block, 1 << 24);
                self.position = 0;
            }
        }
        while data.len() >= BLOCK_SIZE {
            let block: [u8; BLOCK_SIZE] = data[..BLOCK_SIZE].try_into().unwrap();
            self.process_block(&block, 1 << 24);
            data = &data[BLOCK_SIZE..];
        }
        self.buffer[..data.len()].copy_from_slice(data);
        self.position = data.len();
    }

    /// Produces the 16-byte tag and consumes the state.
    pub fn finalize(mut self) -> [u8; TAG_SIZE] {
        if self.position > 0 {
            let mut block = [0u8; BLOCK_SIZE];
            block[..self.position].copy_from_slice(&self.buffer[..self.position]);
            block[self.position] = 0x01;
            self.process_block(&block, 0);
        }

        let mut h = self.h;
        let mut carry = h[1] >> 26;
        h[1] &= MASK26;
        h[2] += carry;
        carry = h[2] >> 26;
        h[2] &= MASK26;
        h[3] += carry;
        carry = h[3] >> 26;
        h[3] &= MASK26;
        h[4] += carry;
        carry = h[4] >> 26;
        h[4] &= MASK26;
        h[0] += carry * 5;
        carry = h[0] >> 26;
        h[0] &= MASK26;
        h[1] += carry;

        // Compare against p by computing h + 5 - 2^130.
        let mut g = [0u32; 5];
        g[0] = h[0].wrapping_add(5);
        carry = g[0] >> 26;
        g[0] &= MASK26;
        for i in 1..4 {
            g[i] = h[i].wrapping_add(carry);
            carry = g[i] >> 26;
            g[i] &= MASK26;
        }
        g[4] = h[4].wrapping_add(carry).wrapping_sub(1 << 26);

        // Select h or g without branching on the comparison result.
        let mask = (g[4] >> 31).wrapping_sub(1);
        for i in 0..5 {
            h[i] = (h[i] & !mask) | (g[i] & mask);
        }

        // Repack the 130-bit value into four 32-bit words.
        let w0 = h[0] | (h[1] << 26);
        let w1 = (h[1] >> 6) | (h[2] << 20);
        let w2 = (h[2] >> 12) | (h[3] << 14);
        let w3 = (h[3] >> 18) | (h[4] << 8);

        // Add s modulo 2^128.
        let mut tag = [0u8; TAG_SIZE];
        let mut f = w0 as u64 + self.s[0] as u64;
        LittleEndian::write_u32(&mut tag[0..4], f as u32);
        f = w1 as u64 + self.s[1] as u64 + (f >> 32);
        LittleEndian::write_u32(&mut tag[4..8], f as u32);
        f = w2 as u64 + self.s[2] as u64 + (f >> 32);
        LittleEndian::write_u32(&mut tag[8..12], f as u32);
        f = w3 as u64 + self.s[3] as u64 + (f >> 32);
        LittleEndian::write_u32(&mut tag[12..16], f as u32);
        tag
    }

    /// One-shot MAC computation.
    pub fn mac(key: &[u8; KEY_SIZE], message: &[u8]) -> [u8; TAG_SIZE] {
        let mut state = Self::new(key);
        state.update(message);
        state.finalize()
    }
}
