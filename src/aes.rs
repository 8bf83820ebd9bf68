//! AES (FIPS 197) with the extended RHX key schedules, the ECB/CBC/CTR
//! block modes and PKCS#7 padding.
//!
//! Encryption runs over four T-tables combining SubBytes with MixColumns;
//! the tables are derived from the S-box at compile time. Decryption uses
//! the plain inverse rounds. The RHX variants replace the FIPS 197 key
//! expansion with a cSHAKE (default) or HKDF (`hkdf-expansion` feature)
//! expansion of the user key and an optional info string, producing the
//! full round-key array directly.

use byteorder::{BigEndian, ByteOrder};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::endian::be_increment;
use crate::errors::Error;
#[cfg(feature = "hkdf-expansion")]
use crate::hmac::{hkdf256_expand, hkdf256_extract, hkdf512_expand, hkdf512_extract};
#[cfg(not(feature = "hkdf-expansion"))]
use crate::sha3::{CShake256, CShake512};

/// The cipher block size in bytes.
pub const BLOCK_SIZE: usize = 16;

pub(crate) const SBOX: [u8; 256] = [
    0x63, 0x7C, 0x77, 0x7B, 0xF2, 0x6B, 0x6F, 0xC5, 0x30, 0x01, 0x67, 0x2B, 0xFE, 0xD7, 0xAB, 0x76,
    0xCA, 0x82, 0xC9, 0x7D, 0xFA, 0x59, 0x47, 0xF0, 0xAD, 0xD4, 0xA2, 0xAF, 0x9C, 0xA4, 0x72, 0xC0,
    0xB7, 0xFD, 0x93, 0x26, 0x36, 0x3F, 0xF7, 0xCC, 0x34, 0xA5, 0xE5, 0xF1, 0x71, 0xD8, 0x31, 0x15,
    0x04, 0xC7, 0x23, 0xC3, 0x18, 0x96, 0x05, 0x9A, 0x07, 0x12, 0x80, 0xE2, 0xEB, 0x27, 0xB2, 0x75,
    0x09, 0x83, 0x2C, 0x1A, 0x1B, 0x6E, 0x5A, 0xA0, 0x52, 0x3B, 0xD6, 0xB3, 0x29, 0xE3, 0x2F, 0x84,
    0x53, 0xD1, 0x00, 0xED, 0x20, 0xFC, 0xB1, 0x5B, 0x6A, 0xCB, 0xBE, 0x39, 0x4A, 0x4C, 0x58, 0xCF,
    0xD0, 0xEF, 0xAA, 0xFB, 0x43, 0x4D, 0x33, 0x85, 0x45, 0xF9, 0x02, 0x7F, 0x50, 0x3C, 0x9F, 0xA8,
    0x51, 0xA3, 0x40, 0x8F, 0x92, 0x9D, 0x38, 0xF5, 0xBC, 0xB6, 0xDA, 0x21, 0x10, 0xFF, 0xF3, 0xD2,
    0xCD, 0x0C, 0x13, 0xEC, 0x5F, 0x97, 0x44, 0x17, 0xC4, 0xA7, 0x7E, 0x3D, 0x64, 0x5D, 0x19, 0x73,
    0x60, 0x81, 0x4F, 0xDC, 0x22, 0x2A, 0x90, 0x88, 0x46, 0xEE, 0xB8, 0x14, 0xDE, 0x5E, 0x0B, 0xDB,
    0xE0, 0x32, 0x3A, 0x0A, 0x49, 0x06, 0x24, 0x5C, 0xC2, 0xD3, 0xAC, 0x62, 0x91, 0x95, 0xE4, 0x79,
    0xE7, 0xC8, 0x37, 0x6D, 0x8D, 0xD5, 0x4E, 0xA9, 0x6C, 0x56, 0xF4, 0xEA, 0x65, 0x7A, 0xAE, 0x08,
    0xBA, 0x78, 0x25, 0x2E, 0x1C, 0xA6, 0xB4, 0xC6, 0xE8, 0xDD, 0x74, 0x1F, 0x4B, 0xBD, 0x8B, 0x8A,
    0x70, 0x3E, 0xB5, 0x66, 0x48, 0x03, 0xF6, 0x0E, 0x61, 0x35, 0x57, 0xB9, 0x86, 0xC1, 0x1D, 0x9E,
    0xE1, 0xF8, 0x98, 0x11, 0x69, 0xD9, 0x8E, 0x94, 0x9B, 0x1E, 0x87, 0xE9, 0xCE, 0x55, 0x28, 0xDF,
    0x8C, 0xA1, 0x89, 0x0D, 0xBF, 0xE6, 0x42, 0x68, 0x41, 0x99, 0x2D, 0x0F, 0xB0, 0x54, 0xBB, 0x16,
];

pub(crate) const fn xtime(x: u8) -> u8 {
    (x << 1) ^ (((x >> 7) & 1) * 0x1B)
}

const fn build_inv_sbox() -> [u8; 256] {
    let mut inv = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        inv[SBOX[i] as usize] = i as u8;
        i += 1;
    }
    inv
}

const INV_SBOX: [u8; 256] = build_inv_sbox();

const fn build_tables() -> [[u32; 256]; 4] {
    let mut t = [[0u32; 256]; 4];
    let mut i = 0;
    while i < 256 {
        let s = SBOX[i] as u32;
        let s2 = xtime(SBOX[i]) as u32;
        let s3 = s2 ^ s;
        let w = (s2 << 24) | (s << 16) | (s << 8) | s3;
        t[0][i] = w;
        t[1][i] = w.rotate_right(8);
        t[2][i] = w.rotate_right(16);
        t[3][i] = w.rotate_right(24);
        i += 1;
    }
    t
}

/// SubBytes ⊕ MixColumns lookup tables (T0..T3).
const TE: [[u32; 256]; 4] = build_tables();

const RCON: [u8; 10] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1B, 0x36];

/// Cipher variant selecting the key schedule and round count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AesVariant {
    /// FIPS 197 AES-128: 16-byte key, 10 rounds, 44 schedule words.
    Aes128,
    /// FIPS 197 AES-256: 32-byte key, 14 rounds, 60 schedule words.
    Aes256,
    /// Extended cipher: 32-byte key, 29 rounds, 120 schedule words
    /// produced by cSHAKE-256 (or HKDF-SHA2-256).
    Rhx256,
    /// Extended cipher: 64-byte key, 59 rounds, 240 schedule words
    /// produced by cSHAKE-512 (or HKDF-SHA2-512).
    Rhx512,
}

impl AesVariant {
    /// Key length in bytes.
    pub const fn key_size(self) -> usize {
        match self {
            AesVariant::Aes128 => 16,
            AesVariant::Aes256 | AesVariant::Rhx256 => 32,
            AesVariant::Rhx512 => 64,
        }
    }

    /// Number of cipher rounds.
    pub const fn rounds(self) -> usize {
        match self {
            AesVariant::Aes128 => 10,
            AesVariant::Aes256 => 14,
            AesVariant::Rhx256 => 29,
            AesVariant::Rhx512 => 59,
        }
    }

    /// Length of the 32-bit round-key schedule.
    pub const fn schedule_words(self) -> usize {
        (self.rounds() + 1) * 4
    }
}

/// An initialized block cipher: the expanded round-key schedule.
///
/// The schedule is produced once by [`Aes::new`], consumed by the block
/// transforms and zeroed on drop.
#[derive(Debug, Zeroize, ZeroizeOnDrop)]
pub struct Aes {
    round_keys: Vec<u32>,
    #[zeroize(skip)]
    rounds: usize,
}

impl Aes {
    /// Expands `key` for `variant`. `info` feeds the extended schedules as
    /// the cSHAKE customization (or HKDF info) string and is ignored by the
    /// FIPS variants.
    pub fn new(variant: AesVariant, key: &[u8], info: &[u8]) -> Result<Self, Error> {
        if key.len() != variant.key_size() {
            return Err(Error::InvalidKeySize);
        }
        let round_keys = match variant {
            AesVariant::Aes128 | AesVariant::Aes256 => Self::expand_fips(key, variant),
            AesVariant::Rhx256 | AesVariant::Rhx512 => Self::expand_extended(key, info, variant),
        };
        Ok(Self {
            round_keys,
            rounds: variant.rounds(),
        })
    }

    /// FIPS 197 rotword/subword/Rcon chain.
    fn expand_fips(key: &[u8], variant: AesVariant) -> Vec<u32> {
        let nk = key.len() / 4;
        let words = variant.schedule_words();
        let mut rk = Vec::with_capacity(words);
        for chunk in key.chunks(4) {
            rk.push(BigEndian::read_u32(chunk));
        }
        for i in nk..words {
            let mut temp = rk[i - 1];
            if i % nk == 0 {
                temp = sub_word(temp.rotate_left(8)) ^ ((RCON[i / nk - 1] as u32) << 24);
            } else if nk == 8 && i % nk == 4 {
                temp = sub_word(temp);
            }
            rk.push(rk[i - nk] ^ temp);
        }
        rk
    }

    /// Extended expansion: the whole schedule is keystream.
    fn expand_extended(key: &[u8], info: &[u8], variant: AesVariant) -> Vec<u32> {
        let words = variant.schedule_words();
        let mut raw = vec![0u8; words * 4];

        #[cfg(not(feature = "hkdf-expansion"))]
        {
            match variant {
                AesVariant::Rhx256 => {
                    let mut xof = CShake256::new(b"RHX-256", info);
                    xof.absorb(key);
                    xof.squeeze(&mut raw);
                    xof.zeroize();
                }
                _ => {
                    let mut xof = CShake512::new(b"RHX-512", info);
                    xof.absorb(key);
                    xof.squeeze(&mut raw);
                    xof.zeroize();
                }
            }
        }

        #[cfg(feature = "hkdf-expansion")]
        {
            match variant {
                AesVariant::Rhx256 => {
                    let mut prk = hkdf256_extract(b"RHX-256", key);
                    hkdf256_expand(&prk, info, &mut raw);
                    prk.zeroize();
                }
                _ => {
                    let mut prk = hkdf512_extract(b"RHX-512", key);
                    hkdf512_expand(&prk, info, &mut raw);
                    prk.zeroize();
                }
            }
        }

        let rk = raw.chunks(4).map(BigEndian::read_u32).collect();
        raw.zeroize();
        rk
    }

    /// Encrypts one 16-byte block in place.
    pub fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        let rk = &self.round_keys;
        let mut s = [0u32; 4];
        for i in 0..4 {
            s[i] = BigEndian::read_u32(&block[4 * i..]) ^ rk[i];
        }

        for round in 1..self.rounds {
            let mut t = [0u32; 4];
            for i in 0..4 {
                t[i] = TE[0][(s[i] >> 24) as usize]
                    ^ TE[1][((s[(i + 1) % 4] >> 16) & 0xFF) as usize]
                    ^ TE[2][((s[(i + 2) % 4] >> 8) & 0xFF) as usize]
                    ^ TE[3][(s[(i + 3) % 4] & 0xFF) as usize]
                    ^ rk[4 * round + i];
            }
            s = t;
        }

        let last = &rk[4 * self.rounds..];
        for i in 0..4 {
            let word = ((SBOX[(s[i] >> 24) as usize] as u32) << 24)
                | ((SBOX[((s[(i + 1) % 4] >> 16) & 0xFF) as usize] as u32) << 16)
                | ((SBOX[((s[(i + 2) % 4] >> 8) & 0xFF) as usize] as u32) << 8)
                | (SBOX[(s[(i + 3) % 4] & 0xFF) as usize] as u32);
            BigEndian::write_u32(&mut block[4 * i..4 * i + 4], word ^ last[i]);
        }
    }

    /// Decrypts one 16-byte block in place.
    pub fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        self.add_round_key(block, self.rounds);
        for round in (1..self.rounds).rev() {
            inv_shift_rows(block);
            inv_sub_bytes(block);
            self.add_round_key(block, round);
            inv_mix_columns(block);
        }
        inv_shift_rows(block);
        inv_sub_bytes(block);
        self.add_round_key(block, 0);
    }

    fn add_round_key(&self, block: &mut [u8; BLOCK_SIZE], round: usize) {
        for c in 0..4 {
            let word = self.round_keys[4 * round + c];
            for r in 0..4 {
                block[4 * c + r] ^= (word >> (24 - 8 * r)) as u8;
            }
        }
    }

    /// ECB encryption of whole blocks. Test and key-wrap use only.
    pub fn ecb_encrypt(&self, output: &mut [u8], input: &[u8]) -> Result<(), Error> {
        transform_blocks(output, input, |b| self.encrypt_block(b))
    }

    /// ECB decryption of whole blocks.
    pub fn ecb_decrypt(&self, output: &mut [u8], input: &[u8]) -> Result<(), Error> {
        transform_blocks(output, input, |b| self.decrypt_block(b))
    }

    /// CBC encryption. `iv` is the running chain value, mutated in place.
    /// Input must be a multiple of the block size (see [`pkcs7_pad`]).
    pub fn cbc_encrypt(
        &self,
        iv: &mut [u8; BLOCK_SIZE],
        output: &mut [u8],
        input: &[u8],
    ) -> Result<(), Error> {
        if input.len() % BLOCK_SIZE != 0 || output.len() < input.len() {
            return Err(Error::InvalidLength);
        }
        let mut chain = *iv;
        for (pt, ct) in input
            .chunks_exact(BLOCK_SIZE)
            .zip(output.chunks_exact_mut(BLOCK_SIZE))
        {
            let mut block = [0u8; BLOCK_SIZE];
            for i in 0..BLOCK_SIZE {
                block[i] = pt[i] ^ chain[i];
            }
            self.encrypt_block(&mut block);
            ct.copy_from_slice(&block);
            chain = block;
        }
        *iv = chain;
        Ok(())
    }

    /// CBC decryption; the inverse of [`Aes::cbc_encrypt`].
    pub fn cbc_decrypt(
        &self,
        iv: &mut [u8; BLOCK_SIZE],
        output: &mut [u8],
        input: &[u8],
    ) -> Result<(), Error> {
        if input.len() % BLOCK_SIZE != 0 || output.len() < input.len() {
            return Err(Error::InvalidLength);
        }
        let mut chain = *iv;
        for (ct, pt) in input
            .chunks_exact(BLOCK_SIZE)
            .zip(output.chunks_exact_mut(BLOCK_SIZE))
        {
            let mut block: [u8; BLOCK_SIZE] = ct.try_into().unwrap();
            self.decrypt_block(&mut block);
            for i in 0..BLOCK_SIZE {
                pt[i] = block[i] ^ chain[i];
            }
            chain.copy_from_slice(ct);
        }
        *iv = chain;
        Ok(())
    }

    /// CTR keystream transform with a big-endian 128-bit counter; handles
    /// both directions and arbitrary lengths. The counter is left at the
    /// next unused block so the call may be repeated on a stream.
    pub fn ctr_transform(
        &self,
        counter: &mut [u8; BLOCK_SIZE],
        output: &mut [u8],
        input: &[u8],
    ) -> Result<(), Error> {
        if output.len() < input.len() {
            return Err(Error::InvalidLength);
        }
        for (pt, ct) in input
            .chunks(BLOCK_SIZE)
            .zip(output.chunks_mut(BLOCK_SIZE))
        {
            let mut keystream = *counter;
            self.encrypt_block(&mut keystream);
            for i in 0..pt.len() {
                ct[i] = pt[i] ^ keystream[i];
            }
            be_increment(counter);
        }
        Ok(())
    }
}

fn transform_blocks<F: FnMut(&mut [u8; BLOCK_SIZE])>(
    output: &mut [u8],
    input: &[u8],
    mut f: F,
) -> Result<(), Error> {
    if input.len() % BLOCK_SIZE != 0 || output.len() < input.len() {
        return Err(Error::InvalidLength);
    }
    for (inp, out) in input
        .chunks_exact(BLOCK_SIZE)
        .zip(output.chunks_exact_mut(BLOCK_SIZE))
    {
        let mut block: [u8; BLOCK_SIZE] = inp.try_into().unwrap();
        f(&mut block);
        out.copy_from_slice(&block);
    }
    Ok(())
}

fn sub_word(w: u32) -> u32 {
    ((SBOX[(w >> 24) as usize] as u32) << 24)
        | ((SBOX[((w >> 16) & 0xFF) as usize] as u32) << 16)
        | ((SBOX[((w >> 8) & 0xFF) as usize] as u32) << 8)
        | (SBOX[(w & 0xFF) as usize] as u32)
}

fn inv_sub_bytes(block: &mut [u8; BLOCK_SIZE]) {
    for b in block.iter_mut() {
        *b = INV_SBOX[*b as usize];
    }
}

fn inv_shift_rows(block: &mut [u8; BLOCK_SIZE]) {
    let copy = *block;
    for r in 1..4 {
        for c in 0..4 {
            block[4 * c + r] = copy[4 * ((c + 4 - r) % 4) + r];
        }
    }
}

fn gmul(a: u8, b: u8) -> u8 {
    let mut p = 0u8;
    let mut a = a;
    for i in 0..8 {
        p ^= a & 0u8.wrapping_sub((b >> i) & 1);
        a = xtime(a);
    }
    p
}

fn inv_mix_columns(block: &mut [u8; BLOCK_SIZE]) {
    for c in 0..4 {
        let col = [
            block[4 * c],
            block[4 * c + 1],
            block[4 * c + 2],
            block[4 * c + 3],
        ];
        block[4 * c] = gmul(col[0], 14) ^ gmul(col[1], 11) ^ gmul(col[2], 13) ^ gmul(col[3], 9);
        block[4 * c + 1] = gmul(col[0], 9) ^ gmul(col[1], 14) ^ gmul(col[2], 11) ^ gmul(col[3], 13);
        block[4 * c + 2] = gmul(col[0], 13) ^ gmul(col[1], 9) ^ gmul(col[2], 14) ^ gmul(col[3], 11);
        block[4 * c + 3] = gmul(col[0], 11) ^ gmul(col[1], 13) ^ gmul(col[2], 9) ^ gmul(col[3], 14);
    }
}

/// PKCS#7: appends `k` copies of byte `k`, `k = block − (len mod block)`.
pub fn pkcs7_pad(data: &mut Vec<u8>) {
    let k = BLOCK_SIZE - (data.len() % BLOCK_SIZE);
    data.extend(std::iter::repeat(k as u8).take(k));
}

/// Returns the PKCS#7 padding length of the final block, or `None` when the
/// trailing bytes are not a valid pad.
///
/// An unpadded block ending in 0x01 is indistinguishable from a one-byte
/// pad; callers must track message length externally when PKCS#7 is used
/// alone.
pub fn pkcs7_padding_length(block: &[u8; BLOCK_SIZE]) -> Option<usize> {
    let k = block[BLOCK_SIZE - 1] as usize;
    if k == 0 || k > BLOCK_SIZE {
        return None;
    }
    if block[BLOCK_SIZE - k..].iter().all(|&b| b == k as u8) {
        Some(k)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher(variant: AesVariant, key: &str) -> Aes {
        Aes::new(variant, &hex::decode(key).unwrap(), &[]).unwrap()
    }

    // FIPS 197 appendix C and SP800-38A F.1 vectors.
    #[test]
    fn ecb_kats() {
        let aes = cipher(
            AesVariant::Aes128,
            "000102030405060708090a0b0c0d0e0f",
        );
        let mut block: [u8; 16] = hex::decode("00112233445566778899aabbccddeeff")
            .unwrap()
            .try_into()
            .unwrap();
        aes.encrypt_block(&mut block);
        assert_eq!(
            block.to_vec(),
            hex::decode("69c4e0d86a7b0430d8cdb78070b4c55a").unwrap()
        );
        aes.decrypt_block(&mut block);
        assert_eq!(
            block.to_vec(),
            hex::decode("00112233445566778899aabbccddeeff").unwrap()
        );

        let aes = cipher(
            AesVariant::Aes256,
            "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4",
        );
        let mut block: [u8; 16] = hex::decode("6bc1bee22e409f96e93d7e117393172a")
            .unwrap()
            .try_into()
            .unwrap();
        aes.encrypt_block(&mut block);
        assert_eq!(
            block.to_vec(),
            hex::decode("f3eed1bdb5d2a03c064b5a7e3db181f8").unwrap()
        );
    }

    // SP800-38A F.2.1 / F.2.5 first blocks.
    #[test]
    fn cbc_kats() {
        let pt = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let mut iv: [u8; 16] = hex::decode("000102030405060708090a0b0c0d0e0f")
            .unwrap()
            .try_into()
            .unwrap();
        let mut ct = [0u8; 16];

        let aes = cipher(AesVariant::Aes128, "2b7e151628aed2a6abf7158809cf4f3c");
        aes.cbc_encrypt(&mut iv, &mut ct, &pt).unwrap();
        assert_eq!(
            ct.to_vec(),
            hex::decode("7649abac8119b246cee98e9b12e9197d").unwrap()
        );

        let aes = cipher(
            AesVariant::Aes256,
            "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4",
        );
        let mut iv: [u8; 16] = hex::decode("000102030405060708090a0b0c0d0e0f")
            .unwrap()
            .try_into()
            .unwrap();
        aes.cbc_encrypt(&mut iv, &mut ct, &pt).unwrap();
        assert_eq!(
            ct.to_vec(),
            hex::decode("f58c4c04d6e5f1ba779eabfb5f7bfbd6").unwrap()
        );
    }

    // SP800-38A F.5.1 / F.5.5 first blocks.
    #[test]
    fn ctr_kats() {
        let pt = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let mut counter: [u8; 16] = hex::decode("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff")
            .unwrap()
            .try_into()
            .unwrap();
        let mut ct = [0u8; 16];

        let aes = cipher(AesVariant::Aes128, "2b7e151628aed2a6abf7158809cf4f3c");
        aes.ctr_transform(&mut counter, &mut ct, &pt).unwrap();
        assert_eq!(
            ct.to_vec(),
            hex::decode("874d6191b620e3261bef6864990db6ce").unwrap()
        );
        assert_eq!(counter[15], 0x00);
        assert_eq!(counter[14], 0xFF);

        let aes = cipher(
            AesVariant::Aes256,
            "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4",
        );
        let mut counter: [u8; 16] = hex::decode("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff")
            .unwrap()
            .try_into()
            .unwrap();
        aes.ctr_transform(&mut counter, &mut ct, &pt).unwrap();
        assert_eq!(
            ct.to_vec(),
            hex::decode("601ec313775789a5b7a7f504bbf3d228").unwrap()
        );
    }

    #[test]
    fn extended_variants_round_trip() {
        for (variant, key_len) in [(AesVariant::Rhx256, 32), (AesVariant::Rhx512, 64)] {
            let key = vec![0x2Au8; key_len];
            let aes = Aes::new(variant, &key, b"round trip info").unwrap();
            assert_eq!(aes.round_keys.len(), variant.schedule_words());

            let mut block = [0x5Au8; 16];
            let original = block;
            aes.encrypt_block(&mut block);
            assert_ne!(block, original);
            aes.decrypt_block(&mut block);
            assert_eq!(block, original);
        }
    }

    #[test]
    fn extended_schedule_separates_info() {
        let key = [7u8; 32];
        let a = Aes::new(AesVariant::Rhx256, &key, b"info-a").unwrap();
        let b = Aes::new(AesVariant::Rhx256, &key, b"info-b").unwrap();
        assert_ne!(a.round_keys, b.round_keys);
    }

    #[test]
    fn mode_round_trips() {
        let aes = cipher(
            AesVariant::Aes256,
            "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4",
        );
        let mut data = b"a message that is not block aligned".to_vec();
        pkcs7_pad(&mut data);
        assert_eq!(data.len() % BLOCK_SIZE, 0);

        let mut iv = [0x11u8; 16];
        let mut ct = vec![0u8; data.len()];
        aes.cbc_encrypt(&mut iv, &mut ct, &data).unwrap();

        let mut iv = [0x11u8; 16];
        let mut pt = vec![0u8; data.len()];
        aes.cbc_decrypt(&mut iv, &mut pt, &ct).unwrap();
        assert_eq!(pt, data);

        let last: [u8; 16] = pt[pt.len() - 16..].try_into().unwrap();
        let pad = pkcs7_padding_length(&last).unwrap();
        assert_eq!(&pt[..pt.len() - pad], b"a message that is not block aligned");
    }

    #[test]
    fn pkcs7_rejects_malformed() {
        let mut block = [4u8; 16];
        block[15] = 0;
        assert_eq!(pkcs7_padding_length(&block), None);
        block[15] = 17;
        assert_eq!(pkcs7_padding_length(&block), None);
        block[15] = 3;
        block[14] = 3;
        block[13] = 2;
        assert_eq!(pkcs7_padding_length(&block), None);
    }

    #[test]
    fn wrong_key_size_rejected() {
        assert_eq!(
            Aes::new(AesVariant::Aes128, &[0u8; 24], &[]).unwrap_err(),
            Error::InvalidKeySize
        );
    }
}
