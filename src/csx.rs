//! CSX-512: an authenticated wide ChaCha stream cipher extension.
//!
//! The working state is sixteen 64-bit words (constants, eight key words,
//! a 128-bit block counter and a 16-byte nonce), permuted by 40 rounds of
//! column/diagonal quarter-rounds; the quarter-round uses the 64-bit
//! rotation set popularized by BLAKE2b (32, 24, 16, 63). The cipher key
//! and, in authenticated modes, the MAC key are drawn from one cSHAKE-512
//! expansion of the user key and nonce, so CSX-512 follows the same keying
//! and framing discipline as the RCS cipher: each `transform` call is one
//! message, tags chain over the transcript, and decryption verifies the
//! tag in constant time before any plaintext is produced.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::ctutils;
use crate::endian::u64_to_le;
use crate::errors::Error;
use crate::kmac::{Kmac512, Kmac512R12};
use crate::sha3::CShake512;

/// Key size in bytes.
pub const CSX_KEY_SIZE: usize = 64;
/// Nonce size in bytes.
pub const CSX_NONCE_SIZE: usize = 16;
/// Keystream block size in bytes (16 × 64-bit words).
pub const CSX_BLOCK_SIZE: usize = 128;
/// MAC tag size in bytes (authenticated modes).
pub const CSX_MAC_SIZE: usize = 64;

const CSX_ROUNDS: usize = 40;

// "expand 64-byte k", twice: the widened analogue of the ChaCha sigma row.
const CSX_SIGMA: [u64; 4] = [
    0x3620_646E_6170_7865, // "expand 6" (LE)
    0x6B20_6574_7962_2D34, // "4-byte k"
    0x3620_646E_6170_7865,
    0x6B20_6574_7962_2D34,
];

/// Authentication selection. `None` instantiates no MAC state at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsxAuthMode {
    /// Unauthenticated stream.
    None,
    /// KMAC-512 over the standard 24-round permutation.
    Standard,
    /// The 12-round KMAC variant. Not NIST-standardized.
    Reduced,
}

/// Key material for [`Csx::initialize`].
pub struct CsxKeyParams<'a> {
    pub key: &'a [u8],
    pub nonce: &'a [u8],
    pub info: &'a [u8],
}

#[derive(Debug)]
enum CsxMac {
    Standard(Kmac512),
    Reduced(Kmac512R12),
}

impl CsxMac {
    fn update(&mut self, data: &[u8]) {
        match self {
            CsxMac::Standard(m) => m.update(data),
            CsxMac::Reduced(m) => m.update(data),
        }
    }

    fn chained_tag(&self, length_frame: &[u8], tag: &mut [u8]) {
        match self {
            CsxMac::Standard(m) => {
                let mut framed = m.clone();
                framed.update(length_frame);
                framed.finalize(tag);
            }
            CsxMac::Reduced(m) => {
                let mut framed = m.clone();
                framed.update(length_frame);
                framed.finalize(tag);
            }
        }
    }
}

impl Zeroize for CsxMac {
    fn zeroize(&mut self) {
        match self {
            CsxMac::Standard(m) => m.zeroize(),
            CsxMac::Reduced(m) => m.zeroize(),
        }
    }
}

#[inline]
fn quarter_round(state: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] = (state[d] ^ state[a]).rotate_left(32);
    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_left(24);
    state[a] = state[a].wrapping_add(state[b]);
    state[d] = (state[d] ^ state[a]).rotate_left(16);
    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_left(63);
}

/// An initialized CSX-512 stream state.
#[derive(Debug)]
pub struct Csx {
    state: [u64; 16],
    mac: Option<CsxMac>,
    pending_ad: Vec<u8>,
    start_nonce: [u8; CSX_NONCE_SIZE],
    nonce_bound: bool,
    encrypt: bool,
}

impl Csx {
    /// Expands `key ‖ nonce` through cSHAKE-512 into the stream key and,
    /// in authenticated modes, the MAC key. The counter starts at zero.
    pub fn initialize(
        params: &CsxKeyParams<'_>,
        encrypt: bool,
        auth: CsxAuthMode,
    ) -> Result<Self, Error> {
        if params.key.len() != CSX_KEY_SIZE {
            return Err(Error::InvalidKeySize);
        }
        if params.nonce.len() != CSX_NONCE_SIZE {
            return Err(Error::InvalidNonceSize);
        }

        let mac_key_len = if auth == CsxAuthMode::None {
            0
        } else {
            CSX_MAC_SIZE
        };
        let mut expansion = vec![0u8; CSX_KEY_SIZE + mac_key_len];
        let mut xof = CShake512::new(b"CSX-512", params.info);
        xof.absorb(params.key);
        xof.absorb(params.nonce);
        xof.squeeze(&mut expansion);
        xof.zeroize();

        let mut state = [0u64; 16];
        state[..4].copy_from_slice(&CSX_SIGMA);
        for i in 0..8 {
            state[4 + i] = crate::endian::le_to_u64(&expansion[8 * i..]);
        }
        state[12] = 0;
        state[13] = 0;
        state[14] = crate::endian::le_to_u64(&params.nonce[..8]);
        state[15] = crate::endian::le_to_u64(&params.nonce[8..]);

        let mac = match auth {
            CsxAuthMode::None => None,
            CsxAuthMode::Standard => Some(CsxMac::Standard(Kmac512::new(
                &expansion[CSX_KEY_SIZE..],
                b"CSX-512",
            ))),
            CsxAuthMode::Reduced => Some(CsxMac::Reduced(Kmac512R12::new(
                &expansion[CSX_KEY_SIZE..],
                b"CSX-512",
            ))),
        };
        expansion.zeroize();

        let mut start_nonce = [0u8; CSX_NONCE_SIZE];
        start_nonce.copy_from_slice(params.nonce);

        Ok(Self {
            state,
            mac,
            pending_ad: Vec::new(),
            start_nonce,
            nonce_bound: false,
            encrypt,
        })
    }

    /// MAC tag length; zero in the unauthenticated mode.
    pub fn tag_size(&self) -> usize {
        if self.mac.is_some() {
            CSX_MAC_SIZE
        } else {
            0
        }
    }

    /// Queues associated data for the next message only.
    pub fn set_associated(&mut self, ad: &[u8]) {
        self.pending_ad.clear();
        let mut frame = [0u8; 8];
        u64_to_le(&mut frame, ad.len() as u64);
        self.pending_ad.extend_from_slice(&frame);
        self.pending_ad.extend_from_slice(ad);
    }

    fn next_block(&mut self) -> [u8; CSX_BLOCK_SIZE] {
        let mut working = self.state;
        for _ in 0..CSX_ROUNDS / 2 {
            quarter_round(&mut working, 0, 4, 8, 12);
            quarter_round(&mut working, 1, 5, 9, 13);
            quarter_round(&mut working, 2, 6, 10, 14);
            quarter_round(&mut working, 3, 7, 11, 15);
            quarter_round(&mut working, 0, 5, 10, 15);
            quarter_round(&mut working, 1, 6, 11, 12);
            quarter_round(&mut working, 2, 7, 8, 13);
            quarter_round(&mut working, 3, 4, 9, 14);
        }
        let mut block = [0u8; CSX_BLOCK_SIZE];
        for (i, chunk) in block.chunks_mut(8).enumerate() {
            u64_to_le(chunk, working[i].wrapping_add(self.state[i]));
        }
        // 128-bit counter across words 12 and 13.
        self.state[12] = self.state[12].wrapping_add(1);
        if self.state[12] == 0 {
            self.state[13] = self.state[13].wrapping_add(1);
        }
        working.zeroize();
        block
    }

    fn apply_keystream(&mut self, output: &mut [u8], input: &[u8]) {
        for (src, dst) in input
            .chunks(CSX_BLOCK_SIZE)
            .zip(output.chunks_mut(CSX_BLOCK_SIZE))
        {
            let mut keystream = self.next_block();
            for i in 0..src.len() {
                dst[i] = src[i] ^ keystream[i];
            }
            keystream.zeroize();
        }
    }

    fn mac_frames(&mut self, ciphertext: &[u8]) {
        let ad = std::mem::take(&mut self.pending_ad);
        let bind = !self.nonce_bound;
        self.nonce_bound = true;
        let Some(mac) = self.mac.as_mut() else {
            return;
        };
        if !ad.is_empty() {
            mac.update(&ad);
        }
        if bind {
            let nonce = self.start_nonce;
            mac.update(&nonce);
        }
        mac.update(ciphertext);
    }

    fn message_tag(&self, msg_len: usize, tag: &mut [u8]) {
        let Some(mac) = self.mac.as_ref() else {
            return;
        };
        let mut frame = [0u8; 8];
        u64_to_le(&mut frame, msg_len as u64);
        mac.chained_tag(&frame, tag);
    }

    /// Processes one complete message; same contract as the RCS transform:
    /// on encrypt the tag is appended, on decrypt it is verified in
    /// constant time before any plaintext is released, and a failed
    /// verification zeroes the output and returns `false`.
    pub fn transform(&mut self, output: &mut [u8], input: &[u8]) -> Result<bool, Error> {
        let tag_size = self.tag_size();
        if self.encrypt {
            if output.len() < input.len() + tag_size {
                return Err(Error::InvalidLength);
            }
            let (ct, tag_out) = output.split_at_mut(input.len());
            self.apply_keystream(ct, input);
            if self.mac.is_some() {
                let ct_copy = ct.to_vec();
                self.mac_frames(&ct_copy);
                self.message_tag(input.len(), &mut tag_out[..tag_size]);
            }
            Ok(true)
        } else {
            if input.len() < tag_size {
                return Err(Error::InvalidLength);
            }
            let msg_len = input.len() - tag_size;
            if output.len() < msg_len {
                return Err(Error::InvalidLength);
            }
            let (ct, tag) = input.split_at(msg_len);
            if self.mac.is_some() {
                self.mac_frames(ct);
                let mut expected = vec![0u8; tag_size];
                self.message_tag(msg_len, &mut expected);
                let ok = ctutils::verify(&expected, tag);
                expected.zeroize();
                if !ok {
                    ctutils::clear(&mut output[..msg_len]);
                    return Ok(false);
                }
            }
            self.apply_keystream(&mut output[..msg_len], ct);
            Ok(true)
        }
    }
}

impl Drop for Csx {
    fn drop(&mut self) {
        self.state.zeroize();
        self.pending_ad.zeroize();
        self.start_nonce.zeroize();
        if let Some(mac) = self.mac.as_mut() {
            mac.zeroize();
        }
    }
}

impl ZeroizeOnDrop for Csx {}
