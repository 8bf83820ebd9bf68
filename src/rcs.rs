//! RCS: an authenticated wide-block counter-mode stream cipher.
//!
//! The cipher is a Rijndael extension over a 256-bit (RCS-256) or 512-bit
//! (RCS-512) block. The round-key schedule and the MAC key are both drawn
//! from one cSHAKE expansion of the user key and starting nonce; encryption
//! is counter mode over the wide block (encrypt nonce, XOR, increment the
//! nonce as a little-endian wide integer), so only the forward transform
//! exists.
//!
//! In an authenticated mode every `transform` call frames one message: the
//! MAC absorbs the pending associated data, the starting nonce (first
//! message only) and the ciphertext, and a tag bound to the message length
//! is appended (encrypt) or verified in constant time before any plaintext
//! is released (decrypt). The MAC state persists across messages, so
//! successive tags chain over the whole transcript.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::aes::{xtime, SBOX};
use crate::ctutils;
use crate::endian::{le_increment, u64_to_le};
use crate::errors::Error;
use crate::kmac::{Kmac256, Kmac256R12, Kmac512, Kmac512R12};
use crate::sha3::{CShake256, CShake512};

/// RCS-256 key, block, nonce and tag size in bytes.
pub const RCS256_KEY_SIZE: usize = 32;
/// RCS-512 key, block, nonce and tag size in bytes.
pub const RCS512_KEY_SIZE: usize = 64;

const RCS256_ROUNDS: usize = 24;
const RCS512_ROUNDS: usize = 30;

/// Widened ShiftRows offsets shared by both block widths.
const ROW_OFFSETS: [usize; 4] = [0, 1, 3, 4];

/// Authentication selection. `None` instantiates no MAC state at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RcsAuthMode {
    /// Unauthenticated counter-mode stream.
    None,
    /// KMAC-256 / KMAC-512 over the standard 24-round permutation.
    Standard,
    /// The 12-round KMAC variant. Not NIST-standardized; kept for
    /// interoperability with tags produced by the reduced-round option.
    Reduced,
}

/// Key material for [`Rcs::initialize`]; `info` is an optional
/// domain-separation string fed to the key-schedule expansion.
pub struct RcsKeyParams<'a> {
    pub key: &'a [u8],
    pub nonce: &'a [u8],
    pub info: &'a [u8],
}

enum RcsMac {
    Standard256(Kmac256),
    Standard512(Kmac512),
    Reduced256(Kmac256R12),
    Reduced512(Kmac512R12),
}

impl RcsMac {
    fn update(&mut self, data: &[u8]) {
        match self {
            RcsMac::Standard256(m) => m.update(data),
            RcsMac::Standard512(m) => m.update(data),
            RcsMac::Reduced256(m) => m.update(data),
            RcsMac::Reduced512(m) => m.update(data),
        }
    }

    fn tag(&self, out: &mut [u8]) {
        match self {
            RcsMac::Standard256(m) => m.finalize_cloned(out),
            RcsMac::Standard512(m) => m.finalize_cloned(out),
            RcsMac::Reduced256(m) => m.finalize_cloned(out),
            RcsMac::Reduced512(m) => m.finalize_cloned(out),
        }
    }
}

impl Zeroize for RcsMac {
    fn zeroize(&mut self) {
        match self {
            RcsMac::Standard256(m) => m.zeroize(),
            RcsMac::Standard512(m) => m.zeroize(),
            RcsMac::Reduced256(m) => m.zeroize(),
            RcsMac::Reduced512(m) => m.zeroize(),
        }
    }
}

/// An initialized RCS stream state.
pub struct Rcs {
    block_size: usize,
    rounds: usize,
    round_keys: Vec<u8>,
    nonce: Vec<u8>,
    start_nonce: Vec<u8>,
    mac: Option<RcsMac>,
    pending_ad: Vec<u8>,
    nonce_bound: bool,
    encrypt: bool,
}

impl Rcs {
    /// Creates the round-key schedule and (in authenticated modes) the MAC
    /// key from one cSHAKE expansion of `key ‖ nonce`. The key length
    /// selects the width: 32 bytes → RCS-256, 64 bytes → RCS-512. The
    /// nonce must be one block.
    pub fn initialize(
        params: &RcsKeyParams<'_>,
        encrypt: bool,
        auth: RcsAuthMode,
    ) -> Result<Self, Error> {
        let (block_size, rounds, name) = match params.key.len() {
            RCS256_KEY_SIZE => (RCS256_KEY_SIZE, RCS256_ROUNDS, b"RCS-256".as_slice()),
            RCS512_KEY_SIZE => (RCS512_KEY_SIZE, RCS512_ROUNDS, b"RCS-512".as_slice()),
            _ => return Err(Error::InvalidKeySize),
        };
        if params.nonce.len() != block_size {
            return Err(Error::InvalidNonceSize);
        }

        let schedule_len = (rounds + 1) * block_size;
        let mac_key_len = if auth == RcsAuthMode::None {
            0
        } else {
            block_size
        };
        let mut expansion = vec![0u8; schedule_len + mac_key_len];

        if block_size == RCS256_KEY_SIZE {
            let mut xof = CShake256::new(name, params.info);
            xof.absorb(params.key);
            xof.absorb(params.nonce);
            xof.squeeze(&mut expansion);
            xof.zeroize();
        } else {
            let mut xof = CShake512::new(name, params.info);
            xof.absorb(params.key);
            xof.absorb(params.nonce);
            xof.squeeze(&mut expansion);
            xof.zeroize();
        }

        let round_keys = expansion[..schedule_len].to_vec();
        let mac = match auth {
            RcsAuthMode::None => None,
            RcsAuthMode::Standard => Some(if block_size == RCS256_KEY_SIZE {
                RcsMac::Standard256(Kmac256::new(&expansion[schedule_len..], name))
            } else {
                RcsMac::Standard512(Kmac512::new(&expansion[schedule_len..], name))
            }),
            RcsAuthMode::Reduced => Some(if block_size == RCS256_KEY_SIZE {
                RcsMac::Reduced256(Kmac256R12::new(&expansion[schedule_len..], name))
            } else {
                RcsMac::Reduced512(Kmac512R12::new(&expansion[schedule_len..], name))
            }),
        };
        expansion.zeroize();

        Ok(Self {
            block_size,
            rounds,
            round_keys,
            nonce: params.nonce.to_vec(),
            start_nonce: params.nonce.to_vec(),
            mac,
            pending_ad: Vec::new(),
            nonce_bound: false,
            encrypt,
        })
    }

    /// MAC tag length for this width; zero in the unauthenticated mode.
    pub fn tag_size(&self) -> usize {
        if self.mac.is_some() {
            self.block_size
        } else {
            0
        }
    }

    /// Queues associated data for the next message. Ignored (and cleared)
    /// after that message is processed; unauthenticated states have no use
    /// for it.
    pub fn set_associated(&mut self, ad: &[u8]) {
        self.pending_ad.clear();
        let mut frame = [0u8; 8];
        u64_to_le(&mut frame, ad.len() as u64);
        self.pending_ad.extend_from_slice(&frame);
        self.pending_ad.extend_from_slice(ad);
    }

    fn encrypt_wide_block(&self, block: &mut [u8]) {
        let nb = self.block_size / 4;
        let mut tmp = vec![0u8; self.block_size];

        self.add_round_key(block, 0);
        for round in 1..self.rounds {
            sub_bytes(block);
            shift_rows(block, &mut tmp, nb);
            mix_columns(block, nb);
            self.add_round_key(block, round);
        }
        sub_bytes(block);
        shift_rows(block, &mut tmp, nb);
        self.add_round_key(block, self.rounds);
        tmp.zeroize();
    }

    fn add_round_key(&self, block: &mut [u8], round: usize) {
        let rk = &self.round_keys[round * self.block_size..(round + 1) * self.block_size];
        for (b, k) in block.iter_mut().zip(rk.iter()) {
            *b ^= k;
        }
    }

    fn apply_keystream(&mut self, output: &mut [u8], input: &[u8]) {
        let mut keystream = vec![0u8; self.block_size];
        for (src, dst) in input
            .chunks(self.block_size)
            .zip(output.chunks_mut(self.block_size))
        {
            keystream.copy_from_slice(&self.nonce);
            self.encrypt_wide_block(&mut keystream);
            for i in 0..src.len() {
                dst[i] = src[i] ^ keystream[i];
            }
            le_increment(&mut self.nonce);
        }
        keystream.zeroize();
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
            let nonce = &self.start_nonce;
            mac.update(nonce);
        }
        mac.update(ciphertext);
    }

    fn message_tag(&self, msg_len: usize, tag: &mut [u8]) {
        let Some(mac) = self.mac.as_ref() else {
            return;
        };
        // The length suffix is folded into a cloned state so the running
        // transcript keeps chaining over ciphertext only.
        let mut framed = match mac {
            RcsMac::Standard256(m) => {
                let mut m = m.clone();
                m.update(&le_len(msg_len));
                RcsMac::Standard256(m)
            }
            RcsMac::Standard512(m) => {
                let mut m = m.clone();
                m.update(&le_len(msg_len));
                RcsMac::Standard512(m)
            }
            RcsMac::Reduced256(m) => {
                let mut m = m.clone();
                m.update(&le_len(msg_len));
                RcsMac::Reduced256(m)
            }
            RcsMac::Reduced512(m) => {
                let mut m = m.clone();
                m.update(&le_len(msg_len));
                RcsMac::Reduced512(m)
            }
        };
        framed.tag(tag);
        framed.zeroize();
    }

    /// Processes one complete message.
    ///
    /// Encrypting: `output` receives `input.len()` ciphertext bytes plus
    /// the tag in authenticated modes. Decrypting: `input` carries
    /// `ciphertext ‖ tag` and `output` receives the plaintext; on tag
    /// mismatch `output` is zeroed and `false` is returned before any
    /// plaintext is produced. `output` and `input` may alias only as the
    /// same buffer offsets (in-place use).
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

impl Drop for Rcs {
    fn drop(&mut self) {
        self.round_keys.zeroize();
        self.nonce.zeroize();
        self.start_nonce.zeroize();
        self.pending_ad.zeroize();
        if let Some(mac) = self.mac.as_mut() {
            mac.zeroize();
        }
    }
}

impl ZeroizeOnDrop for Rcs {}

fn le_len(len: usize) -> [u8; 8] {
    let mut out = [0u8; 8];
    u64_to_le(&mut out, len as u64);
    out
}

fn sub_bytes(block: &mut [u8]) {
    for b in block.iter_mut() {
        *b = SBOX[*b as usize];
    }
}

/// Rows shift left by `ROW_OFFSETS[row]` columns; the state is
/// column-major (`byte = 4*col + row`) over `nb` columns.
fn shift_rows(block: &mut [u8], tmp: &mut [u8], nb: usize) {
    tmp.copy_from_slice(block);
    for row in 1..4 {
        let offset = ROW_OFFSETS[row];
        for col in 0..nb {
            block[4 * col + row] = tmp[4 * ((col + offset) % nb) + row];
        }
    }
}

fn mix_columns(block: &mut [u8], nb: usize) {
    for col in 0..nb {
        let a = [
            block[4 * col],
            block[4 * col + 1],
            block[4 * col + 2],
            block[4 * col + 3],
        ];
        block[4 * col] = xtime(a[0]) ^ xtime(a[1]) ^ a[1] ^ a[2] ^ a[3];
        block[4 * col + 1] = a[0] ^ xtime(a[1]) ^ xtime(a[2]) ^ a[2] ^ a[3];
        block[4 * col + 2] = a[0] ^ a[1] ^ xtime(a[2]) ^ xtime(a[3]) ^ a[3];
        block[4 * col + 3] = xtime(a[0]) ^ a[0] ^ a[1] ^ a[2] ^ xtime(a[3]);
    }
}
