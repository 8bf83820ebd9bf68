//! FIPS 202 digests and XOFs, and the SP800-185 cSHAKE construction.
//!
//! Everything here is a thin wrapper over [`crate::keccak::Sponge`]; the
//! wrappers fix the rate and domain-separation byte and expose the
//! absorb/finalize/squeeze lifecycle. `Shake512` and `CShake512` (rate 72)
//! are non-FIPS extensions carried for the extended key schedules.

use zeroize::Zeroize;

use crate::keccak::{
    Sponge, DOMAIN_CSHAKE, DOMAIN_SHA3, DOMAIN_SHAKE, RATE_128, RATE_256, RATE_384, RATE_512,
};

/// SP800-185 2.3.1: encodes `value` with its byte length prepended.
pub fn left_encode(value: u64) -> Vec<u8> {
    let mut bytes = value.to_be_bytes().to_vec();
    while bytes.len() > 1 && bytes[0] == 0 {
        bytes.remove(0);
    }
    let mut out = Vec::with_capacity(bytes.len() + 1);
    out.push(bytes.len() as u8);
    out.extend_from_slice(&bytes);
    out
}

/// SP800-185 2.3.1: encodes `value` with its byte length appended.
pub fn right_encode(value: u64) -> Vec<u8> {
    let mut bytes = value.to_be_bytes().to_vec();
    while bytes.len() > 1 && bytes[0] == 0 {
        bytes.remove(0);
    }
    let count = bytes.len() as u8;
    bytes.push(count);
    bytes
}

/// SP800-185 2.3.2: `left_encode(len(s) * 8) || s`.
pub fn encode_string(s: &[u8]) -> Vec<u8> {
    let mut out = left_encode((s.len() as u64) * 8);
    out.extend_from_slice(s);
    out
}

/// SP800-185 2.3.3: prepends `left_encode(w)` and zero-pads to a multiple
/// of `w` bytes.
pub fn bytepad(x: &[u8], w: usize) -> Vec<u8> {
    let mut out = left_encode(w as u64);
    out.extend_from_slice(x);
    while out.len() % w != 0 {
        out.push(0);
    }
    out
}

macro_rules! sha3_digest {
    ($(#[$doc:meta])* $name:ident, $rate:expr, $size:expr) => {
        $(#[$doc])*
        #[derive(Clone, Default)]
        pub struct $name {
            sponge: Sponge<{ $rate }, 24>,
        }

        impl $name {
            /// Output size in bytes.
            pub const SIZE: usize = $size;
            /// Sponge rate in bytes.
            pub const RATE: usize = $rate;

            pub fn new() -> Self {
                Self { sponge: Sponge::new() }
            }

            pub fn absorb(&mut self, data: &[u8]) {
                self.sponge.absorb(data);
            }

            pub fn finalize(mut self) -> [u8; $size] {
                self.sponge.finalize(DOMAIN_SHA3);
                let mut out = [0u8; $size];
                self.sponge.squeeze(&mut out);
                self.sponge.zeroize();
                out
            }

            /// One-shot digest.
            pub fn digest(data: &[u8]) -> [u8; $size] {
                let mut hasher = Self::new();
                hasher.absorb(data);
                hasher.finalize()
            }
        }
    };
}

sha3_digest!(
    /// SHA3-256 (FIPS 202, rate 136, 32-byte digest).
    Sha3_256,
    RATE_256,
    32
);
sha3_digest!(
    /// SHA3-384 (FIPS 202, rate 104, 48-byte digest).
    Sha3_384,
    RATE_384,
    48
);
sha3_digest!(
    /// SHA3-512 (FIPS 202, rate 72, 64-byte digest).
    Sha3_512,
    RATE_512,
    64
);

macro_rules! shake_xof {
    ($(#[$doc:meta])* $name:ident, $rate:expr) => {
        $(#[$doc])*
        #[derive(Clone, Default)]
        pub struct $name {
            sponge: Sponge<{ $rate }, 24>,
            finalized: bool,
        }

        impl $name {
            /// Sponge rate in bytes.
            pub const RATE: usize = $rate;

            pub fn new() -> Self {
                Self { sponge: Sponge::new(), finalized: false }
            }

            /// Absorbs input; must not be called once squeezing has begun.
            pub fn absorb(&mut self, data: &[u8]) {
                debug_assert!(!self.finalized, "absorb after squeeze");
                self.sponge.absorb(data);
            }

            /// Squeezes output; finalizes the sponge on first call and may
            /// be called repeatedly for streaming output.
            pub fn squeeze(&mut self, output: &mut [u8]) {
                if !self.finalized {
                    self.sponge.finalize(DOMAIN_SHAKE);
                    self.finalized = true;
                }
                self.sponge.squeeze(output);
            }

            /// One-shot XOF evaluation.
            pub fn xof(data: &[u8], output: &mut [u8]) {
                let mut state = Self::new();
                state.absorb(data);
                state.squeeze(output);
                state.sponge.zeroize();
            }
        }
    };
}

shake_xof!(
    /// SHAKE-128 (FIPS 202, rate 168).
    Shake128,
    RATE_128
);
shake_xof!(
    /// SHAKE-256 (FIPS 202, rate 136).
    Shake256,
    RATE_256
);
shake_xof!(
    /// SHAKE-512 (rate 72). Not defined by FIPS 202; retained for the
    /// 512-bit key-expansion paths.
    Shake512,
    RATE_512
);

macro_rules! cshake_xof {
    ($(#[$doc:meta])* $name:ident, $rate:expr) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $name {
            sponge: Sponge<{ $rate }, 24>,
            domain: u8,
            finalized: bool,
        }

        impl $name {
            /// Sponge rate in bytes.
            pub const RATE: usize = $rate;

            /// Creates a cSHAKE instance with function name `name` and
            /// customization string `custom`. With both empty the
            /// construction degenerates to plain SHAKE.
            pub fn new(name: &[u8], custom: &[u8]) -> Self {
                let mut sponge = Sponge::new();
                let domain = if name.is_empty() && custom.is_empty() {
                    DOMAIN_SHAKE
                } else {
                    let mut frame = encode_string(name);
                    frame.extend_from_slice(&encode_string(custom));
                    sponge.absorb(&bytepad(&frame, $rate));
                    DOMAIN_CSHAKE
                };
                Self { sponge, domain, finalized: false }
            }

            pub fn absorb(&mut self, data: &[u8]) {
                debug_assert!(!self.finalized, "absorb after squeeze");
                self.sponge.absorb(data);
            }

            /// Absorbs the final padding without squeezing; used by the
            /// KMAC layer which appends its own output-length frame first.
            pub(crate) fn finalize_frame(&mut self) {
                debug_assert!(!self.finalized);
                self.sponge.finalize(self.domain);
                self.finalized = true;
            }

            pub fn squeeze(&mut self, output: &mut [u8]) {
                if !self.finalized {
                    self.finalize_frame();
                }
                self.sponge.squeeze(output);
            }

            /// One-shot evaluation.
            pub fn xof(name: &[u8], custom: &[u8], data: &[u8], output: &mut [u8]) {
                let mut state = Self::new(name, custom);
                state.absorb(data);
                state.squeeze(output);
                state.zeroize();
            }
        }

        impl Zeroize for $name {
            fn zeroize(&mut self) {
                self.sponge.zeroize();
                self.finalized = false;
            }
        }
    };
}

cshake_xof!(
    /// cSHAKE-128 (SP800-185).
    CShake128,
    RATE_128
);
cshake_xof!(
    /// cSHAKE-256 (SP800-185).
    CShake256,
    RATE_256
);
cshake_xof!(
    /// cSHAKE-512 (rate 72). Non-standard width, used by the RHX-512 and
    /// RCS-512 key schedules.
    CShake512,
    RATE_512
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sp800_185_encodes() {
        assert_eq!(left_encode(0), vec![1, 0]);
        assert_eq!(left_encode(168), vec![1, 168]);
        assert_eq!(left_encode(4096), vec![2, 16, 0]);
        assert_eq!(right_encode(0), vec![0, 1]);
        assert_eq!(right_encode(256), vec![1, 0, 2]);
        assert_eq!(encode_string(b""), vec![1, 0]);
        assert_eq!(encode_string(b"K"), vec![1, 8, b'K']);
        let padded = bytepad(b"xyz", 8);
        assert_eq!(padded.len(), 8);
        assert_eq!(&padded[..2], &[1, 8]);
    }

    #[test]
    fn sha3_kats() {
        // FIPS 202 test vectors.
        assert_eq!(
            Sha3_256::digest(b"").to_vec(),
            hex::decode("a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a")
                .unwrap()
        );
        assert_eq!(
            Sha3_256::digest(b"abc").to_vec(),
            hex::decode("3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532")
                .unwrap()
        );
        assert_eq!(
            Sha3_384::digest(b"abc").to_vec(),
            hex::decode(
                "ec01498288516fc926459f58e2c6ad8df9b473cb0fc08c2596da7cf0e49be4b2\
                 98d88cea927ac7f539f1edf228376d25"
            )
            .unwrap()
        );
        assert_eq!(
            Sha3_512::digest(b"abc").to_vec(),
            hex::decode(
                "b751850b1a57168a5693cd924b6b096e08f621827444f70d884f5d0240d2712e\
                 10e116e9192af3c91a7ec57647e3934057340b4cf408d5a56592f8274eee9915"
            )
            .unwrap()
        );
    }

    #[test]
    fn shake_kats() {
        let mut out = [0u8; 32];
        Shake128::xof(b"", &mut out);
        assert_eq!(
            out.to_vec(),
            hex::decode("7f9c2ba4e88f827d616045507605853ed73b8093f6efbc88eb1a6eacfa66ef26")
                .unwrap()
        );
        Shake256::xof(b"", &mut out);
        assert_eq!(
            out.to_vec(),
            hex::decode("46b9dd2b0ba88d13233b3feb743eeb243fcd52ea62b81b82b50c27646ed5762f")
                .unwrap()
        );
    }

    #[test]
    fn cshake_kats() {
        // SP800-185 cSHAKE sample vectors.
        let mut out = [0u8; 32];
        CShake128::xof(b"", b"Email Signature", &[0x00, 0x01, 0x02, 0x03], &mut out);
        assert_eq!(
            out.to_vec(),
            hex::decode("c1c36925b6409a04f1b504fcbca9d82b4017277cb5ed2b2065fc1d3814d5aaf5")
                .unwrap()
        );

        let mut out = [0u8; 64];
        CShake256::xof(b"", b"Email Signature", &[0x00, 0x01, 0x02, 0x03], &mut out);
        assert_eq!(
            out.to_vec(),
            hex::decode(
                "d008828e2b80ac9d2218ffee1d070c48b8e4c87bff32c9699d5b6896eee0edd1\
                 64020e2be0560858d9c00c037e34a96937c561a74c412bb4c746469527281c8c"
            )
            .unwrap()
        );
    }

    #[test]
    fn cshake_degenerates_to_shake() {
        let msg = b"degenerate case";
        let mut a = [0u8; 48];
        let mut b = [0u8; 48];
        CShake256::xof(b"", b"", msg, &mut a);
        Shake256::xof(msg, &mut b);
        assert_eq!(a, b);

        CShake512::xof(b"", b"", msg, &mut a);
        Shake512::xof(msg, &mut b);
        assert_eq!(a, b);
    }
}
