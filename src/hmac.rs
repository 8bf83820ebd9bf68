//! HMAC (FIPS 198a) over the SHA-2 family, and HKDF (RFC 5869).

use zeroize::Zeroize;

use crate::sha2::{Sha256, Sha512};

macro_rules! hmac_impl {
    ($(#[$doc:meta])* $name:ident, $hash:ident, $block:expr, $size:expr) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $name {
            inner: $hash,
            opad_key: [u8; $block],
        }

        impl $name {
            /// MAC size in bytes.
            pub const SIZE: usize = $size;

            /// Initializes the MAC; keys longer than the block are hashed
            /// down first.
            pub fn new(key: &[u8]) -> Self {
                let mut padded = [0u8; $block];
                if key.len() > $block {
                    padded[..$size].copy_from_slice(&$hash::digest(key));
                } else {
                    padded[..key.len()].copy_from_slice(key);
                }

                let mut ipad_key = [0u8; $block];
                let mut opad_key = [0u8; $block];
                for i in 0..$block {
                    ipad_key[i] = padded[i] ^ 0x36;
                    opad_key[i] = padded[i] ^ 0x5C;
                }
                padded.zeroize();

                let mut inner = $hash::new();
                inner.update(&ipad_key);
                ipad_key.zeroize();
                Self { inner, opad_key }
            }

            pub fn update(&mut self, data: &[u8]) {
                self.inner.update(data);
            }

            pub fn finalize(mut self) -> [u8; $size] {
                let inner_digest = self.inner.finalize();
                let mut outer = $hash::new();
                outer.update(&self.opad_key);
                outer.update(&inner_digest);
                self.opad_key.zeroize();
                outer.finalize()
            }

            /// One-shot MAC.
            pub fn mac(key: &[u8], data: &[u8]) -> [u8; $size] {
                let mut state = Self::new(key);
                state.update(data);
                state.finalize()
            }
        }
    };
}

hmac_impl!(
    /// HMAC-SHA-256.
    HmacSha256,
    Sha256,
    64,
    32
);
hmac_impl!(
    /// HMAC-SHA-512.
    HmacSha512,
    Sha512,
    128,
    64
);

macro_rules! hkdf_impl {
    ($extract:ident, $expand:ident, $hmac:ident, $size:expr) => {
        /// HKDF-Extract: `PRK = HMAC(salt, ikm)`.
        pub fn $extract(salt: &[u8], ikm: &[u8]) -> [u8; $size] {
            $hmac::mac(salt, ikm)
        }

        /// HKDF-Expand: the counter chain
        /// `T_i = HMAC(PRK, T_{i-1} || info || i)`, i starting at 1.
        pub fn $expand(prk: &[u8], info: &[u8], okm: &mut [u8]) {
            debug_assert!(okm.len() <= 255 * $size, "HKDF output too long");
            let mut t: Vec<u8> = Vec::new();
            let mut counter = 1u8;
            let mut written = 0usize;
            while written < okm.len() {
                let mut mac = $hmac::new(prk);
                mac.update(&t);
                mac.update(info);
                mac.update(&[counter]);
                let block = mac.finalize();
                let take = (okm.len() - written).min($size);
                okm[written..written + take].copy_from_slice(&block[..take]);
                t = block.to_vec();
                written += take;
                counter = counter.wrapping_add(1);
            }
            t.zeroize();
        }
    };
}

hkdf_impl!(hkdf256_extract, hkdf256_expand, HmacSha256, 32);
hkdf_impl!(hkdf512_extract, hkdf512_expand, HmacSha512, 64);
