//! # pqkit
//!
//! A **pure Rust** post-quantum cryptographic toolkit bundling the
//! NIST-standardized lattice schemes with the symmetric substrate they are
//! built on: **ML-KEM** (Kyber) and **ML-DSA** (Dilithium) over an
//! in-crate implementation of the Keccak family (SHA-3, SHAKE, cSHAKE,
//! KMAC), SHA-2 with HMAC/HKDF, AES with extended key schedules and block
//! modes, ChaCha20, Poly1305 and the RCS authenticated wide-block stream
//! cipher.
//!
//! ## 🛡️ Security & Robustness
//!
//! * **Constant Time**: MAC comparison, the FO-transform re-encryption
//!   check and the decapsulation key selection use the [`subtle`] crate;
//!   modular reductions are branch-free Montgomery/Barrett arithmetic.
//! * **Memory Clearing**: every structure holding secrets (decapsulation
//!   and signing keys, shared secrets, cipher schedules, keyed sponge
//!   states, DRBG states) implements [`zeroize::Zeroize`] and is wiped
//!   when it goes out of scope.
//! * **Panic-Free**: fallible public operations return a [`Result`] with a
//!   typed [`errors::Error`]; authentication outcomes that must not leak
//!   detail are plain booleans.
//! * **Determinism**: every randomized operation accepts an external
//!   generator (implementing [`rand_core::RngCore`]); the DRBGs in
//!   [`drbg`] can be injected in its place to reproduce Known Answer
//!   Tests.
//!
//! ## 🚀 Quick Start (ML-KEM-768)
//!
//! ```rust
//! use pqkit::MlKem768;
//! use pqkit::traits::KemScheme;
//! use rand::rngs::OsRng;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let kem = MlKem768::new();
//!
//! // Key generation (Alice).
//! let (ek, dk) = kem.key_gen(&mut OsRng);
//!
//! // Encapsulation (Bob).
//! let (shared_secret_bob, ciphertext) = kem.encaps(&ek, &mut OsRng)?;
//!
//! // Decapsulation (Alice).
//! let (shared_secret_alice, ok) = kem.decaps(&dk, &ciphertext)?;
//!
//! assert!(ok);
//! assert_eq!(shared_secret_bob.0, shared_secret_alice.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## 📦 Architecture
//!
//! - [`keccak`], [`sha3`], [`kmac`]: the permutation, sponges and MACs.
//! - [`sha2`], [`hmac`]: the SHA-2 family with HMAC and HKDF.
//! - [`aes`], [`chacha`], [`poly1305`], [`rcs`], [`csx`]: block and
//!   stream ciphers, including the two authenticated wide-block streams.
//! - [`mlkem`]: ML-KEM over R_q = Z_3329[X]/(X^256+1).
//! - [`mldsa`]: ML-DSA over Z_8380417[X]/(X^256+1).
//! - [`drbg`]: deterministic generators, including the NIST KAT DRBG.
//! - [`traits`]: the KEM and signature seams.

pub mod aes;
pub mod chacha;
pub mod csx;
pub mod ctutils;
pub mod drbg;
pub mod endian;
pub mod errors;
pub mod hmac;
pub mod keccak;
pub mod kmac;
pub mod mldsa;
pub mod mlkem;
pub mod poly1305;
pub mod rcs;
pub mod sha2;
pub mod sha3;
pub mod traits;

pub use self::aes::{Aes, AesVariant};
pub use self::chacha::ChaCha20;
pub use self::csx::{Csx, CsxAuthMode, CsxKeyParams};
pub use self::drbg::{Csg, NistCtrDrbg};
pub use self::errors::Error;
pub use self::hmac::{HmacSha256, HmacSha512};
pub use self::kmac::{Kmac128, Kmac256, Kmac256R12, Kmac512, Kmac512R12};
pub use self::mldsa::{DsaSigningKey, DsaVerifyKey, MlDsa, MlDsa44, MlDsa65, MlDsa87};
pub use self::mlkem::{
    KemDecapsKey, KemEncapsKey, KemSharedSecret, MlKem, MlKem1024, MlKem1280, MlKem512, MlKem768,
};
pub use self::poly1305::Poly1305;
pub use self::rcs::{Rcs, RcsAuthMode, RcsKeyParams};
pub use self::sha2::{Sha256, Sha384, Sha512};
pub use self::sha3::{
    CShake128, CShake256, CShake512, Sha3_256, Sha3_384, Sha3_512, Shake128, Shake256, Shake512,
};
