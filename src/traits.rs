//! Scheme-level traits.
//!
//! The KEM and signature surfaces are small enough to express as traits so
//! alternate asymmetric algorithms (hash-based or code-based schemes with
//! the same I/O shape) can slot in beside the lattice schemes.

use rand::{CryptoRng, RngCore};

use crate::errors::Error;
use crate::mldsa::{DsaSigningKey, DsaVerifyKey, MlDsa};
use crate::mldsa::params::DsaParams;
use crate::mlkem::{KemDecapsKey, KemEncapsKey, KemSharedSecret, MlKem};
use crate::mlkem::params::KemParams;

/// A key-encapsulation mechanism.
pub trait KemScheme {
    type EncapsKey;
    type DecapsKey;
    type SharedSecret;

    fn key_gen<R: RngCore + CryptoRng>(&self, rng: &mut R) -> (Self::EncapsKey, Self::DecapsKey);

    fn encaps<R: RngCore + CryptoRng>(
        &self,
        ek: &Self::EncapsKey,
        rng: &mut R,
    ) -> Result<(Self::SharedSecret, Vec<u8>), Error>;

    /// Never fails on malformed content: a mismatching ciphertext yields
    /// the implicit-rejection secret and a `false` flag.
    fn decaps(
        &self,
        dk: &Self::DecapsKey,
        ciphertext: &[u8],
    ) -> Result<(Self::SharedSecret, bool), Error>;
}

impl<P: KemParams> KemScheme for MlKem<P> {
    type EncapsKey = KemEncapsKey;
    type DecapsKey = KemDecapsKey;
    type SharedSecret = KemSharedSecret;

    fn key_gen<R: RngCore + CryptoRng>(&self, rng: &mut R) -> (Self::EncapsKey, Self::DecapsKey) {
        MlKem::key_gen(self, rng)
    }

    fn encaps<R: RngCore + CryptoRng>(
        &self,
        ek: &Self::EncapsKey,
        rng: &mut R,
    ) -> Result<(Self::SharedSecret, Vec<u8>), Error> {
        MlKem::encaps(self, ek, rng)
    }

    fn decaps(
        &self,
        dk: &Self::DecapsKey,
        ciphertext: &[u8],
    ) -> Result<(Self::SharedSecret, bool), Error> {
        MlKem::decaps(self, dk, ciphertext)
    }
}

/// A detached-signature scheme.
pub trait SignatureScheme {
    type VerifyKey;
    type SigningKey;

    fn key_gen<R: RngCore + CryptoRng>(&self, rng: &mut R) -> (Self::VerifyKey, Self::SigningKey);

    fn sign<R: RngCore + CryptoRng>(
        &self,
        message: &[u8],
        sk: &Self::SigningKey,
        rng: &mut R,
    ) -> Result<Vec<u8>, Error>;

    /// Returns only a boolean; failures carry no diagnostics.
    fn verify(&self, message: &[u8], signature: &[u8], pk: &Self::VerifyKey) -> bool;
}

impl<P: DsaParams> SignatureScheme for MlDsa<P> {
    type VerifyKey = DsaVerifyKey;
    type SigningKey = DsaSigningKey;

    fn key_gen<R: RngCore + CryptoRng>(&self, rng: &mut R) -> (Self::VerifyKey, Self::SigningKey) {
        MlDsa::key_gen(self, rng)
    }

    fn sign<R: RngCore + CryptoRng>(
        &self,
        message: &[u8],
        sk: &Self::SigningKey,
        rng: &mut R,
    ) -> Result<Vec<u8>, Error> {
        MlDsa::sign(self, message, sk, rng)
    }

    fn verify(&self, message: &[u8], signature: &[u8], pk: &Self::VerifyKey) -> bool {
        MlDsa::verify(self, message, signature, pk)
    }
}
