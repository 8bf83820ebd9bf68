//! ML-KEM parameter sets.
//!
//! The ring is fixed (n = 256, q = 3329, η2 = 2); a level type selects the
//! module rank k, the noise parameter η1 and the ciphertext compression
//! depths. Byte sizes derive from those choices.

/// Polynomial degree.
pub const N: usize = 256;
/// Coefficient modulus.
pub const Q: i16 = 3329;
/// Size of seeds, hashes and the shared secret in bytes.
pub const SYM_BYTES: usize = 32;
/// Bytes of an uncompressed (12-bit) polynomial.
pub const POLY_BYTES: usize = 384;
/// Noise parameter η2, common to all sets.
pub const ETA2: usize = 2;

/// A security level of the KEM.
pub trait KemParams {
    /// Module rank.
    const K: usize;
    /// Noise parameter for the secret and keygen errors.
    const ETA1: usize;
    /// Compression depth of the ciphertext vector u.
    const DU: usize;
    /// Compression depth of the ciphertext polynomial v.
    const DV: usize;
    /// Display name of the parameter set.
    const NAME: &'static str;

    /// Bytes of a packed polynomial vector.
    const POLYVEC_BYTES: usize = Self::K * POLY_BYTES;
    /// IND-CPA public key: packed t̂ vector plus the matrix seed ρ.
    const INDCPA_PUBLICKEY_BYTES: usize = Self::POLYVEC_BYTES + SYM_BYTES;
    /// IND-CPA secret key: packed ŝ vector.
    const INDCPA_SECRETKEY_BYTES: usize = Self::POLYVEC_BYTES;
    /// Bytes of the compressed u component.
    const CIPHERTEXT_U_BYTES: usize = Self::K * Self::DU * N / 8;
    /// Bytes of the compressed v component.
    const CIPHERTEXT_V_BYTES: usize = Self::DV * N / 8;
    /// Total ciphertext bytes.
    const CIPHERTEXT_BYTES: usize = Self::CIPHERTEXT_U_BYTES + Self::CIPHERTEXT_V_BYTES;
    /// Encapsulation-key bytes.
    const PUBLICKEY_BYTES: usize = Self::INDCPA_PUBLICKEY_BYTES;
    /// Decapsulation-key bytes: sk_cpa ‖ pk ‖ H(pk) ‖ z.
    const SECRETKEY_BYTES: usize =
        Self::INDCPA_SECRETKEY_BYTES + Self::INDCPA_PUBLICKEY_BYTES + 2 * SYM_BYTES;
}

/// ML-KEM-512 (k = 2).
pub struct Kem512Params;

impl KemParams for Kem512Params {
    const K: usize = 2;
    const ETA1: usize = 3;
    const DU: usize = 10;
    const DV: usize = 4;
    const NAME: &'static str = "ML-KEM-512";
}

/// ML-KEM-768 (k = 3).
pub struct Kem768Params;

impl KemParams for Kem768Params {
    const K: usize = 3;
    const ETA1: usize = 2;
    const DU: usize = 10;
    const DV: usize = 4;
    const NAME: &'static str = "ML-KEM-768";
}

/// ML-KEM-1024 (k = 4).
pub struct Kem1024Params;

impl KemParams for Kem1024Params {
    const K: usize = 4;
    const ETA1: usize = 2;
    const DU: usize = 11;
    const DV: usize = 5;
    const NAME: &'static str = "ML-KEM-1024";
}

/// Extended k = 5 parameter set. Not part of FIPS 203; carried for
/// compatibility with deployments of the original library's highest level.
pub struct Kem1280Params;

impl KemParams for Kem1280Params {
    const K: usize = 5;
    const ETA1: usize = 2;
    const DU: usize = 11;
    const DV: usize = 5;
    const NAME: &'static str = "ML-KEM-1280";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_sizes() {
        assert_eq!(Kem512Params::PUBLICKEY_BYTES, 800);
        assert_eq!(Kem512Params::SECRETKEY_BYTES, 1632);
        assert_eq!(Kem512Params::CIPHERTEXT_BYTES, 768);

        assert_eq!(Kem768Params::PUBLICKEY_BYTES, 1184);
        assert_eq!(Kem768Params::SECRETKEY_BYTES, 2400);
        assert_eq!(Kem768Params::CIPHERTEXT_BYTES, 1088);

        assert_eq!(Kem1024Params::PUBLICKEY_BYTES, 1568);
        assert_eq!(Kem1024Params::SECRETKEY_BYTES, 3168);
        assert_eq!(Kem1024Params::CIPHERTEXT_BYTES, 1568);

        assert_eq!(Kem1280Params::PUBLICKEY_BYTES, 1952);
        assert_eq!(Kem1280Params::SECRETKEY_BYTES, 3936);
        assert_eq!(Kem1280Params::CIPHERTEXT_BYTES, 1920);
    }
}
