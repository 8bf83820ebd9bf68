//! ML-DSA parameter sets.
//!
//! The ring is fixed (n = 256, q = 8380417, d = 13). A level type selects
//! the matrix shape (k × l), the secret range η, the challenge weight τ,
//! the mask range γ1, the low-order rounding range γ2 and the maximum hint
//! weight ω. The 48-byte collision-resistant hash width and the 32-byte challenge
//! seed follow the original library's layout, which the documented key and
//! signature sizes pin down exactly.

/// Polynomial degree.
pub const N: usize = 256;
/// Coefficient modulus.
pub const Q: i32 = 8380417;
/// Dropped bits of t.
pub const D: usize = 13;
/// Seed length in bytes (ρ, K, and the challenge seed c̃).
pub const SEED_BYTES: usize = 32;
/// Output length of the collision-resistant hash (tr, μ, ρ′).
pub const CRH_BYTES: usize = 48;
/// Bytes of a packed t1 polynomial (10-bit coefficients).
pub const POLYT1_BYTES: usize = 320;
/// Bytes of a packed t0 polynomial (13-bit coefficients).
pub const POLYT0_BYTES: usize = 416;

/// A security level of the signature scheme.
pub trait DsaParams {
    /// Rows of the public matrix.
    const K: usize;
    /// Columns of the public matrix.
    const L: usize;
    /// Secret coefficient range.
    const ETA: usize;
    /// Number of ±1 entries in the challenge polynomial.
    const TAU: usize;
    /// Rejection bound offset β = τ·η.
    const BETA: i32;
    /// Mask coefficient range.
    const GAMMA1: i32;
    /// Low-order rounding range.
    const GAMMA2: i32;
    /// Maximum total hint weight.
    const OMEGA: usize;
    /// Display name of the parameter set.
    const NAME: &'static str;

    /// Bytes of a packed mask polynomial (γ1-dependent).
    const POLYZ_BYTES: usize;
    /// Bytes of a packed w1 polynomial (γ2-dependent).
    const POLYW1_BYTES: usize;
    /// Bytes of a packed secret polynomial (η-dependent).
    const POLYETA_BYTES: usize;

    /// Public key: ρ ‖ packed t1.
    const PUBLICKEY_BYTES: usize = SEED_BYTES + Self::K * POLYT1_BYTES;
    /// Secret key: ρ ‖ K ‖ tr ‖ packed s1 ‖ packed s2 ‖ packed t0.
    const SECRETKEY_BYTES: usize = 2 * SEED_BYTES
        + CRH_BYTES
        + (Self::K + Self::L) * Self::POLYETA_BYTES
        + Self::K * POLYT0_BYTES;
    /// Signature: c̃ ‖ packed z ‖ hint vector.
    const SIGNATURE_BYTES: usize =
        SEED_BYTES + Self::L * Self::POLYZ_BYTES + Self::OMEGA + Self::K;
}

/// ML-DSA-44 (level 2).
pub struct Dsa44Params;

impl DsaParams for Dsa44Params {
    const K: usize = 4;
    const L: usize = 4;
    const ETA: usize = 2;
    const TAU: usize = 39;
    const BETA: i32 = 78;
    const GAMMA1: i32 = 1 << 17;
    const GAMMA2: i32 = (Q - 1) / 88;
    const OMEGA: usize = 80;
    const NAME: &'static str = "ML-DSA-44";
    const POLYZ_BYTES: usize = 576;
    const POLYW1_BYTES: usize = 192;
    const POLYETA_BYTES: usize = 96;
}

/// ML-DSA-65 (level 3).
pub struct Dsa65Params;

impl DsaParams for Dsa65Params {
    const K: usize = 6;
    const L: usize = 5;
    const ETA: usize = 4;
    const TAU: usize = 49;
    const BETA: i32 = 196;
    const GAMMA1: i32 = 1 << 19;
    const GAMMA2: i32 = (Q - 1) / 32;
    const OMEGA: usize = 55;
    const NAME: &'static str = "ML-DSA-65";
    const POLYZ_BYTES: usize = 640;
    const POLYW1_BYTES: usize = 128;
    const POLYETA_BYTES: usize = 128;
}

/// ML-DSA-87 (level 5).
pub struct Dsa87Params;

impl DsaParams for Dsa87Params {
    const K: usize = 8;
    const L: usize = 7;
    const ETA: usize = 2;
    const TAU: usize = 60;
    const BETA: i32 = 120;
    const GAMMA1: i32 = 1 << 19;
    const GAMMA2: i32 = (Q - 1) / 32;
    const OMEGA: usize = 75;
    const NAME: &'static str = "ML-DSA-87";
    const POLYZ_BYTES: usize = 640;
    const POLYW1_BYTES: usize = 128;
    const POLYETA_BYTES: usize = 96;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_sizes() {
        assert_eq!(Dsa44Params::PUBLICKEY_BYTES, 1312);
        assert_eq!(Dsa44Params::SECRETKEY_BYTES, 2544);
        assert_eq!(Dsa44Params::SIGNATURE_BYTES, 2420);

        assert_eq!(Dsa65Params::PUBLICKEY_BYTES, 1952);
        assert_eq!(Dsa65Params::SECRETKEY_BYTES, 4016);
        assert_eq!(Dsa65Params::SIGNATURE_BYTES, 3293);

        assert_eq!(Dsa87Params::PUBLICKEY_BYTES, 2592);
        assert_eq!(Dsa87Params::SECRETKEY_BYTES, 4880);
        assert_eq!(Dsa87Params::SIGNATURE_BYTES, 4595);
    }

    #[test]
    fn beta_is_tau_times_eta() {
        assert_eq!(Dsa44Params::BETA, (Dsa44Params::TAU * Dsa44Params::ETA) as i32);
        assert_eq!(Dsa65Params::BETA, (Dsa65Params::TAU * Dsa65Params::ETA) as i32);
        assert_eq!(Dsa87Params::BETA, (Dsa87Params::TAU * Dsa87Params::ETA) as i32);
    }
}
