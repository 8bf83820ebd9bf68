use thiserror::Error;

/// The crate-wide error type.
///
/// Authentication and verification outcomes that must not become oracle
/// channels are reported as booleans by the operations concerned; this enum
/// covers contract violations a caller can act on.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An input slice does not have the length the operation requires.
    #[error("invalid input length")]
    InvalidLength,

    /// The supplied key does not match any supported key size.
    #[error("invalid key size")]
    InvalidKeySize,

    /// The supplied nonce or IV does not match the cipher block size.
    #[error("invalid nonce size")]
    InvalidNonceSize,

    /// A parameter value is outside its permitted range.
    #[error("invalid parameter")]
    InvalidParameter,

    /// An AEAD tag did not match the received ciphertext.
    #[error("message authentication failure")]
    AuthenticationFailure,

    /// A signature did not verify under the given public key.
    #[error("signature verification failure")]
    VerificationFailure,
}
