//! Keystore decryption error types

use thiserror::Error;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Mapping the untyped record onto the typed keystore shape
    Validation,
    /// Deriving the decryption key from the passphrase
    Kdf,
    /// Verifying the checksum over key material and ciphertext
    Checksum,
    /// Decrypting the ciphertext into the secret
    Cipher,
}

/// Errors that can occur while decrypting a keystore
///
/// Every variant is terminal: retrying with the same inputs yields the same
/// error. Only [`DecryptError::ChecksumMismatch`] is secret-dependent, so it is
/// the only variant that carries no detail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecryptError {
    /// The record could not be mapped onto the keystore shape
    #[error("malformed keystore: {0}")]
    MalformedKeystore(String),

    /// The record has no checksum module
    #[error("no checksum")]
    MissingChecksum,

    /// The record has no cipher module
    #[error("no cipher")]
    MissingCipher,

    /// KDF salt is not valid hex
    #[error("invalid KDF salt")]
    InvalidSalt,

    /// KDF cost parameters were rejected by the derivation function
    #[error("invalid KDF parameters: {0}")]
    InvalidKdfParams(String),

    /// PBKDF2 pseudorandom function is not supported
    #[error("unsupported PBKDF2 PRF {0:?}")]
    UnsupportedPrf(String),

    /// KDF function is not supported
    #[error("unsupported KDF {0:?}")]
    UnsupportedKdf(String),

    /// KDF cost parameter is above the configured limit
    #[error("KDF parameter {param} = {value} exceeds configured limit {limit}")]
    KdfCostExceeded {
        param: &'static str,
        value: u64,
        limit: u64,
    },

    /// Decryption key is shorter than the 32 bytes the checksum requires
    #[error("decryption key must be at least 32 bytes, got {actual}")]
    KeyTooShort { actual: usize },

    /// Cipher message is not valid hex
    #[error("invalid cipher message")]
    InvalidCipherMessage,

    /// Checksum message is not valid hex
    #[error("invalid checksum message")]
    InvalidChecksumMessage,

    /// Wrong passphrase or tampered keystore
    #[error("invalid checksum")]
    ChecksumMismatch,

    /// Cipher IV is not valid hex or has the wrong length
    #[error("invalid IV")]
    InvalidIv,

    /// Cipher function is not supported
    #[error("unsupported cipher {0:?}")]
    UnsupportedCipher(String),

    /// XOR ciphertext does not cover the whole decryption key
    #[error("ciphertext too short: expected at least {expected} bytes, got {actual}")]
    CiphertextTooShort { expected: usize, actual: usize },
}

impl DecryptError {
    /// Stage of the pipeline that produced this error
    pub fn stage(&self) -> Stage {
        match self {
            Self::MalformedKeystore(_) | Self::MissingChecksum | Self::MissingCipher => {
                Stage::Validation
            }
            Self::InvalidSalt
            | Self::InvalidKdfParams(_)
            | Self::UnsupportedPrf(_)
            | Self::UnsupportedKdf(_)
            | Self::KdfCostExceeded { .. } => Stage::Kdf,
            Self::KeyTooShort { .. }
            | Self::InvalidCipherMessage
            | Self::InvalidChecksumMessage
            | Self::ChecksumMismatch => Stage::Checksum,
            Self::InvalidIv | Self::UnsupportedCipher(_) | Self::CiphertextTooShort { .. } => {
                Stage::Cipher
            }
        }
    }
}

impl From<serde_json::Error> for DecryptError {
    fn from(err: serde_json::Error) -> Self {
        DecryptError::MalformedKeystore(err.to_string())
    }
}

/// Result type for keystore decryption
pub type DecryptResult<T> = Result<T, DecryptError>;
