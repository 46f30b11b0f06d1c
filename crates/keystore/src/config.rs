//! Decryptor configuration
//!
//! The only tunable is a set of upper bounds on KDF cost parameters. Keystores
//! are usually trusted local files, so the default imposes no limits and the
//! pipeline behaves exactly as the keystore dictates. Callers that decrypt
//! keystores from untrusted sources should configure limits, since scrypt's
//! `n` and PBKDF2's `c` directly control CPU and memory spent per call.
//!
//! # Example
//!
//! ```rust
//! use keystore_v4::DecryptorConfig;
//!
//! let config = DecryptorConfig::from_json(r#"{ "kdf_limits": { "max_scrypt_n": 262144 } }"#)
//!     .unwrap();
//! assert_eq!(config.kdf_limits.max_scrypt_n, Some(262144));
//! assert_eq!(config.kdf_limits.max_pbkdf2_iterations, None);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// EIP-2335 production scrypt cost `n` (2^18)
pub const EIP2335_SCRYPT_N: u64 = 262_144;
/// EIP-2335 production scrypt block size `r`
pub const EIP2335_SCRYPT_R: u32 = 8;
/// EIP-2335 production scrypt parallelism `p`
pub const EIP2335_SCRYPT_P: u32 = 1;
/// EIP-2335 production PBKDF2 iteration count `c` (2^18)
pub const EIP2335_PBKDF2_C: u32 = 262_144;
/// Largest derived key length accepted by [`KdfLimits::recommended`]
pub const RECOMMENDED_MAX_DKLEN: usize = 64;

/// Errors loading a [`DecryptorConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Upper bounds on KDF cost parameters.
///
/// `None` means unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfLimits {
    /// Maximum scrypt CPU/memory cost `n`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scrypt_n: Option<u64>,
    /// Maximum scrypt block size `r`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scrypt_r: Option<u32>,
    /// Maximum scrypt parallelism `p`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scrypt_p: Option<u32>,
    /// Maximum PBKDF2 iteration count `c`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pbkdf2_iterations: Option<u32>,
    /// Maximum derived key length in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_dklen: Option<usize>,
}

impl KdfLimits {
    /// No limits at all.
    pub const fn unbounded() -> Self {
        Self {
            max_scrypt_n: None,
            max_scrypt_r: None,
            max_scrypt_p: None,
            max_pbkdf2_iterations: None,
            max_dklen: None,
        }
    }

    /// Limits capped at the EIP-2335 production parameters.
    pub const fn recommended() -> Self {
        Self {
            max_scrypt_n: Some(EIP2335_SCRYPT_N),
            max_scrypt_r: Some(EIP2335_SCRYPT_R),
            max_scrypt_p: Some(EIP2335_SCRYPT_P),
            max_pbkdf2_iterations: Some(EIP2335_PBKDF2_C),
            max_dklen: Some(RECOMMENDED_MAX_DKLEN),
        }
    }

    /// Whether any limit is configured
    pub fn is_bounded(&self) -> bool {
        *self != Self::unbounded()
    }
}

/// Configuration for a [`Decryptor`](crate::Decryptor)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecryptorConfig {
    /// KDF cost limits enforced before derivation
    pub kdf_limits: KdfLimits,
}

impl DecryptorConfig {
    /// Config with [`KdfLimits::recommended`]
    pub fn recommended() -> Self {
        Self {
            kdf_limits: KdfLimits::recommended(),
        }
    }

    /// Parse config from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
