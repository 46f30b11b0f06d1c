//! Key Derivation Function (KDF) selection
//!
//! A keystore names its KDF by string. That string is resolved exactly once,
//! into the closed [`Kdf`] enum, and derivation dispatches on the enum. The
//! salt is decoded before the function name is inspected, so a bad salt is
//! reported even for an unsupported function.
//!
//! Supported functions:
//! - `scrypt` with `n` (power of two), `r`, `p`
//! - `pbkdf2` with `c` iterations of `hmac-sha256`

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, warn};

use crate::config::KdfLimits;
use crate::error::{DecryptError, DecryptResult};
use crate::secure::{IntoSecret, SecretBytes};

/// scrypt function identifier
pub const SCRYPT: &str = "scrypt";
/// PBKDF2 function identifier
pub const PBKDF2: &str = "pbkdf2";
/// The only PBKDF2 pseudorandom function supported
pub const HMAC_SHA256: &str = "hmac-sha256";

/// Largest derived key either function can produce: (2^32 - 1) SHA-256 blocks
pub const MAX_DKLEN: u64 = u32::MAX as u64 * 32;

/// KDF module as it appears in the keystore
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KdfModule {
    /// KDF function identifier (e.g., "scrypt")
    #[serde(default)]
    pub function: String,
    /// KDF parameters
    pub params: KdfParams,
    /// Empty message field (required by EIP-2335 schema)
    #[serde(default)]
    pub message: String,
}

/// Raw KDF parameters, the union of every supported function's fields.
///
/// Fields not present in the keystore take their zero value; the KDF stage
/// decides whether that is acceptable for the named function.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KdfParams {
    /// Derived key length in bytes
    pub dklen: usize,
    /// scrypt CPU/memory cost (power of 2)
    #[serde(skip_serializing_if = "is_zero_u64")]
    pub n: u64,
    /// scrypt block size
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub r: u32,
    /// scrypt parallelization
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub p: u32,
    /// PBKDF2 iteration count
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub c: u32,
    /// PBKDF2 pseudorandom function
    #[serde(skip_serializing_if = "String::is_empty")]
    pub prf: String,
    /// Salt as hex string
    pub salt: String,
}

fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

/// PBKDF2 pseudorandom function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prf {
    HmacSha256,
}

impl TryFrom<&str> for Prf {
    type Error = DecryptError;

    fn try_from(name: &str) -> DecryptResult<Self> {
        match name {
            HMAC_SHA256 => Ok(Prf::HmacSha256),
            other => Err(DecryptError::UnsupportedPrf(other.to_string())),
        }
    }
}

/// Validated scrypt parameters
#[derive(Clone, PartialEq, Eq)]
pub struct ScryptParams {
    pub dklen: usize,
    pub n: u64,
    pub r: u32,
    pub p: u32,
    pub salt: Vec<u8>,
}

/// Validated PBKDF2 parameters
#[derive(Clone, PartialEq, Eq)]
pub struct Pbkdf2Params {
    pub dklen: usize,
    pub c: u32,
    pub prf: Prf,
    pub salt: Vec<u8>,
}

/// A supported key derivation function with its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kdf {
    Scrypt(ScryptParams),
    Pbkdf2(Pbkdf2Params),
}

impl fmt::Debug for ScryptParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScryptParams")
            .field("dklen", &self.dklen)
            .field("n", &self.n)
            .field("r", &self.r)
            .field("p", &self.p)
            .field("salt", &hex::encode(&self.salt))
            .finish()
    }
}

impl fmt::Debug for Pbkdf2Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pbkdf2Params")
            .field("dklen", &self.dklen)
            .field("c", &self.c)
            .field("prf", &self.prf)
            .field("salt", &hex::encode(&self.salt))
            .finish()
    }
}

impl TryFrom<&KdfModule> for Kdf {
    type Error = DecryptError;

    fn try_from(module: &KdfModule) -> DecryptResult<Self> {
        let params = &module.params;
        let salt = hex::decode(&params.salt).map_err(|_| DecryptError::InvalidSalt)?;

        match module.function.as_str() {
            SCRYPT => Ok(Kdf::Scrypt(ScryptParams {
                dklen: params.dklen,
                n: params.n,
                r: params.r,
                p: params.p,
                salt,
            })),
            PBKDF2 => Ok(Kdf::Pbkdf2(Pbkdf2Params {
                dklen: params.dklen,
                c: params.c,
                prf: Prf::try_from(params.prf.as_str())?,
                salt,
            })),
            other => Err(DecryptError::UnsupportedKdf(other.to_string())),
        }
    }
}

impl Kdf {
    /// Function identifier as written in keystores
    pub fn name(&self) -> &'static str {
        match self {
            Kdf::Scrypt(_) => SCRYPT,
            Kdf::Pbkdf2(_) => PBKDF2,
        }
    }

    /// Requested derived key length
    pub fn dklen(&self) -> usize {
        match self {
            Kdf::Scrypt(params) => params.dklen,
            Kdf::Pbkdf2(params) => params.dklen,
        }
    }

    /// Reject parameters above the configured cost limits
    pub fn check_limits(&self, limits: &KdfLimits) -> DecryptResult<()> {
        check_limit("dklen", self.dklen() as u64, limits.max_dklen.map(|v| v as u64))?;

        match self {
            Kdf::Scrypt(params) => {
                check_limit("n", params.n, limits.max_scrypt_n)?;
                check_limit("r", params.r.into(), limits.max_scrypt_r.map(u64::from))?;
                check_limit("p", params.p.into(), limits.max_scrypt_p.map(u64::from))
            }
            Kdf::Pbkdf2(params) => check_limit(
                "c",
                params.c.into(),
                limits.max_pbkdf2_iterations.map(u64::from),
            ),
        }
    }

    /// Derive the decryption key from the passphrase
    pub fn derive_key(&self, passphrase: &[u8]) -> DecryptResult<SecretBytes> {
        debug!(kdf = self.name(), dklen = self.dklen(), "deriving decryption key");

        match self {
            Kdf::Scrypt(params) => scrypt_derive_key(
                passphrase,
                &params.salt,
                params.n,
                params.r,
                params.p,
                params.dklen,
            ),
            Kdf::Pbkdf2(params) => match params.prf {
                Prf::HmacSha256 => {
                    pbkdf2_derive_key(passphrase, &params.salt, params.c, params.dklen)
                }
            },
        }
    }
}

fn check_limit(param: &'static str, value: u64, limit: Option<u64>) -> DecryptResult<()> {
    match limit {
        Some(limit) if value > limit => Err(DecryptError::KdfCostExceeded {
            param,
            value,
            limit,
        }),
        _ => Ok(()),
    }
}

/// Produce the decryption key for a keystore.
///
/// Without a KDF module the passphrase bytes are the key, unchanged.
pub fn derive_key(
    module: Option<&KdfModule>,
    passphrase: &[u8],
    limits: &KdfLimits,
) -> DecryptResult<SecretBytes> {
    let Some(module) = module else {
        warn!("keystore has no KDF, using passphrase as decryption key");
        return Ok(passphrase.into_secret());
    };

    let kdf = Kdf::try_from(module)?;
    kdf.check_limits(limits)?;
    kdf.derive_key(passphrase)
}

/// Zeroed output buffer for a derived key of `dklen` bytes.
///
/// `dklen` comes straight from the keystore, so an impossible length is an
/// error rather than an allocation failure.
fn key_buffer(dklen: usize) -> DecryptResult<Vec<u8>> {
    if dklen as u64 > MAX_DKLEN {
        return Err(DecryptError::InvalidKdfParams(format!(
            "dklen {} exceeds maximum {}",
            dklen, MAX_DKLEN
        )));
    }

    let mut output = Vec::new();
    output
        .try_reserve_exact(dklen)
        .map_err(|e| DecryptError::InvalidKdfParams(format!("dklen {}: {}", dklen, e)))?;
    output.resize(dklen, 0);
    Ok(output)
}

/// Derive a key using scrypt KDF
///
/// # Arguments
///
/// * `passphrase` - User passphrase bytes
/// * `salt` - Salt bytes
/// * `n` - CPU/memory cost parameter (power of 2, at least 2)
/// * `r` - Block size parameter
/// * `p` - Parallelization parameter
/// * `dklen` - Desired key length in bytes
pub fn scrypt_derive_key(
    passphrase: &[u8],
    salt: &[u8],
    n: u64,
    r: u32,
    p: u32,
    dklen: usize,
) -> DecryptResult<SecretBytes> {
    if n < 2 || !n.is_power_of_two() {
        return Err(DecryptError::InvalidKdfParams(format!(
            "scrypt n must be a power of 2 greater than 1, got {}",
            n
        )));
    }
    if r == 0 || p == 0 {
        return Err(DecryptError::InvalidKdfParams(format!(
            "scrypt r and p must be at least 1, got r = {}, p = {}",
            r, p
        )));
    }
    let log_n = n.trailing_zeros() as u8;

    // `len` only matters for PHC strings; output length comes from the buffer.
    let params = scrypt::Params::new(log_n, r, p, scrypt::Params::RECOMMENDED_LEN)
        .map_err(|e| DecryptError::InvalidKdfParams(e.to_string()))?;

    let mut output = key_buffer(dklen)?;
    scrypt::scrypt(passphrase, salt, &params, &mut output)
        .map_err(|e| DecryptError::InvalidKdfParams(e.to_string()))?;

    Ok(output.into_secret())
}

/// Derive a key using PBKDF2-HMAC-SHA256
///
/// # Arguments
///
/// * `passphrase` - User passphrase bytes
/// * `salt` - Salt bytes
/// * `c` - Iteration count (at least 1)
/// * `dklen` - Desired key length in bytes
pub fn pbkdf2_derive_key(
    passphrase: &[u8],
    salt: &[u8],
    c: u32,
    dklen: usize,
) -> DecryptResult<SecretBytes> {
    if c == 0 {
        return Err(DecryptError::InvalidKdfParams(
            "pbkdf2 iteration count must be at least 1".to_string(),
        ));
    }

    let mut output = key_buffer(dklen)?;
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, salt, c, &mut output);

    Ok(output.into_secret())
}
