//! Cipher selection and decryption
//!
//! Supported functions:
//! - `xor`: key bytes XORed with ciphertext bytes, one per key byte
//! - `aes-128-ctr`: AES-128 keyed with the first 16 key bytes, CTR mode with
//!   a 128-bit big-endian counter seeded by the IV (no padding)

use aes::Aes128;
use cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use super::error::{DecryptError, DecryptResult};
use crate::secure::{IntoSecret, SecretBytes};

/// XOR function identifier
pub const XOR: &str = "xor";
/// AES-128-CTR function identifier
pub const AES_128_CTR: &str = "aes-128-ctr";

/// IV (initialization vector) length for AES-128-CTR
pub const IV_LENGTH: usize = 16;

/// AES-128 key length
pub const AES_KEY_LENGTH: usize = 16;

/// Type alias for AES-128-CTR cipher
type Aes128Ctr = Ctr128BE<Aes128>;

/// Cipher module as it appears in the keystore
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CipherModule {
    /// Cipher function identifier (e.g., "aes-128-ctr")
    #[serde(default)]
    pub function: String,
    /// Cipher parameters (empty for `xor`)
    #[serde(default)]
    pub params: CipherParams,
    /// Encrypted message as hex string
    #[serde(default)]
    pub message: String,
}

impl CipherModule {
    /// Get the ciphertext bytes
    pub fn ciphertext(&self) -> DecryptResult<Vec<u8>> {
        hex::decode(&self.message).map_err(|_| DecryptError::InvalidCipherMessage)
    }
}

/// Cipher parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CipherParams {
    /// Initialization vector as hex string
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub iv: String,
}

/// A supported cipher with its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cipher {
    Xor,
    Aes128Ctr { iv: [u8; IV_LENGTH] },
}

impl TryFrom<&CipherModule> for Cipher {
    type Error = DecryptError;

    fn try_from(module: &CipherModule) -> DecryptResult<Self> {
        match module.function.as_str() {
            XOR => Ok(Cipher::Xor),
            AES_128_CTR => {
                let iv = hex::decode(&module.params.iv).map_err(|_| DecryptError::InvalidIv)?;
                let iv: [u8; IV_LENGTH] = iv.try_into().map_err(|_| DecryptError::InvalidIv)?;
                Ok(Cipher::Aes128Ctr { iv })
            }
            other => Err(DecryptError::UnsupportedCipher(other.to_string())),
        }
    }
}

impl Cipher {
    /// Function identifier as written in keystores
    pub fn name(&self) -> &'static str {
        match self {
            Cipher::Xor => XOR,
            Cipher::Aes128Ctr { .. } => AES_128_CTR,
        }
    }

    /// Decrypt the ciphertext with the decryption key.
    ///
    /// `xor` yields exactly `decryption_key.len()` bytes; `aes-128-ctr`
    /// yields exactly `ciphertext.len()` bytes.
    pub fn decrypt(&self, decryption_key: &[u8], ciphertext: &[u8]) -> DecryptResult<SecretBytes> {
        debug!(cipher = self.name(), "decrypting secret");

        match self {
            Cipher::Xor => xor_decrypt(decryption_key, ciphertext),
            Cipher::Aes128Ctr { iv } => aes_128_ctr_decrypt(decryption_key, iv, ciphertext),
        }
    }
}

/// XOR the decryption key with the ciphertext.
///
/// The secret is exactly as long as the key; ciphertext bytes past the key
/// length are ignored.
pub fn xor_decrypt(decryption_key: &[u8], ciphertext: &[u8]) -> DecryptResult<SecretBytes> {
    if ciphertext.len() < decryption_key.len() {
        return Err(DecryptError::CiphertextTooShort {
            expected: decryption_key.len(),
            actual: ciphertext.len(),
        });
    }

    let secret: Vec<u8> = decryption_key
        .iter()
        .zip(ciphertext)
        .map(|(k, c)| k ^ c)
        .collect();

    Ok(secret.into_secret())
}

/// Decrypt secret data using AES-128-CTR
///
/// # Arguments
///
/// * `decryption_key` - Derived key; only the first 16 bytes are used
/// * `iv` - 16-byte initialization vector
/// * `ciphertext` - The encrypted data
pub fn aes_128_ctr_decrypt(
    decryption_key: &[u8],
    iv: &[u8; IV_LENGTH],
    ciphertext: &[u8],
) -> DecryptResult<SecretBytes> {
    let key: Zeroizing<[u8; AES_KEY_LENGTH]> = decryption_key
        .get(..AES_KEY_LENGTH)
        .and_then(|k| k.try_into().ok())
        .map(Zeroizing::new)
        .ok_or(DecryptError::KeyTooShort {
            actual: decryption_key.len(),
        })?;

    let mut cipher = Aes128Ctr::new(&(*key).into(), &(*iv).into());

    let mut plaintext = ciphertext.to_vec();
    cipher.apply_keystream(&mut plaintext);

    Ok(plaintext.into_secret())
}
