//! Verified decryption of EIP-2335 version 4 keystores
//!
//! This crate provides:
//! - Mapping of untyped keystore JSON onto a typed record
//! - Key derivation via scrypt or PBKDF2-HMAC-SHA256 (or none)
//! - SHA-256 checksum verification over `key[16..32] || ciphertext`
//! - Decryption via AES-128-CTR or XOR
//!
//! The secret is only returned once the checksum has matched. A wrong
//! passphrase and a tampered keystore both surface as
//! [`DecryptError::ChecksumMismatch`].
//!
//! # Example
//!
//! ```rust,ignore
//! use keystore_v4::{Decryptor, DecryptorConfig, ExposeSecret};
//!
//! let document: serde_json::Value = serde_json::from_str(&keystore_json)?;
//! let decryptor = Decryptor::with_config(DecryptorConfig::recommended());
//! let secret = decryptor.decrypt_document(&document, passphrase.as_bytes())?;
//! let secret_key_bytes = secret.expose_secret();
//! ```
//!
//! # Resource use
//!
//! KDF cost parameters come from the keystore itself. Keystores from
//! untrusted sources should be decrypted with [`KdfLimits`] configured.

pub mod checksum;
pub mod cipher;
pub mod config;
pub mod decryptor;
pub mod error;
pub mod kdf;
pub mod record;
pub mod secure;

// Pipeline exports
pub use decryptor::{decrypt, Decryptor};

// Record exports
pub use checksum::{compute_checksum, ChecksumModule};
pub use self::cipher::{Cipher, CipherModule, CipherParams};
pub use kdf::{Kdf, KdfModule, KdfParams, Prf};
pub use record::KeystoreRecord;

// Config exports
pub use config::{ConfigError, DecryptorConfig, KdfLimits};

// Error exports
pub use error::{DecryptError, DecryptResult, Stage};

// Secure memory exports
pub use secure::{ExposeSecret, IntoSecret, SecretBytes};
