//! Verified decryption pipeline
//!
//! Validator → KDF → checksum → cipher. Each stage either hands its output to
//! the next or fails the whole call; nothing partial is ever returned.

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::checksum::verify_checksum;
use crate::cipher::Cipher;
use crate::config::{DecryptorConfig, KdfLimits};
use crate::error::DecryptResult;
use crate::kdf::derive_key;
use crate::record::KeystoreRecord;
use crate::secure::{ExposeSecret, SecretBytes};

/// Decrypts version 4 keystores.
///
/// Holds nothing but configuration, so a single instance can be shared
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct Decryptor {
    config: DecryptorConfig,
}

impl Decryptor {
    /// Keystore format name
    pub const NAME: &'static str = "keystore";

    /// Keystore format version
    pub const VERSION: u32 = 4;

    /// Create a decryptor with no KDF cost limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decryptor with the given configuration
    pub fn with_config(config: DecryptorConfig) -> Self {
        Self { config }
    }

    /// Create a decryptor enforcing the given KDF cost limits
    pub fn with_limits(kdf_limits: KdfLimits) -> Self {
        Self::with_config(DecryptorConfig { kdf_limits })
    }

    /// Active configuration
    pub fn config(&self) -> &DecryptorConfig {
        &self.config
    }

    /// Decrypt an untyped keystore record
    pub fn decrypt(
        &self,
        record: &Map<String, Value>,
        passphrase: &[u8],
    ) -> DecryptResult<SecretBytes> {
        let record = KeystoreRecord::from_map(record)?;
        self.decrypt_record(&record, passphrase)
    }

    /// Decrypt a keystore record held in any JSON value
    pub fn decrypt_value(&self, record: &Value, passphrase: &[u8]) -> DecryptResult<SecretBytes> {
        let record = KeystoreRecord::from_value(record)?;
        self.decrypt_record(&record, passphrase)
    }

    /// Decrypt a keystore record given as JSON text
    pub fn decrypt_json(&self, record: &str, passphrase: &[u8]) -> DecryptResult<SecretBytes> {
        let record = KeystoreRecord::from_json(record)?;
        self.decrypt_record(&record, passphrase)
    }

    /// Decrypt a complete EIP-2335 keystore document (`crypto` plus metadata)
    pub fn decrypt_document(
        &self,
        document: &Value,
        passphrase: &[u8],
    ) -> DecryptResult<SecretBytes> {
        let record = KeystoreRecord::from_document(document)?;
        self.decrypt_record(&record, passphrase)
    }

    /// Decrypt an already-typed keystore record
    #[instrument(skip_all, name = "decrypt_keystore")]
    pub fn decrypt_record(
        &self,
        record: &KeystoreRecord,
        passphrase: &[u8],
    ) -> DecryptResult<SecretBytes> {
        let record = record.validate()?;

        let decryption_key = derive_key(record.kdf, passphrase, &self.config.kdf_limits)?;
        let decryption_key = decryption_key.expose_secret();

        let ciphertext = verify_checksum(decryption_key, record.checksum, record.cipher)?;

        let cipher = Cipher::try_from(record.cipher)?;
        let secret = cipher.decrypt(decryption_key, &ciphertext)?;

        debug!(
            kdf = record.kdf.map(|kdf| kdf.function.as_str()).unwrap_or("none"),
            cipher = cipher.name(),
            "keystore decrypted"
        );
        Ok(secret)
    }
}

/// Decrypt an untyped keystore record with a default [`Decryptor`].
///
/// # Example
///
/// ```rust
/// use keystore_v4::{decrypt, DecryptError};
/// use serde_json::json;
///
/// let record = json!({
///     "checksum": { "message": "00" },
///     "cipher": { "function": "xor", "message": "00" },
/// });
/// let record = record.as_object().unwrap();
///
/// // without a KDF the passphrase is the key, and it must be 32 bytes
/// let result = decrypt(record, b"short");
/// assert_eq!(result.err(), Some(DecryptError::KeyTooShort { actual: 5 }));
/// ```
pub fn decrypt(record: &Map<String, Value>, passphrase: &[u8]) -> DecryptResult<SecretBytes> {
    Decryptor::new().decrypt(record, passphrase)
}
