//! Typed keystore record and the conversion from untyped JSON
//!
//! Keystores arrive as loosely-typed JSON. They are mapped onto
//! [`KeystoreRecord`] exactly once, before any cryptographic work, and only
//! the shape is checked here: each module's contents are validated by the
//! stage that consumes it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::checksum::ChecksumModule;
use super::cipher::CipherModule;
use super::error::{DecryptError, DecryptResult};
use super::kdf::KdfModule;

/// The `crypto` section of an EIP-2335 keystore
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KeystoreRecord {
    /// Key derivation function; absent means the passphrase is the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<KdfModule>,
    /// Checksum for integrity verification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<ChecksumModule>,
    /// Cipher parameters and encrypted data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cipher: Option<CipherModule>,
}

/// A record whose required modules are known to be present
#[derive(Debug, Clone, Copy)]
pub struct ValidatedRecord<'a> {
    pub kdf: Option<&'a KdfModule>,
    pub checksum: &'a ChecksumModule,
    pub cipher: &'a CipherModule,
}

impl KeystoreRecord {
    /// Map an untyped keyed structure onto the record shape
    pub fn from_map(map: &Map<String, Value>) -> DecryptResult<Self> {
        Ok(Self::deserialize(&Value::Object(map.clone()))?)
    }

    /// Map any JSON value onto the record shape; non-objects are malformed
    pub fn from_value(value: &Value) -> DecryptResult<Self> {
        match value {
            Value::Object(_) => Ok(Self::deserialize(value)?),
            other => Err(DecryptError::MalformedKeystore(format!(
                "expected object, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Parse JSON text into the record shape
    pub fn from_json(json: &str) -> DecryptResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Extract the record from a complete EIP-2335 keystore document.
    ///
    /// The document's `crypto` object is the record; the surrounding
    /// `uuid`, `pubkey`, `path`, `version` and `description` are ignored.
    pub fn from_document(document: &Value) -> DecryptResult<Self> {
        match document.get("crypto") {
            Some(crypto) => Self::from_value(crypto),
            None => Err(DecryptError::MalformedKeystore(
                "keystore document has no crypto section".to_string(),
            )),
        }
    }

    /// Check that the checksum and cipher modules are present
    pub fn validate(&self) -> DecryptResult<ValidatedRecord<'_>> {
        let checksum = self.checksum.as_ref().ok_or(DecryptError::MissingChecksum)?;
        let cipher = self.cipher.as_ref().ok_or(DecryptError::MissingCipher)?;

        Ok(ValidatedRecord {
            kdf: self.kdf.as_ref(),
            checksum,
            cipher,
        })
    }
}

impl TryFrom<&Map<String, Value>> for KeystoreRecord {
    type Error = DecryptError;

    fn try_from(map: &Map<String, Value>) -> DecryptResult<Self> {
        Self::from_map(map)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
