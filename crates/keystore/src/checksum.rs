//! SHA-256 checksum verification for keystore integrity
//!
//! The checksum is computed over: decryption_key[16:32] || ciphertext
//!
//! Bytes 0..16 of the key never enter the digest; for `aes-128-ctr` they are
//! the cipher key. A mismatch means either a wrong passphrase or a tampered
//! keystore, and the two are deliberately indistinguishable.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;

use super::cipher::CipherModule;
use super::error::{DecryptError, DecryptResult};

/// Minimum decryption key length accepted by the checksum stage
pub const MIN_KEY_LENGTH: usize = 32;

/// Length of a SHA-256 checksum in bytes
pub const CHECKSUM_LENGTH: usize = 32;

/// Checksum module as it appears in the keystore
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChecksumModule {
    /// Checksum function identifier ("sha256", implied)
    #[serde(default)]
    pub function: String,
    /// Empty params (sha256 has no params)
    #[serde(default)]
    pub params: ChecksumParams,
    /// Checksum value as hex string
    #[serde(default)]
    pub message: String,
}

impl ChecksumModule {
    /// Create a SHA-256 checksum module for a precomputed digest
    pub fn new(checksum: &[u8]) -> Self {
        Self {
            function: "sha256".to_string(),
            params: ChecksumParams {},
            message: hex::encode(checksum),
        }
    }

    /// Get the checksum bytes
    pub fn checksum(&self) -> DecryptResult<Vec<u8>> {
        hex::decode(&self.message).map_err(|_| DecryptError::InvalidChecksumMessage)
    }
}

/// Empty params struct for SHA-256 (required by EIP-2335 schema)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChecksumParams {}

/// Compute checksum over decryption_key[16:32] || ciphertext
pub fn compute_checksum(
    decryption_key: &[u8],
    ciphertext: &[u8],
) -> DecryptResult<[u8; CHECKSUM_LENGTH]> {
    ensure_key_length(decryption_key)?;

    let mut hasher = Sha256::new();
    hasher.update(&decryption_key[16..32]);
    hasher.update(ciphertext);

    Ok(hasher.finalize().into())
}

/// Run the checksum stage and hand back the verified ciphertext.
///
/// Errors, in the order they are checked: `KeyTooShort`,
/// `InvalidCipherMessage`, `InvalidChecksumMessage`, `ChecksumMismatch`.
pub fn verify_checksum(
    decryption_key: &[u8],
    checksum: &ChecksumModule,
    cipher: &CipherModule,
) -> DecryptResult<Vec<u8>> {
    ensure_key_length(decryption_key)?;
    let ciphertext = cipher.ciphertext()?;

    let computed = compute_checksum(decryption_key, &ciphertext)?;
    let expected = checksum.checksum()?;

    if !constant_time_eq(&computed, &expected) {
        return Err(DecryptError::ChecksumMismatch);
    }

    trace!(ciphertext_len = ciphertext.len(), "checksum verified");
    Ok(ciphertext)
}

fn ensure_key_length(decryption_key: &[u8]) -> DecryptResult<()> {
    if decryption_key.len() < MIN_KEY_LENGTH {
        return Err(DecryptError::KeyTooShort {
            actual: decryption_key.len(),
        });
    }
    Ok(())
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xor_cipher(ciphertext: &[u8]) -> CipherModule {
        CipherModule {
            function: "xor".to_string(),
            params: Default::default(),
            message: hex::encode(ciphertext),
        }
    }

    #[test]
    fn test_compute_checksum() {
        let derived_key = vec![0xAA; 32];
        let ciphertext = vec![0xBB; 32];

        let checksum = compute_checksum(&derived_key, &ciphertext).unwrap();
        let checksum2 = compute_checksum(&derived_key, &ciphertext).unwrap();
        assert_eq!(checksum, checksum2);
    }

    #[test]
    fn test_known_checksum() {
        let key = b"0123456789abcdef0123456789abcdef";
        let ciphertext =
            hex::decode("30313233342ce05fa4313b8306e77bf57fc6519d729790f64a8a90d469e88709")
                .unwrap();

        let checksum = compute_checksum(key, &ciphertext).unwrap();
        assert_eq!(
            hex::encode(checksum),
            "470df5e35c6f864638ac463d9d9fee5c054e5a4dc8f057686145e29111b2dea6"
        );
    }

    #[test]
    fn test_verify_checksum_valid() {
        let derived_key = vec![0xAA; 32];
        let ciphertext = vec![0xBB; 32];

        let checksum = compute_checksum(&derived_key, &ciphertext).unwrap();
        let module = ChecksumModule::new(&checksum);

        let verified = verify_checksum(&derived_key, &module, &xor_cipher(&ciphertext)).unwrap();
        assert_eq!(verified, ciphertext);
    }

    #[test]
    fn test_verify_checksum_invalid() {
        let derived_key = vec![0xAA; 32];
        let module = ChecksumModule::new(&[0x00; 32]);

        let result = verify_checksum(&derived_key, &module, &xor_cipher(&[0xBB; 32]));
        assert_eq!(result, Err(DecryptError::ChecksumMismatch));
    }

    #[test]
    fn test_truncated_checksum_mismatch() {
        let derived_key = vec![0xAA; 32];
        let ciphertext = vec![0xBB; 32];
        let checksum = compute_checksum(&derived_key, &ciphertext).unwrap();
        let module = ChecksumModule::new(&checksum[..31]);

        let result = verify_checksum(&derived_key, &module, &xor_cipher(&ciphertext));
        assert_eq!(result, Err(DecryptError::ChecksumMismatch));
    }

    #[test]
    fn test_key_too_short() {
        let module = ChecksumModule::new(&[0x00; 32]);

        for len in [0, 16, 31] {
            let result = verify_checksum(&vec![0xAA; len], &module, &xor_cipher(&[0xBB; 32]));
            assert_eq!(result, Err(DecryptError::KeyTooShort { actual: len }));
        }
    }

    #[test]
    fn test_error_order() {
        let mut cipher = xor_cipher(&[0xBB; 32]);
        cipher.message = "zz".to_string();
        let mut module = ChecksumModule::new(&[0x00; 32]);
        module.message = "zz".to_string();

        // short key wins over bad hex
        let result = verify_checksum(&[0xAA; 8], &module, &cipher);
        assert_eq!(result, Err(DecryptError::KeyTooShort { actual: 8 }));

        // cipher message is decoded before the checksum message
        let result = verify_checksum(&[0xAA; 32], &module, &cipher);
        assert_eq!(result, Err(DecryptError::InvalidCipherMessage));

        let result = verify_checksum(&[0xAA; 32], &module, &xor_cipher(&[0xBB; 32]));
        assert_eq!(result, Err(DecryptError::InvalidChecksumMessage));
    }

    #[test]
    fn test_checksum_uses_second_half_of_key() {
        let ciphertext = vec![0xCC; 32];

        // Create two keys that differ only in first half
        let mut key1 = vec![0xAA; 32];
        let mut key2 = vec![0xBB; 32];
        key1[16..32].copy_from_slice(&[0xFF; 16]);
        key2[16..32].copy_from_slice(&[0xFF; 16]);

        let checksum1 = compute_checksum(&key1, &ciphertext).unwrap();
        let checksum2 = compute_checksum(&key2, &ciphertext).unwrap();
        assert_eq!(checksum1, checksum2);

        key2[16..32].copy_from_slice(&[0xEE; 16]);
        let checksum3 = compute_checksum(&key2, &ciphertext).unwrap();
        assert_ne!(checksum1, checksum3);
    }

    #[test]
    fn test_bytes_past_32_ignored() {
        let ciphertext = vec![0xCC; 32];
        let mut long_key = vec![0xAA; 48];

        let checksum1 = compute_checksum(&long_key, &ciphertext).unwrap();
        long_key[40] = 0x00;
        let checksum2 = compute_checksum(&long_key, &ciphertext).unwrap();

        assert_eq!(checksum1, checksum2);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(&[1, 2, 3], &[1, 2, 3]));
        assert!(!constant_time_eq(&[1, 2, 3], &[1, 2, 4]));
        assert!(!constant_time_eq(&[1, 2, 3], &[1, 2]));
    }

    #[test]
    fn test_checksum_module_serialization() {
        let module = ChecksumModule::new(&[0xEE; 32]);

        let json = serde_json::to_string(&module).unwrap();
        let parsed: ChecksumModule = serde_json::from_str(&json).unwrap();

        assert_eq!(module, parsed);
    }
}
