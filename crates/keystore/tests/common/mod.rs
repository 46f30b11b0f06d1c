//! Shared fixtures for integration tests
//!
//! The library only decrypts, so keystores for round-trip tests are produced
//! here from the library's own primitives. CTR mode and XOR are their own
//! inverse, which makes the decrypt functions usable for encryption.

#![allow(dead_code)]

use keystore_v4::cipher::{aes_128_ctr_decrypt, xor_decrypt, IV_LENGTH};
use keystore_v4::kdf::{pbkdf2_derive_key, scrypt_derive_key};
use keystore_v4::{compute_checksum, ExposeSecret, IntoSecret, SecretBytes};
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

/// Salt shared by the fixed vectors
pub const SALT: &str = "d4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3";

/// IV shared by the fixed vectors
pub const IV: &str = "264daa3f303d7259501c93d997d84fe6";

/// Secret recovered by every fixed vector
pub const SECRET: &str = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";

/// Install a test subscriber once; `RUST_LOG` controls verbosity
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// KDF choice for fixture keystores
#[derive(Debug, Clone)]
pub enum TestKdf {
    None,
    Scrypt { n: u64, r: u32, p: u32, dklen: usize },
    Pbkdf2 { c: u32, dklen: usize },
}

/// Cipher choice for fixture keystores
#[derive(Debug, Clone, Copy)]
pub enum TestCipher {
    Xor,
    Aes128Ctr,
}

/// Build a keystore record encrypting `secret` under `passphrase`.
///
/// XOR keystores always decrypt to exactly the key length, so `secret` is
/// zero-padded or truncated to the derived key length for [`TestCipher::Xor`].
pub fn encrypt(
    secret: &[u8],
    passphrase: &[u8],
    kdf: &TestKdf,
    cipher: TestCipher,
    salt: &[u8],
    iv: &[u8; IV_LENGTH],
) -> Value {
    let (key, kdf_json) = match kdf {
        TestKdf::None => (passphrase.into_secret(), Value::Null),
        TestKdf::Scrypt { n, r, p, dklen } => (
            scrypt_derive_key(passphrase, salt, *n, *r, *p, *dklen).expect("scrypt"),
            json!({
                "function": "scrypt",
                "params": { "dklen": dklen, "n": n, "r": r, "p": p, "salt": hex::encode(salt) },
                "message": ""
            }),
        ),
        TestKdf::Pbkdf2 { c, dklen } => (
            pbkdf2_derive_key(passphrase, salt, *c, *dklen).expect("pbkdf2"),
            json!({
                "function": "pbkdf2",
                "params": { "dklen": dklen, "c": c, "prf": "hmac-sha256", "salt": hex::encode(salt) },
                "message": ""
            }),
        ),
    };
    let key = key.expose_secret();

    let (ciphertext, cipher_json): (SecretBytes, Value) = match cipher {
        TestCipher::Xor => {
            let mut padded = secret.to_vec();
            padded.resize(key.len(), 0);
            (
                xor_decrypt(key, &padded).expect("xor"),
                json!({ "function": "xor", "params": {} }),
            )
        }
        TestCipher::Aes128Ctr => (
            aes_128_ctr_decrypt(key, iv, secret).expect("aes"),
            json!({ "function": "aes-128-ctr", "params": { "iv": hex::encode(iv) } }),
        ),
    };
    let ciphertext = ciphertext.expose_secret();

    let checksum = compute_checksum(key, ciphertext).expect("checksum");

    let mut record = json!({
        "checksum": { "function": "sha256", "params": {}, "message": hex::encode(checksum) },
        "cipher": cipher_json,
    });
    record["cipher"]["message"] = json!(hex::encode(ciphertext));
    if !kdf_json.is_null() {
        record["kdf"] = kdf_json;
    }
    record
}

/// Record built from hex fixtures
pub fn record(kdf: Value, checksum: &str, cipher: &str, ciphertext: &str) -> Value {
    let mut record = json!({
        "checksum": { "function": "sha256", "params": {}, "message": checksum },
        "cipher": {
            "function": cipher,
            "params": { "iv": IV },
            "message": ciphertext
        }
    });
    if !kdf.is_null() {
        record["kdf"] = kdf;
    }
    record
}

/// scrypt KDF module with the shared salt
pub fn scrypt_kdf(n: u64, r: u32, p: u32, dklen: usize) -> Value {
    json!({
        "function": "scrypt",
        "params": { "dklen": dklen, "n": n, "r": r, "p": p, "salt": SALT },
        "message": ""
    })
}

/// PBKDF2 KDF module with the shared salt
pub fn pbkdf2_kdf(c: u32, prf: &str, dklen: usize) -> Value {
    json!({
        "function": "pbkdf2",
        "params": { "dklen": dklen, "c": c, "prf": prf, "salt": SALT },
        "message": ""
    })
}

/// Borrow a record as the untyped map the decrypt entry point takes
pub fn as_map(record: &Value) -> &Map<String, Value> {
    record.as_object().expect("record is an object")
}
