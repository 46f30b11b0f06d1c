//! Secret wrapper utilities for decryption keys and recovered secrets
//!
//! Everything the pipeline derives or recovers lives in a [`SecretBytes`],
//! which is zeroized on drop and can only be read via `expose_secret()`.

use secrecy::SecretBox;

pub use secrecy::ExposeSecret;

/// A secret byte vector that is zeroized on drop.
///
/// # Example
///
/// ```rust
/// use keystore_v4::secure::{ExposeSecret, IntoSecret};
///
/// let secret = vec![1u8, 2, 3, 4].into_secret();
/// assert_eq!(secret.expose_secret().as_slice(), &[1, 2, 3, 4]);
/// ```
pub type SecretBytes = SecretBox<Vec<u8>>;

/// Extension trait for moving byte buffers into a [`SecretBytes`].
pub trait IntoSecret {
    /// Convert into a secret value.
    fn into_secret(self) -> SecretBytes;
}

impl IntoSecret for Vec<u8> {
    fn into_secret(self) -> SecretBytes {
        SecretBox::new(Box::new(self))
    }
}

impl IntoSecret for &[u8] {
    fn into_secret(self) -> SecretBytes {
        SecretBox::new(Box::new(self.to_vec()))
    }
}
