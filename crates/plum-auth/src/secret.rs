//! The process-wide upload secret

use thiserror::Error;

/// Errors raised while constructing the upload secret
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("upload secret must not be empty")]
    Empty,
}

/// Single shared secret gating write access.
///
/// Constructed once at startup and carried in the application state;
/// read-only afterwards.
#[derive(Clone)]
pub struct UploadSecret {
    value: Vec<u8>,
}

impl UploadSecret {
    /// Create the secret, refusing an empty value so that a missing
    /// configuration entry can never silently authorize everyone.
    pub fn new(value: impl Into<String>) -> Result<Self, SecretError> {
        let value = value.into();
        if value.is_empty() {
            return Err(SecretError::Empty);
        }
        Ok(Self {
            value: value.into_bytes(),
        })
    }

    /// Compare a presented credential against the configured secret.
    ///
    /// The comparison touches every byte of equal-length inputs so that a
    /// mismatch cannot be located by timing the prefix.
    pub fn verify(&self, presented: &[u8]) -> bool {
        !self.value.is_empty() && constant_time_eq(&self.value, presented)
    }
}

impl std::fmt::Debug for UploadSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("UploadSecret(..)")
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_is_refused() {
        assert!(matches!(UploadSecret::new(""), Err(SecretError::Empty)));
    }

    #[test]
    fn test_matching_credential_is_accepted() {
        let secret = UploadSecret::new("owo-whats-this").unwrap();
        assert!(secret.verify(b"owo-whats-this"));
    }

    #[test]
    fn test_mismatched_credential_is_rejected() {
        let secret = UploadSecret::new("owo-whats-this").unwrap();
        assert!(!secret.verify(b"uwu-whats-this"));
        assert!(!secret.verify(b"owo-whats-this-and-more"));
        assert!(!secret.verify(b""));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }
}
