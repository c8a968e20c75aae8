//! Document identifier generation.
//!
//! Identifiers are short lowercase base-36 codes derived from a digest
//! of the document content, a timestamp and a random salt. The
//! [`IdRegistry`] remembers every code it has issued or been told about
//! and retries with a new salt on collision.

use crate::error::{CoreError, CoreResult};
use parking_lot::Mutex;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::debug;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Derives a code from a seed, a timestamp and a salt.
///
/// The digest of `seed|timestamp|salt` is read as a big-endian unsigned
/// integer and written in base 36, then truncated or right-padded with
/// `'0'` to `length`. A code that would start with a digit gets an `'a'`
/// prepended and is truncated again, so every code starts with a letter.
#[must_use]
pub fn derive_code(seed: &str, timestamp: i64, salt: u64, length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(b"|");
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(salt.to_string().as_bytes());
    let digest = hasher.finalize();

    let mut code = to_base36(&digest);
    code.truncate(length);
    while code.len() < length {
        code.push('0');
    }
    if code.starts_with(|c: char| c.is_ascii_digit()) {
        code.insert(0, 'a');
        code.truncate(length);
    }
    code
}

/// Base-36 digits of a big-endian unsigned integer, most significant first.
fn to_base36(bytes: &[u8]) -> String {
    let mut number: Vec<u8> = bytes.iter().copied().skip_while(|&b| b == 0).collect();
    let mut digits = Vec::new();
    while !number.is_empty() {
        let mut quotient = Vec::with_capacity(number.len());
        let mut remainder = 0u32;
        for &byte in &number {
            let acc = (remainder << 8) | u32::from(byte);
            let q = acc / 36;
            remainder = acc % 36;
            if !quotient.is_empty() || q != 0 {
                // q < 256 because remainder < 36
                quotient.push(q as u8);
            }
        }
        digits.push(ALPHABET[remainder as usize]);
        number = quotient;
    }
    if digits.is_empty() {
        digits.push(b'0');
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// The set of issued identifiers.
///
/// One registry is shared by every owner of a store so identifiers are
/// unique across the whole store. Tests construct their own instead of
/// sharing one.
#[derive(Debug)]
pub struct IdRegistry {
    issued: Mutex<HashSet<String>>,
    length: usize,
    max_attempts: u32,
}

impl IdRegistry {
    /// Creates an empty registry issuing codes of `length` characters.
    #[must_use]
    pub fn new(length: usize, max_attempts: u32) -> Self {
        Self {
            issued: Mutex::new(HashSet::new()),
            length,
            max_attempts,
        }
    }

    /// Generates a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IdGenerationExhausted`] when `max_attempts`
    /// salts all collide.
    pub fn generate(&self, seed: &str, timestamp: i64) -> CoreResult<String> {
        let mut rng = rand::thread_rng();
        let mut issued = self.issued.lock();
        for attempt in 0..self.max_attempts {
            let code = derive_code(seed, timestamp, rng.gen(), self.length);
            if issued.insert(code.clone()) {
                return Ok(code);
            }
            debug!(attempt, code = %code, "identifier collision, retrying");
        }
        Err(CoreError::IdGenerationExhausted {
            attempts: self.max_attempts,
            length: self.length,
        })
    }

    /// Records an identifier issued elsewhere (e.g. read from disk).
    ///
    /// Returns `false` if it was already known.
    pub fn register(&self, id: &str) -> bool {
        self.issued.lock().insert(id.to_string())
    }

    /// Forgets an identifier.
    pub fn release(&self, id: &str) -> bool {
        self.issued.lock().remove(id)
    }

    /// Whether an identifier has been issued.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.issued.lock().contains(id)
    }

    /// Number of issued identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issued.lock().len()
    }

    /// Whether nothing has been issued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issued.lock().is_empty()
    }

    /// Forgets every identifier.
    pub fn reset(&self) {
        self.issued.lock().clear();
    }

    /// Configured code length.
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for IdRegistry {
    fn default() -> Self {
        Self::new(7, 64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_conversion() {
        assert_eq!(to_base36(&[0]), "0");
        assert_eq!(to_base36(&[35]), "z");
        assert_eq!(to_base36(&[36]), "10");
        assert_eq!(to_base36(&[1, 0]), "74");
        assert_eq!(to_base36(&[0xff, 0xff]), "1ekf");
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_code("Capitals", 1_700_000_000_000, 42, 7);
        let b = derive_code("Capitals", 1_700_000_000_000, 42, 7);
        assert_eq!(a, b);
        assert_eq!(a.len(), 7);
        assert!(a.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert!(a.starts_with(|c: char| c.is_ascii_lowercase()));
        assert_ne!(a, derive_code("Capitals", 1_700_000_000_000, 43, 7));
    }

    #[test]
    fn ten_thousand_unique_ids() {
        let ids = IdRegistry::default();
        let mut seen = HashSet::new();
        for i in 0..10_000i64 {
            let id = ids.generate(&format!("doc-{}", i % 17), i).unwrap();
            assert_eq!(id.len(), 7);
            assert!(id.starts_with(|c: char| c.is_ascii_lowercase()));
            assert!(seen.insert(id));
        }
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn exhaustion_is_an_error() {
        // One-character codes that must start with a letter: 26 possible.
        let ids = IdRegistry::new(1, 8);
        let mut result = Ok(String::new());
        for i in 0..200 {
            result = ids.generate("x", i);
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(
            result,
            Err(CoreError::IdGenerationExhausted { attempts: 8, length: 1 })
        ));
    }

    #[test]
    fn register_and_reset() {
        let ids = IdRegistry::default();
        assert!(ids.register("abc1234"));
        assert!(!ids.register("abc1234"));
        assert!(ids.contains("abc1234"));
        ids.reset();
        assert!(ids.is_empty());
    }
}
