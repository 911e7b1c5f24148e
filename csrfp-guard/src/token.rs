use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::fmt;
use subtle::ConstantTimeEq;

/// Length used when none is configured.
pub const DEFAULT_TOKEN_LENGTH: usize = 10;

/// Length substituted for a configured length of zero.
pub const FALLBACK_TOKEN_LENGTH: usize = 32;

/// Longest token either source can produce.
pub const MAX_TOKEN_LENGTH: usize = 128;

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Resolve a configured length to the length of generated tokens.
pub fn effective_length(length: usize) -> usize {
    match length {
        0 => FALLBACK_TOKEN_LENGTH,
        n => n.min(MAX_TOKEN_LENGTH),
    }
}

/// Opaque anti-forgery token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare against a submitted value in constant time.
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(&self.0, candidate)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Where the raw token material comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenSource {
    /// SHA-512 digest of 64 random bytes, hex encoded
    #[default]
    Sha512,
    /// 128 random characters from `[a-z0-9]`
    ///
    /// Kept for deployments that must keep issuing tokens in the old
    /// alphabet. Both sources draw from the same CSPRNG.
    Alphanumeric,
}

/// Token generator
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenGenerator {
    source: TokenSource,
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source: TokenSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> TokenSource {
        self.source
    }

    /// Generate a token of `length` characters.
    ///
    /// `length` goes through [`effective_length`] first, so zero yields 32
    /// characters and anything above 128 yields 128.
    pub fn generate(&self, length: usize) -> Token {
        let length = effective_length(length);
        let mut raw = match self.source {
            TokenSource::Sha512 => sha512_material(),
            TokenSource::Alphanumeric => alphanumeric_material(),
        };
        // both sources are ASCII
        raw.truncate(length);
        Token(raw)
    }
}

fn sha512_material() -> String {
    let mut seed = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut seed);
    hex::encode(Sha512::digest(seed))
}

fn alphanumeric_material() -> String {
    let mut rng = rand::thread_rng();
    (0..MAX_TOKEN_LENGTH)
        .map(|_| ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_length() {
        let token = TokenGenerator::new().generate(DEFAULT_TOKEN_LENGTH);
        assert_eq!(token.len(), 10);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_zero_length_becomes_32() {
        assert_eq!(TokenGenerator::new().generate(0).len(), 32);
        assert_eq!(
            TokenGenerator::with_source(TokenSource::Alphanumeric)
                .generate(0)
                .len(),
            32
        );
    }

    #[test]
    fn test_length_is_clamped() {
        assert_eq!(TokenGenerator::new().generate(500).len(), MAX_TOKEN_LENGTH);
        assert_eq!(TokenGenerator::new().generate(128).len(), 128);
    }

    #[test]
    fn test_alphanumeric_source_exact_length() {
        let generator = TokenGenerator::with_source(TokenSource::Alphanumeric);
        for length in [1, 10, 64, 127, 128] {
            let token = generator.generate(length);
            assert_eq!(token.len(), length);
            assert!(
                token
                    .as_str()
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
            );
        }
    }

    #[test]
    fn test_tokens_differ() {
        let generator = TokenGenerator::new();
        let a = generator.generate(32);
        let b = generator.generate(32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_matches() {
        let token = Token::new("abc123");
        assert!(token.matches("abc123"));
        assert!(!token.matches("abc12"));
        assert!(!token.matches("abc1234"));
        assert!(!token.matches(""));
    }
}
