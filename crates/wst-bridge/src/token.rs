use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-chosen correlation value, echoed verbatim in the completion that
/// answers the request. The bridge never inspects or deduplicates it.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(pub u64);

impl Token {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Self(u64::from(value))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_hash_prefixed() {
        assert_eq!(Token::new(42).to_string(), "#42");
        assert_eq!(format!("{:?}", Token::from(7u32)), "#7");
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&Token::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Token::new(9));
    }
}
