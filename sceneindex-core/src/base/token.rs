//! Tokens
//!
//! A token is an immutable name shared cheaply between locators, prim type
//! names, and declaration keys.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// An immutable, cheaply clonable name.
///
/// Tokens compare, hash, and order by their string contents.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(Arc<str>);

impl Token {
    /// Create a token from a string.
    pub fn new(text: &str) -> Self {
        Self(Arc::from(text))
    }

    /// The empty token.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// Get the token's text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this is the empty token.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Token {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Token {
    fn from(text: String) -> Self {
        Self(Arc::from(text))
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?})", &*self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_compare_by_contents() {
        let a1 = Token::new("a");
        let a2 = Token::from(String::from("a"));
        let b = Token::from("b");

        assert_eq!(a1, a2);
        assert!(a1 < b);
        assert_eq!(a1.as_str(), "a");
    }

    #[test]
    fn empty_token() {
        assert!(Token::empty().is_empty());
        assert!(Token::default().is_empty());
        assert!(!Token::new("x").is_empty());
    }
}
