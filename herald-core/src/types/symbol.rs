//! Symbol type for representing tradable instrument identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Symbol type - used for representing tradable instrument identifiers.
///
/// Wraps a `String` value with validation to ensure proper format.
/// Symbols are normalized to uppercase, matching the convention of the
/// market data feed ("EURUSD", "XAUUSD", "US30").
///
/// # Examples
///
/// ```
/// use herald_core::types::Symbol;
///
/// let symbol = Symbol::new("xauusd").unwrap();
/// assert_eq!(symbol.as_str(), "XAUUSD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new `Symbol` from a string, normalizing to uppercase.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptySymbol` if the string is empty.
    /// Returns `ValidationError::InvalidSymbol` if the format is invalid.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        if !s
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::InvalidSymbol(s));
        }
        Ok(Self(s.to_uppercase()))
    }

    /// Creates a new `Symbol` without validation.
    ///
    /// The caller must ensure the value is a valid, uppercase symbol.
    #[must_use]
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}
