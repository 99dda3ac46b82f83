//! String-valued identifiers for subscribers and strategies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Subscriber identity.
///
/// The platform identifies subscribers by their verified account key
/// (typically a lowercased email address). The value is normalized to
/// lowercase at construction so lookups are case-insensitive.
///
/// # Examples
///
/// ```
/// use herald_core::types::SubscriberId;
///
/// let id = SubscriberId::new("Trader@Example.com").unwrap();
/// assert_eq!(id.as_str(), "trader@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(String);

impl SubscriberId {
    /// Creates a new `SubscriberId`, normalizing to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptySubscriberId` if the value is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(ValidationError::EmptySubscriberId);
        }
        Ok(Self(s.trim().to_lowercase()))
    }

    /// Creates a new `SubscriberId` without validation or normalization.
    #[must_use]
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubscriberId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SubscriberId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strategy identity.
///
/// Opaque identifier assigned by the strategy engine collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyId(String);

impl StrategyId {
    /// Creates a new `StrategyId`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyStrategyId` if the value is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::EmptyStrategyId);
        }
        Ok(Self(s))
    }

    /// Creates a new `StrategyId` without validation.
    #[must_use]
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StrategyId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for StrategyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
