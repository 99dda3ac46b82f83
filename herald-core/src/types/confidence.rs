//! Confidence type for bounded 0-100 signal confidence values.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Signal confidence, bounded to the range 0-100.
///
/// Strategy signals carry a confidence score; subscriptions carry a
/// minimum-confidence threshold. Both use this type so an out-of-range
/// value cannot enter the system.
///
/// # Examples
///
/// ```
/// use herald_core::types::Confidence;
///
/// let c = Confidence::new(72).unwrap();
/// assert_eq!(c.as_u8(), 72);
/// assert!(Confidence::new(101).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    /// Minimum confidence (matches everything).
    pub const MIN: Self = Self(0);

    /// Maximum confidence.
    pub const MAX: Self = Self(100);

    /// Creates a new `Confidence`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ConfidenceOutOfRange` if the value
    /// exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if value > 100 {
            return Err(ValidationError::ConfidenceOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Creates a new `Confidence` without validation.
    ///
    /// The caller must ensure the value is at most 100.
    #[must_use]
    pub const fn new_unchecked(value: u8) -> Self {
        Self(value)
    }

    /// Returns the confidence as a `u8`.
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Confidence {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for u8 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_valid() {
        assert_eq!(Confidence::new(0).unwrap(), Confidence::MIN);
        assert_eq!(Confidence::new(100).unwrap(), Confidence::MAX);
    }

    #[test]
    fn test_confidence_out_of_range() {
        assert!(matches!(
            Confidence::new(101),
            Err(ValidationError::ConfidenceOutOfRange(101))
        ));
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::new(60).unwrap() < Confidence::new(72).unwrap());
    }

    #[test]
    fn test_confidence_serde_rejects_out_of_range() {
        let result: Result<Confidence, _> = serde_json::from_str("150");
        assert!(result.is_err());

        let parsed: Confidence = serde_json::from_str("72").unwrap();
        assert_eq!(parsed.as_u8(), 72);
    }
}
