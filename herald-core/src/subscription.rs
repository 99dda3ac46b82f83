//! Subscription filter configuration and records.
//!
//! A subscription is a subscriber's standing filter over the event
//! stream. Scopes support a first-class wildcard, serialized as the
//! string `"*"`; an empty explicit set means "match nothing" and is
//! rejected at validation time rather than silently widened.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::channel::Channel;
use crate::error::RegistryError;
use crate::event::EventType;
use crate::types::{Confidence, StrategyId, SubscriberId, SubscriptionId, Symbol, Timestamp};

/// The wildcard scope marker, serialized as the string `"*"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wildcard;

impl Serialize for Wildcard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("*")
    }
}

impl<'de> Deserialize<'de> for Wildcard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == "*" {
            Ok(Self)
        } else {
            Err(de::Error::invalid_value(
                de::Unexpected::Str(&s),
                &"the wildcard string \"*\"",
            ))
        }
    }
}

/// Strategy scope: every strategy, or exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrategyScope {
    /// Match any strategy.
    Any(Wildcard),
    /// Match one strategy by id.
    Exact(StrategyId),
}

impl StrategyScope {
    /// Wildcard scope.
    pub const ANY: Self = Self::Any(Wildcard);

    /// Returns true if this scope accepts the given strategy.
    #[must_use]
    pub fn matches(&self, strategy_id: &StrategyId) -> bool {
        match self {
            Self::Any(_) => true,
            Self::Exact(id) => id == strategy_id,
        }
    }

    /// Returns true if this is the wildcard scope.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any(_))
    }
}

impl Default for StrategyScope {
    fn default() -> Self {
        Self::ANY
    }
}

/// Symbol scope: every symbol, or an explicit set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymbolScope {
    /// Match any symbol.
    Any(Wildcard),
    /// Match symbols in the set. Must be non-empty.
    Symbols(HashSet<Symbol>),
}

impl SymbolScope {
    /// Wildcard scope.
    pub const ANY: Self = Self::Any(Wildcard);

    /// Returns true if this scope accepts the given symbol.
    #[must_use]
    pub fn matches(&self, symbol: &Symbol) -> bool {
        match self {
            Self::Any(_) => true,
            Self::Symbols(set) => set.contains(symbol),
        }
    }

    /// Returns true if this is an explicit, empty set.
    #[must_use]
    pub fn is_empty_set(&self) -> bool {
        matches!(self, Self::Symbols(set) if set.is_empty())
    }
}

impl Default for SymbolScope {
    fn default() -> Self {
        Self::ANY
    }
}

/// Event-type scope: every type, or an explicit set.
///
/// The wildcard tracks the taxonomy: types added later are matched
/// without subscribers having to update their filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTypeScope {
    /// Match any event type.
    Any(Wildcard),
    /// Match event types in the set. Must be non-empty.
    Types(HashSet<EventType>),
}

impl EventTypeScope {
    /// Wildcard scope.
    pub const ANY: Self = Self::Any(Wildcard);

    /// Returns true if this scope accepts the given event type.
    #[must_use]
    pub fn matches(&self, event_type: EventType) -> bool {
        match self {
            Self::Any(_) => true,
            Self::Types(set) => set.contains(&event_type),
        }
    }

    /// Returns true if this is an explicit, empty set.
    #[must_use]
    pub fn is_empty_set(&self) -> bool {
        matches!(self, Self::Types(set) if set.is_empty())
    }
}

impl Default for EventTypeScope {
    fn default() -> Self {
        Self::ANY
    }
}

fn default_min_confidence() -> Confidence {
    Confidence::new_unchecked(40)
}

/// Validated subscription configuration.
///
/// The recognized fields are exactly `strategy`, `symbols`,
/// `event_types`, `channels`, and `min_confidence`; unknown fields are
/// rejected at deserialization so a client cannot smuggle unvalidated
/// settings past the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscriptionConfig {
    /// Strategy scope.
    #[serde(default)]
    pub strategy: StrategyScope,
    /// Symbol scope.
    #[serde(default)]
    pub symbols: SymbolScope,
    /// Accepted event types.
    #[serde(default)]
    pub event_types: EventTypeScope,
    /// Requested delivery channels. Must be non-empty and within the
    /// owner's plan at mutation time.
    pub channels: HashSet<Channel>,
    /// Minimum signal confidence; events without a confidence value
    /// always pass this check.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: Confidence,
}

impl SubscriptionConfig {
    /// Creates a wildcard-everything config on the given channels.
    #[must_use]
    pub fn all_events(channels: impl IntoIterator<Item = Channel>) -> Self {
        Self {
            strategy: StrategyScope::ANY,
            symbols: SymbolScope::ANY,
            event_types: EventTypeScope::ANY,
            channels: channels.into_iter().collect(),
            min_confidence: Confidence::MIN,
        }
    }

    /// Restricts the strategy scope.
    #[must_use]
    pub fn with_strategy(mut self, strategy_id: StrategyId) -> Self {
        self.strategy = StrategyScope::Exact(strategy_id);
        self
    }

    /// Restricts the symbol scope.
    #[must_use]
    pub fn with_symbols(mut self, symbols: impl IntoIterator<Item = Symbol>) -> Self {
        self.symbols = SymbolScope::Symbols(symbols.into_iter().collect());
        self
    }

    /// Restricts the accepted event types.
    #[must_use]
    pub fn with_event_types(mut self, types: impl IntoIterator<Item = EventType>) -> Self {
        self.event_types = EventTypeScope::Types(types.into_iter().collect());
        self
    }

    /// Sets the minimum confidence threshold.
    #[must_use]
    pub fn with_min_confidence(mut self, confidence: Confidence) -> Self {
        self.min_confidence = confidence;
        self
    }

    /// Validates structural invariants of the config.
    ///
    /// An empty explicit scope would match nothing and is rejected, as is
    /// an empty channel set (a notification nobody ever sees).
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.symbols.is_empty_set() {
            return Err(RegistryError::InvalidConfig(
                "symbol set is empty; use \"*\" to match all symbols".to_string(),
            ));
        }
        if self.event_types.is_empty_set() {
            return Err(RegistryError::InvalidConfig(
                "event type set is empty; use \"*\" to match all types".to_string(),
            ));
        }
        if self.channels.is_empty() {
            return Err(RegistryError::InvalidConfig(
                "at least one delivery channel is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// A stored subscription: config plus ownership and lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription id.
    pub id: SubscriptionId,
    /// Owning subscriber.
    pub owner: SubscriberId,
    /// Filter configuration.
    pub config: SubscriptionConfig,
    /// Disabled subscriptions are excluded from matching; their
    /// historical notifications remain.
    pub enabled: bool,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Last update timestamp.
    pub updated_at: Timestamp,
    /// Number of notifications this subscription has produced.
    pub alerts_sent: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels() -> HashSet<Channel> {
        [Channel::InApp].into_iter().collect()
    }

    #[test]
    fn test_wildcard_serde() {
        let json = serde_json::to_string(&Wildcard).unwrap();
        assert_eq!(json, "\"*\"");
        assert!(serde_json::from_str::<Wildcard>("\"*\"").is_ok());
        assert!(serde_json::from_str::<Wildcard>("\"x\"").is_err());
    }

    #[test]
    fn test_strategy_scope_untagged_serde() {
        let any: StrategyScope = serde_json::from_str("\"*\"").unwrap();
        assert!(any.is_any());

        let exact: StrategyScope = serde_json::from_str("\"trend-h1\"").unwrap();
        assert!(exact.matches(&StrategyId::new_unchecked("trend-h1")));
        assert!(!exact.matches(&StrategyId::new_unchecked("other")));
    }

    #[test]
    fn test_symbol_scope_matching() {
        let scope: SymbolScope = serde_json::from_str("[\"EURUSD\", \"XAUUSD\"]").unwrap();
        assert!(scope.matches(&Symbol::new_unchecked("EURUSD")));
        assert!(!scope.matches(&Symbol::new_unchecked("GBPUSD")));
        assert!(SymbolScope::ANY.matches(&Symbol::new_unchecked("GBPUSD")));
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let json = r#"{"channels": ["in_app"], "frequency": "hourly"}"#;
        let result: Result<SubscriptionConfig, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_defaults() {
        let json = r#"{"channels": ["in_app", "email"]}"#;
        let config: SubscriptionConfig = serde_json::from_str(json).unwrap();
        assert!(config.strategy.is_any());
        assert!(config.symbols.matches(&Symbol::new_unchecked("ANY")));
        assert_eq!(config.min_confidence.as_u8(), 40);
    }

    #[test]
    fn test_validate_rejects_empty_symbol_set() {
        let config = SubscriptionConfig::all_events(channels()).with_symbols([]);
        assert!(matches!(
            config.validate(),
            Err(RegistryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_event_type_set() {
        let config = SubscriptionConfig::all_events(channels()).with_event_types([]);
        assert!(matches!(
            config.validate(),
            Err(RegistryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_channels() {
        let config = SubscriptionConfig::all_events([]);
        assert!(matches!(
            config.validate(),
            Err(RegistryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_accepts_wildcards() {
        let config = SubscriptionConfig::all_events(channels());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = SubscriptionConfig::all_events(channels())
            .with_symbols([Symbol::new_unchecked("XAUUSD")])
            .with_event_types([EventType::NearSl, EventType::ClosedSl])
            .with_min_confidence(Confidence::new_unchecked(60));

        let json = serde_json::to_string(&config).unwrap();
        let parsed: SubscriptionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
