//! Build configuration.

use nodegql_augment::AugmentOptions;
use serde::{Deserialize, Serialize};

/// Options that affect the generated schema.
///
/// Every field takes part in [`SchemaCache`](crate::SchemaCache) keys.
///
/// ```
/// use nodegql::SchemaConfig;
///
/// let config = SchemaConfig::from_json(r#"{ "subscriptions": true }"#).unwrap();
/// assert!(config.subscriptions);
/// assert!(config.legacy_filters);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaConfig {
    /// Emit subscription event types and the `Subscription` root.
    pub subscriptions: bool,
    /// Emit the deprecated bare filter, update and count fields next to
    /// their explicit forms.
    pub legacy_filters: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            subscriptions: false,
            legacy_filters: true,
        }
    }
}

impl SchemaConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_subscriptions(mut self, enabled: bool) -> Self {
        self.subscriptions = enabled;
        self
    }

    #[must_use]
    pub fn with_legacy_filters(mut self, enabled: bool) -> Self {
        self.legacy_filters = enabled;
        self
    }

    /// Parses a JSON configuration; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed input or unknown value
    /// types.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub(crate) fn augment_options(self) -> AugmentOptions {
        AugmentOptions {
            subscriptions: self.subscriptions,
            legacy_filters: self.legacy_filters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchemaConfig::default();
        assert!(!config.subscriptions);
        assert!(config.legacy_filters);
        assert_eq!(SchemaConfig::from_json("{}").unwrap(), config);
    }

    #[test]
    fn test_camel_case_keys() {
        let config = SchemaConfig::from_json(r#"{"legacyFilters": false}"#).unwrap();
        assert!(!config.legacy_filters);
        let json = serde_json::to_string(&config.with_subscriptions(true)).unwrap();
        assert_eq!(json, r#"{"subscriptions":true,"legacyFilters":false}"#);
    }

    #[test]
    fn test_invalid_json() {
        assert!(SchemaConfig::from_json(r#"{"subscriptions": "yes"}"#).is_err());
    }
}
