//! Memoization of built schemas.

use crate::{build_schema, BuildError, BuiltSchema, SchemaConfig};
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

struct Entry {
    type_defs: String,
    config: SchemaConfig,
    schema: Arc<BuiltSchema>,
}

/// Caches built schemas by their type definitions and configuration.
///
/// The cache is owned by the caller; nothing is shared between instances.
/// Failed builds are not cached.
#[derive(Default)]
pub struct SchemaCache {
    entries: FxHashMap<u64, Entry>,
}

impl SchemaCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key of a build input.
    #[must_use]
    pub fn key(type_defs: &str, config: &SchemaConfig) -> u64 {
        let mut hasher = FxHasher::default();
        type_defs.hash(&mut hasher);
        config.hash(&mut hasher);
        hasher.finish()
    }

    /// Returns the cached schema, if this exact input was built before.
    #[must_use]
    pub fn get(&self, type_defs: &str, config: &SchemaConfig) -> Option<Arc<BuiltSchema>> {
        self.entries
            .get(&Self::key(type_defs, config))
            .filter(|entry| entry.type_defs == type_defs && entry.config == *config)
            .map(|entry| Arc::clone(&entry.schema))
    }

    /// Returns the cached schema or builds and caches it.
    ///
    /// # Errors
    ///
    /// Returns the [`BuildError`] of a failed build.
    pub fn get_or_build(
        &mut self,
        type_defs: &str,
        config: &SchemaConfig,
    ) -> Result<Arc<BuiltSchema>, BuildError> {
        if let Some(schema) = self.get(type_defs, config) {
            tracing::debug!("schema cache hit");
            return Ok(schema);
        }

        let schema = Arc::new(build_schema(type_defs, config)?);
        self.entries.insert(
            Self::key(type_defs, config),
            Entry {
                type_defs: type_defs.to_string(),
                config: *config,
                schema: Arc::clone(&schema),
            },
        );
        Ok(schema)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVIE: &str = "type Movie { title: String }";

    #[test]
    fn test_cache_hit_returns_same_schema() {
        let mut cache = SchemaCache::new();
        let config = SchemaConfig::default();
        let first = cache.get_or_build(MOVIE, &config).unwrap();
        let second = cache.get_or_build(MOVIE, &config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_config_is_part_of_key() {
        let mut cache = SchemaCache::new();
        let plain = cache.get_or_build(MOVIE, &SchemaConfig::default()).unwrap();
        let with_events = cache
            .get_or_build(MOVIE, &SchemaConfig::default().with_subscriptions(true))
            .unwrap();
        assert!(!Arc::ptr_eq(&plain, &with_events));
        assert!(with_events.sdl.contains("MovieCreatedEvent"));
        assert_eq!(cache.len(), 2);
        assert_ne!(
            SchemaCache::key(MOVIE, &SchemaConfig::default()),
            SchemaCache::key(MOVIE, &SchemaConfig::default().with_legacy_filters(false))
        );
    }

    #[test]
    fn test_failed_builds_are_not_cached() {
        let mut cache = SchemaCache::new();
        assert!(cache
            .get_or_build("type Movie {", &SchemaConfig::default())
            .is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cache = SchemaCache::new();
        cache.get_or_build(MOVIE, &SchemaConfig::default()).unwrap();
        cache.clear();
        assert!(cache.get(MOVIE, &SchemaConfig::default()).is_none());
    }
}
