//! Engine configuration
//!
//! Depth bounds for the recursive walks, the transform composition mode used
//! by parts flattening, and the cache size callers use when wrapping a store.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use slotgraph_document::TransformComposition;
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum number of parent hops followed from a type
    pub max_type_depth: usize,
    /// Maximum nesting of composite parts
    pub max_parts_depth: usize,
    /// How part locations combine with their composite's
    pub composition: TransformComposition,
    /// Entry bound for a read-through document cache
    pub cache_capacity: u64,
}

impl GraphConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With type chain depth bound
    #[inline]
    #[must_use]
    pub fn with_max_type_depth(mut self, depth: usize) -> Self {
        self.max_type_depth = depth;
        self
    }

    /// With parts depth bound
    #[inline]
    #[must_use]
    pub fn with_max_parts_depth(mut self, depth: usize) -> Self {
        self.max_parts_depth = depth;
        self
    }

    /// With transform composition mode
    #[inline]
    #[must_use]
    pub fn with_composition(mut self, composition: TransformComposition) -> Self {
        self.composition = composition;
        self
    }

    /// Parse from TOML; absent keys keep their defaults
    ///
    /// # Errors
    /// Returns `ConfigError::Toml` if the text is not valid configuration
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Toml` if it is not valid configuration
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&raw)
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_type_depth: 16,
            max_parts_depth: 8,
            composition: TransformComposition::Rigid,
            cache_capacity: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = GraphConfig::new();
        assert_eq!(config.max_type_depth, 16);
        assert_eq!(config.max_parts_depth, 8);
        assert_eq!(config.composition, TransformComposition::Rigid);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = GraphConfig::from_toml_str("max_type_depth = 4\ncomposition = \"additive\"").unwrap();
        assert_eq!(config.max_type_depth, 4);
        assert_eq!(config.max_parts_depth, 8);
        assert_eq!(config.composition, TransformComposition::Additive);
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            GraphConfig::from_toml_str("composition = \"wobbly\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn builders() {
        let config = GraphConfig::new().with_max_type_depth(2).with_max_parts_depth(3);
        assert_eq!((config.max_type_depth, config.max_parts_depth), (2, 3));
    }

    #[tokio::test]
    async fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_parts_depth = 2").unwrap();
        let config = GraphConfig::load(file.path()).await.unwrap();
        assert_eq!(config.max_parts_depth, 2);
    }
}
