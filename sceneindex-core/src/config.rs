//! Forwarding index configuration.

use serde::{Deserialize, Serialize};

use crate::dependencies::DependenciesSchema;
use crate::error::Result;
use crate::locator::DataSourceLocator;

/// Settings for a [`DependencyForwardingSceneIndex`].
///
/// Every field has a default, so a JSON document only needs the fields it
/// changes:
///
/// ```
/// use sceneindex_core::ForwardingConfig;
///
/// let config = ForwardingConfig::from_json(r#"{ "dependencies_locator": "deps" }"#).unwrap();
/// assert_eq!(config.dependencies_locator.to_string(), "deps");
/// assert!(config.dirty_dependents_on_removal);
/// ```
///
/// [`DependencyForwardingSceneIndex`]: crate::dependencies::DependencyForwardingSceneIndex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForwardingConfig {
    /// Where each prim keeps its dependency declarations.
    pub dependencies_locator: DataSourceLocator,
    /// Whether removing a prim dirties the prims that depend on it.
    pub dirty_dependents_on_removal: bool,
}

impl ForwardingConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            dependencies_locator: DependenciesSchema::default_locator(),
            dirty_dependents_on_removal: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(ForwardingConfig::from_json("{}").unwrap(), ForwardingConfig::default());
    }

    #[test]
    fn reads_every_field() {
        let config = ForwardingConfig::from_json(
            r#"{ "dependencies_locator": "custom/deps", "dirty_dependents_on_removal": false }"#,
        )
        .unwrap();
        assert_eq!(config.dependencies_locator, DataSourceLocator::parse("custom/deps"));
        assert!(!config.dirty_dependents_on_removal);
    }

    #[test]
    fn survives_json() {
        let config = ForwardingConfig {
            dependencies_locator: DataSourceLocator::parse("a/b"),
            dirty_dependents_on_removal: false,
        };
        let json = config.to_json().unwrap();
        assert_eq!(ForwardingConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = ForwardingConfig::from_json(r#"{ "dependency_locator": "x" }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
