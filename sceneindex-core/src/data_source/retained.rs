//! Retained Containers
//!
//! Immutable, fully materialized containers. Children keep insertion order.

use std::sync::Arc;

use indexmap::IndexMap;

use super::{ContainerDataSource, ContainerHandle, DataSource};
use crate::base::Token;

/// A container whose children are stored up front.
#[derive(Debug, Default, Clone)]
pub struct RetainedContainer {
    children: IndexMap<Token, DataSource>,
}

impl RetainedContainer {
    /// Build a container from `(name, data source)` pairs.
    ///
    /// Later duplicates replace earlier ones but keep the first position.
    pub fn new<I, N, D>(children: I) -> ContainerHandle
    where
        I: IntoIterator<Item = (N, D)>,
        N: Into<Token>,
        D: Into<DataSource>,
    {
        Arc::new(Self {
            children: children
                .into_iter()
                .map(|(name, child)| (name.into(), child.into()))
                .collect(),
        })
    }

    /// Start building a container child by child.
    pub fn builder() -> RetainedContainerBuilder {
        RetainedContainerBuilder::default()
    }
}

impl ContainerDataSource for RetainedContainer {
    fn names(&self) -> Vec<Token> {
        self.children.keys().cloned().collect()
    }

    fn get(&self, name: &Token) -> Option<DataSource> {
        self.children.get(name).cloned()
    }
}

/// Incremental builder for [`RetainedContainer`].
#[derive(Debug, Default)]
pub struct RetainedContainerBuilder {
    children: IndexMap<Token, DataSource>,
}

impl RetainedContainerBuilder {
    /// Add (or replace) a child.
    pub fn with(mut self, name: impl Into<Token>, child: impl Into<DataSource>) -> Self {
        self.children.insert(name.into(), child.into());
        self
    }

    /// Add (or replace) a child in place.
    pub fn set(&mut self, name: impl Into<Token>, child: impl Into<DataSource>) -> &mut Self {
        self.children.insert(name.into(), child.into());
        self
    }

    /// Number of children added so far.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check whether no children were added.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Finish the container.
    pub fn build(self) -> ContainerHandle {
        Arc::new(RetainedContainer {
            children: self.children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::Value;

    #[test]
    fn keeps_insertion_order() {
        let container = RetainedContainer::builder()
            .with("b", 1_i64)
            .with("a", 2_i64)
            .with("b", 3_i64)
            .build();

        let names: Vec<_> = container.names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(
            container.get(&Token::new("b")).and_then(|ds| ds.as_value().cloned()),
            Some(Value::Int(3))
        );
    }

    #[test]
    fn new_from_pairs() {
        let container = RetainedContainer::new([("x", true), ("y", false)]);
        assert_eq!(container.names().len(), 2);
        assert!(container.get(&Token::new("z")).is_none());
    }
}
