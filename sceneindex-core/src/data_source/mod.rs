//! Data Sources
//!
//! A prim's data is a tree of data sources: containers map names to child
//! data sources, and leaves carry values. Locators address positions in this
//! tree.
//!
//! The forwarding index only reads data sources. It never builds or mutates
//! the data it hands back from `get_prim`.

mod retained;

use std::fmt;
use std::sync::Arc;

use crate::base::{PrimPath, Token};
use crate::locator::DataSourceLocator;

pub use retained::{RetainedContainer, RetainedContainerBuilder};

/// A container of named child data sources.
///
/// Implementations may compute children on demand; they must be safe to
/// query from many threads at once.
pub trait ContainerDataSource: Send + Sync + fmt::Debug {
    /// Names of the children, in the container's preferred order.
    fn names(&self) -> Vec<Token>;

    /// Look up a child by name.
    fn get(&self, name: &Token) -> Option<DataSource>;
}

/// Shared handle to a container data source.
pub type ContainerHandle = Arc<dyn ContainerDataSource>;

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// Free-form text.
    String(String),
    /// A token.
    Token(Token),
    /// A prim path.
    Path(PrimPath),
    /// A data source locator.
    Locator(DataSourceLocator),
}

/// A node in a prim's data tree: a container or a leaf value.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// A container of named children.
    Container(ContainerHandle),
    /// A leaf value.
    Value(Value),
}

impl DataSource {
    /// The container, if this is one.
    pub fn as_container(&self) -> Option<&ContainerHandle> {
        match self {
            DataSource::Container(container) => Some(container),
            DataSource::Value(_) => None,
        }
    }

    /// The leaf value, if this is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            DataSource::Value(value) => Some(value),
            DataSource::Container(_) => None,
        }
    }

    /// The path value, if this is a path leaf.
    pub fn as_path(&self) -> Option<&PrimPath> {
        match self.as_value()? {
            Value::Path(path) => Some(path),
            _ => None,
        }
    }

    /// The locator value, if this is a locator leaf.
    pub fn as_locator(&self) -> Option<&DataSourceLocator> {
        match self.as_value()? {
            Value::Locator(locator) => Some(locator),
            _ => None,
        }
    }

    /// The token value, if this is a token leaf.
    pub fn as_token(&self) -> Option<&Token> {
        match self.as_value()? {
            Value::Token(token) => Some(token),
            _ => None,
        }
    }

    /// Walk `locator` down from this data source. See [`locate`].
    pub fn get(&self, locator: &DataSourceLocator) -> Option<DataSource> {
        match self {
            DataSource::Container(container) => locate(container, locator),
            DataSource::Value(_) if locator.is_empty() => Some(self.clone()),
            DataSource::Value(_) => None,
        }
    }
}

/// Walk `locator` down from `container`.
///
/// The empty locator yields the container itself. Returns `None` as soon as a
/// name is missing or a leaf is reached before the locator is exhausted.
pub fn locate(container: &ContainerHandle, locator: &DataSourceLocator) -> Option<DataSource> {
    let mut current = DataSource::Container(Arc::clone(container));
    for name in locator {
        let next = current.as_container()?.get(name)?;
        current = next;
    }
    Some(current)
}

impl From<Value> for DataSource {
    fn from(value: Value) -> Self {
        DataSource::Value(value)
    }
}

impl From<ContainerHandle> for DataSource {
    fn from(container: ContainerHandle) -> Self {
        DataSource::Container(container)
    }
}

macro_rules! leaf_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }

            impl From<$ty> for DataSource {
                fn from(value: $ty) -> Self {
                    DataSource::Value(Value::$variant(value))
                }
            }
        )*
    };
}

leaf_conversions! {
    bool => Bool,
    i64 => Int,
    f64 => Float,
    String => String,
    Token => Token,
    PrimPath => Path,
    DataSourceLocator => Locator,
}

impl From<&str> for DataSource {
    fn from(text: &str) -> Self {
        DataSource::Value(Value::String(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_walks_nested_containers() {
        let leaf = RetainedContainer::builder().with("color", 3_i64).build();
        let root = RetainedContainer::builder().with("primvars", leaf).build();

        let found = locate(&root, &DataSourceLocator::parse("primvars/color"));
        assert_eq!(found.as_ref().and_then(DataSource::as_value), Some(&Value::Int(3)));

        assert!(locate(&root, &DataSourceLocator::parse("primvars/opacity")).is_none());
        assert!(locate(&root, &DataSourceLocator::parse("primvars/color/x")).is_none());
        assert!(locate(&root, &DataSourceLocator::empty())
            .and_then(|ds| ds.as_container().cloned())
            .is_some());
    }

    #[test]
    fn typed_accessors() {
        let path = DataSource::from(PrimPath::absolute_root());
        assert_eq!(path.as_path(), Some(&PrimPath::absolute_root()));
        assert!(path.as_locator().is_none());

        let locator = DataSource::from(DataSourceLocator::parse("a/b"));
        assert_eq!(locator.as_locator(), Some(&DataSourceLocator::parse("a/b")));
        assert!(locator.as_container().is_none());

        let token = DataSource::from(Token::new("mesh"));
        assert_eq!(token.as_token().map(Token::as_str), Some("mesh"));
        assert!(token.get(&DataSourceLocator::empty()).is_some());
        assert!(token.get(&DataSourceLocator::parse("x")).is_none());
    }
}
