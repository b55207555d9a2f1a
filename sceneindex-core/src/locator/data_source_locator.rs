//! Data Source Locators
//!
//! A locator addresses a field nested inside a prim's data source tree by
//! naming each container on the way down, e.g. `primvars/color/interpolation`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use crate::base::Token;

/// Locators rarely exceed this depth, so the elements stay inline.
type Elements = SmallVec<[Token; 4]>;

/// An ordered, immutable sequence of names identifying a nested field.
///
/// The empty locator denotes the whole prim. Two locators intersect when one
/// is a prefix of the other.
///
/// Ordering is element-wise lexicographic, so a locator sorts immediately
/// before every locator it is a prefix of, and all locators sharing a prefix
/// are contiguous in sorted order.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataSourceLocator {
    elements: Elements,
}

impl DataSourceLocator {
    /// Create a locator from a sequence of names.
    pub fn new<I, T>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        Self {
            elements: elements.into_iter().map(Into::into).collect(),
        }
    }

    /// The empty locator, which addresses the whole prim.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a `/`-separated locator, ignoring empty segments.
    ///
    /// `"a/b"`, `"/a/b"` and `"a//b/"` all parse to the same locator.
    pub fn parse(text: &str) -> Self {
        Self::new(text.split('/').filter(|segment| !segment.is_empty()))
    }

    /// Check whether this is the empty locator.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn element(&self, index: usize) -> &Token {
        &self.elements[index]
    }

    /// First element, if any.
    pub fn first_element(&self) -> Option<&Token> {
        self.elements.first()
    }

    /// Last element, if any.
    pub fn last_element(&self) -> Option<&Token> {
        self.elements.last()
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.elements.iter()
    }

    /// Return a new locator with `element` appended.
    pub fn append(&self, element: impl Into<Token>) -> Self {
        let mut elements = self.elements.clone();
        elements.push(element.into());
        Self { elements }
    }

    /// Return a new locator with all of `other`'s elements appended.
    pub fn append_locator(&self, other: &DataSourceLocator) -> Self {
        let mut elements = self.elements.clone();
        elements.extend(other.elements.iter().cloned());
        Self { elements }
    }

    /// Return a new locator without the last element.
    pub fn remove_last_element(&self) -> Self {
        debug_assert!(!self.is_empty(), "remove_last_element on empty locator");
        let count = self.elements.len().saturating_sub(1);
        Self {
            elements: self.elements[..count].iter().cloned().collect(),
        }
    }

    /// Return a new locator without the first element.
    pub fn remove_first_element(&self) -> Self {
        debug_assert!(!self.is_empty(), "remove_first_element on empty locator");
        Self {
            elements: self.elements.iter().skip(1).cloned().collect(),
        }
    }

    /// Return a new locator with the last element replaced by `element`.
    pub fn replace_last_element(&self, element: impl Into<Token>) -> Self {
        debug_assert!(!self.is_empty(), "replace_last_element on empty locator");
        let mut elements = self.elements.clone();
        match elements.last_mut() {
            Some(last) => *last = element.into(),
            None => elements.push(element.into()),
        }
        Self { elements }
    }

    /// Check whether `prefix` equals a leading run of this locator's elements.
    ///
    /// The empty locator is a prefix of every locator.
    pub fn has_prefix(&self, prefix: &DataSourceLocator) -> bool {
        self.elements.starts_with(&prefix.elements)
    }

    /// The longest locator that is a prefix of both `self` and `other`.
    pub fn common_prefix(&self, other: &DataSourceLocator) -> Self {
        Self {
            elements: self
                .elements
                .iter()
                .zip(other.elements.iter())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a.clone())
                .collect(),
        }
    }

    /// Check whether one of the two locators is a prefix of the other.
    pub fn intersects(&self, other: &DataSourceLocator) -> bool {
        self.has_prefix(other) || other.has_prefix(self)
    }

    /// Swap `old_prefix` for `new_prefix` if this locator starts with it.
    ///
    /// Locators that don't have `old_prefix` are returned unchanged.
    pub fn replace_prefix(
        &self,
        old_prefix: &DataSourceLocator,
        new_prefix: &DataSourceLocator,
    ) -> Self {
        if !self.has_prefix(old_prefix) {
            return self.clone();
        }
        let mut elements = new_prefix.elements.clone();
        elements.extend(self.elements[old_prefix.element_count()..].iter().cloned());
        Self { elements }
    }
}

impl From<Token> for DataSourceLocator {
    fn from(element: Token) -> Self {
        Self::new([element])
    }
}

impl<'a> IntoIterator for &'a DataSourceLocator {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for DataSourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(element.as_str())?;
        }
        Ok(())
    }
}

impl fmt::Debug for DataSourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataSourceLocator({:?})", self.to_string())
    }
}

impl Serialize for DataSourceLocator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DataSourceLocator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::parse(&text))
    }
}
