//! Prim Paths
//!
//! A prim path names a node in the scene hierarchy. Absolute paths start at
//! the root `/`; each further segment names a child. The empty path is used
//! in dependency declarations to mean "the declaring prim itself".

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};

/// An absolute hierarchical prim path, or the empty path.
///
/// Paths are immutable and cheap to clone. Ordering is by string contents,
/// which is total but not meant to be hierarchical.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimPath(Arc<str>);

impl PrimPath {
    /// The empty path.
    pub fn empty() -> Self {
        Self(Arc::from(""))
    }

    /// The absolute root path `/`.
    pub fn absolute_root() -> Self {
        Self(Arc::from("/"))
    }

    /// Parse a textual path.
    ///
    /// Accepts the empty string, `/`, and `/`-separated absolute paths with
    /// non-empty segments and no trailing separator.
    pub fn new(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Ok(Self::empty());
        }
        if text == "/" {
            return Ok(Self::absolute_root());
        }
        let Some(rest) = text.strip_prefix('/') else {
            return Err(invalid(text, "path must be absolute"));
        };
        for segment in rest.split('/') {
            if segment.is_empty() {
                return Err(invalid(text, "path contains an empty segment"));
            }
            if segment == "." || segment == ".." {
                return Err(invalid(text, "relative segments are not supported"));
            }
        }
        Ok(Self(Arc::from(text)))
    }

    /// Get the path's text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this is the empty path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check whether this is the absolute root `/`.
    pub fn is_absolute_root(&self) -> bool {
        &*self.0 == "/"
    }

    /// Return the path of the child named `name`.
    pub fn append_child(&self, name: &str) -> Self {
        debug_assert!(
            !name.is_empty() && !name.contains('/'),
            "invalid child name {name:?}"
        );
        debug_assert!(!self.is_empty(), "cannot append {name:?} to the empty path");
        if self.is_absolute_root() {
            Self(Arc::from(format!("/{name}")))
        } else {
            Self(Arc::from(format!("{}/{name}", self.0)))
        }
    }

    /// Return the parent path.
    ///
    /// The parent of `/` is the empty path, as is the parent of the empty path.
    pub fn parent(&self) -> Self {
        if self.is_absolute_root() || self.is_empty() {
            return Self::empty();
        }
        match self.0.rfind('/') {
            Some(0) => Self::absolute_root(),
            Some(idx) => Self(Arc::from(&self.0[..idx])),
            None => Self::empty(),
        }
    }

    /// The last segment of the path (empty for `/` and the empty path).
    pub fn name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => "",
        }
    }

    /// Check whether `prefix` is this path or one of its namespace ancestors.
    ///
    /// The empty path is never a prefix, and never has one.
    pub fn has_prefix(&self, prefix: &PrimPath) -> bool {
        if self.is_empty() || prefix.is_empty() {
            return false;
        }
        if prefix.is_absolute_root() {
            return true;
        }
        match self.0.strip_prefix(&*prefix.0) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

fn invalid(text: &str, reason: &'static str) -> Error {
    Error::InvalidPrimPath {
        path: text.to_string(),
        reason,
    }
}

impl Default for PrimPath {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromStr for PrimPath {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        Self::new(text)
    }
}

impl fmt::Display for PrimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PrimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimPath({:?})", &*self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> PrimPath {
        PrimPath::new(text).unwrap()
    }

    #[test]
    fn parses_valid_paths() {
        assert!(path("").is_empty());
        assert!(path("/").is_absolute_root());
        assert_eq!(path("/a/b").as_str(), "/a/b");
    }

    #[test]
    fn rejects_invalid_paths() {
        assert!(PrimPath::new("a/b").is_err());
        assert!(PrimPath::new("/a//b").is_err());
        assert!(PrimPath::new("/a/").is_err());
        assert!(PrimPath::new("/a/../b").is_err());
    }

    #[test]
    fn parent_and_name() {
        assert_eq!(path("/a/b").parent(), path("/a"));
        assert_eq!(path("/a").parent(), PrimPath::absolute_root());
        assert!(PrimPath::absolute_root().parent().is_empty());
        assert_eq!(path("/a/b").name(), "b");
        assert_eq!(PrimPath::absolute_root().name(), "");
    }

    #[test]
    fn append_child_round_trips_with_parent() {
        let child = PrimPath::absolute_root().append_child("a").append_child("b");
        assert_eq!(child, path("/a/b"));
        assert_eq!(child.parent().parent(), PrimPath::absolute_root());
    }

    #[test]
    fn prefix_is_namespace_ancestry() {
        assert!(path("/a/b").has_prefix(&path("/a")));
        assert!(path("/a/b").has_prefix(&path("/a/b")));
        assert!(path("/a/b").has_prefix(&PrimPath::absolute_root()));
        assert!(!path("/ab").has_prefix(&path("/a")));
        assert!(!path("/a").has_prefix(&path("/a/b")));
        assert!(!path("/a").has_prefix(&PrimPath::empty()));
        assert!(!PrimPath::empty().has_prefix(&PrimPath::empty()));
    }
}
