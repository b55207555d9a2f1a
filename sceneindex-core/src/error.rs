//! Error types.
//!
//! The forwarding index never reports errors to its caller: missing or
//! malformed dependency declarations simply resolve to "no dependency".
//! Errors only arise at the edges of the crate, when parsing textual input
//! or building a retained scene.

use thiserror::Error;

/// Errors produced by the value types, configuration loading, and the
/// retained scene.
#[derive(Debug, Error)]
pub enum Error {
    /// A textual prim path could not be parsed.
    #[error("invalid prim path {path:?}: {reason}")]
    InvalidPrimPath {
        /// The offending input.
        path: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A configuration document could not be deserialized.
    #[error("invalid forwarding config: {0}")]
    Config(#[from] serde_json::Error),

    /// A prim could not be inserted because its ancestry is not addressable.
    #[error("cannot add prim at {path:?}: path has no parent")]
    MissingParent {
        /// The path that was rejected.
        path: String,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
