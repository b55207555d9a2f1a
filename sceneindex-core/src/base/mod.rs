//! Base Value Types
//!
//! Names and paths that the rest of the crate borrows: [`Token`] for field
//! names and declaration keys, [`PrimPath`] for nodes of the scene hierarchy.
//! Both are immutable and share their storage on clone.

mod prim_path;
mod token;

pub use prim_path::PrimPath;
pub use token::Token;
