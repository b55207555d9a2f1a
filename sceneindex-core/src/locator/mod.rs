//! Data Source Locators
//!
//! Locators address nested fields of a prim's data source; locator sets
//! describe which of those fields a dirty notice covers.
//!
//! # Semantics
//!
//! - A locator is a sequence of names. The empty locator is the whole prim.
//! - Two locators intersect when one is a prefix of the other.
//! - A locator set never stores a member together with one of its
//!   extensions: the shorter one wins. Once the empty locator is inserted
//!   the set is universal.
//!
//! These rules make "is anything in this dirty notice relevant to me?" a
//! single `intersects` call, which the dependency forwarding index relies on
//! for every edge it follows.

mod data_source_locator;
mod locator_set;

pub use data_source_locator::DataSourceLocator;
pub use locator_set::{DataSourceLocatorSet, Intersection};
