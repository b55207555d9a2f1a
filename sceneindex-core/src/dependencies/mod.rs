//! Dependency Forwarding
//!
//! Prims may declare that some of their data depends on data elsewhere,
//! either on another prim or on another part of themselves. This module
//! reads those declarations and, when the depended-on data is dirtied,
//! dirties the dependent data too.
//!
//! # Overview
//!
//! Each declaration is an edge from `(depended-on prim, depended-on locator)`
//! to `(affected prim, affected locator)`. When a dirty notice arrives for a
//! prim, every edge out of that prim whose depended-on locator intersects a
//! dirtied locator is followed, and the affected pair is dirtied in turn.
//! Propagation continues transitively and terminates on cycles: each
//! `(prim, locator)` pair is emitted at most once per notice.
//!
//! # Lifecycle of a prim's edges
//!
//! 1. Unresolved until the prim is first queried through the index.
//! 2. Resolved: the declarations are recorded in both directions.
//! 3. Cleared when the prim is removed or its declaration container is
//!    dirtied. Clearing only flags entries; resolving again unflags them.
//! 4. Erased by [`DependencyForwardingSceneIndex::remove_deleted_entries`],
//!    which the owner calls at a quiet point.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sceneindex_core::dependencies::{DependenciesSchema, DependencyDeclaration, DependencyForwardingSceneIndex};
//! use sceneindex_core::scene::{RetainedSceneIndex, SceneIndex};
//!
//! let input = Arc::new(RetainedSceneIndex::new());
//! let index = DependencyForwardingSceneIndex::new(input.clone());
//!
//! // ... add prims carrying `__dependencies` containers to `input` ...
//! index.get_prim(&"/A".parse()?);
//!
//! // Dirty notices on /B now also dirty whatever /A declared on /B.
//! ```

mod forwarding;
mod gc;
mod graph;
mod schema;

pub use forwarding::DependencyForwardingSceneIndex;
pub use gc::RemovedEntries;
pub use schema::{
    DependenciesSchema, DependencyDeclaration, AFFECTED_DATA_SOURCE_LOCATOR,
    DEPENDED_ON_DATA_SOURCE_LOCATOR, DEPENDED_ON_PRIM_PATH, DEPENDENCIES,
};
