//! Scene Indices
//!
//! A scene index answers two questions about a hierarchy of prims: "what is
//! at this path?" and "what are this path's children?". It also tells its
//! observers when prims are added, removed, or dirtied.
//!
//! Scene indices compose: a filtering index observes its input, adjusts the
//! notices it receives, and forwards them to its own observers while
//! answering queries by delegating to the input. The dependency forwarding
//! index in [`crate::dependencies`] is such a filter.
//!
//! # Modules
//!
//! - `observer`: notice entry types, the observer trait, the weak observer
//!   registry every scene index embeds, and a recording observer.
//! - `retained`: an in-memory scene index that holds prims directly.

mod observer;
mod retained;

use std::sync::Weak;

use crate::base::{PrimPath, Token};
use crate::data_source::ContainerHandle;

pub use observer::{
    AddedPrimEntry, DirtiedPrimEntry, Notice, NoticeRecorder, ObserverRegistry,
    RemovedPrimEntry, SceneIndexObserver,
};
pub use retained::{RetainedPrimEntry, RetainedSceneIndex};

/// What a scene index returns for a path.
///
/// A path with no prim yields an empty type and no data source.
#[derive(Debug, Clone, Default)]
pub struct SceneIndexPrim {
    /// The prim's type name (empty when untyped or absent).
    pub prim_type: Token,
    /// The prim's data, if any.
    pub data_source: Option<ContainerHandle>,
}

impl SceneIndexPrim {
    /// Create a prim from a type and data source.
    pub fn new(prim_type: Token, data_source: Option<ContainerHandle>) -> Self {
        Self {
            prim_type,
            data_source,
        }
    }

    /// Check whether the prim carries no data.
    pub fn is_empty(&self) -> bool {
        self.data_source.is_none()
    }
}

/// A queryable, observable hierarchy of prims.
///
/// Queries must be safe to issue from many threads at once.
pub trait SceneIndex: Send + Sync {
    /// Get the prim at `path`.
    fn get_prim(&self, path: &PrimPath) -> SceneIndexPrim;

    /// Get the paths of the children of `path`.
    fn get_child_prim_paths(&self, path: &PrimPath) -> Vec<PrimPath>;

    /// Register an observer. Observers are held weakly.
    fn add_observer(&self, observer: Weak<dyn SceneIndexObserver>);

    /// Unregister an observer previously passed to `add_observer`.
    fn remove_observer(&self, observer: &Weak<dyn SceneIndexObserver>);
}
