//! Scene Index Observers
//!
//! Notices flow downstream from a scene index to its observers in batches.
//! Each batch is a slice of entries of a single kind.
//!
//! # Registry
//!
//! Observers are held through weak references, so an observer that is
//! dropped simply stops receiving notices. Dead entries are pruned the next
//! time a notice is sent. The registry lock is released before any observer
//! is called, so observers may query the sender or register further
//! observers while handling a notice.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use super::SceneIndex;
use crate::base::{PrimPath, Token};
use crate::locator::{DataSourceLocator, DataSourceLocatorSet};

/// A prim was added (or its data wholesale replaced).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedPrimEntry {
    /// Path of the prim.
    pub prim_path: PrimPath,
    /// Type of the prim.
    pub prim_type: Token,
}

impl AddedPrimEntry {
    /// Create an entry.
    pub fn new(prim_path: PrimPath, prim_type: Token) -> Self {
        Self {
            prim_path,
            prim_type,
        }
    }
}

/// A prim and all of its namespace descendants were removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedPrimEntry {
    /// Path of the removed subtree's root.
    pub prim_path: PrimPath,
}

impl RemovedPrimEntry {
    /// Create an entry.
    pub fn new(prim_path: PrimPath) -> Self {
        Self { prim_path }
    }
}

/// Some fields of a prim may have changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirtiedPrimEntry {
    /// Path of the prim.
    pub prim_path: PrimPath,
    /// Fields that may have changed.
    pub dirty_locators: DataSourceLocatorSet,
}

impl DirtiedPrimEntry {
    /// Create an entry covering a single locator.
    pub fn new(prim_path: PrimPath, locator: DataSourceLocator) -> Self {
        Self {
            prim_path,
            dirty_locators: DataSourceLocatorSet::from(locator),
        }
    }

    /// Create an entry covering a set of locators.
    pub fn with_locators(prim_path: PrimPath, dirty_locators: DataSourceLocatorSet) -> Self {
        Self {
            prim_path,
            dirty_locators,
        }
    }
}

/// Receives notices from a scene index.
pub trait SceneIndexObserver: Send + Sync {
    /// Prims were added.
    fn prims_added(&self, sender: &dyn SceneIndex, entries: &[AddedPrimEntry]);

    /// Prim subtrees were removed.
    fn prims_removed(&self, sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]);

    /// Prims were dirtied.
    fn prims_dirtied(&self, sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]);
}

/// The set of observers registered with a scene index.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: RwLock<Vec<Weak<dyn SceneIndexObserver>>>,
}

impl ObserverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn add(&self, observer: Weak<dyn SceneIndexObserver>) {
        self.observers.write().push(observer);
    }

    /// Unregister an observer. Unknown observers are ignored.
    pub fn remove(&self, observer: &Weak<dyn SceneIndexObserver>) {
        self.observers
            .write()
            .retain(|registered| !Weak::ptr_eq(registered, observer));
    }

    /// Number of observers still alive.
    pub fn len(&self) -> usize {
        self.observers
            .read()
            .iter()
            .filter(|observer| observer.strong_count() > 0)
            .count()
    }

    /// Check whether no live observers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Send a `prims_added` batch. Empty batches are not sent.
    pub fn send_prims_added(&self, sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        if entries.is_empty() {
            return;
        }
        for observer in self.live() {
            observer.prims_added(sender, entries);
        }
    }

    /// Send a `prims_removed` batch. Empty batches are not sent.
    pub fn send_prims_removed(&self, sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        if entries.is_empty() {
            return;
        }
        for observer in self.live() {
            observer.prims_removed(sender, entries);
        }
    }

    /// Send a `prims_dirtied` batch. Empty batches are not sent.
    pub fn send_prims_dirtied(&self, sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        if entries.is_empty() {
            return;
        }
        for observer in self.live() {
            observer.prims_dirtied(sender, entries);
        }
    }

    /// Upgrade every live observer, pruning the dead ones.
    fn live(&self) -> Vec<Arc<dyn SceneIndexObserver>> {
        let (live, any_dead) = {
            let observers = self.observers.read();
            let live: Vec<_> = observers.iter().filter_map(Weak::upgrade).collect();
            let any_dead = live.len() != observers.len();
            (live, any_dead)
        };
        if any_dead {
            self.observers
                .write()
                .retain(|observer| observer.strong_count() > 0);
        }
        live
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("live_observers", &self.len())
            .finish()
    }
}

/// One recorded notice batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A `prims_added` batch.
    Added(Vec<AddedPrimEntry>),
    /// A `prims_removed` batch.
    Removed(Vec<RemovedPrimEntry>),
    /// A `prims_dirtied` batch.
    Dirtied(Vec<DirtiedPrimEntry>),
}

/// An observer that records every notice batch in arrival order.
#[derive(Debug, Default)]
pub struct NoticeRecorder {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeRecorder {
    /// Create a recorder, ready to be registered as an observer.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register `recorder` with `scene`.
    pub fn observe(recorder: &Arc<Self>, scene: &dyn SceneIndex) {
        let observer: Weak<dyn SceneIndexObserver> = Arc::downgrade(recorder) as Weak<Self>;
        scene.add_observer(observer);
    }

    /// Copy of everything recorded so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Take everything recorded so far, leaving the recorder empty.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.notices.lock().clear();
    }
}

impl SceneIndexObserver for NoticeRecorder {
    fn prims_added(&self, _sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        self.notices.lock().push(Notice::Added(entries.to_vec()));
    }

    fn prims_removed(&self, _sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        self.notices.lock().push(Notice::Removed(entries.to_vec()));
    }

    fn prims_dirtied(&self, _sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        self.notices.lock().push(Notice::Dirtied(entries.to_vec()));
    }
}
