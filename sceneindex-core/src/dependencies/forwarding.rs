//! The dependency forwarding scene index.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};

use tracing::{debug, trace};

use super::gc::RemovedEntries;
use super::graph::DependencyGraph;
use super::schema::DependenciesSchema;
use crate::base::{PrimPath, Token};
use crate::config::ForwardingConfig;
use crate::data_source::ContainerHandle;
use crate::locator::DataSourceLocator;
use crate::scene::{
    AddedPrimEntry, DirtiedPrimEntry, ObserverRegistry, RemovedPrimEntry, SceneIndex,
    SceneIndexObserver, SceneIndexPrim,
};

type Visited = HashSet<(PrimPath, DataSourceLocator)>;

/// A filtering scene index that turns declared data dependencies into extra
/// dirty notices.
///
/// Prims pass through unchanged. A prim's declarations are read the first
/// time it is queried through this index, or when a dirty notice touches its
/// declaration container. From then on, a dirty notice on a depended-on
/// prim is extended with a dirty entry for every prim that transitively
/// depends on the dirtied data.
pub struct DependencyForwardingSceneIndex {
    input: Arc<dyn SceneIndex>,
    config: ForwardingConfig,
    graph: DependencyGraph,
    observers: ObserverRegistry,
}

impl DependencyForwardingSceneIndex {
    /// Wrap `input` with the default configuration.
    pub fn new(input: Arc<dyn SceneIndex>) -> Arc<Self> {
        Self::with_config(input, ForwardingConfig::default())
    }

    /// Wrap `input` and start observing it.
    pub fn with_config(input: Arc<dyn SceneIndex>, config: ForwardingConfig) -> Arc<Self> {
        let index = Arc::new(Self {
            input,
            config,
            graph: DependencyGraph::new(),
            observers: ObserverRegistry::new(),
        });
        let observer: Weak<dyn SceneIndexObserver> = Arc::downgrade(&index) as Weak<Self>;
        index.input.add_observer(observer);
        index
    }

    /// The scene this index filters.
    pub fn input_scene(&self) -> &Arc<dyn SceneIndex> {
        &self.input
    }

    /// The configuration in effect.
    pub fn config(&self) -> &ForwardingConfig {
        &self.config
    }

    /// Whether `path`'s declarations have been read and are current.
    pub fn is_checked(&self, path: &PrimPath) -> bool {
        self.graph.is_checked(path)
    }

    /// Prims `path` currently depends on.
    pub fn depended_on_paths(&self, path: &PrimPath) -> Vec<PrimPath> {
        self.graph.depended_on_paths(path)
    }

    /// Current declarations targeting `path`, as
    /// `(affected prim, declaration name, depended-on locator, affected locator)`.
    pub fn dependents(
        &self,
        path: &PrimPath,
    ) -> Vec<(PrimPath, Token, DataSourceLocator, DataSourceLocator)> {
        self.graph.dependents(path)
    }

    /// Entries queued for the next cleanup: `(affected, depended on)`.
    pub fn pending_cleanup_counts(&self) -> (usize, usize) {
        self.graph.pending_cleanup_counts()
    }

    /// Erase dependency entries that are no longer in use.
    ///
    /// Call this between notice batches, never while a notice is being
    /// handled or prims are being queried through this index.
    pub fn remove_deleted_entries(&self) -> RemovedEntries {
        self.graph.remove_deleted_entries()
    }

    fn record_dependencies(&self, path: &PrimPath, data_source: Option<&ContainerHandle>) {
        let Some(prim) = data_source else {
            trace!(prim = %path, "no data, dependencies left unresolved");
            return;
        };
        let declarations =
            DependenciesSchema::from_parent(prim, &self.config.dependencies_locator).declarations();
        self.graph.update(path, &declarations);
        debug!(prim = %path, edges = declarations.len(), "resolved dependencies");
    }

    fn rediscover(&self, path: &PrimPath) {
        self.graph.clear(path);
        let prim = self.input.get_prim(path);
        self.record_dependencies(path, prim.data_source.as_ref());
    }

    /// Walk everything reachable from `(path, locator)`, appending one entry
    /// per pair not yet in `visited`.
    fn propagate(
        &self,
        path: &PrimPath,
        locator: &DataSourceLocator,
        visited: &mut Visited,
        dirtied: &mut Vec<DirtiedPrimEntry>,
    ) {
        let mut stack = vec![(path.clone(), locator.clone())];
        while let Some((depended_on, dirty_locator)) = stack.pop() {
            for (affected, affected_locator) in
                self.graph.matching_dependents(&depended_on, &dirty_locator)
            {
                if !visited.insert((affected.clone(), affected_locator.clone())) {
                    continue;
                }
                trace!(
                    from = %depended_on,
                    to = %affected,
                    locator = %affected_locator,
                    "forwarding dirty"
                );
                if affected_locator.intersects(&self.config.dependencies_locator) {
                    self.rediscover(&affected);
                }
                dirtied.push(DirtiedPrimEntry::new(
                    affected.clone(),
                    affected_locator.clone(),
                ));
                stack.push((affected, affected_locator));
            }
        }
    }
}

impl fmt::Debug for DependencyForwardingSceneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyForwardingSceneIndex")
            .field("config", &self.config)
            .field("graph", &self.graph)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

impl SceneIndex for DependencyForwardingSceneIndex {
    fn get_prim(&self, path: &PrimPath) -> SceneIndexPrim {
        let prim = self.input.get_prim(path);
        if self.graph.needs_discovery(path) {
            trace!(prim = %path, "resolving dependencies on first query");
            self.record_dependencies(path, prim.data_source.as_ref());
        }
        prim
    }

    fn get_child_prim_paths(&self, path: &PrimPath) -> Vec<PrimPath> {
        self.input.get_child_prim_paths(path)
    }

    fn add_observer(&self, observer: Weak<dyn SceneIndexObserver>) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, observer: &Weak<dyn SceneIndexObserver>) {
        self.observers.remove(observer);
    }
}

impl SceneIndexObserver for DependencyForwardingSceneIndex {
    fn prims_added(&self, _sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        self.observers.send_prims_added(self, entries);
    }

    fn prims_removed(&self, _sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        let mut depended_on = Vec::new();
        for entry in entries {
            // Removed prims stop depending on anything first, so they are
            // not dirtied below.
            for affected in self.graph.affected_under(&entry.prim_path) {
                self.graph.clear(&affected);
            }
            depended_on.extend(self.graph.depended_on_under(&entry.prim_path));
        }

        let mut dirtied = Vec::new();
        if self.config.dirty_dependents_on_removal {
            let mut visited = Visited::new();
            let everything = DataSourceLocator::empty();
            for path in &depended_on {
                self.propagate(path, &everything, &mut visited, &mut dirtied);
            }
        }

        self.observers.send_prims_removed(self, entries);
        if !dirtied.is_empty() {
            debug!(
                removed = entries.len(),
                dirtied = dirtied.len(),
                "dirtying dependents of removed prims"
            );
            self.observers.send_prims_dirtied(self, &dirtied);
        }
    }

    fn prims_dirtied(&self, _sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        let mut visited: Visited = entries
            .iter()
            .flat_map(|entry| {
                entry
                    .dirty_locators
                    .iter()
                    .map(move |locator| (entry.prim_path.clone(), locator.clone()))
            })
            .collect();

        let mut forwarded = Vec::new();
        for entry in entries {
            if entry
                .dirty_locators
                .intersects(&self.config.dependencies_locator)
            {
                self.rediscover(&entry.prim_path);
            }
            for locator in &entry.dirty_locators {
                self.propagate(&entry.prim_path, locator, &mut visited, &mut forwarded);
            }
        }

        if forwarded.is_empty() {
            self.observers.send_prims_dirtied(self, entries);
        } else {
            let mut all = Vec::with_capacity(entries.len() + forwarded.len());
            all.extend_from_slice(entries);
            all.append(&mut forwarded);
            self.observers.send_prims_dirtied(self, &all);
        }
    }
}
