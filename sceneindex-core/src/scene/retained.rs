//! Retained Scene Index
//!
//! An in-memory scene index that stores prims directly. It is the usual
//! input at the bottom of a chain of filtering scene indices: callers push
//! edits into it and it turns them into notices.
//!
//! The absolute root always exists. Adding a prim creates any missing
//! ancestors as untyped prims without data. Removing a prim removes its
//! whole subtree.

use std::collections::HashMap;
use std::sync::Weak;

use indexmap::IndexSet;
use parking_lot::RwLock;

use super::{
    AddedPrimEntry, DirtiedPrimEntry, ObserverRegistry, RemovedPrimEntry, SceneIndex,
    SceneIndexObserver, SceneIndexPrim,
};
use crate::base::{PrimPath, Token};
use crate::data_source::ContainerHandle;
use crate::error::{Error, Result};

/// A prim to add to a [`RetainedSceneIndex`].
#[derive(Debug, Clone)]
pub struct RetainedPrimEntry {
    /// Where to put the prim.
    pub prim_path: PrimPath,
    /// Its type.
    pub prim_type: Token,
    /// Its data.
    pub data_source: Option<ContainerHandle>,
}

impl RetainedPrimEntry {
    /// Create an entry.
    pub fn new(
        prim_path: PrimPath,
        prim_type: impl Into<Token>,
        data_source: Option<ContainerHandle>,
    ) -> Self {
        Self {
            prim_path,
            prim_type: prim_type.into(),
            data_source,
        }
    }
}

#[derive(Debug, Default)]
struct Node {
    prim: SceneIndexPrim,
    children: IndexSet<PrimPath>,
}

/// A scene index holding its prims in memory.
#[derive(Debug)]
pub struct RetainedSceneIndex {
    nodes: RwLock<HashMap<PrimPath, Node>>,
    observers: ObserverRegistry,
}

impl RetainedSceneIndex {
    /// Create a scene holding only the absolute root.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(PrimPath::absolute_root(), Node::default());
        Self {
            nodes: RwLock::new(nodes),
            observers: ObserverRegistry::new(),
        }
    }

    /// Add prims, replacing the data of any that already exist, and send a
    /// single `prims_added` batch.
    ///
    /// Fails without changing anything if any entry has the empty path.
    pub fn add_prims(&self, entries: &[RetainedPrimEntry]) -> Result<()> {
        if let Some(entry) = entries.iter().find(|entry| entry.prim_path.is_empty()) {
            return Err(Error::MissingParent {
                path: entry.prim_path.to_string(),
            });
        }

        let mut added = Vec::with_capacity(entries.len());
        {
            let mut nodes = self.nodes.write();
            for entry in entries {
                link_ancestors(&mut nodes, &entry.prim_path);
                let node = nodes.entry(entry.prim_path.clone()).or_default();
                node.prim = SceneIndexPrim::new(entry.prim_type.clone(), entry.data_source.clone());
                added.push(AddedPrimEntry::new(
                    entry.prim_path.clone(),
                    entry.prim_type.clone(),
                ));
            }
        }

        self.observers.send_prims_added(self, &added);
        Ok(())
    }

    /// Remove prims and their descendants, and send a single
    /// `prims_removed` batch. Removing the root clears the scene but keeps
    /// the root itself.
    pub fn remove_prims(&self, paths: &[PrimPath]) {
        let mut removed = Vec::with_capacity(paths.len());
        {
            let mut nodes = self.nodes.write();
            for path in paths.iter().filter(|path| !path.is_empty()) {
                remove_subtree(&mut nodes, path);
                if path.is_absolute_root() {
                    nodes.insert(PrimPath::absolute_root(), Node::default());
                } else if let Some(parent) = nodes.get_mut(&path.parent()) {
                    parent.children.shift_remove(path);
                }
                removed.push(RemovedPrimEntry::new(path.clone()));
            }
        }

        self.observers.send_prims_removed(self, &removed);
    }

    /// Send a `prims_dirtied` batch. Stored data is left as is.
    pub fn dirty_prims(&self, entries: &[DirtiedPrimEntry]) {
        self.observers.send_prims_dirtied(self, entries);
    }

    /// Check whether a prim exists at `path`.
    pub fn contains(&self, path: &PrimPath) -> bool {
        self.nodes.read().contains_key(path)
    }

    /// Number of prims, including the root.
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Check whether only the root remains.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for RetainedSceneIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneIndex for RetainedSceneIndex {
    fn get_prim(&self, path: &PrimPath) -> SceneIndexPrim {
        self.nodes
            .read()
            .get(path)
            .map(|node| node.prim.clone())
            .unwrap_or_default()
    }

    fn get_child_prim_paths(&self, path: &PrimPath) -> Vec<PrimPath> {
        self.nodes
            .read()
            .get(path)
            .map(|node| node.children.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn add_observer(&self, observer: Weak<dyn SceneIndexObserver>) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, observer: &Weak<dyn SceneIndexObserver>) {
        self.observers.remove(observer);
    }
}

/// Make sure every ancestor of `path` exists and lists its child.
fn link_ancestors(nodes: &mut HashMap<PrimPath, Node>, path: &PrimPath) {
    let mut child = path.clone();
    while !child.is_absolute_root() {
        let parent = child.parent();
        // A linked child implies linked ancestors.
        if !nodes.entry(parent.clone()).or_default().children.insert(child) {
            break;
        }
        child = parent;
    }
}

fn remove_subtree(nodes: &mut HashMap<PrimPath, Node>, path: &PrimPath) {
    let mut stack = vec![path.clone()];
    while let Some(current) = stack.pop() {
        if let Some(node) = nodes.remove(&current) {
            stack.extend(node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::RetainedContainer;
    use crate::scene::{Notice, NoticeRecorder};

    fn path(text: &str) -> PrimPath {
        text.parse().unwrap()
    }

    fn entry(text: &str) -> RetainedPrimEntry {
        RetainedPrimEntry::new(
            path(text),
            "mesh",
            Some(RetainedContainer::builder().with("value", 1_i64).build()),
        )
    }

    #[test]
    fn add_creates_missing_ancestors() {
        let scene = RetainedSceneIndex::new();
        scene.add_prims(&[entry("/a/b/c")]).unwrap();

        assert!(scene.contains(&path("/a")));
        assert!(scene.contains(&path("/a/b")));
        assert_eq!(scene.get_child_prim_paths(&PrimPath::absolute_root()), [path("/a")]);
        assert_eq!(scene.get_child_prim_paths(&path("/a/b")), [path("/a/b/c")]);

        let ancestor = scene.get_prim(&path("/a"));
        assert!(ancestor.prim_type.is_empty());
        assert!(ancestor.is_empty());

        let prim = scene.get_prim(&path("/a/b/c"));
        assert_eq!(prim.prim_type.as_str(), "mesh");
        assert!(!prim.is_empty());
    }

    #[test]
    fn add_replaces_existing_data() {
        let scene = RetainedSceneIndex::new();
        scene.add_prims(&[entry("/a/b")]).unwrap();
        scene
            .add_prims(&[RetainedPrimEntry::new(path("/a"), "xform", None)])
            .unwrap();

        assert_eq!(scene.get_prim(&path("/a")).prim_type.as_str(), "xform");
        assert_eq!(scene.get_child_prim_paths(&path("/a")), [path("/a/b")]);
    }

    #[test]
    fn add_rejects_empty_path() {
        let scene = RetainedSceneIndex::new();
        let result = scene.add_prims(&[
            entry("/a"),
            RetainedPrimEntry::new(PrimPath::empty(), "mesh", None),
        ]);

        assert!(matches!(result, Err(Error::MissingParent { .. })));
        assert!(!scene.contains(&path("/a")));
    }

    #[test]
    fn remove_drops_subtree() {
        let scene = RetainedSceneIndex::new();
        scene
            .add_prims(&[entry("/a/b/c"), entry("/a/d"), entry("/e")])
            .unwrap();
        scene.remove_prims(&[path("/a/b")]);

        assert!(!scene.contains(&path("/a/b")));
        assert!(!scene.contains(&path("/a/b/c")));
        assert!(scene.contains(&path("/a/d")));
        assert_eq!(scene.get_child_prim_paths(&path("/a")), [path("/a/d")]);
        assert!(scene.get_prim(&path("/a/b/c")).is_empty());
    }

    #[test]
    fn remove_root_keeps_root() {
        let scene = RetainedSceneIndex::new();
        scene.add_prims(&[entry("/a"), entry("/b")]).unwrap();
        scene.remove_prims(&[PrimPath::absolute_root()]);

        assert!(scene.is_empty());
        assert!(scene.contains(&PrimPath::absolute_root()));
        assert!(scene.get_child_prim_paths(&PrimPath::absolute_root()).is_empty());
    }

    #[test]
    fn edits_send_notices() {
        let scene = RetainedSceneIndex::new();
        let recorder = NoticeRecorder::new();
        NoticeRecorder::observe(&recorder, &scene);

        scene.add_prims(&[entry("/a")]).unwrap();
        scene.dirty_prims(&[DirtiedPrimEntry::new(
            path("/a"),
            crate::locator::DataSourceLocator::parse("value"),
        )]);
        scene.remove_prims(&[path("/a")]);

        let notices = recorder.take();
        assert_eq!(notices.len(), 3);
        assert_eq!(
            notices[0],
            Notice::Added(vec![AddedPrimEntry::new(path("/a"), Token::new("mesh"))])
        );
        assert!(matches!(notices[1], Notice::Dirtied(ref entries) if entries.len() == 1));
        assert_eq!(
            notices[2],
            Notice::Removed(vec![RemovedPrimEntry::new(path("/a"))])
        );
    }
}
