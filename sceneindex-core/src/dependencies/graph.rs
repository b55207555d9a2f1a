//! Dependency bookkeeping.
//!
//! Edges are stored twice. The forward map answers "what does this prim
//! depend on?" and is what removal and re-resolution walk. The reverse map
//! answers "who depends on this prim, and through which locators?" and is
//! what dirty propagation walks.
//!
//! Nothing is erased eagerly. Clearing a prim's edges flags them and queues
//! their paths, and a later sweep (see `gc`) erases whatever is still flagged.
//! Re-resolution in between simply unflags what it records again.
//!
//! Map guards are never held across calls back into the graph: queries
//! snapshot what they need into owned values first.

use dashmap::{DashMap, DashSet};
use indexmap::{IndexMap, IndexSet};

use super::schema::DependencyDeclaration;
use crate::base::{PrimPath, Token};
use crate::locator::DataSourceLocator;

/// The two locators of one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocatorPair {
    pub depended_on_locator: DataSourceLocator,
    pub affected_locator: DataSourceLocator,
}

/// Forward entry: what an affected prim depends on.
#[derive(Debug, Default)]
pub(crate) struct AffectedPrimEntry {
    pub depended_on: IndexSet<PrimPath>,
    pub flagged_for_deletion: bool,
}

/// Reverse sub-entry: the declarations linking one affected prim to one
/// depended-on prim.
#[derive(Debug, Default)]
pub(crate) struct DependentEntry {
    pub declarations: IndexMap<Token, LocatorPair>,
    pub flagged_for_deletion: bool,
}

/// Dependents of one depended-on prim, keyed by affected prim.
pub(crate) type Dependents = IndexMap<PrimPath, DependentEntry>;

/// Forward and reverse dependency maps plus the cleanup queues.
#[derive(Debug, Default)]
pub(crate) struct DependencyGraph {
    pub(super) affected_to_depended_on: DashMap<PrimPath, AffectedPrimEntry>,
    pub(super) depended_on_to_affected: DashMap<PrimPath, Dependents>,
    pub(super) potentially_deleted_affected: DashSet<PrimPath>,
    pub(super) potentially_deleted_depended_on: DashSet<PrimPath>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A prim needs discovery if it has no live forward entry.
    pub fn needs_discovery(&self, affected: &PrimPath) -> bool {
        self.affected_to_depended_on
            .get(affected)
            .map_or(true, |entry| entry.flagged_for_deletion)
    }

    pub fn is_checked(&self, affected: &PrimPath) -> bool {
        !self.needs_discovery(affected)
    }

    /// Record `declarations` as the complete set of dependencies of
    /// `affected`, replacing whatever was recorded before.
    pub fn update(&self, affected: &PrimPath, declarations: &[DependencyDeclaration]) {
        let mut grouped: IndexMap<PrimPath, IndexMap<Token, LocatorPair>> = IndexMap::new();
        for declaration in declarations {
            grouped
                .entry(declaration.resolved_prim_path(affected))
                .or_default()
                .insert(
                    declaration.name.clone(),
                    LocatorPair {
                        depended_on_locator: declaration.depended_on_locator.clone(),
                        affected_locator: declaration.affected_locator.clone(),
                    },
                );
        }

        // Anything recorded before but not declared now goes stale.
        let previous = self
            .affected_to_depended_on
            .get(affected)
            .map(|entry| entry.depended_on.clone())
            .unwrap_or_default();
        for stale in previous.iter().filter(|path| !grouped.contains_key(*path)) {
            self.flag_dependent(stale, affected);
        }

        for (depended_on, declarations) in &grouped {
            self.depended_on_to_affected
                .entry(depended_on.clone())
                .or_default()
                .insert(
                    affected.clone(),
                    DependentEntry {
                        declarations: declarations.clone(),
                        flagged_for_deletion: false,
                    },
                );
        }

        let mut depended_on: IndexSet<PrimPath> = grouped.into_keys().collect();
        // Stale paths stay listed until the sweep drops their sub-entries.
        depended_on.extend(previous);
        self.affected_to_depended_on.insert(
            affected.clone(),
            AffectedPrimEntry {
                depended_on,
                flagged_for_deletion: false,
            },
        );
    }

    /// Flag every edge out of `affected` for deletion.
    pub fn clear(&self, affected: &PrimPath) {
        let depended_on = match self.affected_to_depended_on.get_mut(affected) {
            Some(mut entry) => {
                entry.flagged_for_deletion = true;
                entry.depended_on.clone()
            }
            None => return,
        };
        for path in &depended_on {
            self.flag_dependent(path, affected);
        }
        self.potentially_deleted_affected.insert(affected.clone());
    }

    fn flag_dependent(&self, depended_on: &PrimPath, affected: &PrimPath) {
        let flagged = self
            .depended_on_to_affected
            .get_mut(depended_on)
            .and_then(|mut dependents| {
                dependents
                    .get_mut(affected)
                    .map(|entry| entry.flagged_for_deletion = true)
            })
            .is_some();
        if flagged {
            self.potentially_deleted_depended_on
                .insert(depended_on.clone());
        }
    }

    /// Live dependents of `depended_on` whose depended-on locator
    /// intersects `locator`, as `(affected prim, affected locator)` pairs.
    /// The empty locator matches every declaration.
    pub fn matching_dependents(
        &self,
        depended_on: &PrimPath,
        locator: &DataSourceLocator,
    ) -> Vec<(PrimPath, DataSourceLocator)> {
        let Some(dependents) = self.depended_on_to_affected.get(depended_on) else {
            return Vec::new();
        };
        let mut matches = Vec::new();
        for (affected, entry) in dependents.iter() {
            if entry.flagged_for_deletion {
                continue;
            }
            for pair in entry.declarations.values() {
                if pair.depended_on_locator.intersects(locator) {
                    matches.push((affected.clone(), pair.affected_locator.clone()));
                }
            }
        }
        matches
    }

    /// Live declarations targeting `depended_on`.
    pub fn dependents(
        &self,
        depended_on: &PrimPath,
    ) -> Vec<(PrimPath, Token, DataSourceLocator, DataSourceLocator)> {
        let Some(dependents) = self.depended_on_to_affected.get(depended_on) else {
            return Vec::new();
        };
        dependents
            .iter()
            .filter(|(_, entry)| !entry.flagged_for_deletion)
            .flat_map(|(affected, entry)| {
                entry.declarations.iter().map(move |(name, pair)| {
                    (
                        affected.clone(),
                        name.clone(),
                        pair.depended_on_locator.clone(),
                        pair.affected_locator.clone(),
                    )
                })
            })
            .collect()
    }

    /// Prims `affected` currently depends on, skipping stale links.
    pub fn depended_on_paths(&self, affected: &PrimPath) -> Vec<PrimPath> {
        let Some(entry) = self.affected_to_depended_on.get(affected) else {
            return Vec::new();
        };
        if entry.flagged_for_deletion {
            return Vec::new();
        }
        let candidates: Vec<PrimPath> = entry.depended_on.iter().cloned().collect();
        drop(entry);

        candidates
            .into_iter()
            .filter(|depended_on| {
                self.depended_on_to_affected
                    .get(depended_on)
                    .and_then(|dependents| {
                        dependents
                            .get(affected)
                            .map(|entry| !entry.flagged_for_deletion)
                    })
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Tracked affected prims at or below `root`.
    pub fn affected_under(&self, root: &PrimPath) -> Vec<PrimPath> {
        self.affected_to_depended_on
            .iter()
            .filter(|entry| entry.key().has_prefix(root))
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Tracked depended-on prims at or below `root`.
    pub fn depended_on_under(&self, root: &PrimPath) -> Vec<PrimPath> {
        self.depended_on_to_affected
            .iter()
            .filter(|entry| entry.key().has_prefix(root))
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Sizes of the two cleanup queues: `(affected, depended on)`.
    pub fn pending_cleanup_counts(&self) -> (usize, usize) {
        (
            self.potentially_deleted_affected.len(),
            self.potentially_deleted_depended_on.len(),
        )
    }
}
