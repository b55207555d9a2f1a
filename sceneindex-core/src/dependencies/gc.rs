//! Deferred cleanup of flagged dependency entries.

use tracing::{debug, warn};

use super::graph::DependencyGraph;
use crate::base::PrimPath;

/// What a cleanup sweep erased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovedEntries {
    /// Affected prims whose forward entry was erased.
    pub affected: Vec<PrimPath>,
    /// Depended-on prims whose reverse entry was erased.
    pub depended_on: Vec<PrimPath>,
}

impl RemovedEntries {
    /// Check whether the sweep erased nothing.
    pub fn is_empty(&self) -> bool {
        self.affected.is_empty() && self.depended_on.is_empty()
    }
}

impl DependencyGraph {
    /// Erase every entry still flagged for deletion and empty both cleanup
    /// queues.
    ///
    /// Must not run concurrently with discovery or notice handling on the
    /// same graph. Entries re-resolved since they were flagged are kept.
    pub fn remove_deleted_entries(&self) -> RemovedEntries {
        let mut removed = RemovedEntries::default();

        let depended_on_paths: Vec<PrimPath> = self
            .potentially_deleted_depended_on
            .iter()
            .map(|path| path.key().clone())
            .collect();
        self.potentially_deleted_depended_on.clear();

        for depended_on in depended_on_paths {
            let flagged: Vec<PrimPath> = match self.depended_on_to_affected.get_mut(&depended_on) {
                Some(mut dependents) => {
                    let flagged: Vec<PrimPath> = dependents
                        .iter()
                        .filter(|(_, entry)| entry.flagged_for_deletion)
                        .map(|(affected, _)| affected.clone())
                        .collect();
                    for affected in &flagged {
                        dependents.shift_remove(affected);
                    }
                    flagged
                }
                None => continue,
            };

            for affected in flagged {
                let erase = match self.affected_to_depended_on.get_mut(&affected) {
                    Some(mut entry) => {
                        entry.depended_on.shift_remove(&depended_on);
                        entry.flagged_for_deletion && entry.depended_on.is_empty()
                    }
                    None => {
                        warn!(
                            affected = %affected,
                            depended_on = %depended_on,
                            "dependent entry has no matching forward entry"
                        );
                        false
                    }
                };
                if erase && self.affected_to_depended_on.remove(&affected).is_some() {
                    removed.affected.push(affected);
                }
            }

            if self
                .depended_on_to_affected
                .remove_if(&depended_on, |_, dependents| dependents.is_empty())
                .is_some()
            {
                removed.depended_on.push(depended_on);
            }
        }

        let affected_paths: Vec<PrimPath> = self
            .potentially_deleted_affected
            .iter()
            .map(|path| path.key().clone())
            .collect();
        self.potentially_deleted_affected.clear();

        for affected in affected_paths {
            if self
                .affected_to_depended_on
                .remove_if(&affected, |_, entry| entry.flagged_for_deletion)
                .is_some()
            {
                removed.affected.push(affected);
            }
        }

        debug!(
            affected = removed.affected.len(),
            depended_on = removed.depended_on.len(),
            "removed deleted dependency entries"
        );
        removed
    }
}
