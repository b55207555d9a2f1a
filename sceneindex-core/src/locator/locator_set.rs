//! Locator Sets
//!
//! A [`DataSourceLocatorSet`] is the currency of dirty notices: it describes
//! which fields of a prim may have changed.
//!
//! # Representation
//!
//! Members are kept sorted and minimal. Inserting a locator that already has
//! a prefix in the set is a no-op; inserting a locator that is a prefix of
//! existing members absorbs them. Because locators sort immediately before
//! their extensions, every query can be answered either by a linear scan or
//! by a binary search. Small sets scan; large sets search.

use std::fmt;
use std::slice;

use super::DataSourceLocator;

/// Sets at least this large answer single-locator queries by binary search.
const BINARY_SEARCH_CUTOFF: usize = 5;

/// Set-vs-set queries walk both sorted sequences in step once either set is
/// at least this large.
const ZIPPER_COMPARE_CUTOFF: usize = 9;

/// A sorted, prefix-collapsed set of locators.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct DataSourceLocatorSet {
    locators: Vec<DataSourceLocator>,
}

impl DataSourceLocatorSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The universal set, containing the empty locator.
    pub fn universal() -> Self {
        Self {
            locators: vec![DataSourceLocator::empty()],
        }
    }

    /// Check whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// Check whether the set contains the empty locator (and thus everything).
    pub fn is_universal(&self) -> bool {
        self.locators.first().is_some_and(DataSourceLocator::is_empty)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Iterate over the members in sorted order.
    pub fn iter(&self) -> slice::Iter<'_, DataSourceLocator> {
        self.locators.iter()
    }

    /// The members as a sorted slice.
    pub fn as_slice(&self) -> &[DataSourceLocator] {
        &self.locators
    }

    /// Insert a locator, keeping the set minimal.
    pub fn insert(&mut self, locator: DataSourceLocator) {
        if self.contains(&locator) {
            return;
        }
        // Members that `locator` absorbs form a contiguous run at its position.
        let start = self.locators.partition_point(|member| member < &locator);
        let absorbed = self.locators[start..]
            .iter()
            .take_while(|member| member.has_prefix(&locator))
            .count();
        self.locators.drain(start..start + absorbed);
        self.locators.insert(start, locator);
    }

    /// Insert every member of `other`.
    pub fn insert_set(&mut self, other: &DataSourceLocatorSet) {
        if other.is_empty() || self.is_universal() {
            return;
        }
        if self.is_empty() {
            self.locators.clone_from(&other.locators);
            return;
        }
        self.locators.extend(other.locators.iter().cloned());
        self.normalize();
    }

    /// Check whether some member is a prefix of (or equal to) `locator`.
    pub fn contains(&self, locator: &DataSourceLocator) -> bool {
        if self.locators.len() < BINARY_SEARCH_CUTOFF {
            self.contains_scan(locator)
        } else {
            self.contains_search(locator)
        }
    }

    /// Check whether some member intersects `locator`.
    pub fn intersects(&self, locator: &DataSourceLocator) -> bool {
        if self.locators.len() < BINARY_SEARCH_CUTOFF {
            self.intersects_scan(locator)
        } else {
            self.intersects_search(locator)
        }
    }

    /// Check whether any member of `self` intersects any member of `other`.
    pub fn intersects_set(&self, other: &DataSourceLocatorSet) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        if self.len() < ZIPPER_COMPARE_CUTOFF && other.len() < ZIPPER_COMPARE_CUTOFF {
            self.intersects_set_scan(other)
        } else {
            self.intersects_set_zipper(other)
        }
    }

    /// Lazily yield the intersection of each intersecting member with
    /// `locator`.
    ///
    /// For a member that has `locator` as a prefix the member is yielded;
    /// for a member that is a prefix of `locator`, `locator` itself is.
    pub fn intersection<'a>(&'a self, locator: &'a DataSourceLocator) -> Intersection<'a> {
        let inner = if self.locators.len() < BINARY_SEARCH_CUTOFF {
            Inner::Scan(self.locators.iter())
        } else if self.contains_search(locator) {
            Inner::Single(Some(locator))
        } else {
            let start = self.lower_bound(locator);
            Inner::Run(self.locators[start..].iter())
        };
        Intersection { locator, inner }
    }

    /// Apply [`DataSourceLocator::replace_prefix`] to every member.
    pub fn replace_prefix(
        &self,
        old_prefix: &DataSourceLocator,
        new_prefix: &DataSourceLocator,
    ) -> Self {
        let mut result = Self {
            locators: self
                .locators
                .iter()
                .map(|locator| locator.replace_prefix(old_prefix, new_prefix))
                .collect(),
        };
        result.normalize();
        result
    }

    /// Sort members and drop those that have another member as a prefix.
    fn normalize(&mut self) {
        self.locators.sort_unstable();
        let mut kept: Vec<DataSourceLocator> = Vec::with_capacity(self.locators.len());
        for locator in self.locators.drain(..) {
            // Anything absorbed in sorted order is absorbed by the last kept member.
            if kept.last().is_some_and(|last| locator.has_prefix(last)) {
                continue;
            }
            kept.push(locator);
        }
        self.locators = kept;
    }

    /// Index of the first member not less than `locator`.
    fn lower_bound(&self, locator: &DataSourceLocator) -> usize {
        self.locators.partition_point(|member| member < locator)
    }

    fn contains_scan(&self, locator: &DataSourceLocator) -> bool {
        self.locators.iter().any(|member| locator.has_prefix(member))
    }

    fn contains_search(&self, locator: &DataSourceLocator) -> bool {
        // Only the greatest member not above `locator` can be its prefix.
        let end = self.locators.partition_point(|member| member <= locator);
        end > 0 && locator.has_prefix(&self.locators[end - 1])
    }

    fn intersects_scan(&self, locator: &DataSourceLocator) -> bool {
        self.locators.iter().any(|member| member.intersects(locator))
    }

    fn intersects_search(&self, locator: &DataSourceLocator) -> bool {
        let start = self.lower_bound(locator);
        if start < self.locators.len() && self.locators[start].has_prefix(locator) {
            return true;
        }
        start > 0 && locator.has_prefix(&self.locators[start - 1])
    }

    fn intersects_set_scan(&self, other: &DataSourceLocatorSet) -> bool {
        self.locators.iter().any(|a| other.locators.iter().any(|b| a.intersects(b)))
    }

    fn intersects_set_zipper(&self, other: &DataSourceLocatorSet) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.locators.len() && j < other.locators.len() {
            let (a, b) = (&self.locators[i], &other.locators[j]);
            if a.intersects(b) {
                return true;
            }
            if a < b {
                i += 1;
            } else {
                j += 1;
            }
        }
        false
    }
}

impl From<DataSourceLocator> for DataSourceLocatorSet {
    fn from(locator: DataSourceLocator) -> Self {
        Self {
            locators: vec![locator],
        }
    }
}

impl FromIterator<DataSourceLocator> for DataSourceLocatorSet {
    fn from_iter<I: IntoIterator<Item = DataSourceLocator>>(iter: I) -> Self {
        let mut set = Self {
            locators: iter.into_iter().collect(),
        };
        set.normalize();
        set
    }
}

impl Extend<DataSourceLocator> for DataSourceLocatorSet {
    fn extend<I: IntoIterator<Item = DataSourceLocator>>(&mut self, iter: I) {
        self.locators.extend(iter);
        self.normalize();
    }
}

impl<'a> IntoIterator for &'a DataSourceLocatorSet {
    type Item = &'a DataSourceLocator;
    type IntoIter = slice::Iter<'a, DataSourceLocator>;

    fn into_iter(self) -> Self::IntoIter {
        self.locators.iter()
    }
}

impl fmt::Debug for DataSourceLocatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.locators.iter().map(ToString::to_string))
            .finish()
    }
}

/// Iterator returned by [`DataSourceLocatorSet::intersection`].
///
/// Borrows the set, so it cannot outlive a mutation of it.
#[derive(Debug, Clone)]
pub struct Intersection<'a> {
    locator: &'a DataSourceLocator,
    inner: Inner<'a>,
}

#[derive(Debug, Clone)]
enum Inner<'a> {
    /// Test every member.
    Scan(slice::Iter<'a, DataSourceLocator>),
    /// Members extending the locator, starting at its lower bound.
    Run(slice::Iter<'a, DataSourceLocator>),
    /// A member is a prefix of the locator; the locator is the only result.
    Single(Option<&'a DataSourceLocator>),
}

impl<'a> Iterator for Intersection<'a> {
    type Item = &'a DataSourceLocator;

    fn next(&mut self) -> Option<Self::Item> {
        let locator = self.locator;
        match &mut self.inner {
            Inner::Scan(members) => members.find_map(|member| {
                if member.has_prefix(locator) {
                    Some(member)
                } else if locator.has_prefix(member) {
                    Some(locator)
                } else {
                    None
                }
            }),
            Inner::Run(members) => match members.next() {
                Some(member) if member.has_prefix(locator) => Some(member),
                _ => {
                    // Past the run; stay exhausted.
                    self.inner = Inner::Single(None);
                    None
                }
            },
            Inner::Single(single) => single.take(),
        }
    }
}
