//! Property Tests
//!
//! Locator laws and dirty propagation over random dependency graphs.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use sceneindex_core::base::PrimPath;
use sceneindex_core::data_source::RetainedContainer;
use sceneindex_core::dependencies::{
    DependenciesSchema, DependencyDeclaration, DependencyForwardingSceneIndex, DEPENDENCIES,
};
use sceneindex_core::locator::{DataSourceLocator, DataSourceLocatorSet};
use sceneindex_core::scene::{
    DirtiedPrimEntry, Notice, NoticeRecorder, RetainedPrimEntry, RetainedSceneIndex, SceneIndex,
};

const PRIM_COUNT: usize = 5;

fn locator_strategy() -> impl Strategy<Value = DataSourceLocator> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 0..4)
        .prop_map(DataSourceLocator::new)
}

fn prim_path(index: usize) -> PrimPath {
    PrimPath::absolute_root().append_child(&format!("P{index}"))
}

/// `(affected prim, depended-on prim, depended-on locator, affected locator)`
type Edge = (usize, usize, DataSourceLocator, DataSourceLocator);

fn edge_strategy() -> impl Strategy<Value = Edge> {
    (
        0..PRIM_COUNT,
        0..PRIM_COUNT,
        locator_strategy(),
        locator_strategy(),
    )
}

/// Every `(prim, locator)` pair reachable from `start`, including `start`.
fn naive_closure(edges: &[Edge], start: (usize, DataSourceLocator)) -> HashSet<(usize, DataSourceLocator)> {
    let mut reached = HashSet::from([start.clone()]);
    let mut work = vec![start];
    while let Some((prim, locator)) = work.pop() {
        for (affected, depended_on, depended_on_locator, affected_locator) in edges {
            if *depended_on == prim && depended_on_locator.intersects(&locator) {
                let next = (*affected, affected_locator.clone());
                if reached.insert(next.clone()) {
                    work.push(next);
                }
            }
        }
    }
    reached
}

fn build_scene(edges: &[Edge]) -> (Arc<RetainedSceneIndex>, Arc<DependencyForwardingSceneIndex>) {
    let input = Arc::new(RetainedSceneIndex::new());
    let index = DependencyForwardingSceneIndex::new(input.clone());

    let prims: Vec<RetainedPrimEntry> = (0..PRIM_COUNT)
        .map(|prim| {
            let declarations = edges
                .iter()
                .enumerate()
                .filter(|(_, edge)| edge.0 == prim)
                .map(|(i, (_, depended_on, depended_on_locator, affected_locator))| {
                    DependencyDeclaration::new(
                        format!("edge{i}"),
                        prim_path(*depended_on),
                        depended_on_locator.clone(),
                        affected_locator.clone(),
                    )
                });
            let data = RetainedContainer::builder()
                .with(DEPENDENCIES, DependenciesSchema::build(declarations))
                .build();
            RetainedPrimEntry::new(prim_path(prim), "mesh", Some(data))
        })
        .collect();
    input.add_prims(&prims).unwrap();
    for prim in 0..PRIM_COUNT {
        index.get_prim(&prim_path(prim));
    }
    (input, index)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn intersects_means_one_prefixes_the_other(a in locator_strategy(), b in locator_strategy()) {
        prop_assert_eq!(a.intersects(&b), a.has_prefix(&b) || b.has_prefix(&a));
    }

    #[test]
    fn append_then_remove_last_round_trips(
        locator in locator_strategy(),
        extra in prop::sample::select(vec!["x", "y", "primvars"]),
    ) {
        prop_assert_eq!(locator.append(extra).remove_last_element(), locator);
    }

    #[test]
    fn universal_set_contains_everything(
        members in prop::collection::vec(locator_strategy(), 0..8),
        probe in locator_strategy(),
    ) {
        let mut locators: DataSourceLocatorSet = members.into_iter().collect();
        locators.insert(DataSourceLocator::empty());
        prop_assert!(locators.is_universal());
        prop_assert!(locators.contains(&probe));
    }

    #[test]
    fn empty_set_matches_nothing(probe in locator_strategy()) {
        let locators = DataSourceLocatorSet::new();
        prop_assert!(!locators.contains(&probe));
        prop_assert!(!locators.intersects(&probe));
        prop_assert!(locators.iter().next().is_none());
    }

    #[test]
    fn propagation_matches_naive_closure(
        edges in prop::collection::vec(edge_strategy(), 0..12),
        start_prim in 0..PRIM_COUNT,
        start_locator in locator_strategy(),
    ) {
        let (input, index) = build_scene(&edges);
        let recorder = NoticeRecorder::new();
        NoticeRecorder::observe(&recorder, index.as_ref());

        input.dirty_prims(&[DirtiedPrimEntry::new(prim_path(start_prim), start_locator.clone())]);

        let notices = recorder.take();
        prop_assert_eq!(notices.len(), 1);
        let Notice::Dirtied(entries) = &notices[0] else {
            panic!("expected a dirty notice");
        };

        let emitted: Vec<(usize, DataSourceLocator)> = entries
            .iter()
            .flat_map(|entry| {
                let prim = (0..PRIM_COUNT)
                    .find(|i| prim_path(*i) == entry.prim_path)
                    .unwrap();
                entry.dirty_locators.iter().map(move |locator| (prim, locator.clone()))
            })
            .collect();
        let unique: HashSet<_> = emitted.iter().cloned().collect();

        prop_assert_eq!(emitted.len(), unique.len());
        prop_assert_eq!(&emitted[0], &(start_prim, start_locator.clone()));
        prop_assert_eq!(unique, naive_closure(&edges, (start_prim, start_locator)));
    }

    #[test]
    fn rediscovery_is_idempotent(edges in prop::collection::vec(edge_strategy(), 0..12)) {
        let (input, index) = build_scene(&edges);
        let snapshot = |index: &DependencyForwardingSceneIndex| {
            (0..PRIM_COUNT)
                .map(|prim| {
                    (
                        index.depended_on_paths(&prim_path(prim)),
                        index.dependents(&prim_path(prim)),
                    )
                })
                .collect::<Vec<_>>()
        };
        let before = snapshot(&*index);

        let everything: Vec<_> = (0..PRIM_COUNT)
            .map(|prim| DirtiedPrimEntry::new(prim_path(prim), DataSourceLocator::new([DEPENDENCIES])))
            .collect();
        input.dirty_prims(&everything);

        prop_assert_eq!(snapshot(&*index), before);
    }
}
