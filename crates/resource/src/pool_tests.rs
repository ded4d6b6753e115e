// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

use super::*;

fn two_node_pool() -> ResourcePool {
    let mut pool = ResourcePool::new("testcluster");
    let root = pool.root();
    for n in 0..2 {
        let node = pool.add(root, ResourceKind::Node, format!("node{n}"), 1);
        for c in 0..2 {
            pool.add(node, ResourceKind::Core, format!("core{c}"), 1);
        }
    }
    pool
}

#[yare::parameterized(
    disjoint_before = { 0, 10, 10, 20, false },
    disjoint_after = { 20, 30, 10, 20, false },
    identical = { 10, 20, 10, 20, true },
    contained = { 12, 15, 10, 20, true },
    straddle_start = { 5, 11, 10, 20, true },
    straddle_end = { 19, 25, 10, 20, true },
)]
fn window_overlap(a0: i64, a1: i64, b0: i64, b1: i64, expected: bool) {
    let a = TimeWindow::new(a0, a1);
    let b = TimeWindow::new(b0, b1);
    assert_eq!(a.overlaps(&b), expected);
    assert_eq!(b.overlaps(&a), expected);
}

#[test]
fn pool_starts_with_cluster_root() {
    let pool = ResourcePool::new("c");
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.get(pool.root()).kind, ResourceKind::Cluster);
}

#[test]
fn add_links_parent_and_child() {
    let mut pool = ResourcePool::new("c");
    let root = pool.root();
    let node = pool.add(root, ResourceKind::Node, "node0", 1);

    assert_eq!(pool.get(root).children, vec![node]);
    assert_eq!(pool.get(node).parent, Some(root));
}

#[test]
fn lookup_by_name_finds_every_match() {
    let pool = two_node_pool();
    assert_eq!(pool.lookup_by_name("node1").len(), 1);
    // Each node names its cores identically
    assert_eq!(pool.lookup_by_name("core0").len(), 2);
    assert!(pool.lookup_by_name("node9").is_empty());
}

#[test]
fn free_in_rejects_overlapping_booking() {
    let mut pool = two_node_pool();
    let core = pool.of_kind(ResourceKind::Core)[0];
    let w = TimeWindow::new(0, 60);

    assert!(pool.get(core).free_in(&w));
    pool.get_mut(core)
        .insert_allocation(JobId(1), Booking { window: w, amount: 1 });

    assert!(!pool.get(core).free_in(&TimeWindow::new(30, 90)));
    // A disjoint future window is still free
    assert!(pool.get(core).free_in(&TimeWindow::new(60, 120)));
}

#[test]
fn reservation_blocks_exclusive_use() {
    let mut pool = two_node_pool();
    let core = pool.of_kind(ResourceKind::Core)[0];
    let w = TimeWindow::new(0, 60);

    pool.get_mut(core)
        .insert_reservation(JobId(2), Booking { window: w, amount: 1 });
    assert!(!pool.get(core).free_in(&w));

    pool.get_mut(core).clear_reservations();
    assert!(pool.get(core).free_in(&w));
}

#[test]
fn shareable_ignores_zero_amount_tags() {
    let mut pool = two_node_pool();
    let node = pool.of_kind(ResourceKind::Node)[0];
    let w = TimeWindow::new(0, 60);

    pool.get_mut(node)
        .insert_allocation(JobId(1), Booking { window: w, amount: 0 });

    // A second shared tag fits; exclusive use does not.
    assert!(pool.get(node).shareable_in(&w, 0));
    assert!(!pool.get(node).free_in(&w));
}

#[test]
fn allocation_flips_state_and_release_restores_it() {
    let mut pool = two_node_pool();
    let core = pool.of_kind(ResourceKind::Core)[0];
    let w = TimeWindow::new(0, 60);

    pool.get_mut(core)
        .insert_allocation(JobId(1), Booking { window: w, amount: 1 });
    assert_eq!(pool.get(core).state, ResourceState::Allocated);

    pool.get_mut(core).remove_job(JobId(1));
    assert_eq!(pool.get(core).state, ResourceState::Idle);
}

#[test]
fn release_does_not_clobber_excluded_state() {
    let mut pool = two_node_pool();
    let core = pool.of_kind(ResourceKind::Core)[0];
    let w = TimeWindow::new(0, 60);

    pool.get_mut(core)
        .insert_allocation(JobId(1), Booking { window: w, amount: 1 });
    pool.get_mut(core).state = ResourceState::Excluded;

    pool.get_mut(core).remove_job(JobId(1));
    assert_eq!(pool.get(core).state, ResourceState::Excluded);
}

#[test]
fn excluded_resources_are_never_available() {
    let mut pool = two_node_pool();
    let core = pool.of_kind(ResourceKind::Core)[0];
    let w = TimeWindow::new(0, 60);

    pool.get_mut(core).state = ResourceState::Excluded;
    assert!(!pool.get(core).free_in(&w));
    assert!(!pool.get(core).shareable_in(&w, 0));
}

#[test]
fn tree_ids_are_preorder() {
    let tree = ResourceTree {
        id: ResourceId(0),
        children: vec![
            ResourceTree {
                id: ResourceId(1),
                children: vec![ResourceTree::leaf(ResourceId(2))],
            },
            ResourceTree::leaf(ResourceId(3)),
        ],
    };
    let ids: Vec<usize> = tree.ids().iter().map(|id| id.0).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
}

#[test]
fn allocated_jobs_lists_every_tag() {
    let mut pool = two_node_pool();
    let node = pool.of_kind(ResourceKind::Node)[0];
    let w = TimeWindow::new(0, 60);

    pool.get_mut(node)
        .insert_allocation(JobId(10), Booking { window: w, amount: 0 });
    pool.get_mut(node)
        .insert_allocation(JobId(11), Booking { window: w, amount: 0 });

    assert_eq!(pool.get(node).allocated_jobs(), vec![JobId(10), JobId(11)]);
}
