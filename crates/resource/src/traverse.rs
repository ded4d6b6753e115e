// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Matching, selection, allocation, and release over the pool.
//!
//! `find` builds a candidate shadow tree, `select` stages concrete picks
//! and counts what it satisfied on the request, `allocate`/`reserve`
//! convert staged picks into bookings. Policy plugins drive these in that
//! order; a selection that never reaches allocate/reserve is cleaned up by
//! the `unstage` call at the start of the next pass.

use crate::pool::{
    Booking, Resource, ResourceId, ResourceKind, ResourcePool, ResourceState, ResourceTree,
};
use crate::request::ResourceRequest;
use crate::ResourceError;
use drover_core::JobId;

fn available(r: &Resource, req: &ResourceRequest) -> bool {
    if req.exclusive {
        r.free_in(&req.window)
    } else {
        r.shareable_in(&req.window, req.size)
    }
}

fn child_candidates(pool: &ResourcePool, id: ResourceId, creq: &ResourceRequest) -> u64 {
    pool.get(id)
        .children
        .iter()
        .filter(|&&cid| {
            let cr = pool.get(cid);
            cr.kind == creq.kind && available(cr, creq)
        })
        .count() as u64
}

/// A resource is a candidate when it is itself available for the request
/// and enough of its direct children can satisfy every child request.
fn is_candidate(pool: &ResourcePool, id: ResourceId, req: &ResourceRequest) -> bool {
    available(pool.get(id), req)
        && req.children.iter().all(|c| child_candidates(pool, id, c) >= c.qty)
}

fn find_under(
    pool: &ResourcePool,
    id: ResourceId,
    req: &ResourceRequest,
) -> Option<(u64, ResourceTree)> {
    let r = pool.get(id);
    // An excluded or invalid resource takes its whole subtree out of
    // scheduling.
    if matches!(r.state, ResourceState::Excluded | ResourceState::Invalid) {
        return None;
    }
    if r.kind == req.kind {
        if !is_candidate(pool, id, req) {
            return None;
        }
        // Candidate subtree carries every matching child so selection can
        // pick its quantities later.
        let mut children = Vec::new();
        for creq in &req.children {
            for &cid in &r.children {
                let cr = pool.get(cid);
                if cr.kind == creq.kind && available(cr, creq) {
                    children.push(ResourceTree::leaf(cid));
                }
            }
        }
        return Some((1, ResourceTree { id, children }));
    }

    let mut count = 0;
    let mut children = Vec::new();
    for &cid in &r.children {
        if let Some((n, tree)) = find_under(pool, cid, req) {
            count += n;
            children.push(tree);
        }
    }
    if children.is_empty() {
        None
    } else {
        Some((count, ResourceTree { id, children }))
    }
}

/// Search the hierarchy under `root` for resources satisfying `req`.
///
/// Returns the number of matching resources of the requested kind and a
/// candidate tree retaining only matching branches. A count of zero comes
/// with an empty tree rooted at `root`.
pub fn find_resources(
    pool: &ResourcePool,
    root: ResourceId,
    req: &ResourceRequest,
) -> (u64, ResourceTree) {
    match find_under(pool, root, req) {
        Some((count, tree)) => (count, tree),
        None => (0, ResourceTree::leaf(root)),
    }
}

fn select_under(
    pool: &mut ResourcePool,
    tree: &ResourceTree,
    req: &mut ResourceRequest,
) -> Option<ResourceTree> {
    let kind = pool.get(tree.id).kind;
    if kind == req.kind {
        if req.found() >= req.qty {
            return None;
        }
        // First-fit pick of child quantities; bail if this candidate can
        // no longer supply them.
        let mut picks: Vec<(usize, Vec<ResourceId>)> = Vec::new();
        for (ci, creq) in req.children.iter().enumerate() {
            let mut ids = Vec::new();
            for ct in &tree.children {
                if ids.len() as u64 == creq.qty {
                    break;
                }
                let cr = pool.get(ct.id);
                if cr.kind == creq.kind && cr.staged == 0 && available(cr, creq) {
                    ids.push(ct.id);
                }
            }
            if (ids.len() as u64) < creq.qty {
                return None;
            }
            picks.push((ci, ids));
        }

        pool.get_mut(tree.id).staged = req.size;
        let mut selected_children = Vec::new();
        for (ci, ids) in picks {
            let creq = &mut req.children[ci];
            for id in &ids {
                pool.get_mut(*id).staged = creq.size;
                selected_children.push(ResourceTree::leaf(*id));
            }
            creq.add_found(ids.len() as u64);
        }
        req.add_found(1);
        return Some(ResourceTree { id: tree.id, children: selected_children });
    }

    let mut children = Vec::new();
    for ct in &tree.children {
        if let Some(sel) = select_under(pool, ct, req) {
            children.push(sel);
        }
    }
    if children.is_empty() {
        None
    } else {
        Some(ResourceTree { id: tree.id, children })
    }
}

/// Pick concrete resources out of a candidate tree, staging them on the
/// pool and counting satisfaction on `req`. Returns the selected subtree,
/// or `None` when nothing could be picked.
pub fn select_resources(
    pool: &mut ResourcePool,
    found: &ResourceTree,
    req: &mut ResourceRequest,
) -> Option<ResourceTree> {
    select_under(pool, found, req)
}

/// Convert a selected tree's staged capacity into allocations for `job`.
pub fn allocate_resources(
    pool: &mut ResourcePool,
    tree: &ResourceTree,
    job: JobId,
    window: crate::pool::TimeWindow,
) -> Result<(), ResourceError> {
    for id in tree.ids() {
        let r = pool.get_mut(id);
        let amount = r.staged;
        r.insert_allocation(job, Booking { window, amount });
        r.staged = 0;
    }
    Ok(())
}

/// Convert a selected tree's staged capacity into reservations for `job`.
pub fn reserve_resources(
    pool: &mut ResourcePool,
    tree: &ResourceTree,
    job: JobId,
    window: crate::pool::TimeWindow,
) -> Result<(), ResourceError> {
    for id in tree.ids() {
        let r = pool.get_mut(id);
        let amount = r.staged;
        r.insert_reservation(job, Booking { window, amount });
        r.staged = 0;
    }
    Ok(())
}

/// Drop every allocation and reservation held by `job`.
pub fn release_job(pool: &mut ResourcePool, job: JobId) {
    for id in pool.ids().collect::<Vec<_>>() {
        pool.get_mut(id).remove_job(job);
    }
}

/// Drop all reservations pool-wide. Out-of-order capable policies call
/// this at the top of each pass and re-reserve.
pub fn release_all_reservations(pool: &mut ResourcePool) {
    for id in pool.ids().collect::<Vec<_>>() {
        pool.get_mut(id).clear_reservations();
    }
}

/// Clear staged capacity across a shadow tree.
pub fn unstage(pool: &mut ResourcePool, tree: &ResourceTree) {
    for id in tree.ids() {
        pool.get_mut(id).staged = 0;
    }
}

/// Reduced counts under one node leaf of a serialized allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RliteCounts {
    pub core: u64,
    pub gpu: u64,
}

/// One per-node leaf of the compact allocation form: the hostname, its
/// topology signature, and the reduced child counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RliteLeaf {
    pub node: String,
    pub digest: Option<String>,
    pub children: RliteCounts,
}

fn count_under(pool: &ResourcePool, tree: &ResourceTree, counts: &mut RliteCounts) {
    for child in &tree.children {
        match pool.get(child.id).kind {
            ResourceKind::Core => counts.core += 1,
            ResourceKind::Gpu => counts.gpu += 1,
            _ => {}
        }
        count_under(pool, child, counts);
    }
}

/// Reduce an allocated tree to per-node leaves.
pub fn serialize_lite(pool: &ResourcePool, tree: &ResourceTree) -> Vec<RliteLeaf> {
    fn walk(pool: &ResourcePool, tree: &ResourceTree, out: &mut Vec<RliteLeaf>) {
        let r = pool.get(tree.id);
        if r.kind == ResourceKind::Node {
            let mut counts = RliteCounts::default();
            count_under(pool, tree, &mut counts);
            out.push(RliteLeaf {
                node: r.name.clone(),
                digest: r.digest.clone(),
                children: counts,
            });
        } else {
            for child in &tree.children {
                walk(pool, child, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(pool, tree, &mut out);
    out
}

#[cfg(test)]
#[path = "traverse_tests.rs"]
mod tests;
