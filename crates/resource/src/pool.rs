// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Arena-backed resource pool.

use drover_core::JobId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Index of a resource in the pool arena. Resources are never removed,
/// so ids stay valid for the life of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub usize);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a resource in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Cluster,
    Node,
    Core,
    Gpu,
}

drover_core::simple_display! {
    ResourceKind {
        Cluster => "cluster",
        Node => "node",
        Core => "core",
        Gpu => "gpu",
    }
}

/// Administrative / allocation state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    Idle,
    Allocated,
    Excluded,
    Invalid,
}

drover_core::simple_display! {
    ResourceState {
        Idle => "idle",
        Allocated => "allocated",
        Excluded => "excluded",
        Invalid => "invalid",
    }
}

/// Half-open time interval `[start, end)` in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A per-job booking on a resource. `amount` zero tags the resource as in
/// use without consuming it (shared parents of an allocation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    pub window: TimeWindow,
    pub amount: u64,
}

/// One entry in the pool arena.
#[derive(Debug, Clone)]
pub struct Resource {
    pub kind: ResourceKind,
    pub name: String,
    /// Topology signature; populated on nodes once ranks are linked.
    pub digest: Option<String>,
    pub size: u64,
    pub state: ResourceState,
    /// Capacity marked by an in-progress selection, converted to an
    /// allocation or reservation, or cleared by `unstage`.
    pub staged: u64,
    allocations: BTreeMap<JobId, Booking>,
    reservations: BTreeMap<JobId, Booking>,
    pub children: Vec<ResourceId>,
    pub parent: Option<ResourceId>,
}

impl Resource {
    /// True when an exclusive request for `window` can take this resource:
    /// nothing else may be booked on it during the window.
    pub fn free_in(&self, window: &TimeWindow) -> bool {
        if matches!(self.state, ResourceState::Excluded | ResourceState::Invalid) {
            return false;
        }
        !self
            .allocations
            .values()
            .chain(self.reservations.values())
            .any(|b| b.window.overlaps(window))
    }

    /// True when a shared request can tag this resource during `window`.
    pub fn shareable_in(&self, window: &TimeWindow, amount: u64) -> bool {
        if matches!(self.state, ResourceState::Excluded | ResourceState::Invalid) {
            return false;
        }
        let consumed: u64 = self
            .allocations
            .values()
            .chain(self.reservations.values())
            .filter(|b| b.window.overlaps(window))
            .map(|b| b.amount)
            .sum();
        consumed + amount <= self.size
    }

    /// Jobs holding an allocation on this resource.
    pub fn allocated_jobs(&self) -> Vec<JobId> {
        self.allocations.keys().copied().collect()
    }

    pub fn allocation(&self, job: JobId) -> Option<&Booking> {
        self.allocations.get(&job)
    }

    pub fn reservation(&self, job: JobId) -> Option<&Booking> {
        self.reservations.get(&job)
    }

    pub(crate) fn insert_allocation(&mut self, job: JobId, booking: Booking) {
        self.allocations.insert(job, booking);
        if booking.amount > 0 {
            self.state = ResourceState::Allocated;
        }
    }

    pub(crate) fn insert_reservation(&mut self, job: JobId, booking: Booking) {
        self.reservations.insert(job, booking);
    }

    pub(crate) fn remove_job(&mut self, job: JobId) {
        self.allocations.remove(&job);
        self.reservations.remove(&job);
        if self.state == ResourceState::Allocated && self.allocations.is_empty() {
            self.state = ResourceState::Idle;
        }
    }

    pub(crate) fn clear_reservations(&mut self) {
        self.reservations.clear();
    }
}

/// Shadow tree over pool entries: candidate and selected subtrees reference
/// resources by id and never own them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTree {
    pub id: ResourceId,
    pub children: Vec<ResourceTree>,
}

impl ResourceTree {
    pub fn leaf(id: ResourceId) -> Self {
        Self { id, children: Vec::new() }
    }

    /// Ids of every resource in the tree, preorder.
    pub fn ids(&self) -> Vec<ResourceId> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<ResourceId>) {
        out.push(self.id);
        for child in &self.children {
            child.collect_ids(out);
        }
    }
}

/// The resource inventory: a single-rooted hierarchy in an arena.
#[derive(Debug, Clone)]
pub struct ResourcePool {
    resources: Vec<Resource>,
    root: ResourceId,
}

impl ResourcePool {
    /// Create a pool containing only a cluster root.
    pub fn new(cluster_name: impl Into<String>) -> Self {
        let root = Resource {
            kind: ResourceKind::Cluster,
            name: cluster_name.into(),
            digest: None,
            size: 1,
            state: ResourceState::Idle,
            staged: 0,
            allocations: BTreeMap::new(),
            reservations: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
        };
        Self { resources: vec![root], root: ResourceId(0) }
    }

    pub fn root(&self) -> ResourceId {
        self.root
    }

    /// Append a child resource and return its id.
    pub fn add(
        &mut self,
        parent: ResourceId,
        kind: ResourceKind,
        name: impl Into<String>,
        size: u64,
    ) -> ResourceId {
        let id = ResourceId(self.resources.len());
        self.resources.push(Resource {
            kind,
            name: name.into(),
            digest: None,
            size,
            state: ResourceState::Idle,
            staged: 0,
            allocations: BTreeMap::new(),
            reservations: BTreeMap::new(),
            children: Vec::new(),
            parent: Some(parent),
        });
        self.resources[parent.0].children.push(id);
        id
    }

    pub fn get(&self, id: ResourceId) -> &Resource {
        &self.resources[id.0]
    }

    pub fn get_mut(&mut self, id: ResourceId) -> &mut Resource {
        &mut self.resources[id.0]
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ResourceId> {
        (0..self.resources.len()).map(ResourceId)
    }

    /// All resources whose name matches, preorder. Hostnames are node
    /// names, so exclude/include use this.
    pub fn lookup_by_name(&self, name: &str) -> Vec<ResourceId> {
        self.ids().filter(|id| self.get(*id).name == name).collect()
    }

    /// Resources of a given kind, preorder.
    pub fn of_kind(&self, kind: ResourceKind) -> Vec<ResourceId> {
        self.ids().filter(|id| self.get(*id).kind == kind).collect()
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
