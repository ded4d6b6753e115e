// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Hierarchical resource request trees.

use crate::pool::{ResourceKind, TimeWindow};

/// One level of a resource request.
///
/// `qty` resources of `kind` must be found; each must additionally satisfy
/// every child request underneath it. `size` is the capacity an allocation
/// will consume (zero tags the resource without consuming it, e.g. a
/// shared node). Selection counts what it satisfied in `found`; callers
/// reset the counters with [`clear_found`](Self::clear_found) before each
/// selection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub kind: ResourceKind,
    pub qty: u64,
    pub size: u64,
    pub exclusive: bool,
    pub window: TimeWindow,
    pub children: Vec<ResourceRequest>,
    found: u64,
}

impl ResourceRequest {
    pub fn new(kind: ResourceKind, qty: u64, size: u64, exclusive: bool, window: TimeWindow) -> Self {
        Self { kind, qty, size, exclusive, window, children: Vec::new(), found: 0 }
    }

    pub fn with_child(mut self, child: ResourceRequest) -> Self {
        self.children.push(child);
        self
    }

    pub fn found(&self) -> u64 {
        self.found
    }

    pub(crate) fn add_found(&mut self, n: u64) {
        self.found += n;
    }

    /// Reset selection counters across the whole tree.
    pub fn clear_found(&mut self) {
        self.found = 0;
        for child in &mut self.children {
            child.clear_found();
        }
    }

    /// True when the last selection fully satisfied this request: `qty`
    /// resources at this level, each with its child quantities.
    pub fn all_found(&self) -> bool {
        if self.found < self.qty {
            return false;
        }
        self.children.iter().all(|c| c.found >= c.qty * self.qty)
    }
}
