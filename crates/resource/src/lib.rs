// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! drover-resource: hierarchical resource inventory and matching primitives
//!
//! The pool is an arena: resources live in a slab and are addressed by
//! [`ResourceId`]. Shadow trees ([`ResourceTree`]) reference pool entries
//! without owning them, so candidate/selected trees are cheap to build and
//! drop.

pub mod pool;
pub mod reader;
pub mod request;
pub mod traverse;

pub use pool::{
    Resource, ResourceId, ResourceKind, ResourcePool, ResourceState, ResourceTree, TimeWindow,
};
pub use reader::{load_file, parse_inventory, TopologyBlob};
pub use request::ResourceRequest;
pub use traverse::{
    allocate_resources, find_resources, release_all_reservations, release_job, reserve_resources,
    select_resources, serialize_lite, unstage, RliteCounts, RliteLeaf,
};

use thiserror::Error;

/// Errors from inventory loading and pool mutation.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to read inventory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse inventory: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("inventory error: {0}")]
    Invalid(String),

    #[error("node {0} has no topology signature")]
    UnlinkedNode(String),
}
