// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Inventory construction: TOML description files and topology blobs.

use crate::pool::{ResourceKind, ResourcePool};
use crate::ResourceError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct InventoryFile {
    cluster: ClusterSection,
    #[serde(default)]
    node: Vec<NodeSection>,
}

#[derive(Debug, Deserialize)]
struct ClusterSection {
    name: String,
}

#[derive(Debug, Deserialize)]
struct NodeSection {
    name: String,
    /// When present, expands to `name0..name{count-1}`.
    count: Option<u64>,
    cores: u64,
    #[serde(default)]
    gpus: u64,
}

fn add_node(pool: &mut ResourcePool, name: String, section: &NodeSection) {
    let root = pool.root();
    let node = pool.add(root, ResourceKind::Node, name, 1);
    for i in 0..section.cores {
        pool.add(node, ResourceKind::Core, format!("core{i}"), 1);
    }
    for i in 0..section.gpus {
        pool.add(node, ResourceKind::Gpu, format!("gpu{i}"), 1);
    }
}

/// Parse a TOML inventory description into a pool.
pub fn parse_inventory(text: &str) -> Result<ResourcePool, ResourceError> {
    let file: InventoryFile = toml::from_str(text)?;
    if file.node.is_empty() {
        return Err(ResourceError::Invalid("inventory defines no nodes".into()));
    }
    let mut pool = ResourcePool::new(&file.cluster.name);
    for section in &file.node {
        match section.count {
            Some(0) => {
                return Err(ResourceError::Invalid(format!(
                    "node {} has count=0",
                    section.name
                )))
            }
            Some(n) => {
                for i in 0..n {
                    add_node(&mut pool, format!("{}{}", section.name, i), section);
                }
            }
            None => add_node(&mut pool, section.name.clone(), section),
        }
    }
    tracing::debug!(nodes = pool.of_kind(ResourceKind::Node).len(), "inventory parsed");
    Ok(pool)
}

/// Load a TOML inventory file.
pub fn load_file(path: &Path) -> Result<ResourcePool, ResourceError> {
    let text = std::fs::read_to_string(path)?;
    parse_inventory(&text)
}

/// Per-rank hardware description fetched from the key-value store at
/// startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyBlob {
    pub hostname: String,
    pub cores: u64,
    #[serde(default)]
    pub gpus: u64,
}

/// Synthesize a pool directly from topology blobs (no inventory file).
/// Each blob becomes one node signed with its digest.
pub fn from_topology(cluster: &str, blobs: &[(TopologyBlob, String)]) -> ResourcePool {
    let mut pool = ResourcePool::new(cluster);
    let root = pool.root();
    for (blob, digest) in blobs {
        let node = pool.add(root, ResourceKind::Node, blob.hostname.clone(), 1);
        pool.get_mut(node).digest = Some(digest.clone());
        for i in 0..blob.cores {
            pool.add(node, ResourceKind::Core, format!("core{i}"), 1);
        }
        for i in 0..blob.gpus {
            pool.add(node, ResourceKind::Gpu, format!("gpu{i}"), 1);
        }
    }
    pool
}

/// Sign every node in a file-loaded pool with the digest recorded for its
/// hostname. Fails on the first node the signatures don't cover, so the
/// caller can decide to rebuild the pool from topology instead.
pub fn link_ranks(
    pool: &mut ResourcePool,
    signatures: &[(String, String)],
) -> Result<(), ResourceError> {
    for id in pool.of_kind(ResourceKind::Node) {
        let name = pool.get(id).name.clone();
        match signatures.iter().find(|(host, _)| *host == name) {
            Some((_, digest)) => pool.get_mut(id).digest = Some(digest.clone()),
            None => return Err(ResourceError::UnlinkedNode(name)),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
