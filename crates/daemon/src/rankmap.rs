// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Hostname/digest to broker-rank resolution.
//!
//! Built once at startup from per-rank topology blobs. Normal mode looks
//! up by hostname signed with the topology digest; simulator mode trusts
//! the digest alone.

use crate::adapters::BlobStore;
use crate::error::EngineError;
use drover_resource::{ResourceKind, ResourcePool, TopologyBlob};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

pub(crate) fn sha256_hex(data: &str) -> String {
    format!("{:x}", Sha256::digest(data.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct RankEntry {
    pub host: String,
    pub digest: String,
    pub rank: u32,
}

#[derive(Debug, Default)]
pub struct RankTable {
    entries: Vec<RankEntry>,
    by_sign: HashMap<(String, String), u32>,
    by_digest: HashMap<String, u32>,
}

impl RankTable {
    pub fn new(entries: Vec<RankEntry>) -> Self {
        let mut by_sign = HashMap::new();
        let mut by_digest = HashMap::new();
        for e in &entries {
            by_sign.insert((e.host.clone(), e.digest.clone()), e.rank);
            by_digest.insert(e.digest.clone(), e.rank);
        }
        Self { entries, by_sign, by_digest }
    }

    /// Fetch `resource.topo.<rank>` blobs for every rank, hash them, and
    /// build the table. Returns the parsed blobs as well so topology-mode
    /// startup can synthesize the pool from them.
    pub fn from_blobs(
        store: &dyn BlobStore,
    ) -> Result<(Self, Vec<(TopologyBlob, String)>), EngineError> {
        let size = store.size().map_err(|e| EngineError::Io(e.to_string()))?;
        if size == 0 {
            return Err(EngineError::NotFound("topology blobs".into()));
        }
        let mut entries = Vec::with_capacity(size as usize);
        let mut blobs = Vec::with_capacity(size as usize);
        for rank in 0..size {
            let key = format!("resource.topo.{rank}");
            let raw = store.get(&key).map_err(|e| EngineError::Io(e.to_string()))?;
            let digest = sha256_hex(&raw);
            let blob: TopologyBlob = serde_json::from_str(&raw)
                .map_err(|e| EngineError::InvalidArg(format!("bad topology blob {key}: {e}")))?;
            entries.push(RankEntry { host: blob.hostname.clone(), digest: digest.clone(), rank });
            blobs.push((blob, digest));
        }
        tracing::info!(ranks = entries.len(), "rank table built from topology");
        Ok((Self::new(entries), blobs))
    }

    /// Derive a table straight from an inventory pool: node order gives
    /// the rank, the digest is synthesized from the hostname. Simulator
    /// mode runs without real topology data.
    pub fn emulated(pool: &ResourcePool) -> Self {
        let entries = pool
            .of_kind(ResourceKind::Node)
            .into_iter()
            .enumerate()
            .map(|(rank, id)| {
                let host = pool.get(id).name.clone();
                RankEntry { digest: sha256_hex(&host), host, rank: rank as u32 }
            })
            .collect();
        Self::new(entries)
    }

    pub fn lookup_by_sign(&self, host: &str, digest: &str) -> Option<u32> {
        self.by_sign.get(&(host.to_string(), digest.to_string())).copied()
    }

    pub fn lookup_by_digest(&self, digest: &str) -> Option<u32> {
        self.by_digest.get(digest).copied()
    }

    /// `(hostname, digest)` pairs for signing an inventory pool.
    pub fn signatures(&self) -> Vec<(String, String)> {
        self.entries.iter().map(|e| (e.host.clone(), e.digest.clone())).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "rankmap_tests.rs"]
mod tests;
