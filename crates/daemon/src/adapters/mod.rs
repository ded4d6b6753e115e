// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Adapters for external I/O.
//!
//! The broker transport, job-status service, and key-value store live
//! outside this crate; the engine only sees these narrow traits. All
//! sends are fire-and-forget, so the traits are synchronous.

use crate::engine::EngineEvent;
use drover_core::{JobId, JobState};
use drover_wire::{Jcb, RliteEntry};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("send failed: {0}")]
    Send(String),

    #[error("key {0} unavailable: {1}")]
    Blob(String, String),
}

/// Outbound broker messaging: broadcast events and addressed requests.
pub trait EventBus: Send {
    fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), AdapterError>;
    fn request(&self, topic: &str, payload: serde_json::Value) -> Result<(), AdapterError>;
}

/// Job-status service updates. State updates fan back out to every
/// subscriber, the scheduler included; that loopback drives the implicit
/// transition chain.
pub trait StatusSink: Send {
    fn update_state(&self, id: JobId, ostate: JobState, nstate: JobState)
        -> Result<(), AdapterError>;
    fn update_alloc(&self, id: JobId, rlite: Vec<RliteEntry>) -> Result<(), AdapterError>;
}

/// Blocking key-value reads, used only before the reactor runs.
pub trait BlobStore {
    /// Number of ranks with topology blobs.
    fn size(&self) -> Result<u32, AdapterError>;
    fn get(&self, key: &str) -> Result<String, AdapterError>;
}

/// Status sink wired straight back into the engine's event queue.
#[derive(Clone)]
pub struct LoopbackStatus {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl LoopbackStatus {
    pub fn new(tx: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, jcb: Jcb) -> Result<(), AdapterError> {
        self.tx
            .send(EngineEvent::JobStatus(jcb))
            .map_err(|e| AdapterError::Send(e.to_string()))
    }
}

impl StatusSink for LoopbackStatus {
    fn update_state(
        &self,
        id: JobId,
        ostate: JobState,
        nstate: JobState,
    ) -> Result<(), AdapterError> {
        self.send(Jcb::state_change(id.0, ostate, nstate))
    }

    fn update_alloc(&self, id: JobId, rlite: Vec<RliteEntry>) -> Result<(), AdapterError> {
        self.send(Jcb { jobid: id.0, state_pair: None, rdesc: None, rlite: Some(rlite) })
    }
}

/// Topology blobs read from a directory of `<key>.json` files. The
/// directory comes from the external reader's `DROVER_TOPO_DIR`.
pub struct DirBlobStore {
    dir: PathBuf,
}

impl DirBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var_os("DROVER_TOPO_DIR").map(|dir| Self::new(PathBuf::from(dir)))
    }
}

impl BlobStore for DirBlobStore {
    fn size(&self) -> Result<u32, AdapterError> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| AdapterError::Blob(self.dir.display().to_string(), e.to_string()))?;
        let count = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .is_some_and(|n| n.starts_with("resource.topo.") && n.ends_with(".json"))
            })
            .count();
        Ok(count as u32)
    }

    fn get(&self, key: &str) -> Result<String, AdapterError> {
        let path = self.dir.join(format!("{key}.json"));
        std::fs::read_to_string(&path)
            .map_err(|e| AdapterError::Blob(key.to_string(), e.to_string()))
    }
}

/// Bus that only logs. Stands in where no broker transport is wired.
pub struct LogBus;

impl EventBus for LogBus {
    fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), AdapterError> {
        tracing::info!(topic, %payload, "event");
        Ok(())
    }

    fn request(&self, topic: &str, payload: serde_json::Value) -> Result<(), AdapterError> {
        tracing::info!(topic, %payload, "request");
        Ok(())
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::RecordingBus;

#[cfg(test)]
mod tests {
    use super::*;
    use drover_wire::RliteChildren;

    #[test]
    fn loopback_state_update_round_trips() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = LoopbackStatus::new(tx);

        sink.update_state(JobId(4), JobState::Selected, JobState::Allocated)
            .unwrap();

        match rx.try_recv().unwrap() {
            EngineEvent::JobStatus(jcb) => {
                assert_eq!(jcb.jobid, 4);
                assert_eq!(jcb.new_state(), Some(JobState::Allocated));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn loopback_alloc_update_has_no_state_pair() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = LoopbackStatus::new(tx);

        let entry = RliteEntry {
            node: "node0".into(),
            digest: None,
            rank: Some(0),
            children: RliteChildren { core: 1, gpu: 0 },
        };
        sink.update_alloc(JobId(4), vec![entry]).unwrap();

        match rx.try_recv().unwrap() {
            EngineEvent::JobStatus(jcb) => {
                assert_eq!(jcb.new_state(), None);
                assert_eq!(jcb.rlite.as_ref().map(Vec::len), Some(1));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn loopback_fails_once_the_engine_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sink = LoopbackStatus::new(tx);
        assert!(sink
            .update_state(JobId(1), JobState::Null, JobState::Submitted)
            .is_err());
    }

    #[test]
    fn dir_blob_store_reads_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("resource.topo.0.json"), "{\"hostname\":\"a\",\"cores\":1}")
            .unwrap();
        std::fs::write(dir.path().join("resource.topo.1.json"), "{\"hostname\":\"b\",\"cores\":1}")
            .unwrap();

        let store = DirBlobStore::new(dir.path());
        assert_eq!(store.size().unwrap(), 2);
        assert!(store.get("resource.topo.1").unwrap().contains("\"b\""));
        assert!(store.get("resource.topo.9").is_err());
    }
}
