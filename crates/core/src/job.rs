// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Job identifier, lifecycle states, and the user resource request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a job, assigned by the submission service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Lifecycle state of a job.
///
/// The scheduler enforces which transitions are legal; external status
/// notifications carrying anything else are logged and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobState {
    /// Created but no submission notification processed yet
    Null,
    Submitted,
    Pending,
    /// Waiting for the scheduling loop to find resources
    SchedReq,
    /// Resources selected and allocated by the scheduling loop
    Selected,
    Allocated,
    RunRequest,
    Starting,
    Running,
    Completing,
    Complete,
    /// Removed from the pending queue before selection
    Cancelled,
    /// Run request or start failed
    Failed,
    /// Final state; the record is destroyed on this transition
    Reaped,
}

crate::simple_display! {
    JobState {
        Null => "null",
        Submitted => "submitted",
        Pending => "pending",
        SchedReq => "sched-req",
        Selected => "selected",
        Allocated => "allocated",
        RunRequest => "run-request",
        Starting => "starting",
        Running => "running",
        Completing => "completing",
        Complete => "complete",
        Cancelled => "cancelled",
        Failed => "failed",
        Reaped => "reaped",
    }
}

impl JobState {
    /// States from which only a reap transition remains.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled | Self::Failed | Self::Reaped)
    }
}

/// Fallback walltime when a submission omits it or asks for zero.
pub const DEFAULT_WALLTIME_SECS: u64 = 3600;

/// Resource counts requested at submission, plus the per-node splits the
/// request builder derives from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobRequest {
    pub nnodes: u64,
    pub ncores: u64,
    pub ngpus: u64,
    pub walltime_secs: u64,
    pub node_exclusive: bool,
    /// Derived: cores each selected node must supply. Zero until the
    /// request builder runs.
    #[serde(default)]
    pub cores_per_node: u64,
    /// Derived: GPUs each selected node must supply. Zero until the
    /// request builder runs.
    #[serde(default)]
    pub gpus_per_node: u64,
}

impl JobRequest {
    /// Build a request from submission counts, applying the walltime fallback.
    pub fn from_counts(
        nnodes: u64,
        ncores: u64,
        ngpus: u64,
        walltime_secs: Option<u64>,
        node_exclusive: bool,
    ) -> Self {
        let walltime_secs = match walltime_secs {
            None | Some(0) => DEFAULT_WALLTIME_SECS,
            Some(w) => w,
        };
        Self {
            nnodes,
            ncores,
            ngpus,
            walltime_secs,
            node_exclusive,
            cores_per_node: 0,
            gpus_per_node: 0,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
