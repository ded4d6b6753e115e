// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Job control block: the payload of job-status notifications.

use drover_core::JobState;
use serde::{Deserialize, Serialize};

/// Old/new state pair of a status notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePair {
    pub ostate: JobState,
    pub nstate: JobState,
}

/// Resource description supplied at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rdesc {
    pub nnodes: u64,
    pub ncores: u64,
    #[serde(default)]
    pub ngpus: u64,
    /// Seconds; absent or zero falls back to the scheduler default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walltime: Option<u64>,
}

/// Reduced child counts of one allocation leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RliteChildren {
    pub core: u64,
    #[serde(default)]
    pub gpu: u64,
}

/// One per-node leaf of a serialized allocation. Leaves leave the
/// scheduler with `digest` resolved into `rank`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RliteEntry {
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    pub children: RliteChildren,
}

/// The job control block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jcb {
    pub jobid: u64,

    #[serde(
        rename = "state-pair",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub state_pair: Option<StatePair>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rdesc: Option<Rdesc>,

    #[serde(rename = "R_lite", default, skip_serializing_if = "Option::is_none")]
    pub rlite: Option<Vec<RliteEntry>>,
}

impl Jcb {
    /// A first-observation notification for a freshly submitted job.
    pub fn submitted(jobid: u64, rdesc: Rdesc) -> Self {
        Self {
            jobid,
            state_pair: Some(StatePair { ostate: JobState::Null, nstate: JobState::Submitted }),
            rdesc: Some(rdesc),
            rlite: None,
        }
    }

    /// A bare state-change notification.
    pub fn state_change(jobid: u64, ostate: JobState, nstate: JobState) -> Self {
        Self {
            jobid,
            state_pair: Some(StatePair { ostate, nstate }),
            rdesc: None,
            rlite: None,
        }
    }

    /// True for the first notification a job ever produces.
    pub fn is_newjob(&self) -> bool {
        matches!(
            self.state_pair,
            Some(StatePair { ostate: JobState::Null, nstate: JobState::Submitted })
        )
    }

    /// The state this notification asks the job to enter.
    pub fn new_state(&self) -> Option<JobState> {
        self.state_pair.map(|p| p.nstate)
    }
}

#[cfg(test)]
#[path = "jcb_tests.rs"]
mod tests;
