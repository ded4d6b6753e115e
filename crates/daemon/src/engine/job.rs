// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! The scheduler's per-job record.

use drover_core::{JobId, JobRequest, JobState};
use drover_resource::ResourceTree;

/// Everything the scheduler tracks for one job.
///
/// Owned by the job table arena; handlers address jobs by [`JobId`].
/// The resource subtree is exclusively the job's once attached, and is
/// dropped with the record.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub state: JobState,
    /// Epoch seconds at first observation
    pub submit_time: i64,
    pub request: JobRequest,
    /// Higher runs earlier
    pub priority: i64,
    /// 1-based position assigned at insertion into the pending queue
    pub enqueue_pos: u64,
    /// Epoch seconds the allocation starts
    pub start_time: Option<i64>,
    /// Selected or reserved subtree
    pub resources: Option<ResourceTree>,
}

impl Job {
    pub fn new(id: JobId, submit_time: i64) -> Self {
        Self {
            id,
            state: JobState::Null,
            submit_time,
            request: JobRequest::default(),
            priority: 0,
            enqueue_pos: 0,
            start_time: None,
            resources: None,
        }
    }
}

drover_core::builder! {
    pub struct JobBuilder => Job {
        set {
            id: JobId = JobId(1),
            state: JobState = JobState::SchedReq,
            submit_time: i64 = 0,
            request: JobRequest = JobRequest::from_counts(1, 1, 0, Some(60), false),
            priority: i64 = 0,
            enqueue_pos: u64 = 1,
        }
        option {
            start_time: i64 = None,
            resources: ResourceTree = None,
        }
    }
}
