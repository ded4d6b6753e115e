// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Job table: the arena owning every job plus the three lifecycle queues.
//!
//! The queues hold ids only; the arena map is also the O(1) lookup index.
//! A job is in exactly one queue from enqueue until destruction.

use super::job::Job;
use crate::error::EngineError;
use drover_core::{JobId, JobState};
use indexmap::IndexMap;

/// Which lifecycle queue a job currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Pending,
    Running,
    Completed,
}

drover_core::simple_display! {
    QueueKind {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
    }
}

#[derive(Debug, Default)]
pub struct JobTable {
    jobs: IndexMap<JobId, Job>,
    pending: Vec<JobId>,
    running: Vec<JobId>,
    completed: Vec<JobId>,
    /// Set when a queue change may have exposed a schedulable candidate.
    dirty: bool,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a job in its initial state and append it to the pending
    /// queue. Its enqueue position is the new queue length.
    pub fn enqueue_pending(&mut self, id: JobId, submit_time: i64) -> Result<(), EngineError> {
        if self.jobs.contains_key(&id) {
            return Err(EngineError::InvalidArg(format!("duplicate job {id}")));
        }
        let mut job = Job::new(id, submit_time);
        self.pending.push(id);
        job.enqueue_pos = self.pending.len() as u64;
        self.jobs.insert(id, job);
        Ok(())
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    pub fn job_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    /// Flag schedulable work regardless of any job's queue position
    /// (dequeues and resource events).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear and return the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Flag schedulable work for one job. Only jobs within the configured
    /// queue depth can set the flag, and only when it is clear.
    pub fn mark_schedulable(&mut self, id: JobId, queue_depth: u32) -> bool {
        if self.dirty {
            return false;
        }
        match self.jobs.get(&id) {
            Some(job) if job.enqueue_pos <= queue_depth as u64 => {
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    pub fn pending_ids(&self) -> Vec<JobId> {
        self.pending.clone()
    }

    pub fn running_ids(&self) -> Vec<JobId> {
        self.running.clone()
    }

    pub fn completed_ids(&self) -> Vec<JobId> {
        self.completed.clone()
    }

    pub fn queue_of(&self, id: JobId) -> Option<QueueKind> {
        if self.pending.contains(&id) {
            Some(QueueKind::Pending)
        } else if self.running.contains(&id) {
            Some(QueueKind::Running)
        } else if self.completed.contains(&id) {
            Some(QueueKind::Completed)
        } else {
            None
        }
    }

    /// A dequeue may expose a new candidate within depth, so every remove
    /// from the pending queue flags schedulable work.
    pub fn remove_from_pending(&mut self, id: JobId) {
        self.pending.retain(|j| *j != id);
        self.dirty = true;
    }

    pub fn move_to_running(&mut self, id: JobId) {
        self.pending.retain(|j| *j != id);
        self.running.push(id);
        self.dirty = true;
    }

    /// Move a job into the completed queue from whichever queue holds it.
    pub fn move_to_completed(&mut self, id: JobId) {
        self.pending.retain(|j| *j != id);
        self.running.retain(|j| *j != id);
        if !self.completed.contains(&id) {
            self.completed.push(id);
        }
        self.dirty = true;
    }

    /// Drop the job record entirely. Removal from an active queue flags
    /// schedulable work; removal from the completed queue does not.
    pub fn destroy(&mut self, id: JobId) -> Option<Job> {
        match self.queue_of(id) {
            Some(QueueKind::Pending | QueueKind::Running) => self.dirty = true,
            _ => {}
        }
        self.pending.retain(|j| *j != id);
        self.running.retain(|j| *j != id);
        self.completed.retain(|j| *j != id);
        self.jobs.shift_remove(&id)
    }

    /// Stable sort of the pending queue by descending priority.
    pub fn sort_pending_by_priority(&mut self) {
        let jobs = &self.jobs;
        self.pending.sort_by(|a, b| {
            let pa = jobs.get(a).map(|j| j.priority).unwrap_or(i64::MIN);
            let pb = jobs.get(b).map(|j| j.priority).unwrap_or(i64::MIN);
            pb.cmp(&pa)
        });
    }

    /// Jobs currently in a given state, across all queues.
    pub fn in_state(&self, state: JobState) -> Vec<JobId> {
        self.jobs
            .iter()
            .filter(|(_, j)| j.state == state)
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
