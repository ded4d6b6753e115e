// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Queue-age priority plugin: the longer a job has waited, the higher its
//! priority. Records core-seconds on reap.

use super::{PluginError, PriorityPlugin};
use crate::engine::{Job, JobTable};

pub struct PrioAge {
    usage_core_secs: u64,
}

impl PrioAge {
    pub fn new() -> Self {
        Self { usage_core_secs: 0 }
    }

    /// Cumulative core-seconds recorded from reaped jobs.
    pub fn recorded_usage(&self) -> u64 {
        self.usage_core_secs
    }
}

impl Default for PrioAge {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityPlugin for PrioAge {
    fn name(&self) -> &'static str {
        "prio.age"
    }

    fn priority_setup(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    fn prioritize_jobs(&mut self, now: i64, table: &mut JobTable) {
        for id in table.pending_ids() {
            if let Some(job) = table.job_mut(id) {
                job.priority = now.saturating_sub(job.submit_time);
            }
        }
    }

    fn record_job_usage(&mut self, job: &Job) {
        let cores = job.request.ncores.max(job.request.nnodes * job.request.cores_per_node);
        self.usage_core_secs += cores * job.request.walltime_secs;
        tracing::debug!(
            job = %job.id,
            core_secs = cores * job.request.walltime_secs,
            "recorded job usage"
        );
    }
}
