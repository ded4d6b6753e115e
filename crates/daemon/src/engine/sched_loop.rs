// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! The scheduling loop.
//!
//! One pass prioritizes and sorts the pending queue, then walks up to
//! `queue-depth` jobs, driving each schedulable one through the policy
//! plugin's find → select → allocate/reserve sequence. Per-job failures
//! are soft: log and move to the next job.

use super::Engine;
use crate::adapters::{EventBus, StatusSink};
use crate::error::EngineError;
use drover_core::{Clock, JobId, JobRequest, JobState};
use drover_resource::{
    release_all_reservations, release_job, serialize_lite, unstage, ResourceKind, ResourceRequest,
    TimeWindow,
};
use drover_wire::{RliteChildren, RliteEntry};
use tracing::{debug, error};

/// Translate a job's counted request into a hierarchical resource
/// request, deriving the per-node splits as a side effect.
///
/// Node requests demand at least one core per node; a request naming
/// neither nodes nor cores cannot be built.
pub(crate) fn build_resource_request(
    req: &mut JobRequest,
    starttime: i64,
) -> Option<ResourceRequest> {
    let window = TimeWindow::new(starttime, starttime + req.walltime_secs as i64);
    if req.nnodes > 0 {
        if req.ncores < req.nnodes {
            req.ncores = req.nnodes;
        }
        req.cores_per_node = req.ncores.div_ceil(req.nnodes);
        req.gpus_per_node = 0;

        let (size, exclusive) = if req.node_exclusive { (1, true) } else { (0, false) };
        let mut top = ResourceRequest::new(ResourceKind::Node, req.nnodes, size, exclusive, window)
            .with_child(ResourceRequest::new(
                ResourceKind::Core,
                req.cores_per_node,
                1,
                true,
                window,
            ));
        if req.ngpus > 0 {
            req.gpus_per_node = req.ngpus.div_ceil(req.nnodes);
            top = top.with_child(ResourceRequest::new(
                ResourceKind::Gpu,
                req.gpus_per_node,
                1,
                true,
                window,
            ));
        }
        Some(top)
    } else if req.ncores > 0 {
        Some(ResourceRequest::new(ResourceKind::Core, req.ncores, 1, true, window))
    } else {
        None
    }
}

impl<B: EventBus, S: StatusSink, C: Clock> Engine<B, S, C> {
    /// Run one scheduling pass over the pending queue.
    pub(crate) fn schedule_jobs(&mut self) {
        let starttime = self.starttime();

        if let Some(plugin) = self.priority.as_mut() {
            plugin.prioritize_jobs(starttime, &mut self.table);
        }
        self.table.sort_pending_by_priority();

        if self.behavior.sched_properties().out_of_order_capable {
            // Reservations are re-established as this pass walks the queue.
            release_all_reservations(&mut self.pool);
        }
        if let Err(e) = self.behavior.sched_loop_setup() {
            error!(error = %e, "plugin refused loop setup; pass aborted");
            return;
        }

        let depth = self.args.params.queue_depth as usize;
        for id in self.table.pending_ids().into_iter().take(depth) {
            let state = match self.table.job(id) {
                Some(job) => job.state,
                None => continue,
            };
            if state != JobState::SchedReq {
                continue;
            }
            if let Err(e) = self.schedule_job(id, starttime) {
                debug!(job = %id, error = %e, "job not scheduled this pass");
            }
        }
    }

    /// Try to place one job at `starttime`.
    fn schedule_job(&mut self, id: JobId, starttime: i64) -> Result<(), EngineError> {
        let (mut request, walltime) = {
            let job = self
                .table
                .job_mut(id)
                .ok_or_else(|| EngineError::NotFound(format!("job {id}")))?;
            let built = build_resource_request(&mut job.request, starttime).ok_or_else(|| {
                EngineError::InvalidArg(format!("job {id} requests no resources"))
            })?;
            (built, job.request.walltime_secs)
        };

        let root = self.pool.root();
        let (nfound, found) = self.behavior.find_resources(&self.pool, root, &request);
        if nfound == 0 {
            return Err(EngineError::ResourceExhausted(format!(
                "no {} candidates",
                request.kind
            )));
        }
        debug!(job = %id, kind = %request.kind, found = nfound, required = request.qty, "found candidates");

        unstage(&mut self.pool, &found);
        request.clear_found();
        let Some(selected) =
            self.behavior.select_resources(&mut self.pool, &found, &mut request, None)
        else {
            return Err(EngineError::ResourceExhausted(format!(
                "selection produced nothing for job {id}"
            )));
        };

        if request.all_found() {
            let window = TimeWindow::new(starttime, starttime + walltime as i64);
            self.behavior.allocate_resources(&mut self.pool, &selected, id, window)?;
            if let Some(job) = self.table.job_mut(id) {
                job.start_time = Some(starttime);
                job.state = JobState::Selected;
                // A previously reserved subtree is replaced outright.
                job.resources = Some(selected);
            }
            if let Err(e) = self.post_allocate_update(id) {
                error!(job = %id, error = %e, "failed to request allocation");
                release_job(&mut self.pool, id);
                if let Some(job) = self.table.job_mut(id) {
                    job.resources = None;
                }
                return Err(e);
            }
            debug!(job = %id, "allocated");
        } else {
            match self.behavior.reserve_resources(
                &mut self.pool,
                &selected,
                id,
                starttime,
                walltime,
                root,
                &request,
            ) {
                Ok(()) => {
                    if let Some(job) = self.table.job_mut(id) {
                        job.resources = Some(selected);
                    }
                    debug!(job = %id, "reserved");
                }
                Err(e) => {
                    debug!(job = %id, error = %e, "reservation refused");
                    unstage(&mut self.pool, &selected);
                }
            }
        }
        Ok(())
    }

    /// Serialize the job's subtree, resolve hostnames to ranks, and post
    /// the allocate update followed by the selected → allocated state
    /// change.
    fn post_allocate_update(&mut self, id: JobId) -> Result<(), EngineError> {
        let leaves = {
            let job = self
                .table
                .job(id)
                .ok_or_else(|| EngineError::NotFound(format!("job {id}")))?;
            let tree = job.resources.as_ref().ok_or_else(|| {
                EngineError::InternalInvariant(format!("job {id} allocated without resources"))
            })?;
            serialize_lite(&self.pool, tree)
        };

        let mut entries = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            let digest = leaf.digest.clone().unwrap_or_default();
            let rank = if self.args.in_sim {
                self.ranks.lookup_by_digest(&digest)
            } else {
                debug!(hostname = %leaf.node, digest = %digest, "resolving rank");
                self.ranks.lookup_by_sign(&leaf.node, &digest)
            };
            let Some(rank) = rank else {
                error!(hostname = %leaf.node, "controlling broker not found");
                return Err(EngineError::NotFound(format!("rank for node {}", leaf.node)));
            };
            entries.push(RliteEntry {
                node: leaf.node,
                digest: None,
                rank: Some(rank),
                children: RliteChildren { core: leaf.children.core, gpu: leaf.children.gpu },
            });
        }

        self.status
            .update_alloc(id, entries)
            .map_err(|e| EngineError::Io(e.to_string()))?;
        self.status
            .update_state(id, JobState::Selected, JobState::Allocated)
            .map_err(|e| EngineError::Io(e.to_string()))?;
        self.update_sim_timer();
        Ok(())
    }
}

#[cfg(test)]
#[path = "sched_loop_tests.rs"]
mod tests;
