// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Control surface: cancel, exclude, include, and parameter access.

use super::Engine;
use crate::adapters::{EventBus, StatusSink};
use crate::error::EngineError;
use drover_core::{Clock, JobId, JobState};
use drover_resource::ResourceState;
use drover_wire::{topics, ControlRequest, ControlResponse};
use tracing::{debug, info, warn};

impl<B: EventBus, S: StatusSink, C: Clock> Engine<B, S, C> {
    /// Answer one control request. Failures map to their error code; the
    /// handler never unwinds.
    pub fn handle_control(&mut self, request: ControlRequest) -> ControlResponse {
        let result = match request {
            ControlRequest::Cancel { jobid } => self.handle_cancel(JobId(jobid)),
            ControlRequest::Exclude { node, kill } => self.handle_exclude(&node, kill),
            ControlRequest::Include { node } => self.handle_include(&node),
            ControlRequest::ParamsSet { param } => self.handle_params_set(&param),
            ControlRequest::ParamsGet => Ok(self.handle_params_get()),
        };
        result.unwrap_or_else(|e| e.to_response())
    }

    /// Cancel a job still waiting for resources.
    fn handle_cancel(&mut self, id: JobId) -> Result<ControlResponse, EngineError> {
        info!(job = %id, "cancel requested");
        let state = self.table.job(id).map(|j| j.state).ok_or_else(|| {
            debug!(job = %id, "attempt to cancel nonexistent job");
            EngineError::NotFound(format!("job {id}"))
        })?;
        if state != JobState::SchedReq {
            debug!(job = %id, state = %state, "attempt to cancel job in wrong state");
            return Err(EngineError::InvalidState(format!("job {id} is {state}")));
        }

        self.table.remove_from_pending(id);
        self.status
            .update_state(id, JobState::SchedReq, JobState::Cancelled)
            .map_err(|e| EngineError::Io(e.to_string()))?;
        info!(job = %id, "pending job removed");

        if let Err(e) = self
            .bus
            .publish(topics::STATE_CANCELLED, serde_json::json!({"jobid": id.0}))
        {
            debug!(error = %e, "error sending cancelled event");
        }
        Ok(ControlResponse::Cancelled { jobid: id.0 })
    }

    /// Take every resource named `node` out of scheduling; optionally
    /// broadcast kills for the jobs allocated there.
    fn handle_exclude(&mut self, node: &str, kill: bool) -> Result<ControlResponse, EngineError> {
        info!(node, kill, "node exclusion requested");
        let ids = self.pool.lookup_by_name(node);
        if ids.is_empty() {
            debug!(node, "attempt to exclude nonexistent node");
            return Err(EngineError::NotFound(format!("node {node}")));
        }

        for rid in ids {
            self.pool.get_mut(rid).state = ResourceState::Excluded;
            if kill {
                for job in self.pool.get(rid).allocated_jobs() {
                    self.bus
                        .publish(&topics::wreck_kill(job), serde_json::json!({}))
                        .map_err(|e| EngineError::Io(e.to_string()))?;
                }
            }
        }

        info!(node, "excluded from scheduling");
        self.bus
            .publish(topics::RES_EXCLUDED, serde_json::json!({}))
            .map_err(|e| EngineError::Io(e.to_string()))?;
        Ok(ControlResponse::Ok)
    }

    /// Return excluded resources to service. Resources in any state other
    /// than excluded/idle/invalid are skipped with a warning.
    fn handle_include(&mut self, node: &str) -> Result<ControlResponse, EngineError> {
        info!(node, "node inclusion requested");
        let ids = self.pool.lookup_by_name(node);
        if ids.is_empty() {
            debug!(node, "attempt to include nonexistent node");
            return Err(EngineError::NotFound(format!("node {node}")));
        }

        for rid in ids {
            let state = self.pool.get(rid).state;
            match state {
                ResourceState::Excluded | ResourceState::Idle | ResourceState::Invalid => {
                    self.pool.get_mut(rid).state = ResourceState::Idle;
                }
                other => {
                    warn!(node, state = %other, "cannot include node due to state");
                }
            }
        }

        debug!(node, "include node resource");
        if let Err(e) = self.bus.publish(topics::RES_INCLUDED, serde_json::json!({})) {
            tracing::error!(error = %e, "error sending included event");
        }
        Ok(ControlResponse::Ok)
    }

    fn handle_params_set(&mut self, param: &str) -> Result<ControlResponse, EngineError> {
        info!(param, "sched params change requested");
        let prev_delay = self.args.params.delay_sched;

        let mut params = self.args.params;
        params
            .apply(param)
            .map_err(|e| EngineError::InvalidArg(e.to_string()))?;
        self.args.params = params;

        // Only reconfigure on an actual flip, so watchers start once.
        if prev_delay != params.delay_sched {
            self.adjust_for_sched_params()?;
        }
        Ok(ControlResponse::Ok)
    }

    fn handle_params_get(&self) -> ControlResponse {
        ControlResponse::Params {
            queue_depth: self.args.params.queue_depth,
            delay_sched: self.args.params.delay_sched as u32,
        }
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
