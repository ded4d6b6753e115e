// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! The job state machine.
//!
//! Incoming status notifications drive transitions. The first observation
//! of a job falls through submitted → pending → sched-req in one handler
//! invocation; later notifications move one edge at a time. An illegal
//! transition is logged and dropped without touching the job, so a broken
//! notifier cannot wedge the machine.

use super::Engine;
use crate::adapters::{EventBus, StatusSink};
use crate::error::EngineError;
use drover_core::{Clock, JobId, JobRequest, JobState};
use drover_wire::{topics, Jcb};
use tracing::{debug, error, info, warn};

impl<B: EventBus, S: StatusSink, C: Clock> Engine<B, S, C> {
    /// Entry point for job-status notifications.
    pub(crate) fn handle_job_status(&mut self, jcb: Jcb) {
        let id = JobId(jcb.jobid);
        if jcb.is_newjob() {
            if let Err(e) = self.table.enqueue_pending(id, self.clock.epoch_secs()) {
                error!(job = %id, error = %e, "failed to enqueue job");
                return;
            }
            debug!(job = %id, "job enqueued");
        }
        // Allocation updates loop back without a state pair; nothing to do.
        let Some(newstate) = jcb.new_state() else { return };
        if self.table.job(id).is_none() {
            info!(job = %id, "status notification for unknown job (directly launched?)");
            return;
        }
        // Transition errors are soft: logged in action, queue left intact.
        let _ = self.action(id, newstate, &jcb);
    }

    /// Apply one status notification to the state machine.
    fn action(&mut self, id: JobId, newstate: JobState, jcb: &Jcb) -> Result<(), EngineError> {
        let Some(oldstate) = self.table.job(id).map(|j| j.state) else {
            return Err(EngineError::NotFound(format!("job {id}")));
        };
        debug!(job = %id, from = %oldstate, to = %newstate, "attempting state change");

        match oldstate {
            JobState::Null => {
                self.verify(id, oldstate, newstate, newstate == JobState::Submitted)?;
                let request = self.parse_request(id, jcb);
                if let Some(job) = self.table.job_mut(id) {
                    job.request = request;
                    // Implicit chain: submitted → pending → sched-req
                    job.state = JobState::SchedReq;
                }
                self.after_sched_req(id);
            }

            // The implicit chain also fires when these states see any
            // notification at all; the payload state is not consulted.
            JobState::Submitted | JobState::Pending => {
                if let Some(job) = self.table.job_mut(id) {
                    job.state = JobState::SchedReq;
                }
                self.after_sched_req(id);
            }

            JobState::SchedReq => {
                // sched-req → selected happens inside the scheduling loop;
                // the only legal notification here is a cancellation.
                self.verify(id, oldstate, newstate, newstate == JobState::Cancelled)?;
                self.set_state(id, JobState::Cancelled);
                if self.args.reap {
                    self.table.move_to_completed(id);
                } else {
                    self.table.destroy(id);
                }
            }

            JobState::Selected => {
                self.verify(id, oldstate, newstate, newstate == JobState::Allocated)?;
                self.set_state(id, JobState::Allocated);
                self.request_run(id);
            }

            JobState::Allocated => {
                self.verify(id, oldstate, newstate, newstate == JobState::RunRequest)?;
                self.set_state(id, JobState::RunRequest);
            }

            JobState::RunRequest => {
                self.verify(
                    id,
                    oldstate,
                    newstate,
                    matches!(newstate, JobState::Starting | JobState::Failed),
                )?;
                self.set_state(id, newstate);
                if newstate == JobState::Failed {
                    self.release_and_dispose(id);
                }
            }

            JobState::Starting => {
                self.verify(
                    id,
                    oldstate,
                    newstate,
                    matches!(newstate, JobState::Running | JobState::Failed),
                )?;
                self.set_state(id, newstate);
                if newstate == JobState::Running {
                    self.table.move_to_running(id);
                } else {
                    self.release_and_dispose(id);
                }
            }

            JobState::Running => {
                self.verify(id, oldstate, newstate, newstate == JobState::Completing)?;
                self.set_state(id, JobState::Completing);
            }

            JobState::Completing => {
                self.verify(id, oldstate, newstate, newstate == JobState::Complete)?;
                self.set_state(id, JobState::Complete);
                self.release_and_dispose(id);
            }

            JobState::Cancelled | JobState::Failed => {
                self.verify(id, oldstate, newstate, newstate == JobState::Reaped)?;
                self.set_state(id, JobState::Reaped);
                if self.args.reap {
                    self.reap(id, false);
                } else {
                    error!(job = %id, "reap support is not enabled (use reap=true)");
                }
            }

            JobState::Complete => {
                self.verify(id, oldstate, newstate, newstate == JobState::Reaped)?;
                self.set_state(id, JobState::Reaped);
                if self.args.reap {
                    self.reap(id, true);
                } else {
                    error!(job = %id, "reap support is not enabled (use reap=true)");
                }
            }

            JobState::Reaped => {
                self.verify(id, oldstate, newstate, false)?;
            }
        }
        Ok(())
    }

    fn verify(
        &self,
        id: JobId,
        oldstate: JobState,
        newstate: JobState,
        legal: bool,
    ) -> Result<(), EngineError> {
        if legal {
            return Ok(());
        }
        error!(job = %id, from = %oldstate, to = %newstate, "bad state transition");
        Err(EngineError::InternalInvariant(format!(
            "job {id} bad state transition from {oldstate} to {newstate}"
        )))
    }

    fn set_state(&mut self, id: JobId, state: JobState) {
        if let Some(job) = self.table.job_mut(id) {
            job.state = state;
        }
    }

    fn parse_request(&self, id: JobId, jcb: &Jcb) -> JobRequest {
        match jcb.rdesc {
            Some(r) => JobRequest::from_counts(
                r.nnodes,
                r.ncores,
                r.ngpus,
                r.walltime,
                self.args.node_excl,
            ),
            None => {
                warn!(job = %id, "submission carries no resource description");
                JobRequest::from_counts(0, 0, 0, None, self.args.node_excl)
            }
        }
    }

    /// A job just became schedulable: run a pass now, or flag it for the
    /// next check boundary when coalescing.
    fn after_sched_req(&mut self, id: JobId) {
        if self.args.params.delay_sched {
            self.table.mark_schedulable(id, self.args.params.queue_depth);
        } else {
            self.schedule_jobs();
        }
    }

    /// Post the run-request state update, then ask the execution service
    /// to start the job.
    fn request_run(&mut self, id: JobId) {
        if let Err(e) =
            self.status
                .update_state(id, JobState::Allocated, JobState::RunRequest)
        {
            error!(job = %id, error = %e, "failed to update job state");
            return;
        }
        if let Err(e) = self.send_run_request(id) {
            error!(job = %id, error = %e, "failed to send run request");
        }
    }

    /// Shared cleanup for failed and completed jobs: release the
    /// allocation, announce freed resources, then retire the record.
    fn release_and_dispose(&mut self, id: JobId) {
        if self.args.sched_once {
            // Testing mode: resources are used once and never returned.
            debug!(job = %id, "sched-once holds the allocation");
        } else {
            drover_resource::release_job(&mut self.pool, id);
            debug!(job = %id, "released resources");
        }
        if !self.args.params.delay_sched {
            // Under coalescing the check handler schedules anyway.
            if let Err(e) = self.bus.publish(topics::RES_FREED, serde_json::json!({})) {
                error!(job = %id, error = %e, "error sending resources-freed event");
            }
        }
        if self.args.reap {
            self.table.move_to_completed(id);
        } else {
            self.table.destroy(id);
        }
    }

    /// Final destruction on the reap transition.
    fn reap(&mut self, id: JobId, record_usage: bool) {
        if record_usage {
            if let (Some(plugin), Some(job)) = (self.priority.as_mut(), self.table.job(id)) {
                plugin.record_job_usage(job);
            }
        }
        self.table.destroy(id);
        debug!(job = %id, "reaped");
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
