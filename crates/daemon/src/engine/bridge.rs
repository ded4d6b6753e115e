// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Bridging layer hiding simulation vs. normal mode.
//!
//! Run requests, the scheduling clock, and execution-service timers all
//! differ between the two modes; everything else in the engine goes
//! through these helpers and stays mode-blind.

use super::Engine;
use crate::adapters::{AdapterError, EventBus, StatusSink};
use crate::sim::{SimState, NEXT_EVENT_EXEC, NEXT_EVENT_OTHER};
use drover_core::{Clock, JobId};
use drover_wire::topics;
use tracing::{debug, error};

impl<B: EventBus, S: StatusSink, C: Clock> Engine<B, S, C> {
    /// The wall- or simulated-clock moment a pass schedules against.
    pub(crate) fn starttime(&self) -> i64 {
        match self.sim.as_ref().and_then(|s| s.state.as_ref()) {
            Some(state) => state.sim_time as i64,
            None => self.clock.epoch_secs(),
        }
    }

    /// Ask the execution service to start a job.
    pub(crate) fn send_run_request(&mut self, id: JobId) -> Result<(), AdapterError> {
        if self.args.in_sim {
            self.bus.request(&topics::sim_exec_run(id), serde_json::json!({}))?;
            if let Some(sim) = self.sim.as_mut() {
                sim.timer_queue.push_back("sim_exec".to_string());
            }
        } else {
            self.bus.publish(&topics::wrexec_run(id), serde_json::json!({}))?;
        }
        debug!(job = %id, "run request sent");
        Ok(())
    }

    /// Ask for another scheduler wakeup after messaging the simulator.
    pub(crate) fn update_sim_timer(&mut self) {
        if let Some(sim) = self.sim.as_mut() {
            sim.timer_queue.push_back("sched".to_string());
        }
    }

    /// `sim.start`: register with the simulator driver.
    pub(crate) fn handle_sim_start(&mut self) {
        if self.sim.is_none() {
            error!("sim start received outside simulator mode");
            return;
        }
        debug!("received a start event");
        if self
            .bus
            .request(topics::SIM_JOIN, serde_json::json!({"mod_name": "sched", "rank": -1}))
            .is_err()
        {
            error!("failed to register with the simulator");
            return;
        }
        debug!("sent a join request");
    }

    /// `sched.trigger`: install the delivered time, drain queued events
    /// in FIFO order, run the boundary pass, account elapsed wall-clock,
    /// and hand the updated state back.
    pub(crate) fn handle_trigger(&mut self, state: SimState) {
        if self.sim.is_none() {
            error!("trigger received outside simulator mode");
            return;
        }
        debug!(sim_time = state.sim_time, "setting sim state to new values");
        if let Some(sim) = self.sim.as_mut() {
            sim.state = Some(state);
        }

        let begin = self.clock.now();
        self.ev_prep();
        self.drain_sim_status();
        self.drain_sim_resources();
        let elapsed = (self.clock.now() - begin).as_secs_f64();
        if let Some(st) = self.sim.as_mut().and_then(|s| s.state.as_mut()) {
            st.sim_time += elapsed;
        }
        debug!(seconds = elapsed, "scheduler timer: events + loop");
        self.ev_check();
        self.handle_timer_queue();

        let Some(state) = self.sim.as_mut().and_then(|s| s.state.take()) else { return };
        let reply = serde_json::json!({
            "mod_name": "sched",
            "sim_time": state.sim_time,
            "timers": state.timers,
        });
        if let Err(e) = self.bus.request(topics::SIM_REPLY, reply) {
            error!(error = %e, "failed to reply to the simulator");
        }
    }

    /// Drain queued job-status notifications, oldest first. Loopback
    /// updates enqueued while draining are handled in the same sweep.
    fn drain_sim_status(&mut self) {
        loop {
            let Some(jcb) = self.sim.as_mut().and_then(|s| s.jsc_queue.pop_front()) else {
                break;
            };
            debug!(job = jcb.jobid, "handling queued status event");
            self.handle_job_status(jcb);
        }
    }

    /// Drain queued resource events, oldest first.
    fn drain_sim_resources(&mut self) {
        loop {
            let Some(topic) = self.sim.as_mut().and_then(|s| s.res_queue.pop_front()) else {
                break;
            };
            debug!(topic = %topic, "handling queued resource event");
            if self.args.params.delay_sched {
                self.table.mark_dirty();
            } else {
                self.schedule_jobs();
            }
        }
    }

    /// Move each queued module's wakeup timer to its next slot.
    fn handle_timer_queue(&mut self) {
        let Some(sim) = self.sim.as_mut() else { return };
        let Some(state) = sim.state.as_mut() else {
            sim.timer_queue.clear();
            return;
        };
        while let Some(module) = sim.timer_queue.pop_front() {
            let spacing = if module == "sim_exec" { NEXT_EVENT_EXEC } else { NEXT_EVENT_OTHER };
            let next = state.sim_time + spacing;
            let timer = state.timers.entry(module).or_insert(-1.0);
            if *timer > next || *timer < 0.0 {
                *timer = next;
            }
        }
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
