// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Topic strings the scheduler answers on and publishes to.

use drover_core::JobId;

// Control surface (request/response)
pub const CANCEL: &str = "sched.cancel";
pub const EXCLUDE: &str = "sched.exclude";
pub const INCLUDE: &str = "sched.include";
pub const PARAMS_SET: &str = "sched.params.set";
pub const PARAMS_GET: &str = "sched.params.get";

// Resource events; anything under the prefix triggers a scheduling pass
pub const RES_PREFIX: &str = "sched.res.";
pub const RES_FREED: &str = "sched.res.freed";
pub const RES_EXCLUDED: &str = "sched.res.excluded";
pub const RES_INCLUDED: &str = "sched.res.included";
pub const RES_PARAM_UPDATE: &str = "sched.res.param_update";

// Published job events
pub const STATE_CANCELLED: &str = "wreck.state.cancelled";

// Simulator handshake
pub const SIM_START: &str = "sim.start";
pub const SIM_TRIGGER: &str = "sched.trigger";
pub const SIM_JOIN: &str = "sim.join";
pub const SIM_ALIVE: &str = "sim.alive";
pub const SIM_REPLY: &str = "sim.reply";

/// Run request topic for the normal execution service.
pub fn wrexec_run(id: JobId) -> String {
    format!("wrexec.run.{id}")
}

/// Run request topic for the simulated execution service.
pub fn sim_exec_run(id: JobId) -> String {
    format!("sim_exec.run.{id}")
}

/// Kill broadcast topic for one job.
pub fn wreck_kill(id: JobId) -> String {
    format!("wreck.{id}.kill")
}

/// True when a topic counts as a resource event.
pub fn is_res_event(topic: &str) -> bool {
    topic.starts_with(RES_PREFIX)
}
