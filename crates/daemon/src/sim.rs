// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Simulator bridge state.
//!
//! Under the simulator the reactor does not run free: a trigger request
//! delivers the simulated time, queued notifications are drained in FIFO
//! order, and control returns to the driver with an updated state. The
//! handling itself lives on the engine; this module holds the types.

use drover_wire::Jcb;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Simulated time and per-module wakeup timers, exchanged with the
/// simulator driver on every trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub sim_time: f64,
    #[serde(default)]
    pub timers: BTreeMap<String, f64>,
}

/// Spacing for the execution service's next wakeup; it must not fire
/// until the run-request state chain has settled.
pub(crate) const NEXT_EVENT_EXEC: f64 = 1e-4;
pub(crate) const NEXT_EVENT_OTHER: f64 = 1e-5;

/// Queues for events that arrive between triggers.
#[derive(Debug, Default)]
pub(crate) struct SimCtx {
    pub state: Option<SimState>,
    pub jsc_queue: VecDeque<Jcb>,
    pub res_queue: VecDeque<String>,
    pub timer_queue: VecDeque<String>,
}

impl SimCtx {
    pub fn new() -> Self {
        Self::default()
    }
}
