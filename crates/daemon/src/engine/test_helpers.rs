// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! In-process engine harness.
//!
//! Builds a full engine on fake adapters: a recording bus, a loopback
//! status sink, and a controllable clock. Tests drive events by hand and
//! drain the loopback channel to let implicit transition chains settle.

use super::{Engine, EngineDeps, EngineEvent};
use crate::adapters::{LoopbackStatus, RecordingBus};
use crate::config::SchedulerArgs;
use crate::rankmap::RankTable;
use drover_core::{FakeClock, JobState};
use drover_resource::{parse_inventory, ResourcePool};
use drover_wire::{ControlRequest, ControlResponse, Jcb, Rdesc};
use tokio::sync::mpsc;

/// 3 nodes with 4 cores + 2 GPUs each.
pub const TEST_INVENTORY: &str = r#"
[cluster]
name = "testcluster"

[[node]]
name = "node"
count = 3
cores = 4
gpus = 2
"#;

pub fn default_pool() -> ResourcePool {
    parse_inventory(TEST_INVENTORY).unwrap()
}

pub struct TestEngine {
    pub engine: Engine<RecordingBus, LoopbackStatus, FakeClock>,
    pub rx: mpsc::UnboundedReceiver<EngineEvent>,
    /// External handle onto the engine's event channel (what a broker
    /// transport would hold).
    pub tx: mpsc::UnboundedSender<EngineEvent>,
    pub bus: RecordingBus,
    pub clock: FakeClock,
}

pub fn engine(args: SchedulerArgs) -> TestEngine {
    engine_with_pool(args, default_pool())
}

pub fn engine_with_pool(args: SchedulerArgs, mut pool: ResourcePool) -> TestEngine {
    let (tx, rx) = mpsc::unbounded_channel();
    let ranks = RankTable::emulated(&pool);
    drover_resource::reader::link_ranks(&mut pool, &ranks.signatures()).unwrap();

    let bus = RecordingBus::new();
    let clock = FakeClock::new();
    let engine = Engine::new(
        args,
        pool,
        ranks,
        EngineDeps {
            bus: bus.clone(),
            status: LoopbackStatus::new(tx.clone()),
            clock: clock.clone(),
        },
    )
    .unwrap();
    TestEngine { engine, rx, tx, bus, clock }
}

/// Like [`engine_with_pool`] but with caller-supplied policy plugins.
pub fn engine_with_plugins(
    args: SchedulerArgs,
    mut pool: ResourcePool,
    behavior: Box<dyn crate::plugins::BehaviorPlugin>,
    priority: Option<Box<dyn crate::plugins::PriorityPlugin>>,
) -> TestEngine {
    let (tx, rx) = mpsc::unbounded_channel();
    let ranks = RankTable::emulated(&pool);
    drover_resource::reader::link_ranks(&mut pool, &ranks.signatures()).unwrap();

    let bus = RecordingBus::new();
    let clock = FakeClock::new();
    let engine = Engine::with_plugins(
        args,
        pool,
        ranks,
        EngineDeps {
            bus: bus.clone(),
            status: LoopbackStatus::new(tx.clone()),
            clock: clock.clone(),
        },
        behavior,
        priority,
    )
    .unwrap();
    TestEngine { engine, rx, tx, bus, clock }
}

impl TestEngine {
    /// Handle every event waiting on the loopback channel, letting the
    /// implicit transition chain settle.
    pub fn drain(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.engine.handle_event(event);
        }
    }

    /// Deliver a submission notification.
    pub fn submit(&mut self, id: u64, nnodes: u64, ncores: u64, ngpus: u64, walltime: u64) {
        let rdesc = Rdesc { nnodes, ncores, ngpus, walltime: Some(walltime) };
        self.engine.handle_event(EngineEvent::JobStatus(Jcb::submitted(id, rdesc)));
    }

    /// Deliver a bare state-change notification.
    pub fn notify(&mut self, id: u64, ostate: JobState, nstate: JobState) {
        self.engine
            .handle_event(EngineEvent::JobStatus(Jcb::state_change(id, ostate, nstate)));
    }

    /// Deliver a broadcast resource event.
    pub fn resource_event(&mut self, topic: &str) {
        self.engine.handle_event(EngineEvent::Resource { topic: topic.to_string() });
    }

    pub fn control(&mut self, request: ControlRequest) -> ControlResponse {
        self.engine.handle_control(request)
    }

    pub fn state_of(&self, id: u64) -> Option<JobState> {
        self.engine.table().job(drover_core::JobId(id)).map(|j| j.state)
    }

    /// Submit and settle the loopback chain; with free resources the job
    /// ends up waiting for the execution service in run-request.
    pub fn submit_and_settle(&mut self, id: u64, nnodes: u64, ncores: u64, ngpus: u64, walltime: u64) {
        self.submit(id, nnodes, ncores, ngpus, walltime);
        self.drain();
    }

    /// Walk an allocated job into the running state.
    pub fn advance_to_running(&mut self, id: u64) {
        self.notify(id, JobState::RunRequest, JobState::Starting);
        self.notify(id, JobState::Starting, JobState::Running);
        self.drain();
    }
}
