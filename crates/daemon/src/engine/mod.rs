// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! The scheduler engine: one reactor loop owning all mutable state.
//!
//! Events arrive on a single channel and are handled to completion in
//! arrival order. When coalescing is on, the prep/check pair runs around
//! each drained batch, so a burst of events costs one scheduling pass.

mod bridge;
mod coalesce;
mod control;
mod job;
mod lifecycle;
mod sched_loop;
mod table;

#[cfg(any(test, feature = "test-support"))]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
pub mod test_helpers;

pub use coalesce::Coalescer;
pub use job::Job;
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use table::{JobTable, QueueKind};

use crate::adapters::{EventBus, StatusSink};
use crate::config::SchedulerArgs;
use crate::error::EngineError;
use crate::plugins::{self, BehaviorPlugin, PriorityPlugin};
use crate::rankmap::RankTable;
use crate::sim::{SimCtx, SimState};
use drover_core::Clock;
use drover_resource::ResourcePool;
use drover_wire::{topics, ControlRequest, ControlResponse, Jcb};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Everything the reactor can be asked to handle.
#[derive(Debug)]
pub enum EngineEvent {
    /// Job-status notification (external or looped back)
    JobStatus(Jcb),
    /// Broadcast resource event (`sched.res.*`)
    Resource { topic: String },
    /// Control request; the response goes back on `reply` when present
    Control {
        request: ControlRequest,
        reply: Option<oneshot::Sender<ControlResponse>>,
    },
    /// Simulator session announcement
    SimStart,
    /// Simulator time step
    SimTrigger(SimState),
}

/// External collaborators handed to the engine.
pub struct EngineDeps<B, S, C> {
    pub bus: B,
    pub status: S,
    pub clock: C,
}

/// The scheduler core. Single-threaded by construction: every handler
/// runs to completion before the next event is dispatched.
pub struct Engine<B: EventBus, S: StatusSink, C: Clock> {
    pub(crate) bus: B,
    pub(crate) status: S,
    pub(crate) clock: C,
    pub(crate) args: SchedulerArgs,
    pub(crate) table: JobTable,
    pub(crate) pool: ResourcePool,
    pub(crate) ranks: RankTable,
    pub(crate) behavior: Box<dyn BehaviorPlugin>,
    pub(crate) priority: Option<Box<dyn PriorityPlugin>>,
    pub(crate) coalescer: Coalescer,
    pub(crate) sim: Option<SimCtx>,
}

impl<B: EventBus, S: StatusSink, C: Clock> Engine<B, S, C> {
    /// Build an engine, resolving plugins from the configured names.
    pub fn new(
        args: SchedulerArgs,
        pool: ResourcePool,
        ranks: RankTable,
        deps: EngineDeps<B, S, C>,
    ) -> Result<Self, EngineError> {
        let mut behavior = plugins::load_behavior(&args.plugin)?;
        behavior.process_args(&args.plugin_opts, &args.params)?;
        info!(plugin = behavior.name(), "behavior plugin loaded");

        let priority = match &args.priority_plugin {
            Some(name) => {
                let mut plugin = plugins::load_priority(name)?;
                plugin.priority_setup()?;
                info!(plugin = plugin.name(), "priority plugin loaded");
                Some(plugin)
            }
            None => None,
        };

        Self::with_plugins(args, pool, ranks, deps, behavior, priority)
    }

    /// Build an engine around caller-supplied policy plugins.
    pub fn with_plugins(
        args: SchedulerArgs,
        pool: ResourcePool,
        ranks: RankTable,
        deps: EngineDeps<B, S, C>,
        behavior: Box<dyn BehaviorPlugin>,
        priority: Option<Box<dyn PriorityPlugin>>,
    ) -> Result<Self, EngineError> {
        let sim = args.in_sim.then(SimCtx::new);
        let mut engine = Self {
            bus: deps.bus,
            status: deps.status,
            clock: deps.clock,
            args,
            table: JobTable::new(),
            pool,
            ranks,
            behavior,
            priority,
            coalescer: Coalescer::new(),
            sim,
        };
        engine.adjust_for_sched_params()?;
        Ok(engine)
    }

    /// Run the reactor until the event channel closes.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<EngineEvent>) {
        if self.args.in_sim {
            let _ = self
                .bus
                .request(topics::SIM_ALIVE, serde_json::json!({"mod_name": "sched"}));
        }
        loop {
            if self.coalescer.armed() {
                self.ev_prep();
            }
            let Some(event) = rx.recv().await else { break };
            self.handle_event(event);
            // Drain whatever arrived while handling; the batch shares one
            // check boundary.
            while let Ok(event) = rx.try_recv() {
                self.handle_event(event);
            }
            if self.coalescer.armed() {
                self.ev_check();
            }
        }
        info!("scheduler event loop stopped");
    }

    /// Dispatch a single event to completion.
    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::JobStatus(jcb) => {
                if let Some(sim) = self.sim.as_mut() {
                    debug!(job = jcb.jobid, "queueing status event for trigger");
                    sim.jsc_queue.push_back(jcb);
                    return;
                }
                self.handle_job_status(jcb);
            }

            EngineEvent::Resource { topic } => {
                if let Some(sim) = self.sim.as_mut() {
                    debug!(topic = %topic, "queueing resource event for trigger");
                    sim.res_queue.push_back(topic);
                    return;
                }
                self.handle_res_event(&topic);
            }

            EngineEvent::Control { request, reply } => {
                let response = self.handle_control(request);
                if let Some(tx) = reply {
                    let _ = tx.send(response);
                }
            }

            EngineEvent::SimStart => self.handle_sim_start(),

            EngineEvent::SimTrigger(state) => self.handle_trigger(state),
        }
    }

    /// Resource availability changed somewhere; run or flag a pass.
    fn handle_res_event(&mut self, topic: &str) {
        debug!(topic, "resource event");
        if self.args.params.delay_sched {
            self.table.mark_dirty();
        } else {
            self.schedule_jobs();
        }
    }

    /// Prep boundary: arm the idle kicker when work is flagged.
    pub(crate) fn ev_prep(&mut self) {
        if self.table.dirty() {
            self.coalescer.arm_idle();
        }
    }

    /// Check boundary: drain the dirty flag into one scheduling pass.
    pub(crate) fn ev_check(&mut self) {
        self.coalescer.disarm_idle();
        if self.table.take_dirty() {
            debug!("check callback about to schedule jobs");
            self.schedule_jobs();
        }
    }

    pub(crate) fn adjust_for_sched_params(&mut self) -> Result<(), EngineError> {
        self.coalescer
            .reconfigure(self.args.params.delay_sched, self.args.in_sim, &self.bus)
    }

    pub fn table(&self) -> &JobTable {
        &self.table
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ResourcePool {
        &mut self.pool
    }

    pub fn params(&self) -> crate::config::SchedParams {
        self.args.params
    }

    pub fn coalescer(&self) -> &Coalescer {
        &self.coalescer
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn coalescer_mut(&mut self) -> &mut Coalescer {
        &mut self.coalescer
    }
}
