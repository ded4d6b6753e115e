// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Policy plugin host.
//!
//! Behavior plugins decide where and whether a job fits; priority plugins
//! reorder the pending queue and account for usage. Both are trusted:
//! a plugin error aborts the current pass, never the service.

mod fcfs;
mod prio_age;

pub use fcfs::Fcfs;
pub use prio_age::PrioAge;

use crate::config::SchedParams;
use crate::engine::{Job, JobTable};
use drover_core::JobId;
use drover_resource::{ResourceId, ResourcePool, ResourceRequest, ResourceTree, TimeWindow};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("unknown plugin: {0}")]
    Unknown(String),

    #[error("invalid plugin option: {0}")]
    InvalidOption(String),

    #[error("reservation limit reached")]
    ReservationLimit,

    #[error("plugin error: {0}")]
    Failed(String),
}

/// Capabilities a behavior plugin announces to the scheduling loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedProperties {
    /// The policy may schedule jobs out of queue order; outstanding
    /// reservations are released and re-established every pass.
    pub out_of_order_capable: bool,
}

/// Match/select/allocate/reserve policy.
pub trait BehaviorPlugin: Send + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Configure from `plugin-opts` at load time.
    fn process_args(&mut self, opts: &[String], params: &SchedParams) -> Result<(), PluginError>;

    fn sched_properties(&self) -> SchedProperties;

    /// Called once at the top of every scheduling pass. An error aborts
    /// the pass.
    fn sched_loop_setup(&mut self) -> Result<(), PluginError>;

    /// Search for candidates satisfying `request` under `root`. Returns
    /// the match count and the candidate tree.
    fn find_resources(
        &mut self,
        pool: &ResourcePool,
        root: ResourceId,
        request: &ResourceRequest,
    ) -> (u64, ResourceTree);

    /// Pick concrete resources out of the candidates, counting
    /// satisfaction on `request`. `prior` carries a previous selection
    /// for policies that refine one.
    fn select_resources(
        &mut self,
        pool: &mut ResourcePool,
        found: &ResourceTree,
        request: &mut ResourceRequest,
        prior: Option<&ResourceTree>,
    ) -> Option<ResourceTree>;

    fn allocate_resources(
        &mut self,
        pool: &mut ResourcePool,
        selected: &ResourceTree,
        job: JobId,
        window: TimeWindow,
    ) -> Result<(), PluginError>;

    /// Reserve a partially satisfied selection for a future pass.
    #[allow(clippy::too_many_arguments)]
    fn reserve_resources(
        &mut self,
        pool: &mut ResourcePool,
        selected: &ResourceTree,
        job: JobId,
        starttime: i64,
        walltime_secs: u64,
        root: ResourceId,
        request: &ResourceRequest,
    ) -> Result<(), PluginError>;
}

/// Pending-queue prioritization and usage accounting.
pub trait PriorityPlugin: Send {
    fn name(&self) -> &'static str;

    fn priority_setup(&mut self) -> Result<(), PluginError>;

    /// May mutate the priority of every pending job.
    fn prioritize_jobs(&mut self, now: i64, table: &mut JobTable);

    /// Called when a complete job is reaped.
    fn record_job_usage(&mut self, job: &Job);
}

/// Resolve a behavior plugin by name.
pub fn load_behavior(name: &str) -> Result<Box<dyn BehaviorPlugin>, PluginError> {
    match name {
        "sched.fcfs" => Ok(Box::new(Fcfs::new())),
        _ => Err(PluginError::Unknown(name.to_string())),
    }
}

/// Resolve a priority plugin by name.
pub fn load_priority(name: &str) -> Result<Box<dyn PriorityPlugin>, PluginError> {
    match name {
        "prio.age" => Ok(Box::new(PrioAge::new())),
        _ => Err(PluginError::Unknown(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_registry_resolves_fcfs() {
        assert_eq!(load_behavior("sched.fcfs").unwrap().name(), "sched.fcfs");
    }

    #[test]
    fn unknown_plugins_are_rejected_by_name() {
        match load_behavior("sched.backfill") {
            Err(PluginError::Unknown(name)) => assert_eq!(name, "sched.backfill"),
            other => panic!("expected Unknown, got {other:?}"),
        }
        assert!(load_priority("prio.fair").is_err());
    }

    #[test]
    fn priority_registry_resolves_age() {
        assert_eq!(load_priority("prio.age").unwrap().name(), "prio.age");
    }
}
