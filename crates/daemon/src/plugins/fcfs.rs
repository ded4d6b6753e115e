// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! First-come-first-served behavior plugin.
//!
//! Matches in pool order and reserves resources for the frontmost jobs
//! that could not be fully satisfied, up to `reserve-depth` per pass.

use super::{BehaviorPlugin, PluginError, SchedProperties};
use crate::config::SchedParams;
use drover_core::JobId;
use drover_resource::{traverse, ResourceId, ResourcePool, ResourceRequest, ResourceTree, TimeWindow};

#[derive(Debug)]
pub struct Fcfs {
    /// Reservations allowed per pass; negative means unlimited.
    reserve_depth: i64,
    reserved: u64,
}

impl Fcfs {
    pub fn new() -> Self {
        Self { reserve_depth: 1, reserved: 0 }
    }
}

impl Default for Fcfs {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorPlugin for Fcfs {
    fn name(&self) -> &'static str {
        "sched.fcfs"
    }

    fn process_args(&mut self, opts: &[String], _params: &SchedParams) -> Result<(), PluginError> {
        for opt in opts {
            match opt.split_once('=') {
                Some(("reserve-depth", value)) => {
                    self.reserve_depth = value
                        .parse()
                        .map_err(|_| PluginError::InvalidOption(opt.clone()))?;
                }
                _ => return Err(PluginError::InvalidOption(opt.clone())),
            }
        }
        Ok(())
    }

    fn sched_properties(&self) -> SchedProperties {
        SchedProperties { out_of_order_capable: true }
    }

    fn sched_loop_setup(&mut self) -> Result<(), PluginError> {
        self.reserved = 0;
        Ok(())
    }

    fn find_resources(
        &mut self,
        pool: &ResourcePool,
        root: ResourceId,
        request: &ResourceRequest,
    ) -> (u64, ResourceTree) {
        traverse::find_resources(pool, root, request)
    }

    fn select_resources(
        &mut self,
        pool: &mut ResourcePool,
        found: &ResourceTree,
        request: &mut ResourceRequest,
        _prior: Option<&ResourceTree>,
    ) -> Option<ResourceTree> {
        traverse::select_resources(pool, found, request)
    }

    fn allocate_resources(
        &mut self,
        pool: &mut ResourcePool,
        selected: &ResourceTree,
        job: JobId,
        window: TimeWindow,
    ) -> Result<(), PluginError> {
        traverse::allocate_resources(pool, selected, job, window)
            .map_err(|e| PluginError::Failed(e.to_string()))
    }

    fn reserve_resources(
        &mut self,
        pool: &mut ResourcePool,
        selected: &ResourceTree,
        job: JobId,
        starttime: i64,
        walltime_secs: u64,
        _root: ResourceId,
        _request: &ResourceRequest,
    ) -> Result<(), PluginError> {
        if self.reserve_depth == 0 {
            return Err(PluginError::ReservationLimit);
        }
        if self.reserve_depth > 0 && self.reserved >= self.reserve_depth as u64 {
            return Err(PluginError::ReservationLimit);
        }
        let window = TimeWindow::new(starttime, starttime + walltime_secs as i64);
        traverse::reserve_resources(pool, selected, job, window)
            .map_err(|e| PluginError::Failed(e.to_string()))?;
        self.reserved += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "fcfs_tests.rs"]
mod tests;
