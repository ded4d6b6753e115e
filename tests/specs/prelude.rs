// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Shared imports for scenario specs.

pub use drover_core::{JobId, JobState};
pub use drover_daemon::engine::test_helpers::{engine, engine_with_pool, TestEngine};
pub use drover_daemon::engine::QueueKind;
pub use drover_daemon::{SchedParams, SchedulerArgs};
pub use drover_wire::{topics, ControlRequest, ControlResponse};
