// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Specs for jobs competing over a constrained pool.

use crate::prelude::*;
use drover_resource::parse_inventory;

const ONE_NODE: &str = r#"
[cluster]
name = "tiny"

[[node]]
name = "solo"
cores = 2
"#;

#[test]
fn starved_job_waits_then_takes_freed_resources() {
    let mut t = engine_with_pool(
        SchedulerArgs::default(),
        parse_inventory(ONE_NODE).unwrap(),
    );

    // First job takes both cores
    t.submit_and_settle(1, 0, 2, 0, 60);
    assert_eq!(t.state_of(1), Some(JobState::RunRequest));

    // Second job cannot fit and stays schedulable
    t.submit_and_settle(2, 0, 2, 0, 60);
    assert_eq!(t.state_of(2), Some(JobState::SchedReq));

    // First job finishes; its release frees the cores
    t.advance_to_running(1);
    t.notify(1, JobState::Running, JobState::Completing);
    t.notify(1, JobState::Completing, JobState::Complete);
    t.drain();
    assert!(t.bus.event_topics().contains(&topics::RES_FREED.to_string()));

    // The freed broadcast loops back and triggers the pass that places
    // the waiting job
    t.resource_event(topics::RES_FREED);
    t.drain();
    assert_eq!(t.state_of(2), Some(JobState::RunRequest));
}

#[test]
fn allocations_never_overlap_on_the_same_cores() {
    let mut t = engine_with_pool(
        SchedulerArgs::default(),
        parse_inventory(ONE_NODE).unwrap(),
    );

    t.submit_and_settle(1, 0, 2, 0, 60);
    t.submit_and_settle(2, 0, 1, 0, 60);

    // While job 1 holds both cores, job 2 holds nothing
    let pool = t.engine.pool();
    for id in pool.ids().collect::<Vec<_>>() {
        if pool.get(id).allocation(JobId(2)).is_some() {
            panic!("job 2 must not be allocated while job 1 holds the node");
        }
    }
}

#[test]
fn queue_depth_bounds_each_pass_across_events() {
    let args = SchedulerArgs {
        params: SchedParams { queue_depth: 1, delay_sched: false },
        ..SchedulerArgs::default()
    };
    let mut t = engine_with_pool(args, parse_inventory(ONE_NODE).unwrap());

    // Two starved jobs; with depth 1 only the head is ever examined
    t.control(ControlRequest::Exclude { node: "solo".into(), kill: false });
    t.submit_and_settle(1, 0, 1, 0, 60);
    t.submit_and_settle(2, 0, 1, 0, 60);

    t.control(ControlRequest::Include { node: "solo".into() });
    t.resource_event(topics::RES_INCLUDED);
    t.drain();

    // Head of the queue got the core; the second job was beyond the
    // depth bound for this pass
    assert_eq!(t.state_of(1), Some(JobState::RunRequest));
    assert_eq!(t.state_of(2), Some(JobState::SchedReq));
}
