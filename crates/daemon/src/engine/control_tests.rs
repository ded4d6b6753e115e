// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

use crate::engine::test_helpers::*;
use crate::SchedulerArgs;
use drover_core::{JobId, JobState};
use drover_resource::{ResourceKind, ResourceState};
use drover_wire::{topics, ControlRequest, ControlResponse, ErrorCode};

fn error_code(resp: ControlResponse) -> ErrorCode {
    match resp {
        ControlResponse::Error { code, .. } => code,
        other => panic!("expected error, got {other:?}"),
    }
}

// -- cancel --

#[test]
fn cancel_pending_job() {
    let mut t = engine(SchedulerArgs::default());
    // Oversized request parks the job in sched-req
    t.submit_and_settle(1, 5, 5, 0, 60);

    let resp = t.control(ControlRequest::Cancel { jobid: 1 });
    assert_eq!(resp, ControlResponse::Cancelled { jobid: 1 });

    let events = t.bus.events();
    let cancelled: Vec<_> =
        events.iter().filter(|(t, _)| t == topics::STATE_CANCELLED).collect();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].1["jobid"], 1);

    // Once the status update loops back the record is gone (reap off)
    t.drain();
    assert_eq!(t.state_of(1), None);
}

#[test]
fn cancel_unknown_job() {
    let mut t = engine(SchedulerArgs::default());
    let resp = t.control(ControlRequest::Cancel { jobid: 9 });
    assert_eq!(error_code(resp), ErrorCode::NotFound);
}

#[test]
fn cancel_requires_sched_req_state() {
    let mut t = engine(SchedulerArgs::default());
    t.submit_and_settle(1, 1, 1, 0, 60);
    assert_eq!(t.state_of(1), Some(JobState::RunRequest));

    let resp = t.control(ControlRequest::Cancel { jobid: 1 });
    assert_eq!(error_code(resp), ErrorCode::InvalidState);
}

#[test]
fn double_cancel_fails_the_second_time() {
    let args = SchedulerArgs { reap: true, ..SchedulerArgs::default() };
    let mut t = engine(args);
    t.submit_and_settle(1, 5, 5, 0, 60);

    let first = t.control(ControlRequest::Cancel { jobid: 1 });
    assert!(!first.is_error());
    t.drain();

    let second = t.control(ControlRequest::Cancel { jobid: 1 });
    assert_eq!(error_code(second), ErrorCode::InvalidState);
}

// -- exclude / include --

#[test]
fn exclude_with_kill_broadcasts_per_job() {
    let mut t = engine(SchedulerArgs::default());
    // Two 2-core jobs land on node0 first-fit
    t.submit_and_settle(10, 0, 2, 0, 60);
    t.submit_and_settle(11, 0, 2, 0, 60);

    let resp = t.control(ControlRequest::Exclude { node: "node0".into(), kill: true });
    assert_eq!(resp, ControlResponse::Ok);

    let topics_sent = t.bus.event_topics();
    assert!(topics_sent.contains(&"wreck.10.kill".to_string()));
    assert!(topics_sent.contains(&"wreck.11.kill".to_string()));
    assert!(topics_sent.contains(&topics::RES_EXCLUDED.to_string()));

    let pool = t.engine.pool();
    let node = pool.lookup_by_name("node0")[0];
    assert_eq!(pool.get(node).state, ResourceState::Excluded);
}

#[test]
fn exclude_without_kill_sends_no_kills() {
    let mut t = engine(SchedulerArgs::default());
    t.submit_and_settle(1, 0, 1, 0, 60);

    let resp = t.control(ControlRequest::Exclude { node: "node0".into(), kill: false });
    assert_eq!(resp, ControlResponse::Ok);
    assert!(!t.bus.event_topics().iter().any(|t| t.ends_with(".kill")));
}

#[test]
fn exclude_unknown_host() {
    let mut t = engine(SchedulerArgs::default());
    let resp = t.control(ControlRequest::Exclude { node: "ghost".into(), kill: false });
    assert_eq!(error_code(resp), ErrorCode::NotFound);
}

#[test]
fn excluded_nodes_stop_matching() {
    let mut t = engine(SchedulerArgs::default());
    for node in ["node0", "node1", "node2"] {
        t.control(ControlRequest::Exclude { node: node.into(), kill: false });
    }

    t.submit_and_settle(1, 1, 1, 0, 60);
    assert_eq!(t.state_of(1), Some(JobState::SchedReq));
}

#[test]
fn include_restores_excluded_nodes_to_idle() {
    let mut t = engine(SchedulerArgs::default());
    t.control(ControlRequest::Exclude { node: "node1".into(), kill: false });

    let resp = t.control(ControlRequest::Include { node: "node1".into() });
    assert_eq!(resp, ControlResponse::Ok);
    assert!(t.bus.event_topics().contains(&topics::RES_INCLUDED.to_string()));

    let pool = t.engine.pool();
    let node = pool.lookup_by_name("node1")[0];
    assert_eq!(pool.get(node).state, ResourceState::Idle);
}

#[test]
fn include_skips_allocated_nodes() {
    let args = SchedulerArgs { node_excl: true, ..SchedulerArgs::default() };
    let mut t = engine(args);
    // Node-exclusive job flips its node to allocated
    t.submit_and_settle(1, 1, 1, 0, 60);

    let allocated: Vec<_> = t
        .engine
        .pool()
        .of_kind(ResourceKind::Node)
        .into_iter()
        .filter(|id| t.engine.pool().get(*id).state == ResourceState::Allocated)
        .collect();
    assert_eq!(allocated.len(), 1);
    let name = t.engine.pool().get(allocated[0]).name.clone();

    let resp = t.control(ControlRequest::Include { node: name.clone() });
    assert_eq!(resp, ControlResponse::Ok);
    // Skipped with a warning, state untouched
    assert_eq!(t.engine.pool().get(allocated[0]).state, ResourceState::Allocated);
}

#[test]
fn include_unknown_host() {
    let mut t = engine(SchedulerArgs::default());
    let resp = t.control(ControlRequest::Include { node: "ghost".into() });
    assert_eq!(error_code(resp), ErrorCode::NotFound);
}

// -- params --

#[test]
fn params_set_then_get_round_trips() {
    let mut t = engine(SchedulerArgs::default());

    let resp =
        t.control(ControlRequest::ParamsSet { param: "queue-depth=7,delay-sched=true".into() });
    assert_eq!(resp, ControlResponse::Ok);

    let resp = t.control(ControlRequest::ParamsGet);
    assert_eq!(resp, ControlResponse::Params { queue_depth: 7, delay_sched: 1 });
}

#[yare::parameterized(
    unknown_key = { "wait-time=5" },
    zero_depth = { "queue-depth=0" },
    bad_bool = { "delay-sched=perhaps" },
)]
fn params_set_rejects(param: &str) {
    let mut t = engine(SchedulerArgs::default());
    let resp = t.control(ControlRequest::ParamsSet { param: param.into() });
    assert_eq!(error_code(resp), ErrorCode::InvalidArg);

    // Values unchanged
    let resp = t.control(ControlRequest::ParamsGet);
    assert_eq!(
        resp,
        ControlResponse::Params {
            queue_depth: crate::config::DEFAULT_QUEUE_DEPTH,
            delay_sched: 0
        }
    );
}

#[test]
fn params_delay_flip_reconfigures_the_coalescer() {
    let mut t = engine(SchedulerArgs::default());
    assert!(!t.engine.coalescer().armed());

    t.control(ControlRequest::ParamsSet { param: "delay-sched=true".into() });
    assert!(t.engine.coalescer().armed());

    t.control(ControlRequest::ParamsSet { param: "delay-sched=false".into() });
    assert!(!t.engine.coalescer().armed());
    assert!(t.bus.event_topics().contains(&topics::RES_PARAM_UPDATE.to_string()));
}

#[test]
fn params_same_value_does_not_reconfigure() {
    let mut t = engine(SchedulerArgs::default());
    t.control(ControlRequest::ParamsSet { param: "delay-sched=false".into() });
    // No flip, no synthesized event
    assert!(!t.bus.event_topics().contains(&topics::RES_PARAM_UPDATE.to_string()));
}
