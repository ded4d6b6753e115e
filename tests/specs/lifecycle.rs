// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! End-to-end job lifecycle specs.

use crate::prelude::*;

#[test]
fn batch_job_runs_to_completion() {
    let mut t = engine(SchedulerArgs::default());

    t.submit_and_settle(1, 1, 2, 0, 120);
    assert_eq!(t.state_of(1), Some(JobState::RunRequest));
    assert_eq!(t.bus.event_topics(), vec!["wrexec.run.1".to_string()]);

    // The execution service reports progress
    t.notify(1, JobState::RunRequest, JobState::Starting);
    t.notify(1, JobState::Starting, JobState::Running);
    t.drain();
    assert_eq!(t.engine.table().queue_of(JobId(1)), Some(QueueKind::Running));

    t.notify(1, JobState::Running, JobState::Completing);
    t.notify(1, JobState::Completing, JobState::Complete);
    t.drain();

    // Terminated without reap: record gone, resources announced free
    assert_eq!(t.state_of(1), None);
    assert!(t.bus.event_topics().contains(&topics::RES_FREED.to_string()));
}

#[test]
fn cancel_of_a_starved_pending_job() {
    let mut t = engine(SchedulerArgs::default());

    // Nothing is free: every node is out for maintenance
    for node in ["node0", "node1", "node2"] {
        t.control(ControlRequest::Exclude { node: node.into(), kill: false });
    }

    t.submit_and_settle(1, 1, 1, 0, 60);
    assert_eq!(t.state_of(1), Some(JobState::SchedReq));

    let resp = t.control(ControlRequest::Cancel { jobid: 1 });
    assert_eq!(resp, ControlResponse::Cancelled { jobid: 1 });

    let cancelled: Vec<_> = t
        .bus
        .events()
        .into_iter()
        .filter(|(topic, _)| topic == topics::STATE_CANCELLED)
        .collect();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].1["jobid"], 1);

    t.drain();
    assert_eq!(t.state_of(1), None, "cancelled job is destroyed without reap");
}

#[test]
fn reap_mode_retains_jobs_until_the_reap_transition() {
    let args = SchedulerArgs { reap: true, ..SchedulerArgs::default() };
    let mut t = engine(args);

    t.submit_and_settle(1, 1, 1, 0, 60);
    t.advance_to_running(1);
    t.notify(1, JobState::Running, JobState::Completing);
    t.notify(1, JobState::Completing, JobState::Complete);
    t.drain();

    assert_eq!(t.engine.table().queue_of(JobId(1)), Some(QueueKind::Completed));

    t.notify(1, JobState::Complete, JobState::Reaped);
    t.drain();
    assert_eq!(t.state_of(1), None);
}

#[test]
fn exclude_then_include_restores_scheduling() {
    let mut t = engine(SchedulerArgs::default());

    for node in ["node0", "node1", "node2"] {
        t.control(ControlRequest::Exclude { node: node.into(), kill: false });
    }
    t.submit_and_settle(1, 1, 1, 0, 60);
    assert_eq!(t.state_of(1), Some(JobState::SchedReq));

    for node in ["node0", "node1", "node2"] {
        t.control(ControlRequest::Include { node: node.into() });
    }
    // The included broadcast loops back as a resource event
    t.resource_event(topics::RES_INCLUDED);
    t.drain();

    assert_eq!(t.state_of(1), Some(JobState::RunRequest));
}
