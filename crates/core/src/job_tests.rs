// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

use super::*;

#[test]
fn job_id_display() {
    assert_eq!(JobId(7).to_string(), "7");
}

#[test]
fn job_id_serde_is_transparent() {
    let id = JobId(42);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "42");

    let parsed: JobId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[yare::parameterized(
    null = { JobState::Null, "null" },
    sched_req = { JobState::SchedReq, "sched-req" },
    run_request = { JobState::RunRequest, "run-request" },
    completing = { JobState::Completing, "completing" },
    reaped = { JobState::Reaped, "reaped" },
)]
fn job_state_display(state: JobState, expected: &str) {
    assert_eq!(state.to_string(), expected);
}

#[test]
fn job_state_serde_matches_display() {
    for state in [
        JobState::Null,
        JobState::Submitted,
        JobState::Pending,
        JobState::SchedReq,
        JobState::Selected,
        JobState::Allocated,
        JobState::RunRequest,
        JobState::Starting,
        JobState::Running,
        JobState::Completing,
        JobState::Complete,
        JobState::Cancelled,
        JobState::Failed,
        JobState::Reaped,
    ] {
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, format!("\"{}\"", state));
        let parsed: JobState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }
}

#[yare::parameterized(
    complete = { JobState::Complete, true },
    cancelled = { JobState::Cancelled, true },
    failed = { JobState::Failed, true },
    reaped = { JobState::Reaped, true },
    running = { JobState::Running, false },
    sched_req = { JobState::SchedReq, false },
)]
fn job_state_terminal(state: JobState, terminal: bool) {
    assert_eq!(state.is_terminal(), terminal);
}

#[test]
fn request_applies_walltime_fallback() {
    let req = JobRequest::from_counts(1, 4, 0, None, false);
    assert_eq!(req.walltime_secs, DEFAULT_WALLTIME_SECS);

    let req = JobRequest::from_counts(1, 4, 0, Some(0), false);
    assert_eq!(req.walltime_secs, DEFAULT_WALLTIME_SECS);

    let req = JobRequest::from_counts(1, 4, 0, Some(60), false);
    assert_eq!(req.walltime_secs, 60);
}

#[test]
fn request_derived_fields_start_at_zero() {
    let req = JobRequest::from_counts(2, 8, 4, Some(120), true);
    assert_eq!(req.cores_per_node, 0);
    assert_eq!(req.gpus_per_node, 0);
    assert!(req.node_exclusive);
}
