// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Specs for the reactor loop itself.

use crate::prelude::*;
use drover_daemon::EngineEvent;
use drover_wire::{Jcb, Rdesc};
use std::time::Duration;

fn submitted(id: u64, ncores: u64) -> EngineEvent {
    EngineEvent::JobStatus(Jcb::submitted(
        id,
        Rdesc { nnodes: 0, ncores, ngpus: 0, walltime: Some(60) },
    ))
}

#[tokio::test]
async fn reactor_settles_a_submission_without_outside_help() {
    let t = engine(SchedulerArgs::default());
    let TestEngine { engine, rx, tx, bus, .. } = t;

    tx.send(submitted(1, 1)).unwrap();

    // The loopback keeps the channel open; bound the run instead.
    tokio::select! {
        _ = engine.run(rx) => {}
        _ = tokio::time::sleep(Duration::from_millis(200)) => {}
    }

    assert!(bus.event_topics().contains(&"wrexec.run.1".to_string()));
}

#[tokio::test]
async fn coalesced_submissions_share_one_boundary_pass() {
    let args = SchedulerArgs {
        params: SchedParams { delay_sched: true, ..SchedParams::default() },
        ..SchedulerArgs::default()
    };
    let t = engine(args);
    let TestEngine { engine, rx, tx, bus, .. } = t;

    for id in 1..=3 {
        tx.send(submitted(id, 1)).unwrap();
    }

    tokio::select! {
        _ = engine.run(rx) => {}
        _ = tokio::time::sleep(Duration::from_millis(200)) => {}
    }

    // All three eventually run; the check boundary scheduled them.
    let events = bus.event_topics();
    for id in 1..=3 {
        assert!(events.contains(&format!("wrexec.run.{id}")), "job {id} must run");
    }
}

#[tokio::test]
async fn loopback_sender_keeps_the_reactor_alive() {
    let t = engine(SchedulerArgs::default());
    let TestEngine { mut engine, rx, tx, .. } = t;

    // Even with the transport's sender gone, the engine's own status
    // loopback holds the channel open; the reactor idles rather than
    // shutting down mid-lifecycle.
    drop(tx);
    let done = tokio::time::timeout(Duration::from_millis(200), async move {
        let mut rx = rx;
        while let Some(event) = rx.recv().await {
            engine.handle_event(event);
        }
    })
    .await;
    assert!(done.is_err());
}
