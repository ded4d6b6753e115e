// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Scheduling-event coalescer.
//!
//! With `delay-sched` on, handlers only mark the dirty flag; a prep
//! watcher fires before each reactor wait (arming the idle kicker when
//! work is pending) and a check watcher fires after it, draining the flag
//! into exactly one scheduling pass per boundary. The watcher pair is
//! created the first time `delay-sched` turns on and merely stopped when
//! it turns off.

use crate::adapters::EventBus;
use crate::error::EngineError;
use drover_wire::topics;

#[derive(Debug, Default)]
struct Watcher {
    started: bool,
}

#[derive(Debug, Default)]
pub struct Coalescer {
    before: Option<Watcher>,
    after: Option<Watcher>,
    /// Keeps the check watcher firing even when no external event lands.
    idle: Option<Watcher>,
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both watchers exist and are started.
    pub fn armed(&self) -> bool {
        matches!(
            (&self.before, &self.after),
            (Some(b), Some(a)) if b.started && a.started
        )
    }

    pub fn idle_armed(&self) -> bool {
        self.idle.as_ref().is_some_and(|i| i.started)
    }

    pub(crate) fn arm_idle(&mut self) {
        if let Some(idle) = self.idle.as_mut() {
            idle.started = true;
        }
    }

    pub(crate) fn disarm_idle(&mut self) {
        if let Some(idle) = self.idle.as_mut() {
            idle.started = false;
        }
    }

    /// Apply a `delay-sched` change. Turning coalescing off synthesizes a
    /// param-update resource event so the pending flag drains promptly
    /// under the new mode. A half-allocated watcher pair is an invariant
    /// violation either way.
    pub fn reconfigure(
        &mut self,
        delay_sched: bool,
        in_sim: bool,
        bus: &impl EventBus,
    ) -> Result<(), EngineError> {
        if in_sim {
            return Ok(());
        }

        if delay_sched {
            match (&mut self.before, &mut self.after) {
                (Some(before), Some(after)) => {
                    before.started = true;
                    after.started = true;
                }
                (None, None) => {
                    self.before = Some(Watcher { started: true });
                    self.after = Some(Watcher { started: true });
                    self.idle = Some(Watcher::default());
                }
                _ => {
                    return Err(EngineError::InternalInvariant(
                        "coalescer watcher pair is incomplete".into(),
                    ))
                }
            }
        } else {
            match (&mut self.before, &mut self.after) {
                (Some(before), Some(after)) => {
                    before.started = false;
                    after.started = false;
                    tracing::debug!("update delay_sched parameter");
                    bus.publish(topics::RES_PARAM_UPDATE, serde_json::json!({}))
                        .map_err(|e| EngineError::Io(e.to_string()))?;
                }
                (None, None) => {}
                _ => {
                    return Err(EngineError::InternalInvariant(
                        "coalescer watcher pair is incomplete".into(),
                    ))
                }
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn drop_check_watcher_for_test(&mut self) {
        self.after = None;
    }
}

#[cfg(test)]
#[path = "coalesce_tests.rs"]
mod tests;
