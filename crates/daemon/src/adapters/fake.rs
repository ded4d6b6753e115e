// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Recording fakes for engine tests.

use super::{AdapterError, EventBus};
use parking_lot::Mutex;
use std::sync::Arc;

/// Bus that records everything published or requested.
#[derive(Clone, Default)]
pub struct RecordingBus {
    events: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    requests: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Topics of published events, in order.
    pub fn event_topics(&self) -> Vec<String> {
        self.events.lock().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn request_topics(&self) -> Vec<String> {
        self.requests.lock().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn events(&self) -> Vec<(String, serde_json::Value)> {
        self.events.lock().clone()
    }

    pub fn requests(&self) -> Vec<(String, serde_json::Value)> {
        self.requests.lock().clone()
    }

    /// Number of events published on one topic.
    pub fn count_events(&self, topic: &str) -> usize {
        self.events.lock().iter().filter(|(t, _)| t == topic).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
        self.requests.lock().clear();
    }
}

impl EventBus for RecordingBus {
    fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), AdapterError> {
        self.events.lock().push((topic.to_string(), payload));
        Ok(())
    }

    fn request(&self, topic: &str, payload: serde_json::Value) -> Result<(), AdapterError> {
        self.requests.lock().push((topic.to_string(), payload));
        Ok(())
    }
}
