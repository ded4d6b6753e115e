// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Control surface request/response DTOs.

use serde::{Deserialize, Serialize};

/// Request from a client to the scheduler's control surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControlRequest {
    /// Cancel a job still waiting for resources
    Cancel { jobid: u64 },

    /// Exclude every resource named `node` from scheduling
    Exclude {
        node: String,
        /// Broadcast a kill for each job allocated on the node
        #[serde(default)]
        kill: bool,
    },

    /// Return previously excluded resources to service
    Include { node: String },

    /// Update scheduling parameters from a `key=value,key=value` list
    ParamsSet { param: String },

    /// Read current scheduling parameters
    ParamsGet,
}

/// Failure categories reported to control clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    InvalidArg,
    NotFound,
    InvalidState,
    ResourceExhausted,
    PluginFailure,
    IoFailure,
    InternalInvariant,
}

drover_core::simple_display! {
    ErrorCode {
        InvalidArg => "invalid-arg",
        NotFound => "not-found",
        InvalidState => "invalid-state",
        ResourceExhausted => "resource-exhausted",
        PluginFailure => "plugin-failure",
        IoFailure => "io-failure",
        InternalInvariant => "internal-invariant",
    }
}

impl ErrorCode {
    /// Stable numeric form for callers that key on codes.
    pub fn as_u32(&self) -> u32 {
        match self {
            Self::InvalidArg => 1,
            Self::NotFound => 2,
            Self::InvalidState => 3,
            Self::ResourceExhausted => 4,
            Self::PluginFailure => 5,
            Self::IoFailure => 6,
            Self::InternalInvariant => 7,
        }
    }
}

/// Response from the scheduler's control surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControlResponse {
    /// Empty success payload (exclude/include/params-set)
    Ok,

    /// Cancellation acknowledged
    Cancelled { jobid: u64 },

    /// Current scheduling parameters (params-get). `delay_sched` is 0/1.
    Params {
        #[serde(rename = "queue-depth")]
        queue_depth: u32,
        #[serde(rename = "delay-sched")]
        delay_sched: u32,
    },

    Error { code: ErrorCode, message: String },
}

impl ControlResponse {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error { code, message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
