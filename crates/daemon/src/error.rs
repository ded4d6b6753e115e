// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Engine error kinds and their control-surface mapping.

use crate::plugins::PluginError;
use drover_wire::{ControlResponse, ErrorCode};
use thiserror::Error;

/// Errors raised by engine handlers.
///
/// Handlers never unwind past the dispatch boundary: control requests
/// answer with the mapped [`ErrorCode`], per-job scheduling errors are
/// logged and the pass moves on.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("no matching resources: {0}")]
    ResourceExhausted(String),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("send failed: {0}")]
    Io(String),

    #[error("invariant violated: {0}")]
    InternalInvariant(String),
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArg(_) => ErrorCode::InvalidArg,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::InvalidState(_) => ErrorCode::InvalidState,
            Self::ResourceExhausted(_) => ErrorCode::ResourceExhausted,
            Self::Plugin(_) => ErrorCode::PluginFailure,
            Self::Io(_) => ErrorCode::IoFailure,
            Self::InternalInvariant(_) => ErrorCode::InternalInvariant,
        }
    }

    pub fn to_response(&self) -> ControlResponse {
        ControlResponse::error(self.code(), self.to_string())
    }
}
