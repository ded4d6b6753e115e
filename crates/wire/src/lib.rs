// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Control protocol and job-status payloads for the Drover scheduler.
//!
//! Everything here is JSON-shaped: control requests/responses exchanged
//! over the broker, and the job control block (JCB) carried by job-status
//! notifications.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod control;
mod jcb;
pub mod topics;

pub use control::{ControlRequest, ControlResponse, ErrorCode};
pub use jcb::{Jcb, Rdesc, RliteChildren, RliteEntry, StatePair};
