// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! Startup argument and scheduling-parameter parsing.
//!
//! Module arguments arrive as positional `key=value` strings. Unknown keys
//! are fatal and name the offending key.

use std::path::PathBuf;
use thiserror::Error;

/// How many pending jobs a single scheduling pass examines.
pub const DEFAULT_QUEUE_DEPTH: u32 = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown option: {0}")]
    UnknownKey(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue { key: key.into(), value: value.into() }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

/// Runtime-tunable scheduling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedParams {
    pub queue_depth: u32,
    pub delay_sched: bool,
}

impl Default for SchedParams {
    fn default() -> Self {
        Self { queue_depth: DEFAULT_QUEUE_DEPTH, delay_sched: false }
    }
}

impl SchedParams {
    /// Apply a `key=value,key=value` list on top of the current values.
    pub fn apply(&mut self, list: &str) -> Result<(), ConfigError> {
        for item in list.split(',').filter(|s| !s.is_empty()) {
            let (key, value) = item
                .split_once('=')
                .ok_or_else(|| ConfigError::UnknownKey(item.to_string()))?;
            match key {
                "queue-depth" => {
                    let depth: u32 = value.parse().map_err(|_| invalid(key, value))?;
                    if depth == 0 {
                        return Err(invalid(key, value));
                    }
                    self.queue_depth = depth;
                }
                "delay-sched" => self.delay_sched = parse_bool(key, value)?,
                _ => return Err(ConfigError::UnknownKey(key.to_string())),
            }
        }
        Ok(())
    }
}

/// Where the resource inventory comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceMode {
    /// Inventory file, verified against per-rank topology
    File,
    /// Inventory file taken at face value (simulator)
    FileEmulated,
    /// Synthesized from per-rank topology blobs
    Topology,
}

/// Parsed module arguments.
#[derive(Debug, Clone)]
pub struct SchedulerArgs {
    pub rdl_conf: Option<PathBuf>,
    pub rdl_resource: Option<String>,
    pub plugin: String,
    pub plugin_opts: Vec<String>,
    pub priority_plugin: Option<String>,
    /// Keep terminated jobs in the completed queue until reaped
    pub reap: bool,
    pub node_excl: bool,
    /// Testing mode: never release a job's resources
    pub sched_once: bool,
    pub fail_on_error: bool,
    pub in_sim: bool,
    pub verbosity: u32,
    pub params: SchedParams,
}

impl Default for SchedulerArgs {
    fn default() -> Self {
        Self {
            rdl_conf: None,
            rdl_resource: None,
            plugin: "sched.fcfs".to_string(),
            plugin_opts: Vec::new(),
            priority_plugin: None,
            reap: false,
            node_excl: false,
            sched_once: false,
            fail_on_error: false,
            in_sim: false,
            verbosity: 0,
            params: SchedParams::default(),
        }
    }
}

impl SchedulerArgs {
    /// Parse positional `key=value` module arguments.
    pub fn parse(args: &[String]) -> Result<Self, ConfigError> {
        let mut out = Self::default();
        for arg in args {
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| ConfigError::UnknownKey(arg.to_string()))?;
            match key {
                "rdl-conf" => out.rdl_conf = Some(PathBuf::from(value)),
                "rdl-resource" => out.rdl_resource = Some(value.to_string()),
                "plugin" => out.plugin = value.to_string(),
                "plugin-opts" => {
                    out.plugin_opts =
                        value.split(',').filter(|s| !s.is_empty()).map(String::from).collect()
                }
                "priority-plugin" => out.priority_plugin = Some(value.to_string()),
                "reap" => out.reap = parse_bool(key, value)?,
                "node-excl" => out.node_excl = parse_bool(key, value)?,
                "sched-once" => out.sched_once = parse_bool(key, value)?,
                "fail-on-error" => out.fail_on_error = parse_bool(key, value)?,
                "in-sim" => out.in_sim = parse_bool(key, value)?,
                "verbosity" => {
                    out.verbosity = value.parse().map_err(|_| invalid(key, value))?
                }
                "sched-params" => out.params.apply(value)?,
                _ => return Err(ConfigError::UnknownKey(key.to_string())),
            }
        }
        Ok(out)
    }

    pub fn resource_mode(&self) -> ResourceMode {
        match (&self.rdl_conf, self.in_sim) {
            (Some(_), true) => ResourceMode::FileEmulated,
            (Some(_), false) => ResourceMode::File,
            (None, _) => ResourceMode::Topology,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
