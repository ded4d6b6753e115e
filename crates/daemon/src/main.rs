// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Drover Authors

//! droverd: the Drover batch scheduler daemon.
//!
//! Startup is strictly ordered: parse arguments, fetch topology and build
//! the resource pool (the only blocking reads anywhere), construct the
//! engine, then hand control to the reactor. The broker transport is
//! wired in by the embedding service; standalone, the daemon uses the
//! logging bus and idles until events arrive.

use std::process::ExitCode;

use drover_daemon::adapters::{DirBlobStore, LogBus, LoopbackStatus};
use drover_daemon::config::ResourceMode;
use drover_daemon::{Engine, EngineDeps, EngineError, RankTable, SchedulerArgs};
use drover_resource::{reader, ResourcePool};
use tracing::info;

fn main() -> ExitCode {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match SchedulerArgs::parse(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("droverd: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(args.verbosity);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "scheduler failed to start");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: u32) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(args: SchedulerArgs) -> Result<(), EngineError> {
    let (pool, ranks) = load_resources(&args)?;
    if args.verbosity > 0 {
        dump_pool(&pool);
    }

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let engine = Engine::new(
        args,
        pool,
        ranks,
        EngineDeps {
            bus: LogBus,
            status: LoopbackStatus::new(tx.clone()),
            clock: drover_core::SystemClock,
        },
    )?;

    info!("scheduler starting");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| EngineError::Io(e.to_string()))?;
    // The transport owns the other end of `tx`; the reactor runs until
    // every sender is gone.
    runtime.block_on(engine.run(rx));
    drop(tx);
    Ok(())
}

/// Build the pool and rank table per the configured reader mode.
///
/// An inventory inconsistent with the live topology is rebuilt from the
/// topology blobs unless `fail-on-error` asks for a hard stop.
fn load_resources(args: &SchedulerArgs) -> Result<(ResourcePool, RankTable), EngineError> {
    info!("start to read resources");
    let cluster = args.rdl_resource.as_deref().unwrap_or("default");

    match args.resource_mode() {
        ResourceMode::FileEmulated => {
            let path = args.rdl_conf.as_deref().ok_or_else(|| {
                EngineError::InvalidArg("rdl-conf required for emulated mode".into())
            })?;
            let mut pool = reader::load_file(path)
                .map_err(|e| EngineError::InvalidArg(e.to_string()))?;
            let ranks = RankTable::emulated(&pool);
            reader::link_ranks(&mut pool, &ranks.signatures())
                .map_err(|e| EngineError::InvalidArg(e.to_string()))?;
            info!("resources loaded (emulated topology)");
            Ok((pool, ranks))
        }

        ResourceMode::File => {
            let path = args.rdl_conf.as_deref().ok_or_else(|| {
                EngineError::InvalidArg("rdl-conf required for inventory mode".into())
            })?;
            let store = topology_store()?;
            let (ranks, blobs) = RankTable::from_blobs(&store)?;
            let mut pool = reader::load_file(path)
                .map_err(|e| EngineError::InvalidArg(e.to_string()))?;
            match reader::link_ranks(&mut pool, &ranks.signatures()) {
                Ok(()) => info!("resources constructed from inventory"),
                Err(e) => {
                    info!(error = %e, path = %path.display(), "inventory inconsistent with topology");
                    if args.fail_on_error {
                        return Err(EngineError::InvalidArg(e.to_string()));
                    }
                    info!("rebuilding resources from topology");
                    pool = reader::from_topology(cluster, &blobs);
                }
            }
            Ok((pool, ranks))
        }

        ResourceMode::Topology => {
            let store = topology_store()?;
            let (ranks, blobs) = RankTable::from_blobs(&store)?;
            let pool = reader::from_topology(cluster, &blobs);
            info!("resources constructed from topology");
            Ok((pool, ranks))
        }
    }
}

fn topology_store() -> Result<DirBlobStore, EngineError> {
    DirBlobStore::from_env()
        .ok_or_else(|| EngineError::NotFound("topology source (set DROVER_TOPO_DIR)".into()))
}

fn dump_pool(pool: &ResourcePool) {
    for id in pool.ids() {
        let r = pool.get(id);
        info!(kind = %r.kind, name = %r.name, state = %r.state, "resource");
    }
}
