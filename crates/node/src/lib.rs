#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo
    )
)]

//! # corechain-node
//!
//! Ambient wiring for the corechain miner binary: CLI parsing,
//! configuration-file loading, tracing setup, and an offline [`PeerConnector`]
//! stub standing in for the out-of-scope transport layer.
//! None of this is part of the educative core (C1-C6); it is the ambient
//! stack a real binary needs around that core, in a familiar idiom
//! (`crates/node/src/bin/guardian.rs`: `clap::Parser` CLI, a TOML config
//! file, `tracing_subscriber::fmt` logging).

/// The node's configuration file and CLI surface (§6: system parameters).
pub mod config;
/// Node-level error type.
pub mod error;
/// Tracing/logging setup.
pub mod logging;
/// The periodic block-production loop.
pub mod mining_loop;
/// The offline stand-in for the out-of-scope transport layer.
pub mod offline_connector;

pub use config::{MinerConfig, MinerOpts};
pub use error::NodeError;
pub use mining_loop::run_mining_loop;
pub use offline_connector::OfflineConnector;

use std::time::{SystemTime, UNIX_EPOCH};

/// The current UNIX timestamp in seconds, used to seed
/// `corechain-network`'s shared system time and to timestamp produced
/// blocks.
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
