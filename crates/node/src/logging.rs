//! Tracing setup, matching a common `init_tracing`
//! pattern: a global `tracing_subscriber::fmt` subscriber configurable via
//! an environment variable, installed once at process startup.

use tracing_subscriber::EnvFilter;

/// The environment variable `corechain-miner` reads its log filter from
/// (the `CORECHAIN_LOG`-style env var named in `SPEC_FULL.md`'s Logging
/// section).
pub const LOG_ENV_VAR: &str = "CORECHAIN_LOG";

/// Installs a global `tracing` subscriber. Falls back to an `info`-level
/// filter if `CORECHAIN_LOG` is unset or invalid, matching
/// `EnvFilter::try_from_env` + a hardcoded default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
