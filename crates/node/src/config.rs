//! System parameters (§6) plus the CLI surface that can override them,
//! mirroring a common "CLI flags override config file
//! values" idiom (`crates/node/src/bin/guardian.rs`).

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use corechain_network::NetworkConfig;

use crate::error::NodeError;

/// The on-disk configuration file a miner node loads at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Path to the `redb` database file (§3, C1).
    pub storage_path: PathBuf,
    /// This node's own "ip:port", used to recognize a self-dial (§7).
    pub listen_addr: String,
    /// The bootstrap node's "ip:port" (§6).
    pub bootstrap_addr: String,
    /// Minimum number of miner peers to maintain (§6: `MIN_MINERS`).
    pub min_miners: usize,
    /// How often, in seconds, to resample the shared system time (§6:
    /// `UPDATE_SYS_TIME`).
    pub update_sys_time_secs: u64,
    /// How often, in seconds, to broadcast a time-sync packet (§6:
    /// `TIME_BRDCST_INTERVAL`).
    pub time_broadcast_interval_secs: u64,
    /// Per-call VM step budget (§4.3).
    pub vm_step_budget: u64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("corechain.redb"),
            listen_addr: String::new(),
            bootstrap_addr: String::new(),
            min_miners: 1,
            update_sys_time_secs: 60,
            time_broadcast_interval_secs: 30,
            vm_step_budget: 10_000,
        }
    }
}

impl MinerConfig {
    /// Parses a configuration file's TOML contents.
    pub fn from_toml(contents: &str) -> Result<Self, NodeError> {
        toml::from_str(contents).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// The network-layer view of this configuration (§4.5's tunables).
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            self_ip_port: self.listen_addr.clone(),
            bootstrap_ip_port: self.bootstrap_addr.clone(),
            min_miners: self.min_miners,
            update_sys_time_secs: self.update_sys_time_secs,
            time_broadcast_interval_secs: self.time_broadcast_interval_secs,
        }
    }
}

/// CLI flags for the `corechain-miner` binary. Any flag supplied here wins
/// over the same setting in the config file (`GuardianOpts`'s convention).
#[derive(Debug, Parser)]
#[command(name = "corechain-miner", about = "corechain proof-of-stake miner")]
pub struct MinerOpts {
    /// Path to the node's TOML configuration file.
    #[arg(long, env = "CORECHAIN_CONFIG")]
    pub config: Option<PathBuf>,
    /// Overrides `storage_path` in the config file.
    #[arg(long, env = "CORECHAIN_STORAGE_PATH")]
    pub storage_path: Option<PathBuf>,
    /// Overrides `listen_addr` in the config file.
    #[arg(long, env = "CORECHAIN_LISTEN_ADDR")]
    pub listen_addr: Option<String>,
    /// Overrides `bootstrap_addr` in the config file.
    #[arg(long, env = "CORECHAIN_BOOTSTRAP_ADDR")]
    pub bootstrap_addr: Option<String>,
}

impl MinerOpts {
    /// Loads the config file named by `--config` (if any), then applies any
    /// CLI overrides on top of it.
    pub fn resolve(&self) -> Result<MinerConfig, NodeError> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| NodeError::Config(format!("reading {}: {e}", path.display())))?;
                MinerConfig::from_toml(&text)?
            }
            None => MinerConfig::default(),
        };
        if let Some(storage_path) = &self.storage_path {
            config.storage_path = storage_path.clone();
        }
        if let Some(listen_addr) = &self.listen_addr {
            config.listen_addr = listen_addr.clone();
        }
        if let Some(bootstrap_addr) = &self.bootstrap_addr {
            config.bootstrap_addr = bootstrap_addr.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_round_trips_into_config() {
        let toml = r#"
            storage_path = "/tmp/corechain.redb"
            listen_addr = "127.0.0.1:7000"
            bootstrap_addr = "127.0.0.1:7001"
            min_miners = 3
            update_sys_time_secs = 60
            time_broadcast_interval_secs = 30
            vm_step_budget = 5000
        "#;
        let config = MinerConfig::from_toml(toml).unwrap();
        assert_eq!(config.min_miners, 3);
        assert_eq!(config.listen_addr, "127.0.0.1:7000");
    }

    #[test]
    fn cli_flags_override_config_file_values() {
        let opts = MinerOpts {
            config: None,
            storage_path: None,
            listen_addr: Some("10.0.0.1:9000".to_string()),
            bootstrap_addr: None,
        };
        let config = opts.resolve().unwrap();
        assert_eq!(config.listen_addr, "10.0.0.1:9000");
        assert_eq!(config.min_miners, MinerConfig::default().min_miners);
    }
}
