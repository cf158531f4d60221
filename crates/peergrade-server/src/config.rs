use std::net::SocketAddr;

use clap::Parser;
use peergrade_core::DEFAULT_AVATAR_BASE_URL;

/// Server flags. Store connection settings come from `SURREALDB_*` env vars.
#[derive(Debug, Clone, Parser)]
#[command(name = "peergrade-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Peer and teacher project evaluation service", long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "PEERGRADE_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Emit JSON log lines
    #[arg(long, env = "PEERGRADE_LOG_JSON")]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Evaluator groups required before group analytics are shown
    #[arg(long, env = "PEERGRADE_MIN_EVALUATORS", default_value_t = 1)]
    pub min_evaluators: usize,

    /// Identicon service base URL
    #[arg(long, env = "PEERGRADE_AVATAR_BASE_URL", default_value = DEFAULT_AVATAR_BASE_URL)]
    pub avatar_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            json: false,
            verbose: false,
            min_evaluators: 1,
            avatar_base_url: DEFAULT_AVATAR_BASE_URL.to_string(),
        }
    }
}
