//! revreg-node — the revocation registry full-node binary.
//!
//! Startup sequence:
//!   1. Open (or initialise) the durable revocation log, replay it
//!   2. Start the P2P network (libp2p identify/ping + request_response)
//!   3. Start the client RPC listener
//!   4. Run the main loop: p2p events, RPC commands, reconciliation ticks

mod config;
mod service;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use config::RevRegConfig;
use revreg_p2p::P2pConfig;
use service::Service;

#[derive(Parser, Debug)]
#[command(
    name = "revreg-node",
    version,
    about = "Revocation registry full node — flood-propagated public-key revocations"
)]
struct Args {
    /// Directory holding the durable revocation log.
    #[arg(long, default_value = "~/.revreg/data")]
    data_dir: PathBuf,

    /// P2P listen address.
    #[arg(long, default_value = "/ip4/0.0.0.0/tcp/7777")]
    p2p_listen: String,

    /// Client RPC listen address.
    #[arg(long, default_value = "127.0.0.1:8766")]
    rpc_addr: String,

    /// Bootstrap peer multiaddresses (comma-separated).
    #[arg(long, value_delimiter = ',')]
    bootstrap: Vec<String>,

    /// Path to a `REVOCATION.*` key-value config file. Overrides the
    /// defaults; `--workbits`/`--epoch-duration` override the file in turn.
    #[arg(long)]
    config: Option<PathBuf>,

    /// PoW difficulty override (`REVOCATION.WORKBITS`).
    #[arg(long)]
    workbits: Option<f64>,

    /// Epoch duration override, in seconds (`REVOCATION.EPOCH_DURATION`).
    #[arg(long)]
    epoch_duration: Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,revreg=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("revocation registry node starting");

    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir).with_context(|| format!("creating data dir {}", data_dir.display()))?;

    let config = build_config(&args, &data_dir).context("building configuration")?;

    let p2p_config = P2pConfig {
        listen_addr: args.p2p_listen.clone(),
        bootstrap_peers: args.bootstrap.clone(),
        protocol_version: "/revreg/1.0.0".into(),
    };

    let service =
        Service::start(config, p2p_config, args.rpc_addr.clone()).map_err(|e| anyhow::anyhow!("starting service: {e}"))?;

    // Printed (not logged) so test harnesses and operator scripts can grab the
    // dialable multiaddr without needing an RPC round trip for it.
    println!("P2P_MULTIADDR={}/p2p/{}", args.p2p_listen, service.local_peer_id());

    info!(rpc_addr = %args.rpc_addr, "node ready");
    service.run().await.map_err(|e| anyhow::anyhow!("service loop: {e}"))?;

    Ok(())
}

/// Build the registry config, preferring an explicit `--config` file and
/// falling back to CLI-flag defaults otherwise — mirroring the node's
/// optional-file-with-flag-overrides pattern for genesis parameters.
fn build_config(args: &Args, data_dir: &Path) -> anyhow::Result<RevRegConfig> {
    let mut config = match &args.config {
        Some(path) => RevRegConfig::from_file(path).with_context(|| format!("reading config {}", path.display()))?,
        None => {
            let database_path = data_dir.join("revocations.log");
            RevRegConfig::from_str(&format!(
                "REVOCATION.DATABASE={}\n",
                database_path.display()
            ))
            .map_err(|e| anyhow::anyhow!("{e}"))?
        }
    };

    if let Some(workbits) = args.workbits {
        config.workbits = workbits;
    }
    if let Some(epoch_duration) = args.epoch_duration {
        config.epoch_duration_secs = epoch_duration;
    }
    Ok(config)
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
