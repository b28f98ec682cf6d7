//! cmdhub-node: standalone command registry node
//!
//! Hosts a command registry with the built-in `echo` command and serves it
//! to peers over gRPC.
//!
//! ## Configuration
//! - `cmdhub.yaml`, `--config <path>` or CMDHUB_CONFIG (see `Config::load`)
//! - CMDHUB_REMOTE__HOST / CMDHUB_REMOTE__PORT: listen address (default 0.0.0.0:2552)
//! - CMDHUB_LOG: tracing filter (default: info)

use std::net::SocketAddr;

use tracing::{error, info};

use cmdhub::config::Config;
use cmdhub::remote::serve;
use cmdhub::utils::bootstrap::{init_tracing, parse_config_path};
use cmdhub::workers::EchoWorker;
use cmdhub::CommandManager;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let addr: SocketAddr = config.remote.bind_addr().parse()?;
    let manager = CommandManager::new(config);
    manager.add_command::<EchoWorker>("echo").await;

    info!(
        provider = %manager.config().provider,
        commands = ?manager.registry().names().await,
        "cmdhub-node started"
    );

    serve(addr, manager.registry_service()).await?;
    Ok(())
}
