//! Wardroom server binary.
//!
//! # Usage
//!
//! ```bash
//! # Ephemeral host key, no operators (development)
//! wardroom-server --bind 0.0.0.0:2022
//!
//! # Stable host key and seeded operators (production)
//! wardroom-server --bind 0.0.0.0:22 --host-key host_ed25519 --oper-keys opers.pub
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wardroom_server::{Server, ServerConfig};

/// Wardroom SSH chat server
#[derive(Parser, Debug)]
#[command(name = "wardroom-server")]
#[command(about = "Chat room served over the SSH wire protocol")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:2022")]
    bind: String,

    /// Path to the SSH host key
    #[arg(long)]
    host_key: Option<PathBuf>,

    /// Path to an authorized_keys file seeding the operator set
    #[arg(long)]
    oper_keys: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("wardroom server starting");

    let config = ServerConfig {
        bind_address: args.bind,
        host_key_path: args.host_key,
        oper_keys_path: args.oper_keys,
    };

    let server = Server::new(config)?;
    server.run().await?;

    Ok(())
}
