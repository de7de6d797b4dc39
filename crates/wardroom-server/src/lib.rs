//! Wardroom production server.
//!
//! An SSH server that serves a shared chat room instead of a shell. Clients
//! connect with a stock SSH client and any public key; the key's fingerprint
//! is their identity for the ban and operator sets.
//!
//! # Architecture
//!
//! This crate is the I/O glue around [`wardroom_core`]'s pure chat logic.
//! russh drives one [`handler`] per connection; completed input lines go
//! through the [`session`] dispatcher against the shared [`Hub`]; outbound
//! messages travel through bounded per-member mailboxes drained by one
//! writer task per connection.
//!
//! # Components
//!
//! - [`Server`]: binds the listener and accepts connections
//! - [`Hub`]: process-wide room state (roster, mailboxes, links)
//! - [`terminal::LineEditor`]: line editing over the session channel
//! - [`session`]: slash-command dispatch and the writer task

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod handler;
pub mod hub;
pub mod session;
pub mod terminal;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

pub use error::ServerError;
pub use hub::{Hub, SessionLink, MAILBOX_CAPACITY};
use russh::{
    keys::{HashAlg, PublicKey},
    server::Server as _,
};

use crate::handler::ClientHandler;

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (e.g., "0.0.0.0:2022").
    pub bind_address: String,
    /// Path to the SSH host key (OpenSSH or PEM format). A fresh ephemeral
    /// ed25519 key is generated when absent.
    pub host_key_path: Option<PathBuf>,
    /// Path to an authorized_keys-style file whose keys seed the operator
    /// set.
    pub oper_keys_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:2022".to_string(), host_key_path: None, oper_keys_path: None }
    }
}

/// Production wardroom server.
///
/// Owns the shared [`Hub`] and the russh listener configuration.
pub struct Server {
    hub: Arc<Hub>,
    ssh_config: Arc<russh::server::Config>,
    bind_address: String,
}

impl Server {
    /// Build a server from configuration: load or generate the host key and
    /// seed the operator set.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let host_key = match &config.host_key_path {
            Some(path) => russh::keys::load_secret_key(path, None).map_err(|err| {
                ServerError::Config(format!(
                    "failed to load host key '{}': {err}",
                    path.display()
                ))
            })?,
            None => {
                tracing::warn!("no host key configured - generating an ephemeral ed25519 key");
                tracing::warn!("clients will see a changed host key on every restart");
                russh::keys::PrivateKey::random(
                    &mut rand::rngs::OsRng,
                    russh::keys::Algorithm::Ed25519,
                )
                .map_err(|err| {
                    ServerError::Config(format!("failed to generate host key: {err}"))
                })?
            },
        };

        let hub = Arc::new(Hub::new());
        if let Some(path) = &config.oper_keys_path {
            let fingerprints = load_operator_fingerprints(path)?;
            tracing::info!(count = fingerprints.len(), "seeded operator set");
            hub.seed_operators(fingerprints);
        }

        let ssh_config = russh::server::Config {
            server_id: russh::SshId::Standard(format!(
                "SSH-2.0-wardroom_{}",
                env!("CARGO_PKG_VERSION")
            )),
            keys: vec![host_key],
            auth_rejection_time: Duration::from_secs(3),
            auth_rejection_time_initial: Some(Duration::ZERO),
            ..Default::default()
        };

        Ok(Self {
            hub,
            ssh_config: Arc::new(ssh_config),
            bind_address: config.bind_address,
        })
    }

    /// The shared hub, for seeding or inspection.
    pub fn hub(&self) -> Arc<Hub> {
        Arc::clone(&self.hub)
    }

    /// Run the server, accepting connections until shutdown or listener
    /// failure.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("listening on {}", self.bind_address);

        let mut acceptor = Acceptor { hub: self.hub };
        acceptor
            .run_on_address(self.ssh_config, self.bind_address.as_str())
            .await?;
        Ok(())
    }
}

struct Acceptor {
    hub: Arc<Hub>,
}

impl russh::server::Server for Acceptor {
    type Handler = ClientHandler;

    fn new_client(&mut self, peer_addr: Option<std::net::SocketAddr>) -> ClientHandler {
        tracing::debug!(?peer_addr, "new connection");
        ClientHandler::new(Arc::clone(&self.hub))
    }
}

/// Parse an authorized_keys-style file into operator fingerprints. Blank
/// lines and `#` comments are skipped; a malformed key is a configuration
/// error rather than a silent hole in the operator set.
fn load_operator_fingerprints(path: &Path) -> Result<Vec<String>, ServerError> {
    let contents = std::fs::read_to_string(path).map_err(|err| {
        ServerError::Config(format!(
            "failed to read operator keys '{}': {err}",
            path.display()
        ))
    })?;

    let mut fingerprints = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let key: PublicKey = line.parse().map_err(|err| {
            ServerError::Config(format!("bad operator key on line {}: {err}", index + 1))
        })?;
        fingerprints.push(key.fingerprint(HashAlg::Sha256).to_string());
    }
    Ok(fingerprints)
}
