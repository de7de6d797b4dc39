//! Server error types.

use std::fmt;

/// Errors that can occur in the server.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error (invalid bind address, unreadable host key,
    /// malformed operator keys file).
    ///
    /// Fatal at startup. Fix configuration and restart.
    Config(String),

    /// Transport/network error (bind failure, connection I/O error).
    ///
    /// Fatal when it hits the listener; per-connection occurrences close
    /// only that connection.
    Transport(String),

    /// SSH protocol error surfaced by the russh layer.
    ///
    /// Fatal for the affected connection; the server keeps serving other
    /// clients.
    Ssh(russh::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Ssh(err) => write!(f, "ssh error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Ssh(err) => Some(err),
            _ => None,
        }
    }
}

impl From<russh::Error> for ServerError {
    fn from(err: russh::Error) -> Self {
        Self::Ssh(err)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
