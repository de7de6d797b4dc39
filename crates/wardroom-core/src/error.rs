//! Error types for the chat core.
//!
//! User-input errors only: every variant maps to a single `->` notice sent
//! back to the member who caused it. Nothing here is fatal to the server.

use thiserror::Error;

/// Reasons a requested display name is refused on rename.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Another member already holds the name (case-sensitive match).
    #[error("name is taken: {0}")]
    Taken(String),

    /// The name is empty, too long, or contains whitespace or control
    /// characters.
    #[error("invalid name: {0}")]
    Invalid(String),
}

/// Failure to parse a human-readable duration string such as `5m` or `1h30m`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// Empty input.
    #[error("empty duration")]
    Empty,

    /// A numeric segment was missing or malformed.
    #[error("invalid number in duration: {0}")]
    InvalidNumber(String),

    /// A unit suffix was missing or not one of ns/us/ms/s/m/h.
    #[error("unknown unit in duration: {0}")]
    UnknownUnit(String),
}
