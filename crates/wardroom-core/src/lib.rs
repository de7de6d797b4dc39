//! Wardroom chat logic.
//!
//! Everything a chat room needs that is not I/O: the member roster with its
//! ban and operator sets, slash-command parsing, nick completion, message
//! formatting, and duration handling. The crate is deliberately free of any
//! async runtime or network dependency.
//!
//! # Architecture
//!
//! The roster never touches a socket or a clock. Message delivery goes
//! through the [`Outbox`] trait (the server backs it with a bounded tokio
//! mailbox; tests use an in-memory recorder), and every time-sensitive
//! operation takes `now` as an explicit argument so the silence fence can be
//! exercised with virtual time.
//!
//! # Components
//!
//! - [`Roster`]: membership registry, name uniqueness, broadcast fan-out,
//!   ban and operator sets
//! - [`Command`]: parsed slash commands
//! - [`complete_nick`]: Tab completion over member names
//! - [`parse_duration`] / [`format_duration`]: human-readable durations

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod complete;
mod duration;
mod error;
pub mod message;
mod name;
mod roster;
pub mod style;

pub use command::Command;
pub use complete::complete_nick;
pub use duration::{format_duration, parse_duration};
pub use error::{DurationError, NameError};
pub use name::{clean_name, validate_name, MAX_NAME_BYTES};
pub use roster::{MemberProfile, MemberView, Outbox, Roster};
