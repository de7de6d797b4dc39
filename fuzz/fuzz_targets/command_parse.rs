//! Fuzz target for slash-command parsing
//!
//! Commands come straight off the wire from untrusted peers, so the parser
//! must accept arbitrary text: odd whitespace, embedded slashes, huge
//! arguments, partial UTF-8 repaired upstream.
//!
//! The parser should NEVER panic; unrecognized input maps to
//! Command::Unknown or plain chat.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wardroom_core::Command;

fuzz_target!(|line: &str| {
    let _ = Command::parse(line);
});
