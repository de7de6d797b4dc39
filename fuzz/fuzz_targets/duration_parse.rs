//! Fuzz target for duration parsing
//!
//! `/silence` hands this parser attacker-controlled text. It must reject
//! garbage without panicking, including:
//! - Overflow attempts (enormous digit runs, huge unit multipliers)
//! - Degenerate numbers ("....", "", lone units)
//! - Mixed valid/invalid segment chains

#![no_main]

use libfuzzer_sys::fuzz_target;
use wardroom_core::{format_duration, parse_duration};

fuzz_target!(|input: &str| {
    if let Ok(duration) = parse_duration(input) {
        // Anything accepted must also format without panicking.
        let _ = format_duration(duration);
    }
});
