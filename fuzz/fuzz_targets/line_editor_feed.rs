//! Fuzz target for the line editor byte feed
//!
//! The editor consumes raw channel bytes: control characters, partial
//! escape sequences, split UTF-8, backspace floods. It should never panic
//! and every completed line must be valid UTF-8.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wardroom_server::terminal::{InputEvent, LineEditor};

fuzz_target!(|data: &[u8]| {
    let mut editor = LineEditor::new();

    // Feed in two chunks to exercise state carried across reads.
    let split = data.len() / 2;
    let mut feed = editor.feed(&data[..split]);
    let rest = editor.feed(&data[split..]);
    feed.events.extend(rest.events);

    for event in feed.events {
        if let InputEvent::Line(line) = event {
            assert!(std::str::from_utf8(line.as_bytes()).is_ok());
        }
    }
});
