//! ANSI color styling for member names.
//!
//! Colors are plain SGR codes kept as strings so a code like `31;1` (bold
//! red) works the same as `32`. Every member gets one at session start and
//! keeps it for the life of the connection.

use rand::Rng;

/// SGR codes a new member's name color is drawn from.
pub const COLORS: &[&str] = &[
    "31", "32", "33", "34", "35", "36", "37", "91", "92", "93", "94", "95", "96", "97", "31;1",
    "32;1", "33;1", "34;1", "35;1", "36;1",
];

/// Wrap `text` in the SGR sequence for `code`, resetting afterwards.
pub fn color_string(code: &str, text: &str) -> String {
    format!("\x1b[{code}m{text}\x1b[0m")
}

/// Pick a random member color.
pub fn random_color() -> &'static str {
    COLORS[rand::thread_rng().gen_range(0..COLORS.len())]
}
