//! Message formatting.
//!
//! All strings that reach a terminal are built here so the wire format stays
//! in one place: `name: text` for chat, `** name text` for emotes, `* ...`
//! for system announcements and `-> ...` for replies to the invoker.

use crate::style::color_string;

/// Upper bound on a formatted chat or emote message, in bytes. Longer
/// messages are rejected back to the sender instead of broadcast.
pub const MAX_MESSAGE_BYTES: usize = 1000;

/// Byte length limit for a peer's SSH identification string in `/whois`.
pub const MAX_VERSION_BYTES: usize = 100;

const OVERLONG_VERSION: &str = "Evil Jerk with a superlong string";

/// Emote text used when `/me` is given nothing to say.
pub const EMPTY_EMOTE: &str = " is at a loss for words.";

/// Reply sent to a member whose message was silenced or too long.
pub const REJECTED: &str = "-> Message rejected.";

/// Format a plain chat line: `<colored-name>: <text>`.
pub fn chat_line(color: &str, name: &str, text: &str) -> String {
    format!("{}: {}", color_string(color, name), text)
}

/// Format an emote: `** <colored-name><text>`.
///
/// `text` keeps the leading space from the raw `/me` line; an empty emote
/// gets the stock phrase.
pub fn emote_line(color: &str, name: &str, text: &str) -> String {
    let text = if text.is_empty() { EMPTY_EMOTE } else { text };
    format!("** {}{}", color_string(color, name), text)
}

/// Sanitize a peer's SSH identification string for display.
///
/// Control characters are stripped; anything still longer than
/// [`MAX_VERSION_BYTES`] is replaced wholesale with a fixed placeholder.
pub fn sanitize_client_version(version: &str) -> String {
    let stripped: String = version.chars().filter(|c| !c.is_control()).collect();
    if stripped.len() > MAX_VERSION_BYTES {
        OVERLONG_VERSION.to_string()
    } else {
        stripped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_line_colors_only_the_name() {
        assert_eq!(chat_line("32", "alice", "hello"), "\x1b[32malice\x1b[0m: hello");
    }

    #[test]
    fn emote_keeps_leading_space() {
        assert_eq!(emote_line("31", "bob", " waves"), "** \x1b[31mbob\x1b[0m waves");
    }

    #[test]
    fn empty_emote_uses_stock_phrase() {
        assert_eq!(
            emote_line("31", "bob", ""),
            "** \x1b[31mbob\x1b[0m is at a loss for words."
        );
    }

    #[test]
    fn version_strips_control_characters() {
        assert_eq!(sanitize_client_version("SSH-2.0-OpenSSH_9.6\r\n"), "SSH-2.0-OpenSSH_9.6");
        assert_eq!(sanitize_client_version("a\x1b[31mb"), "a[31mb");
    }

    #[test]
    fn overlong_version_is_replaced() {
        let long = "x".repeat(MAX_VERSION_BYTES + 1);
        assert_eq!(sanitize_client_version(&long), OVERLONG_VERSION);
    }

    #[test]
    fn version_at_limit_passes_through() {
        let exact = "y".repeat(MAX_VERSION_BYTES);
        assert_eq!(sanitize_client_version(&exact), exact);
    }
}
