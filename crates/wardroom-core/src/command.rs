//! Slash command parsing.
//!
//! A line is a command when its first whitespace-separated token starts with
//! `/`. Lines split into at most three tokens, so the final argument keeps
//! any spaces it contains (`/silence bob 1h 30m` silences bob for "1h 30m"
//! worth of parsing attempts, not for "1h").
//!
//! Parsing is total and pure: it never touches the roster. Argument
//! validation (missing names, unknown members, authorization) is the
//! dispatcher's business.

/// A parsed slash command with raw argument slices into the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// `/help` — list recognized commands.
    Help,
    /// `/about` — server blurb.
    About,
    /// `/exit` — close the session channel.
    Exit,
    /// `/list` — names of connected members.
    List,
    /// `/test-colors` — styled sample output.
    TestColors,
    /// `/nick <name>` — request a rename.
    Nick(Option<&'a str>),
    /// `/whois <name>` — fingerprint and client of a member.
    Whois(Option<&'a str>),
    /// `/me <text>` — emote; the text keeps its leading space.
    Me(&'a str),
    /// `/ban <name>` — operator: ban and disconnect a member.
    Ban(Option<&'a str>),
    /// `/op <name>` — operator: grant operator status.
    Op(Option<&'a str>),
    /// `/silence <name> [duration]` — operator: mute a member.
    Silence {
        /// Target member name.
        name: Option<&'a str>,
        /// Optional raw duration string.
        duration: Option<&'a str>,
    },
    /// Anything else starting with `/`; carries the full line for the error
    /// reply.
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Parse a raw input line. Returns `None` for ordinary chat lines.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut parts = line.splitn(3, ' ');
        let cmd = parts.next().unwrap_or("");
        if !cmd.starts_with('/') {
            return None;
        }
        let arg1 = parts.next().filter(|s| !s.is_empty());
        let arg2 = parts.next().filter(|s| !s.is_empty());

        Some(match cmd {
            "/help" => Self::Help,
            "/about" => Self::About,
            "/exit" => Self::Exit,
            "/list" => Self::List,
            "/test-colors" => Self::TestColors,
            "/nick" => Self::Nick(arg1),
            "/whois" => Self::Whois(arg1),
            // Everything after the literal "/me", leading space included.
            "/me" => Self::Me(&line["/me".len()..]),
            "/ban" => Self::Ban(arg1),
            "/op" => Self::Op(arg1),
            "/silence" => Self::Silence { name: arg1, duration: arg2 },
            _ => Self::Unknown(line),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_chat_is_not_a_command() {
        assert_eq!(Command::parse("hello there"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("not /a command"), None);
    }

    #[test]
    fn bare_commands() {
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/about"), Some(Command::About));
        assert_eq!(Command::parse("/exit"), Some(Command::Exit));
        assert_eq!(Command::parse("/list"), Some(Command::List));
        assert_eq!(Command::parse("/test-colors"), Some(Command::TestColors));
    }

    #[test]
    fn nick_with_and_without_argument() {
        assert_eq!(Command::parse("/nick bob"), Some(Command::Nick(Some("bob"))));
        assert_eq!(Command::parse("/nick"), Some(Command::Nick(None)));
    }

    #[test]
    fn me_keeps_leading_space() {
        assert_eq!(Command::parse("/me waves"), Some(Command::Me(" waves")));
        assert_eq!(Command::parse("/me"), Some(Command::Me("")));
        assert_eq!(
            Command::parse("/me likes  double  spaces"),
            Some(Command::Me(" likes  double  spaces"))
        );
    }

    #[test]
    fn meet_is_not_me() {
        assert_eq!(Command::parse("/meet tomorrow"), Some(Command::Unknown("/meet tomorrow")));
    }

    #[test]
    fn silence_splits_name_and_duration() {
        assert_eq!(
            Command::parse("/silence bob 5m"),
            Some(Command::Silence { name: Some("bob"), duration: Some("5m") })
        );
        assert_eq!(
            Command::parse("/silence bob"),
            Some(Command::Silence { name: Some("bob"), duration: None })
        );
        assert_eq!(
            Command::parse("/silence"),
            Some(Command::Silence { name: None, duration: None })
        );
    }

    #[test]
    fn third_token_keeps_spaces() {
        assert_eq!(
            Command::parse("/silence bob 1h 30m"),
            Some(Command::Silence { name: Some("bob"), duration: Some("1h 30m") })
        );
    }

    #[test]
    fn unknown_commands_carry_the_line() {
        assert_eq!(Command::parse("/frobnicate x"), Some(Command::Unknown("/frobnicate x")));
        assert_eq!(Command::parse("/"), Some(Command::Unknown("/")));
    }
}
