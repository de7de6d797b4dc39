//! Session logic: what happens to each completed input line.
//!
//! The dispatcher runs in the reader path with a narrow `Arc<Hub>`
//! capability. Everything it can do directly (notices, broadcasts, roster
//! mutation) happens against the hub; the few things that need the SSH
//! session are returned as [`SessionEffect`]s for the connection handler to
//! execute. That keeps this module free of russh types on the input side and
//! testable against an in-memory hub.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use russh::{server::Handle, ChannelId, CryptoVec};
use tokio::{sync::mpsc, task::JoinHandle};
use wardroom_core::{
    format_duration, message, parse_duration, style::color_string, Command, MemberView, NameError,
};

use crate::{hub::Hub, terminal::LineEditor};

/// Silence applied when `/silence` gets no (or an unparsable) duration.
const DEFAULT_SILENCE: Duration = Duration::from_secs(5 * 60);

const HELP_TEXT: &[&str] = &[
    "-> Available commands:",
    "   /about",
    "   /exit",
    "   /help",
    "   /list",
    "   /me $TEXT",
    "   /nick $NAME",
    "   /whois $NAME",
    "-> Operator commands:",
    "   /ban $NAME",
    "   /op $NAME",
    "   /silence $NAME [$DURATION]",
];

const ABOUT_TEXT: &[&str] = &[
    "-> wardroom is a custom SSH server that serves a shared chat room",
    "   instead of a shell. Connect with any stock SSH client and any",
    "   public key; type /help once you are in.",
    "",
    "   Source: https://github.com/wardroom-chat/wardroom",
];

/// Side effects the connection handler must carry out after a line is
/// dispatched. Everything else already happened against the hub.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionEffect {
    /// Write these lines straight to the invoker's terminal.
    Write(Vec<String>),
    /// The invoker's prompt changed (successful `/nick`).
    SetPrompt(String),
    /// Close the invoker's session channel (`/exit`).
    CloseChannel,
    /// Disconnect another member's connection (`/ban`).
    Disconnect {
        /// Hub id of the member to disconnect.
        member_id: u64,
    },
}

/// The prompt shown to a member: `[<colored-name>] `.
pub fn prompt_for(view: &MemberView) -> String {
    format!("[{}] ", view.colored_name())
}

/// Dispatch one completed input line from member `me`.
pub fn handle_line(hub: &Arc<Hub>, me: u64, line: &str) -> Vec<SessionEffect> {
    if line.is_empty() {
        return Vec::new();
    }
    let Some(view) = hub.view(me) else {
        return Vec::new();
    };

    let Some(command) = Command::parse(line) else {
        send_chat(hub, me, &view, line);
        return Vec::new();
    };

    match command {
        Command::Help => vec![SessionEffect::Write(owned(HELP_TEXT))],
        Command::About => vec![SessionEffect::Write(owned(ABOUT_TEXT))],
        Command::TestColors => vec![SessionEffect::Write(vec![
            color_string("32", "Lorem ipsum dolor sit amet,"),
            format!("consectetur {} elit.", color_string("31;1", "adipiscing")),
        ])],
        Command::Exit => vec![SessionEffect::CloseChannel],
        Command::List => {
            let names = hub.list(None);
            hub.notify(me, format!("-> {} connected: {}", names.len(), names.join(", ")));
            Vec::new()
        },
        Command::Nick(None) => missing_name(hub, me, "/nick"),
        Command::Nick(Some(name)) => match hub.rename(me, name) {
            Ok(new_name) => {
                let prompt = format!("[{}] ", color_string(&view.color, &new_name));
                vec![SessionEffect::SetPrompt(prompt)]
            },
            Err(NameError::Taken(name)) => {
                hub.notify(me, format!("-> Name is taken: {name}"));
                Vec::new()
            },
            Err(NameError::Invalid(name)) => {
                hub.notify(me, format!("-> Invalid name: {name}"));
                Vec::new()
            },
        },
        Command::Whois(None) => missing_name(hub, me, "/whois"),
        Command::Whois(Some(name)) => {
            match hub.who(name) {
                Some(target) => {
                    let version = message::sanitize_client_version(&target.client_version);
                    hub.notify(
                        me,
                        format!(
                            "-> {} is {} via {}",
                            target.colored_name(),
                            target.fingerprint,
                            version
                        ),
                    );
                },
                None => no_such_name(hub, me, name),
            }
            Vec::new()
        },
        Command::Me(text) => {
            let emote = message::emote_line(&view.color, &view.name, text);
            if hub.is_silenced(me) || emote.len() > message::MAX_MESSAGE_BYTES {
                hub.notify(me, message::REJECTED);
            } else {
                hub.broadcast(&emote, None);
            }
            Vec::new()
        },
        Command::Ban(arg) => match operator_target(hub, me, "/ban", arg) {
            Some(target) => {
                hub.notify(target.id, format!("-> Banned by {}.", view.colored_name()));
                hub.ban(&target.fingerprint, None);
                hub.broadcast(
                    &format!("* {} was banned by {}", target.name, view.colored_name()),
                    None,
                );
                vec![SessionEffect::Disconnect { member_id: target.id }]
            },
            None => Vec::new(),
        },
        Command::Op(arg) => {
            if let Some(target) = operator_target(hub, me, "/op", arg) {
                hub.op(&target.fingerprint);
                hub.notify(target.id, format!("-> Made op by {}.", view.colored_name()));
            }
            Vec::new()
        },
        Command::Silence { name, duration } => {
            if let Some(target) = operator_target(hub, me, "/silence", name) {
                let duration = duration
                    .and_then(|raw| parse_duration(raw).ok())
                    .unwrap_or(DEFAULT_SILENCE);
                hub.silence(target.id, duration);
                hub.notify(
                    target.id,
                    format!(
                        "-> Silenced for {} by {}.",
                        format_duration(duration),
                        view.colored_name()
                    ),
                );
            }
            Vec::new()
        },
        Command::Unknown(line) => {
            hub.notify(me, format!("-> Invalid command: {line}"));
            Vec::new()
        },
    }
}

fn send_chat(hub: &Arc<Hub>, me: u64, view: &MemberView, line: &str) {
    let chat = message::chat_line(&view.color, &view.name, line);
    if hub.is_silenced(me) || chat.len() > message::MAX_MESSAGE_BYTES {
        hub.notify(me, message::REJECTED);
    } else {
        hub.broadcast(&chat, Some(me));
    }
}

/// Resolve the target of an operator command, emitting the right notice on
/// every failure path.
fn operator_target(
    hub: &Arc<Hub>,
    me: u64,
    cmd: &str,
    arg: Option<&str>,
) -> Option<MemberView> {
    if !hub.is_op(me) {
        hub.notify(me, "-> You're not an admin.");
        return None;
    }
    let Some(name) = arg else {
        hub.notify(me, format!("-> Missing $NAME from: {cmd} $NAME"));
        return None;
    };
    match hub.who(name) {
        Some(target) => Some(target),
        None => {
            no_such_name(hub, me, name);
            None
        },
    }
}

fn missing_name(hub: &Arc<Hub>, me: u64, cmd: &str) -> Vec<SessionEffect> {
    hub.notify(me, format!("-> Missing $NAME from: {cmd} $NAME"));
    Vec::new()
}

fn no_such_name(hub: &Arc<Hub>, me: u64, name: &str) {
    hub.notify(me, format!("-> No such name: {name}"));
}

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| line.to_string()).collect()
}

/// Spawn the writer task: drain the mailbox to the terminal, repainting the
/// prompt around each message. Ends when the mailbox closes (member removed)
/// or the channel write fails.
pub fn spawn_writer(
    handle: Handle,
    channel: ChannelId,
    editor: Arc<Mutex<LineEditor>>,
    mut mailbox: mpsc::Receiver<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(line) = mailbox.recv().await {
            let bytes = {
                let editor = editor.lock().expect("invariant: editor lock poisoned");
                editor.render_message(&line)
            };
            if handle.data(channel, CryptoVec::from_slice(&bytes)).await.is_err() {
                break;
            }
        }
    })
}
