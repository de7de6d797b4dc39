//! Member roster: the shared room state.
//!
//! Tracks who is connected under which name, who is banned, and who holds
//! operator status. Ban and operator sets are keyed by public-key
//! fingerprint, not by name, so neither survives a rename trick.
//!
//! The roster is deliberately synchronous and I/O-free. Delivery goes
//! through the [`Outbox`] trait and must never block: the server backs it
//! with a bounded mailbox that drops on overflow, so a broadcast finishes in
//! bounded time no matter how stuck an individual receiver is. Time enters
//! only through explicit `now`/`until` arguments, which keeps the silence
//! fence testable with virtual instants.

use std::collections::{HashMap, HashSet};

use crate::{
    error::NameError,
    name::{clean_name, validate_name},
    style::color_string,
};

/// Non-blocking delivery handle for one member's pending messages.
///
/// `deliver` returns `false` when the message was dropped (receiver full or
/// gone). The roster ignores the result; a full mailbox is the receiver's
/// problem, never the broadcaster's.
pub trait Outbox {
    /// Enqueue a line for the member. Must not block.
    fn deliver(&self, line: String) -> bool;
}

/// Identity a connection presents when joining the roster.
#[derive(Debug, Clone)]
pub struct MemberProfile {
    /// Requested display name (usually the SSH username). Cleaned and
    /// deduplicated on join.
    pub name: String,
    /// ANSI SGR code for the member's name color.
    pub color: String,
    /// Fingerprint of the authenticated public key.
    pub fingerprint: String,
    /// Raw SSH identification string of the peer.
    pub client_version: String,
}

/// Read-only snapshot of one member, as returned by lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberView {
    /// Member id.
    pub id: u64,
    /// Current display name.
    pub name: String,
    /// Name color (SGR code).
    pub color: String,
    /// Public-key fingerprint.
    pub fingerprint: String,
    /// Raw client identification string.
    pub client_version: String,
    /// Whether the member is an operator.
    pub op: bool,
}

impl MemberView {
    /// The member's name wrapped in its ANSI color.
    pub fn colored_name(&self) -> String {
        color_string(&self.color, &self.name)
    }
}

struct Member<O, I> {
    name: String,
    color: String,
    fingerprint: String,
    client_version: String,
    op: bool,
    silenced_until: Option<I>,
    term_size: (u16, u16),
    outbox: O,
}

/// Membership registry, ban list, and operator set for the one shared room.
///
/// Generic over the outbox type `O` and the instant type `I` so tests can
/// substitute recording outboxes and virtual time. All mutation is expected
/// to be serialized by the caller (the server wraps the roster in a single
/// mutex held only for the duration of each operation).
pub struct Roster<O, I = std::time::Instant> {
    members: HashMap<u64, Member<O, I>>,
    names: HashMap<String, u64>,
    /// Join order; gives `list` its stable ordering and completion its
    /// "last joiner wins" behavior.
    join_order: Vec<u64>,
    /// Banned fingerprints; `None` is permanent, `Some` expires at the
    /// deadline. A fence like the silence deadline, so no timer task exists.
    bans: HashMap<String, Option<I>>,
    operators: HashSet<String>,
}

impl<O, I> Default for Roster<O, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, I> Roster<O, I> {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self {
            members: HashMap::new(),
            names: HashMap::new(),
            join_order: Vec::new(),
            bans: HashMap::new(),
            operators: HashSet::new(),
        }
    }

    /// Number of connected members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// True when nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Pre-load operator fingerprints (from the configured authorized keys).
    pub fn seed_operators<T: IntoIterator<Item = String>>(&mut self, fingerprints: T) {
        self.operators.extend(fingerprints);
    }

    /// Remove a fingerprint from the ban set. Returns whether it was there.
    pub fn unban(&mut self, fingerprint: &str) -> bool {
        self.bans.remove(fingerprint).is_some()
    }
}

impl<O: Outbox, I: Copy + Ord> Roster<O, I> {
    /// Add a fingerprint to the ban set, permanently or until a deadline.
    ///
    /// A timed ban is a fence like the silence deadline: it expires by
    /// comparison against `now`, never by a timer.
    pub fn ban(&mut self, fingerprint: &str, until: Option<I>) {
        self.bans.insert(fingerprint.to_string(), until);
    }

    /// Check a fingerprint against the ban set at `now`. Consulted by the
    /// authentication callback before any channel is granted.
    pub fn is_banned(&self, fingerprint: &str, now: I) -> bool {
        match self.bans.get(fingerprint) {
            Some(None) => true,
            Some(Some(until)) => *until > now,
            None => false,
        }
    }

    /// Register a member and announce the join to everyone else.
    ///
    /// The requested name is cleaned to the naming rules; if it is taken,
    /// integer suffixes starting at 1 are appended until a free name is
    /// found. Returns the name actually assigned.
    pub fn add(&mut self, id: u64, profile: MemberProfile, outbox: O) -> String {
        debug_assert!(!self.members.contains_key(&id), "member id reused");

        let base = clean_name(&profile.name);
        let mut name = base.clone();
        let mut suffix = 1u32;
        while self.names.contains_key(&name) {
            // Trim the base so the suffixed name stays within the length
            // bound.
            let digits = suffix.to_string();
            let mut trimmed = base.clone();
            while trimmed.len() + digits.len() > crate::name::MAX_NAME_BYTES {
                trimmed.pop();
            }
            name = format!("{trimmed}{digits}");
            suffix += 1;
        }

        let member = Member {
            name: name.clone(),
            color: profile.color,
            op: self.operators.contains(&profile.fingerprint),
            fingerprint: profile.fingerprint,
            client_version: profile.client_version,
            silenced_until: None,
            term_size: (0, 0),
            outbox,
        };
        self.members.insert(id, member);
        self.names.insert(name.clone(), id);
        self.join_order.push(id);

        let announcement = format!("* {} joined. (Total: {})", name, self.members.len());
        self.broadcast(&announcement, Some(id));

        name
    }

    /// Remove a member and announce the departure to everyone remaining.
    ///
    /// Dropping the member also drops its outbox, which is what closes the
    /// mailbox and lets the writer task finish. Safe to call twice.
    pub fn remove(&mut self, id: u64) -> Option<String> {
        let member = self.members.remove(&id)?;
        self.names.remove(&member.name);
        self.join_order.retain(|other| *other != id);

        self.broadcast(&format!("* {} left.", member.name), None);
        Some(member.name)
    }

    /// Rename a member.
    ///
    /// Unlike [`Roster::add`] there is no suffixing here: a taken or invalid
    /// name fails and the roster is left untouched. On success the change is
    /// announced to the whole room and the assigned name returned.
    pub fn rename(&mut self, id: u64, requested: &str) -> Result<String, NameError> {
        validate_name(requested)?;
        if self.names.contains_key(requested) {
            return Err(NameError::Taken(requested.to_string()));
        }
        let member = self
            .members
            .get_mut(&id)
            .ok_or_else(|| NameError::Invalid(requested.to_string()))?;

        let old = std::mem::replace(&mut member.name, requested.to_string());
        self.names.remove(&old);
        self.names.insert(requested.to_string(), id);

        self.broadcast(&format!("* {old} is now known as {requested}"), None);
        Ok(requested.to_string())
    }

    /// Enqueue a message to every member except `except`.
    ///
    /// Delivery is non-blocking per recipient; receivers with a full mailbox
    /// lose the message rather than stall the sender.
    pub fn broadcast(&self, message: &str, except: Option<u64>) {
        for id in &self.join_order {
            if Some(*id) == except {
                continue;
            }
            if let Some(member) = self.members.get(id) {
                member.outbox.deliver(message.to_string());
            }
        }
    }

    /// Enqueue a message to a single member. Returns `false` if the member
    /// is gone or its mailbox is full.
    pub fn notify(&self, id: u64, message: impl Into<String>) -> bool {
        match self.members.get(&id) {
            Some(member) => member.outbox.deliver(message.into()),
            None => false,
        }
    }

    /// Current member names in join order, optionally filtered by prefix.
    pub fn list(&self, prefix: Option<&str>) -> Vec<String> {
        self.join_order
            .iter()
            .filter_map(|id| self.members.get(id))
            .map(|member| member.name.clone())
            .filter(|name| prefix.is_none_or(|p| name.starts_with(p)))
            .collect()
    }

    /// Look up a member by exact name.
    pub fn who(&self, name: &str) -> Option<MemberView> {
        self.view(*self.names.get(name)?)
    }

    /// Snapshot a member by id.
    pub fn view(&self, id: u64) -> Option<MemberView> {
        self.members.get(&id).map(|member| MemberView {
            id,
            name: member.name.clone(),
            color: member.color.clone(),
            fingerprint: member.fingerprint.clone(),
            client_version: member.client_version.clone(),
            op: member.op,
        })
    }

    /// Grant operator status to a fingerprint.
    ///
    /// Applies immediately to any connected member authenticated with it;
    /// status is a property of the fingerprint, so it survives renames and
    /// reconnects.
    pub fn op(&mut self, fingerprint: &str) {
        self.operators.insert(fingerprint.to_string());
        for member in self.members.values_mut() {
            if member.fingerprint == fingerprint {
                member.op = true;
            }
        }
    }

    /// Whether a member holds operator status.
    pub fn is_op(&self, id: u64) -> bool {
        self.members.get(&id).is_some_and(|member| member.op)
    }

    /// Mute a member's outbound messages until the given deadline.
    pub fn silence(&mut self, id: u64, until: I) -> bool {
        match self.members.get_mut(&id) {
            Some(member) => {
                member.silenced_until = Some(until);
                true
            },
            None => false,
        }
    }

    /// Whether a member is muted at `now`. A past deadline means not
    /// silenced; no timer ever needs to clear it.
    pub fn is_silenced(&self, id: u64, now: I) -> bool {
        self.members
            .get(&id)
            .and_then(|member| member.silenced_until)
            .is_some_and(|until| until > now)
    }

    /// Record the member's terminal dimensions from a pty or window-change
    /// request.
    pub fn set_term_size(&mut self, id: u64, width: u16, height: u16) -> bool {
        match self.members.get_mut(&id) {
            Some(member) => {
                member.term_size = (width, height);
                true
            },
            None => false,
        }
    }

    /// The member's last reported terminal dimensions.
    pub fn term_size(&self, id: u64) -> Option<(u16, u16)> {
        self.members.get(&id).map(|member| member.term_size)
    }
}
