//! Shared hub: the process-wide room state plus delivery plumbing.
//!
//! Wraps the core roster with everything it deliberately doesn't know
//! about: bounded tokio mailboxes, the russh handles needed to disconnect a
//! banned member, the clock, and timed un-bans. Sessions hold an `Arc<Hub>`
//! and nothing wider.
//!
//! One mutex guards the roster and is held only for the duration of a map
//! operation. Mailbox enqueues are `try_send` and therefore safe under the
//! lock; a stuck client loses messages instead of stalling a broadcaster. A
//! poisoned lock means a panic already corrupted room state, so we panic
//! through rather than limp along.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard,
    },
    time::Duration,
};

use russh::{server::Handle, ChannelId};
use tokio::{sync::mpsc, time::Instant};
use wardroom_core::{complete_nick, MemberProfile, MemberView, NameError, Outbox, Roster};

/// Exact capacity of each member's inbound mailbox.
pub const MAILBOX_CAPACITY: usize = 10;

/// Bounded, non-blocking delivery handle backing one member's [`Outbox`].
pub struct Mailbox(mpsc::Sender<String>);

impl Outbox for Mailbox {
    fn deliver(&self, line: String) -> bool {
        match self.0.try_send(line) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("dropping message for slow or gone member: {err}");
                false
            },
        }
    }
}

/// What the hub needs to forcibly close a member's connection.
pub struct SessionLink {
    /// Handle to the member's SSH connection.
    pub handle: Handle,
    /// The member's session channel.
    pub channel: ChannelId,
}

/// Process-wide chat room: roster, mailboxes, and connection links.
pub struct Hub {
    roster: Mutex<Roster<Mailbox, Instant>>,
    links: Mutex<HashMap<u64, SessionLink>>,
    next_id: AtomicU64,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self {
            roster: Mutex::new(Roster::new()),
            links: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn roster(&self) -> MutexGuard<'_, Roster<Mailbox, Instant>> {
        self.roster.lock().expect("invariant: hub lock poisoned")
    }

    fn links(&self) -> MutexGuard<'_, HashMap<u64, SessionLink>> {
        self.links.lock().expect("invariant: hub link map poisoned")
    }

    /// Pre-load operator fingerprints from configuration.
    pub fn seed_operators<T: IntoIterator<Item = String>>(&self, fingerprints: T) {
        self.roster().seed_operators(fingerprints);
    }

    /// Consulted by the authentication callback before a channel exists.
    pub fn is_banned(&self, fingerprint: &str) -> bool {
        self.roster().is_banned(fingerprint, Instant::now())
    }

    /// Register a member. Returns its id, the name actually assigned, and
    /// the receiving end of its mailbox for the writer task.
    pub fn join(&self, profile: MemberProfile) -> (u64, String, mpsc::Receiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        let name = self.roster().add(id, profile, Mailbox(tx));
        (id, name, rx)
    }

    /// Attach the connection handle used to disconnect the member on ban.
    pub fn attach_link(&self, id: u64, handle: Handle, channel: ChannelId) {
        self.links().insert(id, SessionLink { handle, channel });
    }

    /// Detach and return a member's connection link, if still present.
    pub fn take_link(&self, id: u64) -> Option<SessionLink> {
        self.links().remove(&id)
    }

    /// Remove a member. Closes its mailbox (ending the writer task) and
    /// announces the departure. Safe to call on every teardown path.
    pub fn leave(&self, id: u64) -> Option<String> {
        self.links().remove(&id);
        self.roster().remove(id)
    }

    /// Rename a member; see [`Roster::rename`] for the rules.
    pub fn rename(&self, id: u64, requested: &str) -> Result<String, NameError> {
        self.roster().rename(id, requested)
    }

    /// Enqueue a message to every member except `except`.
    pub fn broadcast(&self, message: &str, except: Option<u64>) {
        self.roster().broadcast(message, except);
    }

    /// Enqueue a `->` reply to a single member.
    pub fn notify(&self, id: u64, message: impl Into<String>) -> bool {
        self.roster().notify(id, message)
    }

    /// Member names in join order, optionally filtered by prefix.
    pub fn list(&self, prefix: Option<&str>) -> Vec<String> {
        self.roster().list(prefix)
    }

    /// Look up a member by exact name.
    pub fn who(&self, name: &str) -> Option<MemberView> {
        self.roster().who(name)
    }

    /// Snapshot a member by id.
    pub fn view(&self, id: u64) -> Option<MemberView> {
        self.roster().view(id)
    }

    /// Whether the member holds operator status.
    pub fn is_op(&self, id: u64) -> bool {
        self.roster().is_op(id)
    }

    /// Grant operator status to a fingerprint, marking any connected member
    /// holding it.
    pub fn op(&self, fingerprint: &str) {
        self.roster().op(fingerprint);
    }

    /// Ban a fingerprint, permanently or for a duration. A timed ban simply
    /// stops holding at its deadline; nothing has to clear it.
    pub fn ban(&self, fingerprint: &str, duration: Option<Duration>) {
        let until = duration.map(|duration| Instant::now() + duration);
        self.roster().ban(fingerprint, until);
    }

    /// Mute a member for `duration` from now.
    pub fn silence(&self, id: u64, duration: Duration) -> bool {
        self.roster().silence(id, Instant::now() + duration)
    }

    /// Whether the member is muted right now.
    pub fn is_silenced(&self, id: u64) -> bool {
        self.roster().is_silenced(id, Instant::now())
    }

    /// Record a member's terminal dimensions.
    pub fn set_term_size(&self, id: u64, width: u16, height: u16) {
        self.roster().set_term_size(id, width, height);
    }

    /// Number of connected members.
    pub fn member_count(&self) -> usize {
        self.roster().member_count()
    }

    /// Tab completion against the current membership; the editor calls this
    /// through a per-session closure.
    pub fn complete(&self, line: &str, pos: usize) -> Option<(String, usize)> {
        let names = self.roster().list(None);
        complete_nick(line, pos, &names)
    }
}
