//! Per-connection SSH handler.
//!
//! One `ClientHandler` exists per TCP connection. Authentication accepts any
//! public key that is not banned and records its fingerprint as the member's
//! identity. A single session channel is accepted; `pty-req` and
//! `window-change` resize the editor; the first `shell` request registers
//! the member with the hub and starts the writer task. Keystrokes arrive via
//! `data` and leave as completed lines through the dispatcher.
//!
//! Teardown is centralized in `Drop`: whether the peer typed `/exit`, was
//! banned, or just vanished, dropping the handler removes the member, which
//! closes the mailbox and ends the writer task.

use std::sync::{Arc, Mutex};

use russh::{
    keys::{HashAlg, PublicKey},
    server::{Auth, Handler, Msg, Session},
    Channel, ChannelId, CryptoVec, Disconnect, Pty,
};
use wardroom_core::{style::random_color, MemberProfile};

use crate::{
    error::ServerError,
    hub::Hub,
    session::{handle_line, prompt_for, spawn_writer, SessionEffect},
    terminal::{InputEvent, LineEditor},
};

/// Handler state for one SSH connection.
pub struct ClientHandler {
    hub: Arc<Hub>,
    username: String,
    fingerprint: Option<String>,
    editor: Arc<Mutex<LineEditor>>,
    member_id: Option<u64>,
    session_channel: Option<ChannelId>,
    shell_granted: bool,
}

impl ClientHandler {
    /// Create the handler for a newly accepted connection.
    pub fn new(hub: Arc<Hub>) -> Self {
        Self {
            hub,
            username: "guest".to_string(),
            fingerprint: None,
            editor: Arc::new(Mutex::new(LineEditor::new())),
            member_id: None,
            session_channel: None,
            shell_granted: false,
        }
    }

    fn editor(&self) -> std::sync::MutexGuard<'_, LineEditor> {
        self.editor.lock().expect("invariant: editor lock poisoned")
    }

    /// Remove the member from the hub. Idempotent; every teardown path ends
    /// here.
    fn teardown(&mut self) {
        if let Some(id) = self.member_id.take() {
            if let Some(name) = self.hub.leave(id) {
                tracing::info!(%name, "member left");
            }
        }
    }

    async fn run_effects(
        &mut self,
        effects: Vec<SessionEffect>,
        channel: ChannelId,
        session: &mut Session,
    ) {
        for effect in effects {
            match effect {
                SessionEffect::Write(lines) => {
                    let bytes = self.editor().render_lines(&lines);
                    let _ = session.data(channel, CryptoVec::from_slice(&bytes));
                },
                SessionEffect::SetPrompt(prompt) => {
                    let bytes = self.editor().set_prompt(prompt);
                    let _ = session.data(channel, CryptoVec::from_slice(&bytes));
                },
                SessionEffect::CloseChannel => {
                    let _ = session.close(channel);
                },
                SessionEffect::Disconnect { member_id } => {
                    if let Some(link) = self.hub.take_link(member_id) {
                        let _ = link
                            .handle
                            .disconnect(Disconnect::ByApplication, "banned".into(), "".into())
                            .await;
                    }
                },
            }
        }
    }
}

impl Handler for ClientHandler {
    type Error = ServerError;

    async fn auth_publickey_offered(
        &mut self,
        _user: &str,
        key: &PublicKey,
    ) -> Result<Auth, Self::Error> {
        let fingerprint = key.fingerprint(HashAlg::Sha256).to_string();
        if self.hub.is_banned(&fingerprint) {
            tracing::info!(%fingerprint, "rejecting banned key");
            return Ok(Auth::Reject { proceed_with_methods: None, partial_success: false });
        }
        Ok(Auth::Accept)
    }

    async fn auth_publickey(
        &mut self,
        user: &str,
        key: &PublicKey,
    ) -> Result<Auth, Self::Error> {
        let fingerprint = key.fingerprint(HashAlg::Sha256).to_string();
        if self.hub.is_banned(&fingerprint) {
            return Ok(Auth::Reject { proceed_with_methods: None, partial_success: false });
        }

        self.username = user.to_string();
        self.fingerprint = Some(fingerprint);
        Ok(Auth::Accept)
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        // One session channel per connection; refuse the rest.
        if self.session_channel.is_some() {
            return Ok(false);
        }
        self.session_channel = Some(channel.id());
        Ok(true)
    }

    async fn pty_request(
        &mut self,
        _channel: ChannelId,
        _term: &str,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.editor().resize(col_width as u16, row_height as u16);
        if let Some(id) = self.member_id {
            self.hub.set_term_size(id, col_width as u16, row_height as u16);
        }
        Ok(())
    }

    async fn window_change_request(
        &mut self,
        _channel: ChannelId,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.editor().resize(col_width as u16, row_height as u16);
        if let Some(id) = self.member_id {
            self.hub.set_term_size(id, col_width as u16, row_height as u16);
        }
        Ok(())
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        // A second shell request is a protocol violation: negative reply,
        // connection stays up.
        if self.shell_granted {
            let _ = session.channel_failure(channel);
            return Ok(());
        }
        self.shell_granted = true;

        let fingerprint = self
            .fingerprint
            .clone()
            .unwrap_or_else(|| "(no key)".to_string());
        let client_version = String::from_utf8_lossy(session.remote_sshid()).into_owned();

        let profile = MemberProfile {
            name: self.username.clone(),
            color: random_color().to_string(),
            fingerprint,
            client_version,
        };

        let (id, name, mailbox) = self.hub.join(profile);
        self.member_id = Some(id);

        let (width, height) = self.editor().size();
        self.hub.set_term_size(id, width, height);
        self.hub.attach_link(id, session.handle(), channel);

        // Prompt and completion are per-session closures over the hub; no
        // global completer state.
        let view = self.hub.view(id).expect("invariant: member registered above");
        let hub = Arc::clone(&self.hub);
        {
            let mut editor = self.editor();
            editor.set_completer(Box::new(move |line, pos| hub.complete(line, pos)));
            let bytes = editor.set_prompt(prompt_for(&view));
            let _ = session.data(channel, CryptoVec::from_slice(&bytes));
        }

        spawn_writer(session.handle(), channel, Arc::clone(&self.editor), mailbox);

        tracing::info!(%name, "member joined");
        Ok(())
    }

    async fn data(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        let Some(me) = self.member_id else {
            return Ok(());
        };

        let feed = self.editor().feed(data);
        if !feed.echo.is_empty() {
            let _ = session.data(channel, CryptoVec::from_slice(&feed.echo));
        }

        for event in feed.events {
            match event {
                InputEvent::Line(line) => {
                    let effects = handle_line(&self.hub, me, &line);
                    self.run_effects(effects, channel, session).await;
                },
                InputEvent::Eof => {
                    let _ = session.close(channel);
                },
            }
        }
        Ok(())
    }

    async fn channel_eof(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        let _ = session.close(channel);
        Ok(())
    }

    async fn channel_close(
        &mut self,
        _channel: ChannelId,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.teardown();
        Ok(())
    }
}

impl Drop for ClientHandler {
    fn drop(&mut self) {
        self.teardown();
    }
}
