//! Line editor over the SSH session channel.
//!
//! SSH delivers raw keystrokes; this turns them into edited lines the way a
//! shell would: echo, backspace, Ctrl-C to clear, Ctrl-D on an empty line
//! for EOF, Tab for nick completion. Escape sequences (arrow keys and the
//! like) are consumed without echo rather than interpreted.
//!
//! The editor is a pure byte-in/byte-out state machine. It never writes to
//! the channel itself; `feed` returns the echo bytes and the caller sends
//! them, which keeps the whole thing testable without a connection.

/// Completion callback: `(line, cursor) -> (new line, new cursor)`.
///
/// Produced per session as a closure over the hub, so the editor itself
/// stays ignorant of the roster.
pub type Completer = Box<dyn Fn(&str, usize) -> Option<(String, usize)> + Send>;

/// Something the user finished doing, produced by [`LineEditor::feed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A completed input line (without the terminating newline).
    Line(String),
    /// Ctrl-D on an empty line: the user hung up.
    Eof,
}

/// Result of feeding bytes to the editor: completed events plus the echo
/// bytes to send back on the channel.
#[derive(Debug, Default)]
pub struct Feed {
    /// Completed lines and EOF signals, in input order.
    pub events: Vec<InputEvent>,
    /// Bytes to echo to the peer's terminal.
    pub echo: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscState {
    Ground,
    Escape,
    Csi,
}

const CLEAR_LINE: &[u8] = b"\r\x1b[2K";

/// Per-connection line editor state.
pub struct LineEditor {
    prompt: String,
    buffer: Vec<u8>,
    esc: EscState,
    last_byte: u8,
    width: u16,
    height: u16,
    completer: Option<Completer>,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineEditor {
    /// Create an editor with no prompt and the conventional 80x24 size.
    pub fn new() -> Self {
        Self {
            prompt: String::new(),
            buffer: Vec::new(),
            esc: EscState::Ground,
            last_byte: 0,
            width: 80,
            height: 24,
            completer: None,
        }
    }

    /// Replace the prompt. Returns the bytes repainting the input line.
    pub fn set_prompt(&mut self, prompt: String) -> Vec<u8> {
        self.prompt = prompt;
        self.redraw()
    }

    /// Install the Tab completion callback.
    pub fn set_completer(&mut self, completer: Completer) {
        self.completer = Some(completer);
    }

    /// Record new terminal dimensions from a pty-req or window-change.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Current terminal dimensions.
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Bytes that repaint the prompt and the in-progress line from a clear
    /// line.
    pub fn redraw(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(CLEAR_LINE.len() + self.prompt.len() + self.buffer.len());
        out.extend_from_slice(CLEAR_LINE);
        out.extend_from_slice(self.prompt.as_bytes());
        out.extend_from_slice(&self.buffer);
        out
    }

    /// Repaint for an asynchronous message: clear the in-progress line,
    /// print the message, restore prompt and buffer.
    pub fn render_message(&self, message: &str) -> Vec<u8> {
        self.render_lines(std::slice::from_ref(&message.to_string()))
    }

    /// Like [`LineEditor::render_message`] for several lines at once.
    pub fn render_lines(&self, lines: &[String]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(CLEAR_LINE);
        for line in lines {
            out.extend_from_slice(line.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(self.prompt.as_bytes());
        out.extend_from_slice(&self.buffer);
        out
    }

    /// Feed raw channel bytes through the editor.
    pub fn feed(&mut self, data: &[u8]) -> Feed {
        let mut feed = Feed::default();
        for &byte in data {
            self.feed_byte(byte, &mut feed);
            self.last_byte = byte;
        }
        feed
    }

    fn feed_byte(&mut self, byte: u8, feed: &mut Feed) {
        match self.esc {
            EscState::Escape => {
                self.esc = if byte == b'[' { EscState::Csi } else { EscState::Ground };
                return;
            },
            EscState::Csi => {
                // Parameter and intermediate bytes run 0x20..0x40; anything
                // from 0x40..0x7f terminates the sequence.
                if (0x40..0x7f).contains(&byte) {
                    self.esc = EscState::Ground;
                }
                return;
            },
            EscState::Ground => {},
        }

        match byte {
            0x1b => self.esc = EscState::Escape,
            b'\r' => self.finish_line(feed),
            b'\n' => {
                // Lone LF ends a line; the LF of a CRLF pair was already
                // handled by the CR.
                if self.last_byte != b'\r' {
                    self.finish_line(feed);
                }
            },
            0x7f | 0x08 => {
                if self.pop_char() {
                    feed.echo.extend_from_slice(b"\x08 \x08");
                }
            },
            0x03 => {
                // Ctrl-C abandons the line.
                self.buffer.clear();
                feed.echo.extend_from_slice(b"\r\n");
                feed.echo.extend_from_slice(self.prompt.as_bytes());
            },
            0x04 => {
                if self.buffer.is_empty() {
                    feed.events.push(InputEvent::Eof);
                }
            },
            b'\t' => self.complete(feed),
            _ if byte >= 0x20 => {
                self.buffer.push(byte);
                feed.echo.push(byte);
            },
            _ => {},
        }
    }

    fn finish_line(&mut self, feed: &mut Feed) {
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        feed.echo.extend_from_slice(b"\r\n");
        feed.echo.extend_from_slice(self.prompt.as_bytes());
        feed.events.push(InputEvent::Line(line));
    }

    /// Drop the last char from the buffer, stepping over UTF-8 continuation
    /// bytes. Returns whether anything was removed.
    fn pop_char(&mut self) -> bool {
        while let Some(byte) = self.buffer.pop() {
            if byte & 0xc0 != 0x80 {
                return true;
            }
        }
        false
    }

    fn complete(&mut self, feed: &mut Feed) {
        let Some(completer) = &self.completer else {
            return;
        };
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        if let Some((new_line, _new_pos)) = completer(&line, line.len()) {
            self.buffer = new_line.into_bytes();
            feed.echo.extend_from_slice(&self.redraw());
        }
    }
}
