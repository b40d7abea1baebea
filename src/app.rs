use anyhow::Result;
use tokio::task::{JoinError, JoinHandle};

use crate::client::{ChatClient, ChatReply};
use crate::config::Config;

pub const GREETING: &str = "Hello! How can I help you?";
pub const STOPPED_NOTICE: &str = "Chat stopped";
pub const ERROR_NOTICE: &str = "Error processing request";
pub const RESET_NOTICE: &str = "Chat reset. Start new conversation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
    System,
}

/// One transcript entry. Bot text may contain markdown; it is rendered at
/// draw time, the transcript stores it raw.
#[derive(Debug, Clone)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

pub struct App {
    pub should_quit: bool,

    // Input state
    pub input: String,
    pub input_cursor: usize, // cursor position in chars, not bytes

    // Conversation state
    pub transcript: Vec<Message>,
    pub context: String,

    // In-flight request. The handle doubles as the cancellation handle:
    // abort() is the stop signal, and the settled JoinError tells a
    // cancellation apart from a failure.
    pub pending: Option<JoinHandle<Result<ChatReply>>>,
    pub loading: bool,
    pub exit_notice: Option<JoinHandle<Result<()>>>,

    // Transcript viewport
    pub scroll: u16,
    pub chat_height: u16, // inner size of the transcript pane, set during render
    pub chat_width: u16,
    pub animation_frame: u8, // 0-2 for the ellipsis animation

    pub client: ChatClient,
    pub config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        let client = ChatClient::new(&config.server_url);

        let mut app = Self {
            should_quit: false,
            input: String::new(),
            input_cursor: 0,
            transcript: Vec::new(),
            context: String::new(),
            pending: None,
            loading: false,
            exit_notice: None,
            scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            client,
            config,
        };
        app.push_message(Sender::Bot, GREETING.to_string());
        app
    }

    /// Submit the input buffer as a question. Whitespace-only input is a
    /// no-op, and so is submitting while a request is still pending: requests
    /// are serialized, one in flight at a time.
    pub fn submit(&mut self) {
        let question = self.input.trim().to_string();
        if question.is_empty() {
            return;
        }
        if self.pending.is_some() {
            log::debug!("submit ignored, request already pending");
            return;
        }

        self.input.clear();
        self.input_cursor = 0;
        self.push_message(Sender::User, question.clone());
        self.loading = true;
        self.scroll_to_bottom();

        log::debug!("asking server, context len {}", self.context.len());
        let client = self.client.clone();
        let context = self.context.clone();
        self.set_pending(tokio::spawn(async move {
            client.ask(&context, &question).await
        }));
    }

    // The submit guard means a live predecessor should not exist here, but a
    // superseded handle must never settle unobserved.
    fn set_pending(&mut self, handle: JoinHandle<Result<ChatReply>>) {
        if let Some(old) = self.pending.replace(handle) {
            old.abort();
        }
    }

    /// Signal cancellation of the in-flight request, if any. The aborted task
    /// is still observed by `poll_pending`, which reports "Chat stopped".
    pub fn cancel_pending(&mut self) {
        if let Some(handle) = &self.pending {
            log::debug!("aborting in-flight request");
            handle.abort();
        }
    }

    /// Cancel any in-flight request and start the conversation over: empty
    /// context token, cleared transcript, one reset notice. When configured,
    /// the server is told to tear down the session via POST /exit.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.context.clear();
        self.transcript.clear();
        self.push_message(Sender::System, RESET_NOTICE.to_string());

        if self.config.notify_exit {
            let client = self.client.clone();
            self.exit_notice = Some(tokio::spawn(async move { client.notify_exit().await }));
        }
    }

    /// Observe settled background tasks. Called from the event loop on every
    /// pass; never blocks on a task that is still running.
    pub async fn poll_pending(&mut self) {
        let finished = self
            .pending
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(false);
        if finished {
            if let Some(handle) = self.pending.take() {
                let joined = handle.await;
                self.settle(joined);
            }
        }

        let notified = self
            .exit_notice
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(false);
        if notified {
            if let Some(handle) = self.exit_notice.take() {
                match handle.await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        log::debug!("exit notification failed: {err:#}");
                        self.push_message(Sender::System, ERROR_NOTICE.to_string());
                    }
                    Err(join_err) if join_err.is_cancelled() => {
                        self.push_message(Sender::System, STOPPED_NOTICE.to_string());
                    }
                    Err(_) => {
                        self.push_message(Sender::System, ERROR_NOTICE.to_string());
                    }
                }
            }
        }
    }

    /// Apply the outcome of a settled request. Two user-visible failure kinds
    /// only: cancelled and everything else.
    fn settle(&mut self, joined: std::result::Result<Result<ChatReply>, JoinError>) {
        self.loading = false;
        match joined {
            Ok(Ok(reply)) => {
                self.context = reply.context;
                self.push_message(Sender::Bot, reply.response);
            }
            Ok(Err(err)) => {
                log::debug!("chat request failed: {err:#}");
                self.push_message(Sender::System, ERROR_NOTICE.to_string());
            }
            Err(join_err) if join_err.is_cancelled() => {
                self.push_message(Sender::System, STOPPED_NOTICE.to_string());
            }
            Err(join_err) => {
                log::debug!("chat task failed: {join_err}");
                self.push_message(Sender::System, ERROR_NOTICE.to_string());
            }
        }
    }

    /// Append a message and keep the viewport on the newest entry.
    pub fn push_message(&mut self, sender: Sender, text: String) {
        self.transcript.push(Message { sender, text });
        self.scroll_to_bottom();
    }

    /// Tick the ellipsis animation (driven by the Tick event).
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Viewport -------------------------------------------------------------

    /// Wrapped line count of the transcript as rendered, including the
    /// "Thinking" lines while loading. Mirrors the layout in ui.rs: a label
    /// line for User/Bot, wrapped content, a blank separator.
    pub fn transcript_line_count(&self, wrap_width: usize) -> u16 {
        let wrap_width = wrap_width.max(1);
        let mut total: u16 = 0;

        for msg in &self.transcript {
            if msg.sender != Sender::System {
                total += 1; // label line
            }
            for line in msg.text.lines() {
                // Char count, not byte length: content may be non-ASCII.
                let chars = line.chars().count();
                total += (chars / wrap_width + 1) as u16;
            }
            if msg.text.is_empty() {
                total += 1;
            }
            total += 1; // blank separator
        }

        if self.loading {
            total += 2; // "Bot:" + "Thinking..."
        }

        total
    }

    pub fn scroll_to_bottom(&mut self) {
        let width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };
        let height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        let total = self.transcript_line_count(width);
        self.scroll = total.saturating_sub(height);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let total = self.transcript_line_count(self.chat_width.max(1) as usize);
        let max_scroll = total.saturating_sub(self.chat_height);
        self.scroll = self.scroll.saturating_add(lines).min(max_scroll);
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up(self.chat_height / 2);
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down(self.chat_height / 2);
    }
}
