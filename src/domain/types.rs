//! # Domain Types
//!
//! Plain data passed between the chat layer and the workflow layer.
//! Nothing here talks to the network.

use std::fmt;

/// Set of user identifiers allowed to drive the bot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    ids: Vec<String>,
}

impl AllowList {
    /// Parses a comma-separated list such as `"123, 456"`.
    pub fn parse(raw: &str) -> Self {
        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        Self { ids }
    }

    /// Membership is decided on the identifier's string form.
    pub fn is_authorized(&self, user_id: impl fmt::Display) -> bool {
        let user_id = user_id.to_string();
        self.ids.iter().any(|id| *id == user_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Identifier of a workflow run, as echoed back by a Cancel button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunId(String);

impl RunId {
    /// Accepts only non-empty, all-digit strings.
    pub fn parse(raw: &str) -> Option<Self> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything one workflow dispatch needs. Built per command, dropped after the call.
#[derive(Clone)]
pub struct DispatchRequest {
    pub chat_id: String,
    pub image: String,
    pub bot_token: String,
    pub tunnel_token: Option<String>,
}

impl fmt::Debug for DispatchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchRequest")
            .field("chat_id", &self.chat_id)
            .field("image", &self.image)
            .field("bot_token", &"<redacted>")
            .field("tunnel_token", &self.tunnel_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A text message received from the chat platform.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub chat_id: i64,
    pub text: Option<String>,
}

/// An inline button press.
#[derive(Debug, Clone)]
pub struct IncomingCallback {
    pub id: String,
    pub user_id: i64,
    pub chat_id: i64,
    pub message_id: i64,
    pub data: Option<String>,
}

/// An inbound chat event the router knows how to handle.
#[derive(Debug, Clone)]
pub enum Event {
    Message(IncomingMessage),
    Callback(IncomingCallback),
}

impl Event {
    pub fn chat_id(&self) -> i64 {
        match self {
            Event::Message(m) => m.chat_id,
            Event::Callback(c) => c.chat_id,
        }
    }
}

/// A single inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    Callback {
        text: String,
        data: String,
    },
    Url { text: String, url: String },
}

impl Button {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Button::Callback {
            text: text.into(),
            data: data.into(),
        }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Button::Url {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Rows of inline buttons attached to a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row holding a single button.
    pub fn row(mut self, button: Button) -> Self {
        self.rows.push(vec![button]);
        self
    }
}

/// Outbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markdown: bool,
    pub keyboard: Option<Keyboard>,
    pub disable_preview: bool,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
            keyboard: None,
            disable_preview: false,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            markdown: true,
            ..Self::plain(text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn without_preview(mut self) -> Self {
        self.disable_preview = true;
        self
    }
}
