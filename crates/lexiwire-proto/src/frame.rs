//! STOMP frame model.

use std::fmt;

/// STOMP protocol versions offered during the handshake.
pub const ACCEPT_VERSIONS: &str = "1.1,1.2";

/// Heartbeat interval advertised in the CONNECT frame, in milliseconds
/// (outgoing,incoming).
pub const HEART_BEAT: &str = "10000,10000";

/// STOMP command.
///
/// Only the commands this client exchanges are named; anything else the
/// server emits is preserved verbatim in [`Command::Other`] so the session
/// can log and drop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Client handshake request.
    Connect,
    /// Server handshake acknowledgement.
    Connected,
    /// Client topic subscription.
    Subscribe,
    /// Client topic unsubscription.
    Unsubscribe,
    /// Client graceful shutdown.
    Disconnect,
    /// Server broadcast carrying a snapshot body.
    Message,
    /// Server-side protocol error.
    Error,
    /// Any command not listed above.
    Other(String),
}

impl Command {
    /// Wire spelling of the command.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connect => "CONNECT",
            Self::Connected => "CONNECTED",
            Self::Subscribe => "SUBSCRIBE",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::Disconnect => "DISCONNECT",
            Self::Message => "MESSAGE",
            Self::Error => "ERROR",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for Command {
    fn from(raw: &str) -> Self {
        match raw {
            "CONNECT" => Self::Connect,
            "CONNECTED" => Self::Connected,
            "SUBSCRIBE" => Self::Subscribe,
            "UNSUBSCRIBE" => Self::Unsubscribe,
            "DISCONNECT" => Self::Disconnect,
            "MESSAGE" => Self::Message,
            "ERROR" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single STOMP frame.
///
/// Headers keep the order they were supplied in; STOMP itself does not care,
/// but it keeps encoding deterministic and round-trippable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame command.
    pub command: Command,
    /// Header lines, first-colon-split, in supplied order.
    pub headers: Vec<(String, String)>,
    /// Frame body; empty for every control frame the client sends.
    pub body: String,
}

impl Frame {
    /// Build a bodyless control frame.
    pub fn control<I, K, V>(command: Command, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            command,
            headers: headers.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            body: String::new(),
        }
    }

    /// CONNECT frame advertising protocol versions and heartbeat interval.
    pub fn connect() -> Self {
        Self::control(
            Command::Connect,
            [("accept-version", ACCEPT_VERSIONS), ("heart-beat", HEART_BEAT)],
        )
    }

    /// SUBSCRIBE frame for a destination topic.
    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::control(Command::Subscribe, [("id", id), ("destination", destination)])
    }

    /// UNSUBSCRIBE frame for a previously subscribed id.
    pub fn unsubscribe(id: &str) -> Self {
        Self::control(Command::Unsubscribe, [("id", id)])
    }

    /// DISCONNECT frame.
    pub fn disconnect() -> Self {
        Self { command: Command::Disconnect, headers: Vec::new(), body: String::new() }
    }

    /// First header value with the given name, if any.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Encode into wire text: `COMMAND\nkey:value\n...\n\n<body>\0`.
    ///
    /// Never fails for well-formed header maps.
    pub fn to_wire(&self) -> String {
        let mut out = String::new();
        out.push_str(self.command.as_str());
        out.push('\n');
        for (key, value) in &self.headers {
            out.push_str(key);
            out.push(':');
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }
}
