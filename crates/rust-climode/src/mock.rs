//! Scripted transport support for testing.
//!
//! Drivers can be exercised without a device: queue what the device would
//! print, run the driver, then check what was sent.
//!
//! - [`ScriptedTransport`]: replays queued replies and records exchanges
//! - [`ScriptBuilder`]: fluent construction
//!
//! # Example
//!
//! ```rust
//! use rust_climode::mock::ScriptBuilder;
//!
//! let transport = ScriptBuilder::new()
//!     .reply("enable\r\nPassword: ")
//!     .reply("\r\ncore-1#")
//!     .build();
//! assert_eq!(transport.pending(), 2);
//! ```

pub mod scripted;

pub use scripted::{Reply, ScriptedTransport, SentRecord};

/// Create a scripted transport with the given replies queued.
#[must_use]
pub fn scripted<I, S>(replies: I) -> ScriptedTransport
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let transport = ScriptedTransport::new();
    for reply in replies {
        transport.queue_reply(reply);
    }
    transport
}

/// Builder for creating scripted transports fluently.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    replies: Vec<Reply>,
}

impl ScriptBuilder {
    /// Create a new builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            replies: Vec::new(),
        }
    }

    /// Add a device reply.
    #[must_use]
    pub fn reply(mut self, text: impl Into<String>) -> Self {
        self.replies.push(Reply::Text(text.into()));
        self
    }

    /// Add the same reply `count` times.
    #[must_use]
    pub fn repeat(mut self, text: &str, count: usize) -> Self {
        self.replies
            .extend(std::iter::repeat_n(Reply::Text(text.to_string()), count));
        self
    }

    /// Add a connection failure.
    #[must_use]
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.replies.push(Reply::Failure(message.into()));
        self
    }

    /// Build the transport.
    #[must_use]
    pub fn build(self) -> ScriptedTransport {
        let transport = ScriptedTransport::new();
        for reply in self.replies {
            match reply {
                Reply::Text(text) => transport.queue_reply(text),
                Reply::Failure(message) => transport.queue_failure(message),
            }
        }
        transport
    }
}
