//! Scripted transport implementation for testing.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use regex::{Regex, RegexBuilder};

use crate::error::{CliError, Result};
use crate::transport::{Exchange, SendRequest, Transport};

/// A queued device reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text the device prints, prompt included.
    Text(String),
    /// The connection fails with this message.
    Failure(String),
}

/// One recorded exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    /// Text written to the device.
    pub text: String,
    /// Prompt sources offered for this exchange.
    pub prompts: Vec<String>,
    /// Timeout requested for this exchange.
    pub timeout: Option<Duration>,
}

/// Shared state for the scripted transport.
#[derive(Debug, Default)]
struct ScriptState {
    replies: VecDeque<Reply>,
    sent: Vec<SentRecord>,
    sleeps: Vec<Duration>,
    patterns: HashMap<String, Regex>,
}

/// A transport that replays queued replies.
///
/// Each `send` consumes one reply. The offered prompts are tried in order
/// and the first one found anywhere in the reply wins (patterns are
/// compiled multi-line). The reported output is the reply with the matched
/// prompt cut out; the full output keeps it. An exhausted queue or a reply
/// no prompt matches is reported as a timeout.
///
/// Clones share the same state, so a test can keep a handle after handing
/// the transport to a session.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedTransport {
    /// Create a transport with no queued replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a device reply.
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.lock().replies.push_back(Reply::Text(text.into()));
    }

    /// Queue a connection failure.
    pub fn queue_failure(&self, message: impl Into<String>) {
        self.lock().replies.push_back(Reply::Failure(message.into()));
    }

    /// Queue a device reply, builder style.
    #[must_use]
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.queue_reply(text);
        self
    }

    /// Queue a connection failure, builder style.
    #[must_use]
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.queue_failure(message);
        self
    }

    /// Every exchange so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentRecord> {
        self.lock().sent.clone()
    }

    /// The text of every exchange so far.
    #[must_use]
    pub fn sent_texts(&self) -> Vec<String> {
        self.lock().sent.iter().map(|r| r.text.clone()).collect()
    }

    /// Number of exchanges so far.
    #[must_use]
    pub fn send_count(&self) -> usize {
        self.lock().sent.len()
    }

    /// Every sleep requested so far.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    /// Replies not consumed yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().replies.len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, request: &SendRequest<'_>) -> Result<Exchange> {
        let mut state = self.lock();
        state.sent.push(SentRecord {
            text: request.text.to_string(),
            prompts: request.prompts.to_vec(),
            timeout: request.timeout,
        });

        let reply = match state.replies.pop_front() {
            Some(Reply::Text(text)) => text,
            Some(Reply::Failure(message)) => {
                return Err(CliError::transport("scripted device", message));
            }
            None => return Err(CliError::timeout(request.timeout, "")),
        };

        for (index, source) in request.prompts.iter().enumerate() {
            let regex = compiled(&mut state.patterns, source)?;
            let Some(caps) = regex.captures(&reply) else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            return Ok(Exchange {
                output: format!("{}{}", &reply[..whole.start()], &reply[whole.end()..]),
                full_output: reply.clone(),
                match_index: index,
                groups: caps
                    .iter()
                    .map(|m| m.map(|m| m.as_str().to_string()))
                    .collect(),
            });
        }

        Err(CliError::timeout(request.timeout, reply))
    }

    fn sleep(&mut self, duration: Duration) {
        self.lock().sleeps.push(duration);
    }
}

fn compiled<'a>(cache: &'a mut HashMap<String, Regex>, source: &str) -> Result<&'a Regex> {
    match cache.entry(source.to_string()) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(entry) => {
            let regex = RegexBuilder::new(source)
                .multi_line(true)
                .build()
                .map_err(|e| CliError::transport("compiling prompt pattern", e.to_string()))?;
            Ok(entry.insert(regex))
        }
    }
}
