//! The transport seam.
//!
//! A transport writes text to the device and waits until one of the
//! offered prompt patterns shows up in what comes back. The engine never
//! touches sockets itself; SSH, Telnet or serial plumbing lives behind
//! [`Transport`].
//!
//! Async transports implement [`AsyncTransport`] and are driven through
//! [`BlockingTransport`], which runs them on a private current-thread
//! runtime.

pub mod blocking;

use std::future::Future;
use std::time::Duration;

pub use blocking::BlockingTransport;

use crate::error::Result;
use crate::normalize;

/// One write-then-wait exchange.
#[derive(Debug, Clone, Copy)]
pub struct SendRequest<'a> {
    /// Text to write; may be empty.
    pub text: &'a str,
    /// Prompt pattern sources, in priority order.
    pub prompts: &'a [String],
    /// Give up after this long.
    pub timeout: Option<Duration>,
}

impl<'a> SendRequest<'a> {
    /// Create a request without a timeout.
    #[must_use]
    pub const fn new(text: &'a str, prompts: &'a [String]) -> Self {
        Self {
            text,
            prompts,
            timeout: None,
        }
    }

    /// Set the timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// What the device sent back until a prompt matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exchange {
    /// Received text without the matched prompt.
    pub output: String,
    /// Received text including the matched prompt.
    pub full_output: String,
    /// Position of the matched pattern in the offered prompt list.
    pub match_index: usize,
    /// Capture groups of the prompt match; index 0 is the whole match.
    pub groups: Vec<Option<String>>,
}

impl Exchange {
    /// Create an exchange where `output` is followed by the prompt `matched`.
    #[must_use]
    pub fn new(output: impl Into<String>, matched: impl Into<String>, match_index: usize) -> Self {
        let output = output.into();
        let matched = matched.into();
        Self {
            full_output: format!("{output}{matched}"),
            output,
            match_index,
            groups: vec![Some(matched)],
        }
    }

    /// Add capture groups after group 0.
    #[must_use]
    pub fn with_groups<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        self.groups.truncate(1);
        self.groups.extend(groups);
        self
    }

    /// A capture group of the prompt match.
    #[must_use]
    pub fn group(&self, n: usize) -> Option<&str> {
        self.groups.get(n).and_then(Option::as_deref)
    }
}

/// A blocking device connection.
pub trait Transport {
    /// Write `request.text`, then wait for one of `request.prompts`.
    ///
    /// Timeouts and connection failures are reported as
    /// [`CliError::Transport`](crate::CliError::Transport).
    fn send(&mut self, request: &SendRequest<'_>) -> Result<Exchange>;

    /// Drop the device's echo of `command` from `output`.
    fn remove_echo(&self, output: &str, command: &str) -> String {
        normalize::remove_echo(output, command)
    }

    /// Block for `duration`.
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, request: &SendRequest<'_>) -> Result<Exchange> {
        (**self).send(request)
    }

    fn remove_echo(&self, output: &str, command: &str) -> String {
        (**self).remove_echo(output, command)
    }

    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration);
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, request: &SendRequest<'_>) -> Result<Exchange> {
        (**self).send(request)
    }

    fn remove_echo(&self, output: &str, command: &str) -> String {
        (**self).remove_echo(output, command)
    }

    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// An async device connection.
pub trait AsyncTransport {
    /// Write `request.text`, then wait for one of `request.prompts`.
    fn send(&mut self, request: &SendRequest<'_>) -> impl Future<Output = Result<Exchange>>;

    /// Drop the device's echo of `command` from `output`.
    fn remove_echo(&self, output: &str, command: &str) -> String {
        normalize::remove_echo(output, command)
    }

    /// Wait for `duration`.
    fn sleep(&mut self, duration: Duration) -> impl Future<Output = ()> {
        tokio::time::sleep(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_new_keeps_prompt_in_full_output() {
        let exchange = Exchange::new("uptime is 3 days\r\n", "core-1#", 0)
            .with_groups([Some("core-1".to_string())]);
        assert_eq!(exchange.full_output, "uptime is 3 days\r\ncore-1#");
        assert_eq!(exchange.group(0), Some("core-1#"));
        assert_eq!(exchange.group(1), Some("core-1"));
        assert_eq!(exchange.group(2), None);
    }

    #[test]
    fn request_builder() {
        let prompts = vec![">".to_string()];
        let request = SendRequest::new("show clock\r", &prompts).timeout(Some(Duration::from_secs(1)));
        assert_eq!(request.text, "show clock\r");
        assert_eq!(request.prompts.len(), 1);
        assert_eq!(request.timeout, Some(Duration::from_secs(1)));
    }
}
