//! Mutable per-connection state.

use crate::pattern::PromptPattern;

/// Pagination handling currently in force.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePager {
    /// Pattern announcing a paused page.
    pub detect: PromptPattern,
    /// Keystrokes that resume output.
    pub response: String,
}

/// State of one device CLI session.
///
/// Only the session engine mutates it; callers get read access through
/// [`CliSession::state`](super::CliSession::state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    current_mode: String,
    strict_prompt: Option<String>,
    pager: Option<ActivePager>,
    history: Vec<String>,
}

impl SessionState {
    pub(crate) fn new(initial_mode: impl Into<String>) -> Self {
        let initial_mode = initial_mode.into();
        Self {
            history: vec![initial_mode.clone()],
            current_mode: initial_mode,
            strict_prompt: None,
            pager: None,
        }
    }

    /// The mode the device is in.
    #[must_use]
    pub fn current_mode(&self) -> &str {
        &self.current_mode
    }

    /// Literal prompt captured on the last transition.
    #[must_use]
    pub fn strict_prompt(&self) -> Option<&str> {
        self.strict_prompt.as_deref()
    }

    /// Installed pager, if any.
    #[must_use]
    pub const fn pager(&self) -> Option<&ActivePager> {
        self.pager.as_ref()
    }

    /// Every mode entered so far, starting with the initial one.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub(crate) fn enter_mode(&mut self, mode: &str, strict_prompt: Option<String>) {
        self.current_mode = mode.to_string();
        self.strict_prompt = strict_prompt;
        self.history.push(mode.to_string());
    }

    pub(crate) fn clear_strict_prompt(&mut self) {
        self.strict_prompt = None;
    }

    pub(crate) fn set_pager(&mut self, pager: Option<ActivePager>) {
        self.pager = pager;
    }
}
