//! The session handle.

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;

use super::state::SessionState;
use crate::config::{DriverProfile, EngineConfig};
use crate::error::{CliError, Result};
use crate::mode::ModeRegistry;
use crate::section::{self, Section};
use crate::transport::{Exchange, SendRequest, Transport};

/// An interactive CLI session with one device.
///
/// Wraps a [`Transport`] and walks the device through the modes of a
/// [`ModeRegistry`]. Every call blocks until its exchanges complete; use
/// one session per device.
pub struct CliSession<T> {
    pub(super) transport: T,
    pub(super) registry: Arc<ModeRegistry>,
    pub(super) config: EngineConfig,
    pub(super) state: SessionState,
}

impl<T: Transport> CliSession<T> {
    /// Create a session that starts in `initial_mode`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the mode is not in the registry.
    pub fn new(transport: T, registry: Arc<ModeRegistry>, initial_mode: &str) -> Result<Self> {
        Self::with_config(transport, registry, initial_mode, EngineConfig::default())
    }

    /// Create a session with custom engine settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the mode is not in the registry.
    pub fn with_config(
        transport: T,
        registry: Arc<ModeRegistry>,
        initial_mode: &str,
        config: EngineConfig,
    ) -> Result<Self> {
        registry.require(initial_mode)?;
        tracing::debug!(mode = %initial_mode, "Opening CLI session");
        Ok(Self {
            transport,
            registry,
            config,
            state: SessionState::new(initial_mode),
        })
    }

    /// Create a session from a loaded driver profile.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the mode is not in the profile.
    pub fn from_profile(transport: T, profile: &DriverProfile, initial_mode: &str) -> Result<Self> {
        Self::with_config(
            transport,
            Arc::new(profile.modes.clone()),
            initial_mode,
            profile.engine.clone(),
        )
    }

    /// The mode the device is in.
    #[must_use]
    pub fn current_mode(&self) -> &str {
        self.state.current_mode()
    }

    /// Literal prompt captured on the last mode transition.
    #[must_use]
    pub fn strict_prompt(&self) -> Option<&str> {
        self.state.strict_prompt()
    }

    /// Every mode entered so far, starting with the initial one.
    #[must_use]
    pub fn mode_history(&self) -> &[String] {
        self.state.history()
    }

    /// The full session state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// The mode registry.
    #[must_use]
    pub fn registry(&self) -> &ModeRegistry {
        &self.registry
    }

    /// The engine settings.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get a reference to the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Close the session, handing the transport back.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Extract indentation-delimited sections from `text`.
    ///
    /// # Errors
    ///
    /// Returns an input error if `pattern` is not a valid regex.
    pub fn find_sections(&self, text: &str, pattern: &str) -> Result<Vec<Section>> {
        section::find_sections_str(text, pattern)
    }

    /// Extract sections with a compiled header pattern.
    #[must_use]
    pub fn find_sections_regex(&self, text: &str, pattern: &Regex) -> Vec<Section> {
        section::find_sections(text, pattern)
    }

    /// Block for `duration` using the transport's wait.
    pub fn sleep(&mut self, duration: Duration) {
        self.transport.sleep(duration);
    }

    /// Block for `ms` milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an input error if `ms` is negative.
    pub fn sleep_millis(&mut self, ms: i64) -> Result<()> {
        let ms = u64::try_from(ms)
            .map_err(|_| CliError::invalid_input(format!("invalid sleep duration {ms} ms")))?;
        self.sleep(Duration::from_millis(ms));
        Ok(())
    }

    /// One write-then-wait exchange with a checked match index.
    pub(super) fn exchange(
        &mut self,
        text: &str,
        prompts: &[String],
        timeout: Option<Duration>,
    ) -> Result<Exchange> {
        tracing::trace!(text = ?text, prompts = ?prompts, "Sending to device");
        let timeout = timeout.or_else(|| self.config.default_timeout());
        let exchange = self
            .transport
            .send(&SendRequest::new(text, prompts).timeout(timeout))?;
        if exchange.match_index >= prompts.len() {
            return Err(CliError::transport_with_buffer(
                "invalid transport reply",
                format!(
                    "match index {} out of range for {} prompts",
                    exchange.match_index,
                    prompts.len()
                ),
                exchange.full_output,
            ));
        }
        Ok(exchange)
    }
}

impl<T> std::fmt::Debug for CliSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliSession")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
