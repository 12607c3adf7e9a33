//! Running single commands.

use std::sync::Arc;

use super::CliSession;
use super::options::{CommandOptions, ModeOverride};
use crate::error::{CliError, Result};
use crate::mode::Mode;
use crate::normalize;
use crate::transport::Transport;

/// Label used for inline mode overrides in messages.
const INLINE_MODE_LABEL: &str = "[temp]";

impl<T: Transport> CliSession<T> {
    /// Send `text` in the current mode and return the cleaned output.
    ///
    /// # Errors
    ///
    /// Returns transport errors, and a device-reported error when the
    /// mode's error pattern matches the output.
    pub fn command(&mut self, text: &str) -> Result<String> {
        self.command_with(text, &CommandOptions::default())
    }

    /// Send `text` with explicit options.
    ///
    /// A mode override installs that mode's pager before the command runs;
    /// the session's current mode is not changed.
    ///
    /// # Errors
    ///
    /// Same as [`command`](Self::command), plus a configuration error for
    /// an unknown or malformed override mode.
    pub fn command_with(&mut self, text: &str, options: &CommandOptions) -> Result<String> {
        let registry = Arc::clone(&self.registry);
        let mode = match &options.mode {
            Some(ModeOverride::Named(name)) => {
                let mode = registry.require(name)?;
                self.apply_pager(mode, name)?;
                mode
            }
            Some(ModeOverride::Inline(mode)) => {
                self.apply_pager(mode, INLINE_MODE_LABEL)?;
                mode.as_ref()
            }
            None => registry.require(self.state.current_mode())?,
        };
        self.execute(text, mode, options)
    }

    /// Send `text` in `mode`, following pager prompts until the mode prompt.
    pub(super) fn execute(
        &mut self,
        text: &str,
        mode: &Mode,
        options: &CommandOptions,
    ) -> Result<String> {
        if options.clear_prompt || mode.clear_prompt {
            self.state.clear_strict_prompt();
        }

        let mut prompts = vec![match self.state.strict_prompt() {
            Some(strict) => mode.prompt.pinned_source(strict),
            None => mode.prompt.source().to_string(),
        }];
        let pager_response = self.state.pager().map(|pager| {
            prompts.push(pager.detect.source().to_string());
            pager.response.clone()
        });

        let mut to_send = if options.no_cr {
            text.to_string()
        } else {
            format!("{text}{}", self.config.line_ending)
        };

        let mut result = String::new();
        let mut pages = 0usize;
        loop {
            let exchange = self.exchange(&to_send, &prompts, options.timeout).map_err(|e| {
                e.with_context(format!(
                    "error while waiting for a response from the device after command '{text}'"
                ))
            })?;
            match &pager_response {
                Some(response) if exchange.match_index == 1 => {
                    pages += 1;
                    tracing::debug!(command = %text, pages, "Pager prompt acknowledged");
                    result.push_str(&exchange.full_output);
                    to_send.clone_from(response);
                }
                _ => {
                    result.push_str(&exchange.output);
                    break;
                }
            }
        }

        if self.config.strip_ansi {
            result = normalize::strip_ansi(&result).into_owned();
        }
        let cleaned = normalize::normalize_output(&result);
        let cleaned = self.transport.remove_echo(&cleaned, text);

        if let Some(error) = &mode.error {
            if let Some(detail) = error.find_with_detail(&cleaned) {
                return Err(CliError::device_reported(detail, text));
            }
        }
        Ok(cleaned)
    }
}
