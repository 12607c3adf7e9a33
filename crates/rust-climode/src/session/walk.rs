//! Macro chains: walking the mode graph toward a target mode.

use std::sync::Arc;
use std::time::Duration;

use super::CliSession;
use crate::error::{CliError, Result};
use crate::mode::{AUTO_MACRO, MacroStep, ModeRegistry};
use crate::transport::Transport;

/// Bookkeeping for one top-level macro call.
struct Chain<'a> {
    macro_name: &'a str,
    origin: String,
    target: Option<String>,
}

impl Chain<'_> {
    fn target(&self) -> &str {
        self.target.as_deref().unwrap_or_default()
    }
}

/// A candidate landing mode and the prompt that identifies it.
struct PromptChoice<'r> {
    source: &'r str,
    mode: &'r str,
}

fn prompt_choices<'r>(
    registry: &'r ModeRegistry,
    step: &'r MacroStep,
) -> Result<Vec<PromptChoice<'r>>> {
    step.options
        .iter()
        .map(|option| {
            Ok(PromptChoice {
                source: registry.require(option)?.prompt.source(),
                mode: option,
            })
        })
        .collect()
}

impl<T: Transport> CliSession<T> {
    /// Move the device to the target of macro `name`.
    ///
    /// Does nothing when the session is already in a mode called `name`.
    /// Otherwise the macro is run from the current mode; whenever the
    /// device lands somewhere other than the target, the landing mode's
    /// `auto` macro (or its own macro of the same name) is followed. The
    /// pager of the final mode is installed afterwards.
    ///
    /// # Errors
    ///
    /// - configuration error if the macro or a mode it needs is missing
    /// - [`CliError::ModeFailed`] when landing in a dead-end mode
    /// - [`CliError::RecursionLimit`] after too many hops
    /// - [`CliError::ChainExhausted`] when no macro leads on to the target
    /// - transport and device-reported errors from any hop
    pub fn run_macro(&mut self, name: &str) -> Result<()> {
        if self.state.current_mode() == name {
            tracing::trace!(mode = %name, "Already in requested mode");
            return Ok(());
        }

        tracing::debug!(macro_name = %name, mode = %self.state.current_mode(), "Running CLI macro");
        let mut chain = Chain {
            macro_name: name,
            origin: self.state.current_mode().to_string(),
            target: None,
        };
        self.walk(name, &mut chain, 0)?;

        let registry = Arc::clone(&self.registry);
        let mode_name = self.state.current_mode().to_string();
        self.apply_pager(registry.require(&mode_name)?, &mode_name)
    }

    fn walk(&mut self, macro_name: &str, chain: &mut Chain<'_>, depth: usize) -> Result<()> {
        if depth > self.config.max_macro_hops {
            return Err(CliError::RecursionLimit {
                limit: self.config.max_macro_hops,
            });
        }

        let registry = Arc::clone(&self.registry);
        let mode_name = self.state.current_mode().to_string();
        let mode = registry.require(&mode_name)?;
        if mode.macros.is_empty() {
            return Err(CliError::config(format!("no macros in mode {mode_name} in CLI")));
        }
        let step = mode.get_macro(macro_name).ok_or_else(|| {
            CliError::config(format!(
                "can't find macro {macro_name} in macros of mode {mode_name} in CLI"
            ))
        })?;
        if chain.target.is_none() {
            let target = step.target.as_ref().ok_or_else(|| {
                CliError::config(format!(
                    "can't find target in macro {macro_name} of mode {mode_name} in CLI"
                ))
            })?;
            chain.target = Some(target.clone());
        }

        let choices = prompt_choices(&registry, step)?;
        let prompts: Vec<String> = choices.iter().map(|c| c.source.to_string()).collect();
        let text = step.outgoing(&self.config.line_ending);

        if let Some(ms) = step.wait_before {
            self.sleep(Duration::from_millis(ms));
        }
        let sent = self.exchange(&text, &prompts, step.timeout_duration());
        if let Some(ms) = step.wait_after {
            self.sleep(Duration::from_millis(ms));
        }
        let exchange = sent
            .map_err(|e| e.with_context(format!("error while running CLI macro '{macro_name}'")))?;

        if let Some(error) = &mode.error {
            if let Some(detail) = error.find_with_detail(&exchange.output) {
                return Err(CliError::device_reported(
                    detail,
                    step.cmd.clone().unwrap_or_default(),
                ));
            }
        }

        let landed = choices[exchange.match_index].mode;
        self.state
            .enter_mode(landed, exchange.group(1).map(str::to_string));
        tracing::debug!(from = %mode_name, to = %landed, depth, "CLI mode changed");

        if landed == chain.target() {
            tracing::debug!(mode = %landed, "Reached target mode");
            return Ok(());
        }

        let landed_mode = registry.require(landed)?;
        if let Some(message) = &landed_mode.fail {
            return Err(CliError::ModeFailed {
                mode: landed.to_string(),
                message: message.clone(),
            });
        }
        if landed_mode.has_macro(AUTO_MACRO) {
            self.walk(AUTO_MACRO, chain, depth + 1)?;
        } else if landed_mode.has_macro(chain.macro_name) {
            self.walk(chain.macro_name, chain, depth + 1)?;
        }

        if self.state.current_mode() != chain.target() {
            return Err(CliError::ChainExhausted {
                macro_name: chain.macro_name.to_string(),
                origin: chain.origin.clone(),
                target: chain.target().to_string(),
                reached: self.state.current_mode().to_string(),
            });
        }
        Ok(())
    }
}
