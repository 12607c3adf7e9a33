//! Mode, macro step and pager definitions.
//!
//! These types mirror the declarative per-device-type schema. They
//! deserialize from driver profiles with the schema's camelCase field
//! names and can also be built in code with the builder methods.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CliError, Result};
use crate::pattern::PromptPattern;

/// Name of the macro followed when a chain lands in an unexpected mode.
pub const AUTO_MACRO: &str = "auto";

/// One hop of a macro chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MacroStep {
    /// Text to send; nothing is sent when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    /// Suppress the line terminator after `cmd`.
    #[serde(default)]
    pub no_cr: bool,
    /// Milliseconds to wait before sending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_before: Option<u64>,
    /// Milliseconds to wait after the exchange.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_after: Option<u64>,
    /// Exchange timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Modes the device may land in, in the order their prompts are offered.
    pub options: Vec<String>,
    /// Final destination of a chain started by this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl MacroStep {
    /// Create a step that may land in any of `options`.
    #[must_use]
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the command to send.
    #[must_use]
    pub fn cmd(mut self, cmd: impl Into<String>) -> Self {
        self.cmd = Some(cmd.into());
        self
    }

    /// Suppress the line terminator.
    #[must_use]
    pub const fn no_cr(mut self) -> Self {
        self.no_cr = true;
        self
    }

    /// Set the chain target.
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the exchange timeout in milliseconds.
    #[must_use]
    pub const fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout = Some(ms);
        self
    }

    /// Wait before sending, in milliseconds.
    #[must_use]
    pub const fn wait_before_ms(mut self, ms: u64) -> Self {
        self.wait_before = Some(ms);
        self
    }

    /// Wait after the exchange, in milliseconds.
    #[must_use]
    pub const fn wait_after_ms(mut self, ms: u64) -> Self {
        self.wait_after = Some(ms);
        self
    }

    /// The exchange timeout as a duration.
    #[must_use]
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_millis)
    }

    /// Text to put on the wire for this step.
    ///
    /// A step without `cmd` sends nothing at all, not even a terminator.
    #[must_use]
    pub fn outgoing(&self, line_ending: &str) -> String {
        match &self.cmd {
            Some(cmd) if self.no_cr => cmd.clone(),
            Some(cmd) => format!("{cmd}{line_ending}"),
            None => String::new(),
        }
    }
}

/// Pagination handling for a mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pager {
    /// Pattern announcing a paused page.
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub detect: Option<PromptPattern>,
    /// Keystrokes that resume output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Commands issued up front to turn pagination off.
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub avoid: Vec<String>,
}

impl Pager {
    /// Create a pager that answers `detect` with `response`.
    #[must_use]
    pub fn new(detect: PromptPattern, response: impl Into<String>) -> Self {
        Self {
            detect: Some(detect),
            response: Some(response.into()),
            avoid: Vec::new(),
        }
    }

    /// Create a pager that only issues avoid commands.
    #[must_use]
    pub fn avoid_only<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            avoid: commands.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Add an avoid command.
    #[must_use]
    pub fn avoid(mut self, command: impl Into<String>) -> Self {
        self.avoid.push(command.into());
        self
    }

    /// Check the pager is usable, naming `mode` in the error.
    ///
    /// A response without a match pattern is accepted and never sent.
    pub fn validate(&self, mode: &str) -> Result<()> {
        if self.detect.is_some() && self.response.is_none() {
            return Err(CliError::config(format!(
                "in CLI mode {mode} the pager response is not a string"
            )));
        }
        Ok(())
    }
}

/// A named CLI state of the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Mode {
    /// Prompt identifying the mode.
    pub prompt: PromptPattern,
    /// Pattern spotting device-reported errors; group 1 holds the detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<PromptPattern>,
    /// Marks a dead end: arriving here aborts the chain with this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,
    /// Forget any strict prompt before each command in this mode.
    #[serde(default)]
    pub clear_prompt: bool,
    /// Pagination handling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pager: Option<Pager>,
    /// Macros available from this mode.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub macros: BTreeMap<String, MacroStep>,
}

impl Mode {
    /// Create a mode identified by `prompt`.
    #[must_use]
    pub const fn new(prompt: PromptPattern) -> Self {
        Self {
            prompt,
            error: None,
            fail: None,
            clear_prompt: false,
            pager: None,
            macros: BTreeMap::new(),
        }
    }

    /// Set the error pattern.
    #[must_use]
    pub fn error(mut self, error: PromptPattern) -> Self {
        self.error = Some(error);
        self
    }

    /// Mark the mode as a dead end.
    #[must_use]
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.fail = Some(message.into());
        self
    }

    /// Set the clear-prompt default.
    #[must_use]
    pub const fn clear_prompt(mut self, clear: bool) -> Self {
        self.clear_prompt = clear;
        self
    }

    /// Set the pager.
    #[must_use]
    pub fn pager(mut self, pager: Pager) -> Self {
        self.pager = Some(pager);
        self
    }

    /// Add a macro.
    #[must_use]
    pub fn macro_step(mut self, name: impl Into<String>, step: MacroStep) -> Self {
        self.macros.insert(name.into(), step);
        self
    }

    /// Look up a macro by name.
    #[must_use]
    pub fn get_macro(&self, name: &str) -> Option<&MacroStep> {
        self.macros.get(name)
    }

    /// Check if the mode declares a macro.
    #[must_use]
    pub fn has_macro(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }
}

/// Accept either a single string or a list of strings.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(command) => vec![command],
        OneOrMany::Many(commands) => commands,
    })
}
