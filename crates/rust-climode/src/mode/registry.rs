//! The validated mode registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::definition::{MacroStep, Mode};
use crate::error::{CliError, Result};

/// Modes of one device type, indexed by name.
///
/// Every cross-reference is checked when the registry is built, so a
/// session never discovers a dangling mode name halfway through a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeRegistry {
    modes: BTreeMap<String, Mode>,
}

impl ModeRegistry {
    /// Build and validate a registry.
    pub fn new<I, S>(modes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Mode)>,
        S: Into<String>,
    {
        let registry = Self {
            modes: modes.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        };
        registry.validate()?;
        Ok(registry)
    }

    /// Start building a registry mode by mode.
    #[must_use]
    pub fn builder() -> ModeRegistryBuilder {
        ModeRegistryBuilder::default()
    }

    /// Look up a mode.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Mode> {
        self.modes.get(name)
    }

    /// Look up a mode, failing with a configuration error if it's missing.
    pub fn require(&self, name: &str) -> Result<&Mode> {
        self.modes
            .get(name)
            .ok_or_else(|| CliError::config(format!("no mode {name} in CLI")))
    }

    /// Check if a mode exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.modes.contains_key(name)
    }

    /// Iterate over mode names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }

    /// Number of modes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Check if the registry has no modes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    fn validate(&self) -> Result<()> {
        for (name, mode) in &self.modes {
            if name.is_empty() {
                return Err(CliError::config("mode with an empty name"));
            }
            if let Some(pager) = &mode.pager {
                pager.validate(name)?;
            }
            for (macro_name, step) in &mode.macros {
                self.validate_step(name, macro_name, step)?;
            }
        }
        Ok(())
    }

    fn validate_step(&self, mode: &str, macro_name: &str, step: &MacroStep) -> Result<()> {
        if macro_name.is_empty() {
            return Err(CliError::config(format!(
                "mode {mode} has a macro with an empty name"
            )));
        }
        if step.options.is_empty() {
            return Err(CliError::config(format!(
                "macro {macro_name} in mode {mode} has an empty options list"
            )));
        }
        for option in &step.options {
            if !self.contains(option) {
                return Err(CliError::config(format!(
                    "macro {macro_name} in mode {mode} lists unknown mode '{option}' in options"
                )));
            }
        }
        if let Some(target) = &step.target {
            if !self.contains(target) {
                return Err(CliError::config(format!(
                    "macro {macro_name} in mode {mode} targets unknown mode '{target}'"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`ModeRegistry`].
#[derive(Debug, Default)]
pub struct ModeRegistryBuilder {
    modes: BTreeMap<String, Mode>,
}

impl ModeRegistryBuilder {
    /// Add a mode.
    #[must_use]
    pub fn mode(mut self, name: impl Into<String>, mode: Mode) -> Self {
        self.modes.insert(name.into(), mode);
        self
    }

    /// Validate and build the registry.
    pub fn build(self) -> Result<ModeRegistry> {
        ModeRegistry::new(self.modes)
    }
}

impl Serialize for ModeRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.modes.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ModeRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let modes = BTreeMap::<String, Mode>::deserialize(deserializer)?;
        Self::new(modes).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Pager;
    use crate::pattern::PromptPattern;

    fn prompt(s: &str) -> PromptPattern {
        PromptPattern::new(s).unwrap()
    }

    fn ios() -> ModeRegistryBuilder {
        ModeRegistry::builder()
            .mode(
                "userExec",
                Mode::new(prompt(r">\s*$")).macro_step(
                    "enable",
                    MacroStep::new(["enable", "userExec"])
                        .cmd("enable")
                        .target("enable"),
                ),
            )
            .mode("enable", Mode::new(prompt(r"#\s*$")))
    }

    #[test]
    fn valid_registry_builds() {
        let registry = ios().build().unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("enable"));
        assert_eq!(registry.names().collect::<Vec<_>>(), ["enable", "userExec"]);
    }

    #[test]
    fn require_missing_mode() {
        let registry = ios().build().unwrap();
        let err = registry.require("configure").unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("no mode configure in CLI"));
    }

    #[test]
    fn rejects_unknown_option() {
        let err = ios()
            .mode(
                "bad",
                Mode::new(prompt("x")).macro_step("go", MacroStep::new(["nowhere"])),
            )
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("'nowhere'"));
    }

    #[test]
    fn rejects_unknown_target() {
        let err = ios()
            .mode(
                "bad",
                Mode::new(prompt("x"))
                    .macro_step("go", MacroStep::new(["enable"]).target("rommon")),
            )
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("'rommon'"));
    }

    #[test]
    fn rejects_empty_options() {
        let err = ios()
            .mode(
                "bad",
                Mode::new(prompt("x")).macro_step("go", MacroStep::new(Vec::<String>::new())),
            )
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("empty options"));
    }

    #[test]
    fn rejects_half_configured_pager() {
        let pager = Pager {
            detect: Some(prompt("--More--")),
            ..Default::default()
        };
        let err = ios()
            .mode("paged", Mode::new(prompt("#")).pager(pager))
            .build()
            .unwrap_err();
        assert!(err.is_config());

        let response_only = Pager {
            response: Some(" ".into()),
            ..Default::default()
        };
        assert!(
            ios()
                .mode("paged", Mode::new(prompt("#")).pager(response_only))
                .build()
                .is_ok()
        );
    }

    #[test]
    fn deserialize_validates() {
        let bad: std::result::Result<ModeRegistry, _> = serde_json::from_str(
            r#"{"a": {"prompt": ">", "macros": {"x": {"options": ["b"]}}}}"#,
        );
        assert!(bad.is_err());

        let ok: ModeRegistry =
            serde_json::from_str(r##"{"a": {"prompt": ">"}, "b": {"prompt": "#"}}"##).unwrap();
        assert_eq!(ok.len(), 2);
    }
}
