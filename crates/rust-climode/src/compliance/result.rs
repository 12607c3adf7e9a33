//! Rule outcomes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CliError, Result};

/// Outcome of a compliance rule on one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleResult {
    /// The device complies.
    Conforming,
    /// The device does not comply.
    Nonconforming,
    /// The rule does not apply to this device.
    NotApplicable,
    /// The rule itself failed or returned something unusable.
    InvalidRule,
}

impl RuleResult {
    /// The wire name of the result.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conforming => "CONFORMING",
            Self::Nonconforming => "NONCONFORMING",
            Self::NotApplicable => "NOTAPPLICABLE",
            Self::InvalidRule => "INVALIDRULE",
        }
    }
}

/// Parses the three results a rule may return. `INVALIDRULE` is reserved
/// for the evaluator and is rejected.
impl FromStr for RuleResult {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CONFORMING" => Ok(Self::Conforming),
            "NONCONFORMING" => Ok(Self::Nonconforming),
            "NOTAPPLICABLE" => Ok(Self::NotApplicable),
            _ => Err(CliError::invalid_input(format!("invalid rule result '{s}'"))),
        }
    }
}

impl fmt::Display for RuleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule outcome with its comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleVerdict {
    /// The outcome.
    pub result: RuleResult,
    /// Free text explaining the outcome; empty when none was given.
    #[serde(default)]
    pub comment: String,
}

impl RuleVerdict {
    /// A verdict without comment.
    #[must_use]
    pub const fn new(result: RuleResult) -> Self {
        Self {
            result,
            comment: String::new(),
        }
    }

    /// Attach a comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// An `INVALIDRULE` verdict explaining why.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::new(RuleResult::InvalidRule).comment(reason)
    }

    /// Normalise what a rule returned.
    ///
    /// Accepts a bare result name, or an object with a `result` name and an
    /// optional `comment`. A comment that is not a string is ignored.
    ///
    /// # Errors
    ///
    /// Returns an input error for any other shape or an unknown name.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) => Ok(Self::new(name.parse()?)),
            Value::Object(map) => {
                let result = map
                    .get("result")
                    .and_then(Value::as_str)
                    .ok_or_else(|| CliError::invalid_input("rule returned no result"))?
                    .parse()?;
                let comment = map
                    .get("comment")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Ok(Self::new(result).comment(comment))
            }
            other => Err(CliError::invalid_input(format!(
                "rule returned an unusable value: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_name_is_accepted() {
        let verdict = RuleVerdict::from_value(&json!("NOTAPPLICABLE")).unwrap();
        assert_eq!(verdict.result, RuleResult::NotApplicable);
        assert!(verdict.comment.is_empty());
    }

    #[test]
    fn object_with_comment() {
        let verdict = RuleVerdict::from_value(&json!({
            "result": "NONCONFORMING",
            "comment": "telnet enabled on vty 0 4",
        }))
        .unwrap();
        assert_eq!(verdict.result, RuleResult::Nonconforming);
        assert_eq!(verdict.comment, "telnet enabled on vty 0 4");
    }

    #[test]
    fn non_string_comment_is_dropped() {
        let verdict = RuleVerdict::from_value(&json!({"result": "CONFORMING", "comment": 3})).unwrap();
        assert_eq!(verdict, RuleVerdict::new(RuleResult::Conforming));
    }

    #[test]
    fn unusable_returns_are_errors() {
        assert!(RuleVerdict::from_value(&json!("INVALIDRULE")).is_err());
        assert!(RuleVerdict::from_value(&json!("conforming")).is_err());
        assert!(RuleVerdict::from_value(&json!(true)).is_err());
        assert!(RuleVerdict::from_value(&json!({"comment": "x"})).is_err());
    }

    #[test]
    fn serializes_with_wire_names() {
        let verdict = RuleVerdict::new(RuleResult::NotApplicable);
        assert_eq!(
            serde_json::to_value(&verdict).unwrap(),
            json!({"result": "NOTAPPLICABLE", "comment": ""})
        );
    }
}
