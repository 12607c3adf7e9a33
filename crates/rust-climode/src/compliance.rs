//! Compliance rule evaluation.
//!
//! A rule reads device data through a [`RuleDevice`] and returns either a
//! bare result name or a `{result, comment}` object. [`evaluate`] turns
//! whatever came back into a [`RuleVerdict`]; anything unusable, including
//! a rule error, becomes `INVALIDRULE`.
//!
//! ```rust
//! use rust_climode::compliance::{
//!     DeviceRef, ProviderValue, RuleDataProvider, RuleDevice, RuleResult, evaluate,
//! };
//! use rust_climode::host::AttributeValue;
//! use serde_json::json;
//!
//! struct Running(&'static str);
//!
//! impl RuleDataProvider for Running {
//!     fn get(&self, key: &str) -> rust_climode::Result<ProviderValue> {
//!         Ok(match key {
//!             "runningConfig" => AttributeValue::from(self.0).into(),
//!             _ => ProviderValue::Missing,
//!         })
//!     }
//!     fn get_from(&self, _: &str, _: &DeviceRef) -> rust_climode::Result<ProviderValue> {
//!         Ok(ProviderValue::Missing)
//!     }
//! }
//!
//! let no_telnet = |device: &RuleDevice<'_>| -> rust_climode::Result<serde_json::Value> {
//!     let config = device.get("runningConfig")?;
//!     let text = config.as_str().unwrap_or_default();
//!     let vty = device.find_sections(text, r"^line vty")?;
//!     if vty.iter().any(|s| s.config.contains("transport input telnet")) {
//!         Ok(json!({"result": "NONCONFORMING", "comment": "telnet allowed"}))
//!     } else {
//!         Ok(json!("CONFORMING"))
//!     }
//! };
//!
//! let verdict = evaluate(&no_telnet, &Running("line vty 0 4\n transport input telnet\n"));
//! assert_eq!(verdict.result, RuleResult::Nonconforming);
//! ```

mod facade;
mod result;

use serde_json::Value;

pub use facade::{DeviceRef, HostRecord, ProviderValue, RuleDataProvider, RuleDevice, to_native};
pub use result::{RuleResult, RuleVerdict};

use crate::error::Result;

/// A compliance check.
pub trait Rule {
    /// Inspect the device and return a result name or `{result, comment}`.
    fn check(&self, device: &RuleDevice<'_>) -> Result<Value>;
}

impl<F> Rule for F
where
    F: Fn(&RuleDevice<'_>) -> Result<Value>,
{
    fn check(&self, device: &RuleDevice<'_>) -> Result<Value> {
        self(device)
    }
}

/// Run `rule` against the data of `provider`.
pub fn evaluate<R>(rule: &R, provider: &dyn RuleDataProvider) -> RuleVerdict
where
    R: Rule + ?Sized,
{
    let device = RuleDevice::new(provider);
    let verdict = rule
        .check(&device)
        .and_then(|value| RuleVerdict::from_value(&value));
    match verdict {
        Ok(verdict) => {
            tracing::debug!(result = %verdict.result, comment = %verdict.comment, "Rule evaluated");
            verdict
        }
        Err(err) => {
            tracing::debug!(error = %err, "Rule is invalid");
            RuleVerdict::invalid(format!("error while running the rule: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::CliError;

    struct Empty;

    impl RuleDataProvider for Empty {
        fn get(&self, _: &str) -> Result<ProviderValue> {
            Ok(ProviderValue::Missing)
        }

        fn get_from(&self, _: &str, _: &DeviceRef) -> Result<ProviderValue> {
            Ok(ProviderValue::Missing)
        }
    }

    #[test]
    fn conforming_string() {
        let rule = |_: &RuleDevice<'_>| -> Result<Value> { Ok(json!("CONFORMING")) };
        assert_eq!(evaluate(&rule, &Empty), RuleVerdict::new(RuleResult::Conforming));
    }

    #[test]
    fn rule_error_is_invalid_rule() {
        let rule = |_: &RuleDevice<'_>| -> Result<Value> { Err(CliError::invalid_input("boom")) };
        let verdict = evaluate(&rule, &Empty);
        assert_eq!(verdict.result, RuleResult::InvalidRule);
        assert!(verdict.comment.contains("boom"));
    }

    #[test]
    fn bad_section_regex_is_invalid_rule() {
        let rule = |device: &RuleDevice<'_>| -> Result<Value> {
            device.find_sections("interface Gi0/1", "(")?;
            Ok(json!("CONFORMING"))
        };
        assert_eq!(evaluate(&rule, &Empty).result, RuleResult::InvalidRule);
    }

    #[test]
    fn unknown_shape_is_invalid_rule() {
        let rule = |_: &RuleDevice<'_>| -> Result<Value> { Ok(json!(["CONFORMING"])) };
        assert_eq!(evaluate(&rule, &Empty).result, RuleResult::InvalidRule);
    }
}
