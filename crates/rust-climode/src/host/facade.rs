//! Facades handed to driver routines.
//!
//! Drivers never touch the stores directly. Every value goes through a
//! helper that checks the key, refuses undefined (`null`) values and turns
//! loose JSON input into an [`AttributeValue`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CliError, Result};

/// Marker key added to structured values passed to `device.add`.
pub const STRUCTURED_MARKER: &str = "__";

/// A value a driver stores on a device, a configuration or a diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A boolean flag.
    Flag(bool),
    /// A numeric value.
    Number(f64),
    /// A text value.
    Text(String),
    /// A list or an object, kept as JSON.
    Structured(Value),
}

impl AttributeValue {
    /// Convert a loose JSON value.
    ///
    /// # Errors
    ///
    /// Returns an input error for `null`, which stands for an undefined value.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Null => Err(CliError::invalid_input("undefined value")),
            Value::Bool(flag) => Ok(Self::Flag(flag)),
            Value::Number(number) => number
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| CliError::invalid_input(format!("unrepresentable number {number}"))),
            Value::String(text) => Ok(Self::Text(text)),
            other => Ok(Self::Structured(other)),
        }
    }

    /// Get the value as text, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get the value as a number, if it is one.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// Get the value as a flag, if it is one.
    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Convert back to JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Flag(flag) => Value::Bool(*flag),
            Self::Number(number) => serde_json::Number::from_f64(*number)
                .map_or(Value::Null, Value::Number),
            Self::Text(text) => Value::String(text.clone()),
            Self::Structured(value) => value.clone(),
        }
    }

    fn mark_structured(self) -> Self {
        match self {
            Self::Structured(Value::Object(mut map)) => {
                map.insert(STRUCTURED_MARKER.to_string(), Value::Object(serde_json::Map::new()));
                Self::Structured(Value::Object(map))
            }
            other => other,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for AttributeValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<f64> for AttributeValue {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl From<i64> for AttributeValue {
    fn from(number: i64) -> Self {
        Self::Number(number as f64)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
            Self::Structured(value) => write!(f, "{value}"),
        }
    }
}

/// Protocol used to pull a file off the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMethod {
    /// Secure copy.
    Scp,
    /// SSH file transfer.
    Sftp,
}

impl FromStr for DownloadMethod {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "scp" => Ok(Self::Scp),
            "sftp" => Ok(Self::Sftp),
            _ => Err(CliError::invalid_input(format!("invalid download method {s}"))),
        }
    }
}

impl fmt::Display for DownloadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scp => f.write_str("scp"),
            Self::Sftp => f.write_str("sftp"),
        }
    }
}

/// A file download requested by a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Configuration attribute receiving the file.
    pub key: String,
    /// Transfer protocol.
    pub method: DownloadMethod,
    /// Full path of the file on the device.
    pub remote_file: String,
    /// Name to store the file under, when it differs from the remote name.
    pub store_file: Option<String>,
}

/// Receives device attributes collected by a driver.
pub trait DeviceStore {
    /// Forget everything collected so far.
    fn reset(&mut self);

    /// Set a single-valued attribute.
    fn set(&mut self, key: &str, value: AttributeValue) -> Result<()>;

    /// Append to a multi-valued attribute (modules, interfaces, VRFs).
    fn add(&mut self, collection: &str, value: AttributeValue) -> Result<()>;

    /// Read back an attribute.
    fn get(&self, key: &str) -> Option<AttributeValue>;
}

/// Receives configuration attributes collected by a driver.
pub trait ConfigStore {
    /// Set a configuration attribute.
    fn set(&mut self, key: &str, value: AttributeValue) -> Result<()>;

    /// Download a file into a configuration attribute.
    fn download(&mut self, request: &DownloadRequest) -> Result<()>;
}

/// Supplies diagnostics to run and receives their results.
pub trait DiagnosticStore {
    /// The diagnostics to run on the device.
    fn diagnostics(&self) -> Vec<super::Diagnostic>;

    /// Store the result of diagnostic `name`.
    fn set_result(&mut self, name: &str, value: AttributeValue) -> Result<()>;
}

fn check_key(key: &str, operation: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CliError::invalid_input(format!(
            "the key should be a non-empty string in {operation}"
        )));
    }
    Ok(())
}

fn defined(value: Value, operation: &str, key: &str) -> Result<AttributeValue> {
    if value.is_null() {
        return Err(CliError::invalid_input(format!(
            "undefined value used in {operation}, for key {key}"
        )));
    }
    AttributeValue::from_json(value)
}

/// Device facade passed to driver routines.
pub struct DeviceHelper<'a> {
    store: &'a mut dyn DeviceStore,
    allow_add: bool,
}

impl<'a> DeviceHelper<'a> {
    /// Full facade, used for snapshot and run.
    pub fn new(store: &'a mut dyn DeviceStore) -> Self {
        Self {
            store,
            allow_add: true,
        }
    }

    /// Facade without `add`, used for diagnostics.
    pub fn set_only(store: &'a mut dyn DeviceStore) -> Self {
        Self {
            store,
            allow_add: false,
        }
    }

    /// Set a device attribute.
    ///
    /// # Errors
    ///
    /// Returns an input error for an empty key, or the store's error.
    pub fn set(&mut self, key: &str, value: impl Into<AttributeValue>) -> Result<()> {
        check_key(key, "device.set")?;
        self.store.set(key, value.into())
    }

    /// Set a device attribute from loose JSON.
    ///
    /// # Errors
    ///
    /// Also rejects `null`.
    pub fn set_json(&mut self, key: &str, value: Value) -> Result<()> {
        check_key(key, "device.set")?;
        let value = defined(value, "device.set", key)?;
        self.store.set(key, value)
    }

    /// Append a value to a device collection.
    ///
    /// Objects are tagged with an empty `"__"` member before storage.
    ///
    /// # Errors
    ///
    /// Returns an input error for an empty collection name or when the
    /// facade was built with [`set_only`](Self::set_only).
    pub fn add(&mut self, collection: &str, value: impl Into<AttributeValue>) -> Result<()> {
        if !self.allow_add {
            return Err(CliError::invalid_input("device.add is not available here"));
        }
        check_key(collection, "device.add")?;
        self.store.add(collection, value.into().mark_structured())
    }

    /// Append a loose JSON value to a device collection.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add), and rejects `null`.
    pub fn add_json(&mut self, collection: &str, value: Value) -> Result<()> {
        let value = defined(value, "device.add", collection)?;
        self.add(collection, value)
    }

    /// Read back an attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<AttributeValue> {
        self.store.get(key)
    }
}

impl fmt::Debug for DeviceHelper<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHelper")
            .field("allow_add", &self.allow_add)
            .finish_non_exhaustive()
    }
}

/// Configuration facade passed to snapshot routines.
pub struct ConfigHelper<'a> {
    store: &'a mut dyn ConfigStore,
}

impl<'a> ConfigHelper<'a> {
    /// Wrap a configuration store.
    pub fn new(store: &'a mut dyn ConfigStore) -> Self {
        Self { store }
    }

    /// Set a configuration attribute.
    ///
    /// # Errors
    ///
    /// Returns an input error for an empty key, or the store's error.
    pub fn set(&mut self, key: &str, value: impl Into<AttributeValue>) -> Result<()> {
        check_key(key, "config.set")?;
        self.store.set(key, value.into())
    }

    /// Set a configuration attribute from loose JSON.
    ///
    /// # Errors
    ///
    /// Also rejects `null`.
    pub fn set_json(&mut self, key: &str, value: Value) -> Result<()> {
        check_key(key, "config.set")?;
        let value = defined(value, "config.set", key)?;
        self.store.set(key, value)
    }

    /// Download `file_name` from the device into attribute `key`.
    ///
    /// # Errors
    ///
    /// Returns an input error for an empty key or file name, an unknown
    /// method, or the store's error.
    pub fn download(
        &mut self,
        key: &str,
        method: &str,
        file_name: &str,
        store_file_name: Option<&str>,
    ) -> Result<()> {
        check_key(key, "config.download")?;
        let method: DownloadMethod = method.parse()?;
        if file_name.is_empty() {
            return Err(CliError::invalid_input(
                "the remote file name should be a non-empty string in config.download",
            ));
        }
        let request = DownloadRequest {
            key: key.to_string(),
            method,
            remote_file: file_name.to_string(),
            store_file: store_file_name.filter(|name| !name.is_empty()).map(str::to_string),
        };
        tracing::debug!(key = %key, method = %method, file = %file_name, "Downloading file from device");
        self.store.download(&request)
    }
}

impl fmt::Debug for ConfigHelper<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigHelper").finish_non_exhaustive()
    }
}

/// Diagnostic facade passed to scripted diagnostics.
pub struct DiagnosticHelper<'a> {
    store: &'a mut dyn DiagnosticStore,
    current: String,
}

impl<'a> DiagnosticHelper<'a> {
    /// Wrap a diagnostic store, with `current` as the running diagnostic.
    pub fn new(store: &'a mut dyn DiagnosticStore, current: impl Into<String>) -> Self {
        Self {
            store,
            current: current.into(),
        }
    }

    /// Name of the running diagnostic.
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Store the result of the running diagnostic.
    pub fn set(&mut self, value: impl Into<AttributeValue>) -> Result<()> {
        self.store.set_result(&self.current, value.into())
    }

    /// Store the result of another diagnostic by name.
    ///
    /// # Errors
    ///
    /// Returns an input error for an empty key, or the store's error.
    pub fn set_key(&mut self, key: &str, value: impl Into<AttributeValue>) -> Result<()> {
        check_key(key, "diagnostic.set")?;
        self.store.set_result(key, value.into())
    }
}

impl fmt::Debug for DiagnosticHelper<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticHelper")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// The `debug` function handed to driver routines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptLogger;

impl ScriptLogger {
    /// Emit a driver debug message.
    pub fn debug(&self, message: &str) {
        tracing::debug!(target: crate::logging::SCRIPT_TARGET, "{message}");
    }
}

/// Stores that keep everything in memory.
///
/// Implements all three store traits; useful for tests and for callers
/// that persist results themselves afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Single-valued attributes.
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Multi-valued attributes.
    pub collections: BTreeMap<String, Vec<AttributeValue>>,
    /// Configuration attributes.
    pub config: BTreeMap<String, AttributeValue>,
    /// Requested downloads, in order.
    pub downloads: Vec<DownloadRequest>,
    /// Diagnostics to hand out.
    pub pending_diagnostics: Vec<super::Diagnostic>,
    /// Diagnostic results.
    pub results: BTreeMap<String, AttributeValue>,
    /// Number of resets.
    pub resets: usize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a diagnostic to run.
    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: super::Diagnostic) -> Self {
        self.pending_diagnostics.push(diagnostic);
        self
    }
}

impl DeviceStore for MemoryStore {
    fn reset(&mut self) {
        self.attributes.clear();
        self.collections.clear();
        self.resets += 1;
    }

    fn set(&mut self, key: &str, value: AttributeValue) -> Result<()> {
        self.attributes.insert(key.to_string(), value);
        Ok(())
    }

    fn add(&mut self, collection: &str, value: AttributeValue) -> Result<()> {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(value);
        Ok(())
    }

    fn get(&self, key: &str) -> Option<AttributeValue> {
        self.attributes.get(key).cloned()
    }
}

impl ConfigStore for MemoryStore {
    fn set(&mut self, key: &str, value: AttributeValue) -> Result<()> {
        self.config.insert(key.to_string(), value);
        Ok(())
    }

    fn download(&mut self, request: &DownloadRequest) -> Result<()> {
        self.downloads.push(request.clone());
        Ok(())
    }
}

impl DiagnosticStore for MemoryStore {
    fn diagnostics(&self) -> Vec<super::Diagnostic> {
        self.pending_diagnostics.clone()
    }

    fn set_result(&mut self, name: &str, value: AttributeValue) -> Result<()> {
        self.results.insert(name.to_string(), value);
        Ok(())
    }
}
