//! Read-only device facade for rules.

use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, ToSocketAddrs};

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::host::AttributeValue;
use crate::section::{self, Section};

/// A device other than the one being checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceRef {
    /// By database id.
    Id(u64),
    /// By name.
    Name(String),
}

impl From<u64> for DeviceRef {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for DeviceRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// A value as the data provider holds it.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderValue {
    /// Nothing stored.
    Missing,
    /// A single value.
    Scalar(AttributeValue),
    /// An ordered collection.
    List(Vec<ProviderValue>),
    /// A keyed collection.
    Map(BTreeMap<String, ProviderValue>),
}

impl From<AttributeValue> for ProviderValue {
    fn from(value: AttributeValue) -> Self {
        Self::Scalar(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for ProviderValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Convert a provider value into plain JSON, all the way down.
#[must_use]
pub fn to_native(value: &ProviderValue) -> Value {
    match value {
        ProviderValue::Missing => Value::Null,
        ProviderValue::Scalar(scalar) => scalar.to_json(),
        ProviderValue::List(items) => Value::Array(items.iter().map(to_native).collect()),
        ProviderValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), to_native(value)))
                .collect(),
        ),
    }
}

/// Result of a host lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostRecord {
    /// Host name; empty when the lookup failed.
    pub name: String,
    /// Address; empty when the lookup failed.
    pub address: String,
}

/// Where rules read device data from.
pub trait RuleDataProvider {
    /// Read `key` on the device being checked.
    fn get(&self, key: &str) -> Result<ProviderValue>;

    /// Read `key` on another device.
    fn get_from(&self, key: &str, device: &DeviceRef) -> Result<ProviderValue>;

    /// Resolve a host name or address.
    ///
    /// The default resolves through the system resolver and reports the
    /// queried name with the first address found.
    fn lookup(&self, host: &str) -> Option<HostRecord> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Some(HostRecord {
                name: host.to_string(),
                address: ip.to_string(),
            });
        }
        let mut addrs = (host, 0).to_socket_addrs().ok()?;
        addrs.next().map(|addr| HostRecord {
            name: host.to_string(),
            address: addr.ip().to_string(),
        })
    }
}

/// The `device` object a rule receives.
pub struct RuleDevice<'p> {
    provider: &'p dyn RuleDataProvider,
}

impl<'p> RuleDevice<'p> {
    /// Wrap a data provider.
    pub fn new(provider: &'p dyn RuleDataProvider) -> Self {
        Self { provider }
    }

    /// Read `key` on the device being checked, as plain JSON.
    pub fn get(&self, key: &str) -> Result<Value> {
        Ok(to_native(&self.provider.get(key)?))
    }

    /// Read `key` on another device, as plain JSON.
    pub fn get_from(&self, key: &str, device: impl Into<DeviceRef>) -> Result<Value> {
        Ok(to_native(&self.provider.get_from(key, &device.into())?))
    }

    /// Resolve a host; both fields are empty when it cannot be resolved.
    #[must_use]
    pub fn nslookup(&self, host: &str) -> HostRecord {
        self.provider.lookup(host).unwrap_or_default()
    }

    /// Extract indentation-delimited sections from `text`.
    pub fn find_sections(&self, text: &str, pattern: &str) -> Result<Vec<Section>> {
        section::find_sections_str(text, pattern)
    }
}

impl fmt::Debug for RuleDevice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDevice").finish_non_exhaustive()
    }
}
