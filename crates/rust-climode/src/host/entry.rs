//! The connect entry point.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::facade::{
    ConfigHelper, ConfigStore, DeviceHelper, DeviceStore, DiagnosticHelper, DiagnosticStore,
    ScriptLogger,
};
use crate::config::EngineConfig;
use crate::error::{CliError, Result};
use crate::mode::ModeRegistry;
use crate::session::CliSession;
use crate::transport::Transport;

/// Driver routine requested by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptFunction {
    /// Collect device data and configuration.
    Snapshot,
    /// Run an ad-hoc script.
    Run,
    /// Run the configured diagnostics.
    Diagnostics,
}

impl FromStr for ScriptFunction {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "snapshot" => Ok(Self::Snapshot),
            "run" => Ok(Self::Run),
            "diagnostics" => Ok(Self::Diagnostics),
            _ => Err(CliError::invalid_input(format!("unknown driver function '{s}'"))),
        }
    }
}

impl fmt::Display for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot => f.write_str("snapshot"),
            Self::Run => f.write_str("run"),
            Self::Diagnostics => f.write_str("diagnostics"),
        }
    }
}

/// How a diagnostic is carried out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// Switch to `mode` and store the output of `command`.
    Simple {
        /// Macro run before the command.
        mode: String,
        /// Command whose output is the result.
        command: String,
    },
    /// Handled by [`DeviceDriver::diagnose`].
    Scripted,
}

/// A diagnostic to run on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Name the result is stored under.
    pub name: String,
    /// What to do.
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// A diagnostic that runs `command` after macro `mode`.
    pub fn simple(
        name: impl Into<String>,
        mode: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: DiagnosticKind::Simple {
                mode: mode.into(),
                command: command.into(),
            },
        }
    }

    /// A diagnostic handled by the driver.
    pub fn scripted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DiagnosticKind::Scripted,
        }
    }
}

/// Routines a device driver provides.
///
/// Only `snapshot` is required. The other hooks fail with a configuration
/// error unless the driver overrides them.
pub trait DeviceDriver {
    /// Collect device attributes and configuration.
    fn snapshot<T: Transport>(
        &self,
        cli: &mut CliSession<T>,
        device: &mut DeviceHelper<'_>,
        config: &mut ConfigHelper<'_>,
        debug: &ScriptLogger,
    ) -> Result<()>;

    /// Run an ad-hoc script.
    ///
    /// Unlike `snapshot`, the device store is not reset first.
    fn run<T: Transport>(
        &self,
        cli: &mut CliSession<T>,
        device: &mut DeviceHelper<'_>,
        config: &mut ConfigHelper<'_>,
        debug: &ScriptLogger,
    ) -> Result<()> {
        let _ = (cli, device, config, debug);
        Err(CliError::config("No 'run' function"))
    }

    /// Carry out a scripted diagnostic.
    fn diagnose<T: Transport>(
        &self,
        cli: &mut CliSession<T>,
        device: &mut DeviceHelper<'_>,
        diagnostic: &mut DiagnosticHelper<'_>,
    ) -> Result<()> {
        let _ = (cli, device);
        Err(CliError::config(format!(
            "No 'diagnose' function for diagnostic {}",
            diagnostic.current()
        )))
    }
}

/// The stores a driver routine writes to.
pub struct HostStores<'a> {
    /// Device attributes.
    pub device: &'a mut dyn DeviceStore,
    /// Configuration attributes; needed for snapshot and run.
    pub config: Option<&'a mut dyn ConfigStore>,
    /// Diagnostics to run and their results; needed for diagnostics.
    pub diagnostics: Option<&'a mut dyn DiagnosticStore>,
}

impl<'a> HostStores<'a> {
    /// Stores with only a device store.
    pub fn new(device: &'a mut dyn DeviceStore) -> Self {
        Self {
            device,
            config: None,
            diagnostics: None,
        }
    }

    /// Add a configuration store.
    #[must_use]
    pub fn config(mut self, config: &'a mut dyn ConfigStore) -> Self {
        self.config = Some(config);
        self
    }

    /// Add a diagnostic store.
    #[must_use]
    pub fn diagnostics(mut self, diagnostics: &'a mut dyn DiagnosticStore) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }
}

impl fmt::Debug for HostStores<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostStores")
            .field("config", &self.config.is_some())
            .field("diagnostics", &self.diagnostics.is_some())
            .finish_non_exhaustive()
    }
}

/// Builds sessions for driver routines.
#[derive(Debug, Clone)]
pub struct ScriptHost {
    registry: Arc<ModeRegistry>,
    config: EngineConfig,
}

impl ScriptHost {
    /// Create a host for one driver's mode registry.
    #[must_use]
    pub fn new(registry: Arc<ModeRegistry>) -> Self {
        Self {
            registry,
            config: EngineConfig::default(),
        }
    }

    /// Use custom engine settings.
    #[must_use]
    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Open a session in mode `protocol` and run `function` of `driver`.
    ///
    /// Hands the transport back when the routine succeeds.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `protocol` is not a mode of the
    /// registry or a store the routine needs is missing, and any error the
    /// routine returns.
    pub fn connect<T, D>(
        &self,
        transport: T,
        protocol: &str,
        function: ScriptFunction,
        driver: &D,
        stores: HostStores<'_>,
    ) -> Result<T>
    where
        T: Transport,
        D: DeviceDriver,
    {
        let mut cli = CliSession::with_config(
            transport,
            Arc::clone(&self.registry),
            protocol,
            self.config.clone(),
        )?;
        let debug = ScriptLogger;
        tracing::debug!(function = %function, protocol = %protocol, "Running driver function");

        match function {
            ScriptFunction::Snapshot => {
                let config_store = stores.config.ok_or_else(|| {
                    CliError::config("snapshot needs a configuration store")
                })?;
                stores.device.reset();
                let mut device = DeviceHelper::new(stores.device);
                let mut config = ConfigHelper::new(config_store);
                driver.snapshot(&mut cli, &mut device, &mut config, &debug)?;
            }
            ScriptFunction::Run => {
                let config_store = stores
                    .config
                    .ok_or_else(|| CliError::config("run needs a configuration store"))?;
                let mut device = DeviceHelper::new(stores.device);
                let mut config = ConfigHelper::new(config_store);
                driver.run(&mut cli, &mut device, &mut config, &debug)?;
            }
            ScriptFunction::Diagnostics => {
                let store = stores.diagnostics.ok_or_else(|| {
                    CliError::config("diagnostics need a diagnostic store")
                })?;
                let mut device = DeviceHelper::set_only(stores.device);
                for diagnostic in store.diagnostics() {
                    tracing::debug!(diagnostic = %diagnostic.name, "Running diagnostic");
                    let mut helper = DiagnosticHelper::new(&mut *store, diagnostic.name.as_str());
                    match &diagnostic.kind {
                        DiagnosticKind::Simple { mode, command } => {
                            cli.run_macro(mode)?;
                            let output = cli.command(command)?;
                            helper.set(output)?;
                        }
                        DiagnosticKind::Scripted => {
                            driver.diagnose(&mut cli, &mut device, &mut helper)?;
                        }
                    }
                }
            }
        }

        Ok(cli.into_transport())
    }
}

/// Open a session in mode `protocol` and run `function` of `driver`.
///
/// Shorthand for [`ScriptHost::connect`] with default engine settings.
///
/// # Errors
///
/// See [`ScriptHost::connect`].
pub fn connect<T, D>(
    transport: T,
    registry: Arc<ModeRegistry>,
    protocol: &str,
    function: ScriptFunction,
    driver: &D,
    stores: HostStores<'_>,
) -> Result<T>
where
    T: Transport,
    D: DeviceDriver,
{
    ScriptHost::new(registry).connect(transport, protocol, function, driver, stores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_names_round_trip() {
        for name in ["snapshot", "run", "diagnostics"] {
            let function: ScriptFunction = name.parse().unwrap();
            assert_eq!(function.to_string(), name);
        }
        assert!("backup".parse::<ScriptFunction>().is_err());
    }

    #[test]
    fn diagnostics_deserialize_from_json() {
        let diagnostic: Diagnostic = serde_json::from_str(
            r#"{"name": "uptime", "type": "simple", "mode": "enable", "command": "show version"}"#,
        )
        .unwrap();
        assert_eq!(diagnostic, Diagnostic::simple("uptime", "enable", "show version"));

        let scripted: Diagnostic =
            serde_json::from_str(r#"{"name": "cpu", "type": "scripted"}"#).unwrap();
        assert_eq!(scripted.kind, DiagnosticKind::Scripted);
    }
}
