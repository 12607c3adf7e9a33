//! Snapshot example.
//!
//! Loads a driver profile, runs a snapshot routine through the script host
//! against a scripted IOS device, and checks a compliance rule on the
//! collected data.
//!
//! Run with: `cargo run --example ios_snapshot --features mock`

#[cfg(feature = "mock")]
use std::sync::Arc;

#[cfg(feature = "mock")]
use rust_climode::compliance::{ProviderValue, RuleDataProvider, RuleDevice, evaluate};
#[cfg(feature = "mock")]
use rust_climode::config::ConfigFormat;
#[cfg(feature = "mock")]
use rust_climode::host::MemoryStore;
#[cfg(feature = "mock")]
use rust_climode::logging::init_tracing;
#[cfg(feature = "mock")]
use rust_climode::mock::ScriptBuilder;
#[cfg(feature = "mock")]
use rust_climode::prelude::*;
#[cfg(feature = "mock")]
use serde_json::Value;

#[cfg(feature = "mock")]
const PROFILE: &str = r#"
[engine]
command_timeout = 10000

[engine.logging]
filter = "rust_climode=debug"
format = "compact"

[modes.telnet]
prompt = '^([\w.-]+)>\s*$'

[modes.telnet.macros.enable]
cmd = "enable"
options = ["enable", "telnet"]
target = "enable"

[modes.enable]
prompt = '^([\w.-]+)#\s*$'
error = '^% (.*)'
pager = { match = ' --More-- $', response = " " }
"#;

fn main() {
    println!("rust-climode Snapshot Example");
    println!("=============================\n");

    #[cfg(not(feature = "mock"))]
    {
        println!("This example requires the 'mock' feature.");
        println!("Run with: cargo run --example ios_snapshot --features mock");
        return;
    }

    #[cfg(feature = "mock")]
    if let Err(e) = run() {
        eprintln!("snapshot failed: {e}");
        std::process::exit(1);
    }
}

/// Collects the software version and every interface.
#[cfg(feature = "mock")]
struct IosDriver;

#[cfg(feature = "mock")]
impl DeviceDriver for IosDriver {
    fn snapshot<T: Transport>(
        &self,
        cli: &mut CliSession<T>,
        device: &mut DeviceHelper<'_>,
        config: &mut ConfigHelper<'_>,
        debug: &ScriptLogger,
    ) -> Result<()> {
        cli.run_macro("enable")?;

        let version = cli.command("show version")?;
        if let Some(line) = version.lines().find(|l| l.contains("Version")) {
            debug.debug(line);
            device.set("softwareVersion", line.trim())?;
        }

        let running = cli.command("show running-config")?;
        for section in cli.find_sections(&running, r"^interface (\S+)")? {
            device.add_json(
                "networkInterface",
                serde_json::json!({
                    "name": section.get(1).unwrap_or_default(),
                    "description": section.lines.iter()
                        .find_map(|l| l.trim().strip_prefix("description "))
                        .unwrap_or_default(),
                }),
            )?;
        }
        config.set("runningConfig", running)
    }
}

/// Serves the snapshot back to rules.
#[cfg(feature = "mock")]
struct Collected(MemoryStore, MemoryStore);

#[cfg(feature = "mock")]
impl RuleDataProvider for Collected {
    fn get(&self, key: &str) -> Result<ProviderValue> {
        if let Some(value) = self.1.config.get(key) {
            return Ok(value.clone().into());
        }
        if let Some(values) = self.0.collections.get(key) {
            return Ok(values.clone().into());
        }
        Ok(self
            .0
            .attributes
            .get(key)
            .map_or(ProviderValue::Missing, |v| v.clone().into()))
    }

    fn get_from(
        &self,
        _key: &str,
        _device: &rust_climode::compliance::DeviceRef,
    ) -> Result<ProviderValue> {
        Ok(ProviderValue::Missing)
    }
}

#[cfg(feature = "mock")]
fn every_interface_described(device: &RuleDevice<'_>) -> Result<Value> {
    let interfaces = device.get("networkInterface")?;
    let missing: Vec<&str> = interfaces
        .as_array()
        .into_iter()
        .flatten()
        .filter(|i| i["description"].as_str().is_none_or(str::is_empty))
        .filter_map(|i| i["name"].as_str())
        .collect();
    if missing.is_empty() {
        Ok(Value::from("CONFORMING"))
    } else {
        Ok(serde_json::json!({
            "result": "NONCONFORMING",
            "comment": format!("no description on {}", missing.join(", ")),
        }))
    }
}

#[cfg(feature = "mock")]
fn run() -> Result<()> {
    let profile = DriverProfile::parse(PROFILE, ConfigFormat::Toml)?;
    init_tracing(&profile.engine.logging)?;

    println!("1. Loaded profile with {} modes", profile.modes.len());

    let transport = ScriptBuilder::new()
        .reply("enable\r\nedge-1#")
        .reply("show version\r\nCisco IOS Software, Version 15.2(4)M7, RELEASE SOFTWARE\r\nedge-1#")
        .reply("show running-config\r\ninterface Gi0/0\r\n description uplink\r\n --More-- ")
        .reply("\x08\x08\x08\x08\x08\x08\x08\x08\x08\x08interface Gi0/1\r\n shutdown\r\nedge-1#")
        .build();

    let host = ScriptHost::new(Arc::new(profile.modes)).engine_config(profile.engine);
    let mut device = MemoryStore::new();
    let mut config = MemoryStore::new();
    let transport = host.connect(
        transport,
        "telnet",
        ScriptFunction::Snapshot,
        &IosDriver,
        HostStores::new(&mut device).config(&mut config),
    )?;

    println!("2. Snapshot done, {} commands sent", transport.send_count());
    for (key, value) in &device.attributes {
        println!("   {key} = {value}");
    }
    for value in device.collections.values().flatten() {
        println!("   interface {}", value.to_json());
    }

    let verdict = evaluate(&every_interface_described, &Collected(device, config));
    println!("3. Rule verdict: {} ({})", verdict.result, verdict.comment);

    Ok(())
}
