//! Integration tests for the script host and the compliance evaluator.

#![cfg(feature = "mock")]

use std::collections::BTreeMap;
use std::sync::Arc;

use regex::Regex;
use rust_climode::compliance::{
    DeviceRef, ProviderValue, RuleDataProvider, RuleDevice, RuleResult, evaluate,
};
use rust_climode::host::{
    AttributeValue, ConfigHelper, DeviceDriver, DeviceHelper, Diagnostic, DiagnosticHelper,
    HostStores, MemoryStore, ScriptFunction, ScriptLogger, connect,
};
use rust_climode::mock::{ScriptBuilder, ScriptedTransport};
use rust_climode::{
    CliError, CliSession, MacroStep, Mode, ModeRegistry, PromptPattern, Result, Transport,
};
use serde_json::{Value, json};

fn registry() -> Arc<ModeRegistry> {
    Arc::new(
        ModeRegistry::builder()
            .mode(
                "telnet",
                Mode::new(PromptPattern::new(r"^([\w.-]+)>\s*$").unwrap()).macro_step(
                    "enable",
                    MacroStep::new(["enable", "telnet"]).cmd("enable").target("enable"),
                ),
            )
            .mode(
                "enable",
                Mode::new(PromptPattern::new(r"^([\w.-]+)#\s*$").unwrap())
                    .error(PromptPattern::new(r"^% (.*)").unwrap()),
            )
            .build()
            .unwrap(),
    )
}

/// A small IOS-like driver.
struct Ios;

impl DeviceDriver for Ios {
    fn snapshot<T: Transport>(
        &self,
        cli: &mut CliSession<T>,
        device: &mut DeviceHelper<'_>,
        config: &mut ConfigHelper<'_>,
        debug: &ScriptLogger,
    ) -> Result<()> {
        cli.run_macro("enable")?;
        let version = cli.command("show version")?;
        let release = Regex::new(r"Version (\S+),")
            .ok()
            .and_then(|re| re.captures(&version))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        debug.debug(&format!("found release {release}"));
        device.set("softwareVersion", release)?;
        device.set("networkClass", "ROUTER")?;

        let running = cli.command("show running-config")?;
        for section in cli.find_sections(&running, r"^interface (\S+)")? {
            device.add_json(
                "networkInterface",
                json!({
                    "name": section.get(1).unwrap_or_default(),
                    "enabled": !section.config.contains("shutdown"),
                }),
            )?;
        }
        config.set("runningConfig", running)?;
        config.download("startupConfig", "scp", "nvram:/startup-config", None)
    }

    fn run<T: Transport>(
        &self,
        cli: &mut CliSession<T>,
        device: &mut DeviceHelper<'_>,
        config: &mut ConfigHelper<'_>,
        debug: &ScriptLogger,
    ) -> Result<()> {
        cli.run_macro("enable")?;
        let users = cli.command("show users")?;
        for line in users.lines().filter(|l| l.contains("vty")) {
            debug.debug(line);
            device.add_json("session", json!({"line": line.trim()}))?;
        }
        device.set("lastRun", "ok")?;
        config.set("users", users)
    }

    fn diagnose<T: Transport>(
        &self,
        cli: &mut CliSession<T>,
        _device: &mut DeviceHelper<'_>,
        diagnostic: &mut DiagnosticHelper<'_>,
    ) -> Result<()> {
        let output = cli.command("show processes cpu | include CPU")?;
        diagnostic.set(output.contains("five seconds: 0%"))
    }
}

/// A driver that only knows how to snapshot.
struct SnapshotOnly;

impl DeviceDriver for SnapshotOnly {
    fn snapshot<T: Transport>(
        &self,
        _cli: &mut CliSession<T>,
        _device: &mut DeviceHelper<'_>,
        _config: &mut ConfigHelper<'_>,
        _debug: &ScriptLogger,
    ) -> Result<()> {
        Ok(())
    }
}

fn snapshot_transport() -> ScriptedTransport {
    ScriptBuilder::new()
        .reply("enable\r\nr1#")
        .reply("show version\r\nCisco IOS Software, Version 15.2(4)M7, RELEASE\r\nr1#")
        .reply(
            "show running-config\r\ninterface Gi0/0\r\n ip address 10.0.0.1 255.255.255.0\r\ninterface Gi0/1\r\n shutdown\r\nr1#",
        )
        .build()
}

#[test]
fn snapshot_collects_device_and_config() {
    let transport = snapshot_transport();
    let mut device = MemoryStore::new();
    device.attributes.insert("stale".into(), AttributeValue::from("x"));
    let mut config = MemoryStore::new();

    connect(
        transport.clone(),
        registry(),
        "telnet",
        ScriptFunction::Snapshot,
        &Ios,
        HostStores::new(&mut device).config(&mut config),
    )
    .unwrap();

    assert_eq!(device.resets, 1);
    assert!(!device.attributes.contains_key("stale"));
    assert_eq!(
        device.attributes["softwareVersion"],
        AttributeValue::from("15.2(4)M7")
    );
    let interfaces = &device.collections["networkInterface"];
    assert_eq!(interfaces.len(), 2);
    assert_eq!(interfaces[1].to_json()["enabled"], json!(false));
    assert_eq!(interfaces[0].to_json()["__"], json!({}));
    assert!(
        config.config["runningConfig"]
            .as_text()
            .unwrap()
            .starts_with("interface Gi0/0")
    );
    assert_eq!(config.downloads[0].remote_file, "nvram:/startup-config");
    assert_eq!(transport.pending(), 0);
}

#[test]
fn snapshot_without_config_store_is_rejected() {
    let mut device = MemoryStore::new();
    let err = connect(
        ScriptedTransport::new(),
        registry(),
        "telnet",
        ScriptFunction::Snapshot,
        &Ios,
        HostStores::new(&mut device),
    )
    .unwrap_err();

    assert!(err.is_config());
    assert_eq!(device.resets, 0);
}

#[test]
fn unknown_protocol_mode_is_rejected() {
    let mut device = MemoryStore::new();
    let err = connect(
        ScriptedTransport::new(),
        registry(),
        "ssh",
        ScriptFunction::Run,
        &Ios,
        HostStores::new(&mut device),
    )
    .unwrap_err();
    assert!(err.is_config());
}

#[test]
fn run_gets_full_device_and_config() {
    let transport = ScriptBuilder::new()
        .reply("enable\r\nr1#")
        .reply("show users\r\n*  2 vty 0     admin   idle 00:00:00 10.0.0.9\r\n   3 vty 1     ops     idle 00:01:12 10.0.0.7\r\nr1#")
        .build();
    let mut device = MemoryStore::new();
    device.attributes.insert("kept".into(), AttributeValue::from("x"));
    let mut config = MemoryStore::new();

    connect(
        transport.clone(),
        registry(),
        "telnet",
        ScriptFunction::Run,
        &Ios,
        HostStores::new(&mut device).config(&mut config),
    )
    .unwrap();

    assert_eq!(device.resets, 0);
    assert!(device.attributes.contains_key("kept"));
    assert_eq!(device.attributes["lastRun"], AttributeValue::from("ok"));
    let sessions = &device.collections["session"];
    assert_eq!(sessions.len(), 2);
    assert!(sessions[1].to_json()["line"].as_str().unwrap().contains("ops"));
    assert!(config.config["users"].as_text().unwrap().contains("admin"));
    assert_eq!(transport.sent_texts(), vec!["enable\r", "show users\r"]);
}

#[test]
fn run_without_config_store_is_rejected() {
    let mut device = MemoryStore::new();
    let err = connect(
        ScriptedTransport::new(),
        registry(),
        "telnet",
        ScriptFunction::Run,
        &Ios,
        HostStores::new(&mut device),
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "configuration error: run needs a configuration store"
    );
}

#[test]
fn run_without_run_function_fails() {
    let mut device = MemoryStore::new();
    let mut config = MemoryStore::new();
    let err = connect(
        ScriptedTransport::new(),
        registry(),
        "telnet",
        ScriptFunction::Run,
        &SnapshotOnly,
        HostStores::new(&mut device).config(&mut config),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "configuration error: No 'run' function");
}

#[test]
fn diagnostics_run_simple_and_scripted() {
    let transport = ScriptBuilder::new()
        .reply("enable\r\nr1#")
        .reply("show clock\r\n*10:42:00.123 UTC Mon Oct 19 2026\r\nr1#")
        .reply("show processes cpu | include CPU\r\nCPU utilization for five seconds: 0%/0%\r\nr1#")
        .build();
    let mut device = MemoryStore::new();
    let mut diagnostics = MemoryStore::new()
        .with_diagnostic(Diagnostic::simple("clock", "enable", "show clock"))
        .with_diagnostic(Diagnostic::scripted("cpuIdle"));

    connect(
        transport.clone(),
        registry(),
        "telnet",
        ScriptFunction::Diagnostics,
        &Ios,
        HostStores::new(&mut device).diagnostics(&mut diagnostics),
    )
    .unwrap();

    assert_eq!(
        diagnostics.results["clock"],
        AttributeValue::from("*10:42:00.123 UTC Mon Oct 19 2026\r\n")
    );
    assert_eq!(diagnostics.results["cpuIdle"], AttributeValue::from(true));
    assert_eq!(
        transport.sent_texts(),
        vec!["enable\r", "show clock\r", "show processes cpu | include CPU\r"]
    );
}

#[test]
fn diagnostic_device_error_propagates() {
    let transport = ScriptBuilder::new()
        .reply("enable\r\nr1#")
        .reply("show inventroy\r\n% Invalid input detected\r\nr1#")
        .build();
    let mut device = MemoryStore::new();
    let mut diagnostics =
        MemoryStore::new().with_diagnostic(Diagnostic::simple("inventory", "enable", "show inventroy"));

    let err = connect(
        transport,
        registry(),
        "telnet",
        ScriptFunction::Diagnostics,
        &Ios,
        HostStores::new(&mut device).diagnostics(&mut diagnostics),
    )
    .unwrap_err();

    assert!(err.is_device_reported());
    assert!(diagnostics.results.is_empty());
}

/// Rule data backed by a snapshot taken through the host.
struct Snapshot {
    store: MemoryStore,
    config: MemoryStore,
}

impl RuleDataProvider for Snapshot {
    fn get(&self, key: &str) -> Result<ProviderValue> {
        if let Some(value) = self.config.config.get(key) {
            return Ok(value.clone().into());
        }
        if let Some(values) = self.store.collections.get(key) {
            return Ok(values.clone().into());
        }
        Ok(self
            .store
            .attributes
            .get(key)
            .map_or(ProviderValue::Missing, |v| v.clone().into()))
    }

    fn get_from(&self, key: &str, device: &DeviceRef) -> Result<ProviderValue> {
        match device {
            DeviceRef::Name(name) if name == "r1" => self.get(key),
            _ => Ok(ProviderValue::Map(BTreeMap::new())),
        }
    }
}

fn no_shutdown_interfaces(device: &RuleDevice<'_>) -> Result<Value> {
    let running = device.get("runningConfig")?;
    let text = running
        .as_str()
        .ok_or_else(|| CliError::invalid_input("no running configuration"))?;
    let down: Vec<String> = device
        .find_sections(text, r"^interface (\S+)")?
        .into_iter()
        .filter(|s| s.config.contains("shutdown"))
        .map(|s| s.get(1).unwrap_or_default().to_string())
        .collect();
    if down.is_empty() {
        Ok(json!("CONFORMING"))
    } else {
        Ok(json!({"result": "NONCONFORMING", "comment": format!("shut: {}", down.join(", "))}))
    }
}

#[test]
fn rule_over_snapshot_data() {
    let mut store = MemoryStore::new();
    let mut config = MemoryStore::new();
    connect(
        snapshot_transport(),
        registry(),
        "telnet",
        ScriptFunction::Snapshot,
        &Ios,
        HostStores::new(&mut store).config(&mut config),
    )
    .unwrap();
    let data = Snapshot { store, config };

    let verdict = evaluate(&no_shutdown_interfaces, &data);

    assert_eq!(verdict.result, RuleResult::Nonconforming);
    assert_eq!(verdict.comment, "shut: Gi0/1");

    let device = RuleDevice::new(&data);
    assert_eq!(device.get("networkClass").unwrap(), json!("ROUTER"));
    assert_eq!(
        device.get_from("softwareVersion", "r1").unwrap(),
        json!("15.2(4)M7")
    );
    assert_eq!(device.get("networkInterface").unwrap()[0]["name"], json!("Gi0/0"));
}

#[test]
fn rule_without_data_is_invalid() {
    let data = Snapshot {
        store: MemoryStore::new(),
        config: MemoryStore::new(),
    };

    let verdict = evaluate(&no_shutdown_interfaces, &data);

    assert_eq!(verdict.result, RuleResult::InvalidRule);
    assert!(verdict.comment.contains("no running configuration"));
}
