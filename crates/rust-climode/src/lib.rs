//! rust-climode: Prompt-driven CLI mode engine for network devices
//!
//! This crate drives an interactive device CLI (routers, switches,
//! firewalls) through a declarative graph of modes. Each mode is known by
//! its prompt; macros move the device between modes; commands run in the
//! current mode and come back cleaned of pager prompts, terminal
//! overwrites and the echoed command.
//!
//! # Features
//!
//! - **Mode registry** validated once, loadable from TOML or JSON profiles
//! - **Macro walks** with automatic recovery through `auto` macros
//! - **Pager handling** by response or by up-front avoid commands
//! - **Output cleanup** and indentation-based section extraction
//! - **Script host** facades for snapshot, run and diagnostics routines
//! - **Compliance evaluator** boundary for rules over device data
//! - **Mock transport** for testing drivers (feature: `mock`)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rust_climode::mock::ScriptBuilder;
//! use rust_climode::prelude::*;
//!
//! # fn main() -> rust_climode::Result<()> {
//! let registry = ModeRegistry::builder()
//!     .mode(
//!         "userExec",
//!         Mode::new(prompt!(r"^([\w.-]+)>\s*$")).macro_step(
//!             "enable",
//!             macro_step! { cmd "enable"; options ["enable", "userExec"]; target "enable" },
//!         ),
//!     )
//!     .mode("enable", Mode::new(prompt!(r"^([\w.-]+)#\s*$")))
//!     .build()?;
//!
//! let transport = ScriptBuilder::new()
//!     .reply("enable\r\nedge-1#")
//!     .reply("show version | include uptime\r\nedge-1 uptime is 3 weeks\r\nedge-1#")
//!     .build();
//!
//! let mut cli = CliSession::new(transport, Arc::new(registry), "userExec")?;
//! cli.run_macro("enable")?;
//! let uptime = cli.command("show version | include uptime")?;
//! assert_eq!(uptime, "edge-1 uptime is 3 weeks\r\n");
//! # Ok(())
//! # }
//! ```

// Lets the proc macros name `::rust_climode` from inside this crate.
extern crate self as rust_climode;

// Re-export macros
pub use rust_climode_macros::{macro_step, prompt};

pub mod compliance;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod mode;
pub mod normalize;
pub mod pattern;
pub mod prelude;
pub mod section;
pub mod session;
pub mod transport;

/// Scripted transport for testing drivers.
#[cfg(feature = "mock")]
pub mod mock;

pub use compliance::{RuleResult, RuleVerdict, evaluate};
pub use config::{DriverProfile, EngineConfig, LogFormat, LoggingConfig};
pub use error::{CliError, Result};
pub use host::{DeviceDriver, ScriptFunction, ScriptHost, connect};
pub use mode::{AUTO_MACRO, MacroStep, Mode, ModeRegistry, Pager};
pub use normalize::{normalize_output, remove_echo};
pub use pattern::PromptPattern;
pub use section::{Section, find_sections};
pub use session::{CliSession, CommandOptions, ModeOverride};
pub use transport::{AsyncTransport, BlockingTransport, Exchange, SendRequest, Transport};

#[cfg(feature = "mock")]
pub use mock::{ScriptBuilder, ScriptedTransport};
