//! The session engine.
//!
//! A [`CliSession`] tracks which mode a device is in and drives it with
//! four operations:
//!
//! - [`CliSession::run_macro`] walks the mode graph to a macro's target
//! - [`CliSession::command`] runs one command and returns cleaned output
//! - [`CliSession::find_sections`] extracts indented blocks from output
//! - [`CliSession::sleep`] waits through the transport
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rust_climode::mock::ScriptBuilder;
//! use rust_climode::{CliSession, MacroStep, Mode, ModeRegistry, PromptPattern};
//!
//! # fn main() -> rust_climode::Result<()> {
//! let registry = ModeRegistry::builder()
//!     .mode(
//!         "userExec",
//!         Mode::new(PromptPattern::new(r"^([\w.-]+)>\s*$")?).macro_step(
//!             "enable",
//!             MacroStep::new(["enable", "userExec"]).cmd("enable").target("enable"),
//!         ),
//!     )
//!     .mode("enable", Mode::new(PromptPattern::new(r"^([\w.-]+)#\s*$")?))
//!     .build()?;
//!
//! let transport = ScriptBuilder::new()
//!     .reply("enable\r\ncore-1#")
//!     .reply("show clock\r\n12:00:00 UTC\r\ncore-1#")
//!     .build();
//!
//! let mut cli = CliSession::new(transport, Arc::new(registry), "userExec")?;
//! cli.run_macro("enable")?;
//! assert_eq!(cli.current_mode(), "enable");
//! assert_eq!(cli.command("show clock")?, "12:00:00 UTC\r\n");
//! # Ok(())
//! # }
//! ```

mod command;
mod handle;
mod options;
mod pager;
mod state;
mod walk;

pub use handle::CliSession;
pub use options::{CommandOptions, ModeOverride};
pub use state::{ActivePager, SessionState};
