//! Convenient re-exports for common rust-climode usage.
//!
//! ```rust
//! use rust_climode::prelude::*;
//!
//! let enable = Mode::new(prompt!(r"^([\w.-]+)#\s*$"));
//! assert!(enable.prompt.is_match("core-1#"));
//! ```

// Macros
pub use crate::{macro_step, prompt};

// Error handling
pub use crate::error::{CliError, Result};

// Mode graph
pub use crate::mode::{AUTO_MACRO, MacroStep, Mode, ModeRegistry, Pager};
pub use crate::pattern::PromptPattern;

// Configuration
pub use crate::config::{DriverProfile, EngineConfig, LogFormat, LoggingConfig};

// Sessions and transports
pub use crate::session::{CliSession, CommandOptions, ModeOverride};
pub use crate::transport::{AsyncTransport, BlockingTransport, Exchange, SendRequest, Transport};

// Output helpers
pub use crate::section::Section;

// Script host
pub use crate::host::{
    AttributeValue, ConfigHelper, DeviceDriver, DeviceHelper, DiagnosticHelper, HostStores,
    ScriptFunction, ScriptHost, ScriptLogger,
};
