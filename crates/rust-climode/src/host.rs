//! Script host.
//!
//! The driver framework calls [`connect`] with a transport, the protocol
//! the device was reached with (which doubles as the initial mode), and
//! the routine to run. The host builds a [`CliSession`](crate::CliSession),
//! wraps the framework's stores in checked facades and hands both to the
//! driver.

mod entry;
mod facade;

pub use entry::{
    DeviceDriver, Diagnostic, DiagnosticKind, HostStores, ScriptFunction, ScriptHost, connect,
};
pub use facade::{
    AttributeValue, ConfigHelper, ConfigStore, DeviceHelper, DeviceStore, DiagnosticHelper,
    DiagnosticStore, DownloadMethod, DownloadRequest, MemoryStore, STRUCTURED_MARKER,
    ScriptLogger,
};
