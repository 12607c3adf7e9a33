//! Device CLI modes.
//!
//! A mode is a named CLI state identified by its prompt. Macros describe
//! how to move between modes; the registry holds every mode of one device
//! type and is checked for consistency when it is built.

mod definition;
mod registry;

pub use definition::{AUTO_MACRO, MacroStep, Mode, Pager};
pub use registry::{ModeRegistry, ModeRegistryBuilder};
