//! rust-climode-macros: Procedural macros for rust-climode
//!
//! Compile-time helpers for writing mode registries in Rust:
//!
//! - [`prompt!`] - a prompt pattern whose regex is checked at compile time
//! - [`macro_step!`] - a macro step written as keyword clauses
//!
//! # Example
//!
//! ```ignore
//! use rust_climode::{Mode, macro_step, prompt};
//!
//! let user_exec = Mode::new(prompt!(r"^([\w.-]+)>\s*$")).macro_step(
//!     "enable",
//!     macro_step! {
//!         cmd "enable";
//!         options ["enable", "password", "userExec"];
//!         target "enable";
//!     },
//! );
//! ```

// In proc-macro crates, passing parsed input by value is idiomatic
#![allow(clippy::needless_pass_by_value)]

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod prompt;
mod step;

/// Compile-time validated prompt pattern.
///
/// Expands to a `rust_climode::PromptPattern`. An invalid regex is a
/// compilation error.
///
/// # Examples
///
/// ```ignore
/// let enable = prompt!(r"^([\w.-]+)#\s*$");
///
/// // Compilation error
/// // let bad = prompt!(r"^([\w.-]+#");
/// ```
#[proc_macro]
pub fn prompt(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as prompt::PromptInput);
    prompt::expand(input).into()
}

/// Build a `rust_climode::MacroStep` from keyword clauses.
///
/// # Syntax
///
/// ```ignore
/// macro_step! {
///     cmd "configure terminal";    // optional
///     options ["configure", "enable"];  // required, non-empty
///     target "configure";          // optional
///     timeout 5000;                // ms, optional
///     wait_before 100;             // ms, optional
///     wait_after 100;              // ms, optional
///     no_cr;                       // optional
/// }
/// ```
///
/// Unknown or repeated keywords and an empty `options` list are
/// compilation errors.
#[proc_macro]
pub fn macro_step(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as step::StepInput);
    step::expand(input).into()
}
