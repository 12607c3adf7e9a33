//! The `prompt!` macro.

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{LitStr, Result};

/// The prompt! macro input.
pub struct PromptInput {
    /// The prompt regex source.
    pub pattern: LitStr,
}

impl Parse for PromptInput {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(Self {
            pattern: input.parse()?,
        })
    }
}

/// Generate code for the prompt! macro.
pub fn expand(input: PromptInput) -> TokenStream {
    let source = input.pattern.value();

    if let Err(e) = regex::Regex::new(&source) {
        return syn::Error::new(input.pattern.span(), format!("invalid prompt regex: {e}"))
            .to_compile_error();
    }

    let lit = &input.pattern;

    quote! {
        ::rust_climode::PromptPattern::new(#lit)
            .expect("prompt regex was validated at compile time")
    }
}
