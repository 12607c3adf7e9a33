//! The `macro_step!` macro.

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Ident, LitInt, LitStr, Result, Token, braced, bracketed};

/// One `keyword value` clause of a step.
pub enum StepClause {
    /// Command to send.
    Cmd(LitStr),
    /// Modes the device may land in.
    Options(Vec<LitStr>),
    /// Final mode of the macro.
    Target(LitStr),
    /// Exchange timeout in milliseconds.
    Timeout(LitInt),
    /// Pause before sending, in milliseconds.
    WaitBefore(LitInt),
    /// Pause after the exchange, in milliseconds.
    WaitAfter(LitInt),
    /// Send the command without a line ending.
    NoCr,
}

impl StepClause {
    const fn keyword(&self) -> &'static str {
        match self {
            Self::Cmd(_) => "cmd",
            Self::Options(_) => "options",
            Self::Target(_) => "target",
            Self::Timeout(_) => "timeout",
            Self::WaitBefore(_) => "wait_before",
            Self::WaitAfter(_) => "wait_after",
            Self::NoCr => "no_cr",
        }
    }
}

impl Parse for StepClause {
    fn parse(input: ParseStream) -> Result<Self> {
        let keyword: Ident = input.parse()?;

        match keyword.to_string().as_str() {
            "cmd" => Ok(Self::Cmd(input.parse()?)),
            "options" => {
                let content;
                bracketed!(content in input);
                let modes: Punctuated<LitStr, Token![,]> = Punctuated::parse_terminated(&content)?;
                if modes.is_empty() {
                    return Err(syn::Error::new(
                        keyword.span(),
                        "options must name at least one mode",
                    ));
                }
                Ok(Self::Options(modes.into_iter().collect()))
            }
            "target" => Ok(Self::Target(input.parse()?)),
            "timeout" => Ok(Self::Timeout(input.parse()?)),
            "wait_before" => Ok(Self::WaitBefore(input.parse()?)),
            "wait_after" => Ok(Self::WaitAfter(input.parse()?)),
            "no_cr" => Ok(Self::NoCr),
            other => Err(syn::Error::new(
                keyword.span(),
                format!("unknown macro step keyword: {other}"),
            )),
        }
    }
}

/// The macro_step! macro input.
pub struct StepInput {
    /// The clauses, in source order.
    pub clauses: Punctuated<StepClause, Token![;]>,
}

impl Parse for StepInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let span = input.span();
        let clauses: Punctuated<StepClause, Token![;]> = if input.peek(syn::token::Brace) {
            let content;
            braced!(content in input);
            Punctuated::parse_terminated(&content)?
        } else {
            Punctuated::parse_terminated(input)?
        };

        let mut seen = Vec::new();
        for clause in &clauses {
            let keyword = clause.keyword();
            if seen.contains(&keyword) {
                return Err(syn::Error::new(span, format!("duplicate macro step keyword: {keyword}")));
            }
            seen.push(keyword);
        }
        if !seen.contains(&"options") {
            return Err(syn::Error::new(span, "a macro step needs an options list"));
        }

        Ok(Self { clauses })
    }
}

/// Generate code for the macro_step! macro.
pub fn expand(input: StepInput) -> TokenStream {
    let mut options = Vec::new();
    let mut calls = Vec::new();

    for clause in input.clauses {
        match clause {
            StepClause::Options(modes) => options = modes,
            StepClause::Cmd(cmd) => calls.push(quote! { .cmd(#cmd) }),
            StepClause::Target(target) => calls.push(quote! { .target(#target) }),
            StepClause::Timeout(ms) => calls.push(quote! { .timeout_ms(#ms) }),
            StepClause::WaitBefore(ms) => calls.push(quote! { .wait_before_ms(#ms) }),
            StepClause::WaitAfter(ms) => calls.push(quote! { .wait_after_ms(#ms) }),
            StepClause::NoCr => calls.push(quote! { .no_cr() }),
        }
    }

    quote! {
        ::rust_climode::MacroStep::new([#(#options),*]) #(#calls)*
    }
}
