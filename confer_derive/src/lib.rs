//! Derive macro for `confer`.
//!
//! `#[derive(Configurable)]` implements `confer::Describable` from `#[confer(..)]` attributes.
//! Only fields carrying a `#[confer(..)]` attribute are described.
//!
//! Type attributes:
//! * `name`, `description`, `discriminator`, `version`: the configurable marker.
//! * `initializer = path`: create through the zero-parameter function `path` (instead of `Default`).
//! * `creator = path(field, ..)`: create through the designated function `path`, fed from the named fields.
//!
//! Field attributes:
//! * Categories: `flag`, `option`, `positional = N`, `environment = "VAR"`, `property = "key"`.
//! * Switches: `short = 'x'`, `long = "name"` (defaulting to the kebab-cased field name).
//! * Settings: `required`, `default = "text"`, `example = "text"`, `description = "text"`, `rename = "property"`.
//!
//! An enum describes a multi-command: each variant must hold exactly one configurable subcommand.
extern crate proc_macro;

mod generate;
mod load;
mod model;

use crate::model::DeriveConfigurable;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::parse_macro_input;

/// Implement `confer::Describable` for a struct or enum.
#[proc_macro_derive(Configurable, attributes(confer))]
pub fn configurable(input: TokenStream) -> TokenStream {
    let derive_input = parse_macro_input!(input as syn::DeriveInput);

    DeriveConfigurable::try_from(derive_input)
        .and_then(TokenStream2::try_from)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
