mod configurable;
mod field;

use crate::model::DeriveValue;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

fn flatten(value: &Option<DeriveValue>) -> Option<TokenStream2> {
    value.as_ref().map(|value| {
        let tokens = &value.tokens;
        quote! { #tokens }
    })
}

#[cfg(test)]
pub(crate) mod test {
    pub(crate) fn ident(name: &str) -> syn::Ident {
        syn::Ident::new(name, proc_macro2::Span::call_site())
    }

    pub(crate) fn simple_format(rust_str: String) -> String {
        rust_str
            .replace('{', "{\n")
            .replace('}', "}\n")
            .replace(';', ";\n")
    }
}
