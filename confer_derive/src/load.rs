mod attribute;
mod configurable;
mod field;

use crate::model::{DeriveValue, IntermediateAttributes};

pub(self) fn incompatible_error(
    context: &str,
    ident: &syn::Ident,
    left: impl Into<String>,
    right: impl Into<String>,
) -> syn::Error {
    syn::Error::new(
        ident.span(),
        format!(
            "Invalid - {context} cannot be both `{}` and `{}`.",
            left.into(),
            right.into(),
        ),
    )
}

pub(self) fn unknown_error(context: &str, ident: &syn::Ident, key: &str) -> syn::Error {
    syn::Error::new(
        ident.span(),
        format!("Invalid - {context} does not accept `{key}`."),
    )
}

/// Read the `#[confer(..)]` attributes out of `attributes`, merged.
pub(self) fn confer_attributes(
    attributes: &[syn::Attribute],
) -> Result<Option<IntermediateAttributes>, syn::Error> {
    let mut merged: Option<IntermediateAttributes> = None;

    for attribute in attributes {
        if attribute.path().is_ident("confer") {
            let IntermediateAttributes { singletons, pairs } =
                IntermediateAttributes::try_from(attribute)?;
            let merged = merged.get_or_insert_with(IntermediateAttributes::default);
            merged.singletons.extend(singletons);

            for (key, values) in pairs {
                merged.pairs.entry(key).or_default().extend(values);
            }
        }
    }

    Ok(merged)
}

impl IntermediateAttributes {
    /// Reject any key outside of `singletons` and `pairs`.
    pub(self) fn allow(
        &self,
        context: &str,
        ident: &syn::Ident,
        singletons: &[&str],
        pairs: &[&str],
    ) -> Result<(), syn::Error> {
        let mut keys: Vec<&String> = self
            .singletons
            .iter()
            .filter(|key| !singletons.contains(&key.as_str()))
            .chain(
                self.pairs
                    .keys()
                    .filter(|key| !pairs.contains(&key.as_str())),
            )
            .collect();
        keys.sort();

        match keys.first() {
            Some(key) => Err(unknown_error(context, ident, key)),
            None => Ok(()),
        }
    }

    /// The single value of the pair `key`.
    pub(self) fn single(
        &self,
        context: &str,
        ident: &syn::Ident,
        key: &str,
    ) -> Result<Option<DeriveValue>, syn::Error> {
        match self.pairs.get(key).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([value]) => Ok(Some(value.clone())),
            Some(_) => Err(syn::Error::new(
                ident.span(),
                format!("Invalid - {context} declares `{key}` more than once."),
            )),
        }
    }
}
