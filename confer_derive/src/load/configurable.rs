use crate::load::{confer_attributes, incompatible_error};
use crate::model::{DeriveBody, DeriveConfigurable, DeriveCreator, DeriveField, DeriveValue, DeriveVariant};
use quote::ToTokens;
use std::collections::BTreeMap;

const TAG_KEYS: [&str; 4] = ["name", "description", "discriminator", "version"];
const STRUCT_PAIRS: [&str; 6] = [
    "name",
    "description",
    "discriminator",
    "version",
    "initializer",
    "creator",
];

fn last_segment(path: &syn::Path) -> String {
    path.segments
        .last()
        .map(|segment| segment.ident.to_string())
        .unwrap_or_default()
}

fn initializer(value: &DeriveValue) -> Result<DeriveCreator, syn::Error> {
    let path: syn::ExprPath = syn::parse2(value.tokens.clone())?;

    Ok(DeriveCreator::Initializer {
        name: last_segment(&path.path),
        function: DeriveValue {
            tokens: path.to_token_stream(),
        },
    })
}

fn designated(value: &DeriveValue, fields: &[DeriveField]) -> Result<DeriveCreator, syn::Error> {
    let call: syn::ExprCall = syn::parse2(value.tokens.clone())?;
    let function = match call.func.as_ref() {
        syn::Expr::Path(path) => path,
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "Invalid - `creator` must call a function by path.",
            ))
        }
    };
    let mut parameters = Vec::default();

    for argument in &call.args {
        let parameter = match argument {
            syn::Expr::Path(path) => path.path.get_ident().cloned(),
            _ => None,
        }
        .ok_or_else(|| {
            syn::Error::new_spanned(argument, "Invalid - `creator` arguments must be field names.")
        })?;

        if !fields.iter().any(|field| field.field_name == parameter) {
            return Err(syn::Error::new_spanned(
                argument,
                format!("Invalid - `creator` argument `{parameter}` is not a `#[confer]` field."),
            ));
        }

        parameters.push(parameter);
    }

    Ok(DeriveCreator::Designated {
        name: last_segment(&function.path),
        function: DeriveValue {
            tokens: function.to_token_stream(),
        },
        parameters,
    })
}

impl TryFrom<syn::DeriveInput> for DeriveConfigurable {
    type Error = syn::Error;

    fn try_from(value: syn::DeriveInput) -> Result<Self, Self::Error> {
        if !value.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &value.generics,
                "Invalid - a configurable type cannot be generic.",
            ));
        }

        let type_name = value.ident;
        let attributes = confer_attributes(&value.attrs)?.unwrap_or_default();
        let mut tag = BTreeMap::default();

        for key in TAG_KEYS {
            if let Some(tag_value) = attributes.single("type", &type_name, key)? {
                tag.insert(key.to_string(), tag_value);
            }
        }

        let body = match value.data {
            syn::Data::Struct(data) => {
                attributes.allow("struct", &type_name, &[], &STRUCT_PAIRS)?;
                let fields = match data.fields {
                    syn::Fields::Named(named) => named
                        .named
                        .iter()
                        .filter(|field| {
                            field.attrs.iter().any(|attribute| attribute.path().is_ident("confer"))
                        })
                        .map(DeriveField::try_from)
                        .collect::<Result<Vec<_>, _>>()?,
                    syn::Fields::Unit => Vec::default(),
                    syn::Fields::Unnamed(unnamed) => {
                        return Err(syn::Error::new_spanned(
                            unnamed,
                            "Invalid - a configurable struct must have named fields.",
                        ))
                    }
                };
                let initializer_value = attributes.single("struct", &type_name, "initializer")?;
                let creator_value = attributes.single("struct", &type_name, "creator")?;
                let creator = match (initializer_value, creator_value) {
                    (None, None) => DeriveCreator::Default,
                    (Some(value), None) => initializer(&value)?,
                    (None, Some(value)) => designated(&value, &fields)?,
                    (Some(_), Some(_)) => {
                        return Err(incompatible_error(
                            "struct",
                            &type_name,
                            "#[confer(initializer = ..)]",
                            "#[confer(creator = ..)]",
                        ))
                    }
                };

                DeriveBody::Struct { creator, fields }
            }
            syn::Data::Enum(data) => {
                attributes.allow("enum", &type_name, &[], &TAG_KEYS)?;
                let mut variants = Vec::default();

                for variant in data.variants {
                    match variant.fields {
                        syn::Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                            let subcommand_type = unnamed
                                .unnamed
                                .first()
                                .map(|field| field.ty.to_token_stream())
                                .unwrap_or_default();
                            variants.push(DeriveVariant {
                                variant_name: variant.ident,
                                subcommand_type: DeriveValue {
                                    tokens: subcommand_type,
                                },
                            });
                        }
                        _ => {
                            return Err(syn::Error::new_spanned(
                                variant.ident,
                                "Invalid - each variant of a configurable enum must hold exactly one subcommand.",
                            ))
                        }
                    }
                }

                DeriveBody::Enum { variants }
            }
            syn::Data::Union(_) => {
                return Err(syn::Error::new(
                    type_name.span(),
                    "Invalid - a configurable type cannot be a union.",
                ))
            }
        };

        Ok(DeriveConfigurable {
            type_name,
            tag,
            body,
        })
    }
}
