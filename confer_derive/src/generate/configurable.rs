use crate::model::{DeriveBody, DeriveConfigurable, DeriveCreator, DeriveField, DeriveVariant};
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};

fn creator(type_name: &syn::Ident, creator: &DeriveCreator, fields: &[DeriveField]) -> TokenStream2 {
    match creator {
        DeriveCreator::Default => quote! {
            ::confer::MemberDescriptor::creator(
                "default",
                ::confer::Visibility::Public,
                ::std::vec::Vec::new(),
                |_: &::confer::Facts| -> ::std::result::Result<#type_name, ::confer::InvocationError> {
                    ::std::result::Result::Ok(<#type_name as ::std::default::Default>::default())
                },
            )
        },
        DeriveCreator::Initializer { name, function } => {
            let function = &function.tokens;
            quote! {
                ::confer::MemberDescriptor::creator(
                    #name,
                    ::confer::Visibility::Public,
                    ::std::vec::Vec::new(),
                    |_: &::confer::Facts| -> ::std::result::Result<#type_name, ::confer::InvocationError> {
                        ::std::result::Result::Ok(#function())
                    },
                )
            }
        }
        DeriveCreator::Designated {
            name,
            function,
            parameters,
        } => {
            let function = &function.tokens;
            let consumed: Vec<&DeriveField> = parameters
                .iter()
                .filter_map(|parameter| fields.iter().find(|field| &field.field_name == parameter))
                .collect();
            let descriptors = consumed.iter().map(|field| field.generate_parameter());
            let arguments = consumed.iter().map(|field| field.generate_argument());
            quote! {
                ::confer::MemberDescriptor::creator(
                    #name,
                    ::confer::Visibility::Public,
                    ::std::vec![#( #descriptors ),*],
                    |facts: &::confer::Facts| -> ::std::result::Result<#type_name, ::confer::InvocationError> {
                        ::std::result::Result::Ok(#function(#( #arguments ),*))
                    },
                )
                .tag(::confer::Tag::Creator)
            }
        }
    }
}

impl TryFrom<DeriveConfigurable> for TokenStream2 {
    type Error = syn::Error;

    fn try_from(value: DeriveConfigurable) -> Result<Self, Self::Error> {
        let DeriveConfigurable {
            type_name,
            tag,
            body,
        } = value;
        let tag_settings = tag.iter().map(|(key, value)| {
            let key = format_ident!("{key}");
            let value = &value.tokens;
            quote! { .#key(#value) }
        });
        let configurable_tag = quote! {
            ::confer::ConfigurableTag::new() #( #tag_settings )*
        };

        let description = match body {
            DeriveBody::Struct { creator: derive_creator, fields } => {
                let creator = creator(&type_name, &derive_creator, &fields);
                let consumed = match &derive_creator {
                    DeriveCreator::Designated { parameters, .. } => parameters.clone(),
                    _ => Vec::default(),
                };
                let members = fields
                    .iter()
                    .filter(|field| !consumed.contains(&field.field_name))
                    .map(|field| field.generate_member(&type_name));

                quote! {
                    ::confer::TypeDescriptor::concrete::<#type_name>()
                        .configurable(#configurable_tag)
                        .member(#creator)
                        #( .member(#members) )*
                }
            }
            DeriveBody::Enum { variants } => {
                let permitted = variants.iter().map(
                    |DeriveVariant {
                         variant_name,
                         subcommand_type,
                     }| {
                        let subcommand_type = &subcommand_type.tokens;
                        quote! {
                            ::confer::SubcommandDescriptor::new::<#type_name, #subcommand_type, _>(#type_name::#variant_name)
                        }
                    },
                );

                quote! {
                    ::confer::TypeDescriptor::abstract_type::<#type_name>()
                        .configurable(#configurable_tag)
                        #( .permitted(#permitted) )*
                }
            }
        };

        Ok(quote! {
            impl ::confer::Describable for #type_name {
                fn describe() -> ::confer::TypeDescriptor {
                    #description
                }
            }
        })
    }
}
