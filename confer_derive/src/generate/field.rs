use crate::generate::flatten;
use crate::model::{DeriveCategory, DeriveField, DeriveSetting, ValueShape};
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

impl DeriveField {
    /// The property name the field's facts are keyed by.
    pub(crate) fn property(&self) -> TokenStream2 {
        flatten(&self.rename).unwrap_or_else(|| {
            let name = self.field_name.to_string();
            quote! { #name }
        })
    }

    fn value_type(&self) -> TokenStream2 {
        let element_type = &self.element_type.tokens;

        match self.shape {
            ValueShape::Scalar => quote! { ::confer::ValueType::scalar::<#element_type>() },
            ValueShape::Optional => quote! { ::confer::ValueType::optional::<#element_type>() },
            ValueShape::Collection => {
                quote! { ::confer::ValueType::collection::<#element_type>() }
            }
        }
    }

    fn switches(&self) -> TokenStream2 {
        let short = flatten(&self.short).map(|short| quote! { .short(#short) });
        let long = flatten(&self.long).map(|long| quote! { .long(#long) });

        if short.is_none() && long.is_none() {
            let long = self.field_name.to_string().replace('_', "-");
            quote! { .long(#long) }
        } else {
            quote! { #short #long }
        }
    }

    fn settings(&self) -> TokenStream2 {
        let settings = self.settings.iter().map(|setting| match setting {
            DeriveSetting::Required => quote! { .required() },
            DeriveSetting::Default(value) => {
                let value = &value.tokens;
                quote! { .default_value(#value) }
            }
            DeriveSetting::Example(value) => {
                let value = &value.tokens;
                quote! { .example_value(#value) }
            }
            DeriveSetting::Description(value) => {
                let value = &value.tokens;
                quote! { .description(#value) }
            }
        });

        quote! { #( #settings )* }
    }

    fn tags(&self) -> Vec<TokenStream2> {
        let settings = self.settings();
        let mut tags: Vec<TokenStream2> = self
            .categories
            .iter()
            .map(|category| match category {
                DeriveCategory::Flag => {
                    let switches = self.switches();
                    quote! { ::confer::Tag::Flag(::confer::SwitchTag::new() #switches #settings) }
                }
                DeriveCategory::Option => {
                    let switches = self.switches();
                    quote! { ::confer::Tag::Option(::confer::SwitchTag::new() #switches #settings) }
                }
                DeriveCategory::Positional(position) => {
                    let position = &position.tokens;
                    quote! { ::confer::Tag::Positional(::confer::PositionalTag::new(#position) #settings) }
                }
                DeriveCategory::Environment(variable) => {
                    let variable = &variable.tokens;
                    quote! { ::confer::Tag::Environment(::confer::VariableTag::new(#variable) #settings) }
                }
                DeriveCategory::Property(property) => {
                    let property = &property.tokens;
                    quote! { ::confer::Tag::Property(::confer::VariableTag::new(#property) #settings) }
                }
            })
            .collect();

        if let Some(rename) = flatten(&self.rename) {
            tags.push(quote! { ::confer::Tag::Name(::std::string::String::from(#rename)) });
        }

        tags
    }

    /// Describe the field as a writable member of `parent`.
    pub(crate) fn generate_member(&self, parent: &syn::Ident) -> TokenStream2 {
        let field_name = &self.field_name;
        let field_name_str = field_name.to_string();
        let field_type = &self.field_type.tokens;
        let value_type = self.value_type();
        let visibility = if self.public {
            quote! { ::confer::Visibility::Public }
        } else {
            quote! { ::confer::Visibility::Private }
        };
        let tags = self.tags();

        quote! {
            ::confer::MemberDescriptor::field(
                #field_name_str,
                #visibility,
                #value_type,
                |target: &mut #parent, value: #field_type| target.#field_name = value,
            )
            #( .tag(#tags) )*
        }
    }

    /// Describe the field as a parameter of the designated creator.
    pub(crate) fn generate_parameter(&self) -> TokenStream2 {
        let field_name_str = self.field_name.to_string();
        let value_type = self.value_type();
        let tags = self.tags();

        quote! {
            ::confer::ParameterDescriptor::new(#field_name_str, #value_type)
            #( .tag(#tags) )*
        }
    }

    /// Read the field's fact back out of `facts`.
    pub(crate) fn generate_argument(&self) -> TokenStream2 {
        let field_type = &self.field_type.tokens;
        let property = self.property();

        quote! { facts.get::<#field_type>(#property)? }
    }
}
