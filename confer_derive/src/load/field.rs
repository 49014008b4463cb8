use crate::load::{confer_attributes, incompatible_error};
use crate::model::{DeriveCategory, DeriveField, DeriveSetting, DeriveValue, ValueShape};
use quote::ToTokens;

const SINGLETONS: [&str; 3] = ["flag", "option", "required"];
const PAIRS: [&str; 9] = [
    "positional",
    "environment",
    "property",
    "short",
    "long",
    "default",
    "example",
    "description",
    "rename",
];

/// Split a field type into its shape and element type.
fn shape(field_type: &syn::Type) -> (ValueShape, &syn::Type) {
    if let syn::Type::Path(path) = field_type {
        if let Some(segment) = path.path.segments.last() {
            let shape = match segment.ident.to_string().as_str() {
                "Option" => Some(ValueShape::Optional),
                "Vec" => Some(ValueShape::Collection),
                _ => None,
            };

            if let (Some(shape), syn::PathArguments::AngleBracketed(arguments)) =
                (shape, &segment.arguments)
            {
                if let Some(syn::GenericArgument::Type(element)) = arguments.args.first() {
                    return (shape, element);
                }
            }
        }
    }

    (ValueShape::Scalar, field_type)
}

impl TryFrom<&syn::Field> for DeriveField {
    type Error = syn::Error;

    fn try_from(value: &syn::Field) -> Result<Self, Self::Error> {
        let field_name = value
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(value, "Invalid - field must be named."))?;
        let attributes = confer_attributes(&value.attrs)?.unwrap_or_default();
        let context = "field";
        attributes.allow(context, &field_name, &SINGLETONS, &PAIRS)?;

        let mut categories = Vec::default();

        if attributes.singletons.contains("flag") {
            categories.push(DeriveCategory::Flag);
        }

        if attributes.singletons.contains("option") {
            categories.push(DeriveCategory::Option);
        }

        if let Some(position) = attributes.single(context, &field_name, "positional")? {
            categories.push(DeriveCategory::Positional(position));
        }

        if let Some(variable) = attributes.single(context, &field_name, "environment")? {
            categories.push(DeriveCategory::Environment(variable));
        }

        if let Some(property) = attributes.single(context, &field_name, "property")? {
            categories.push(DeriveCategory::Property(property));
        }

        let short = attributes.single(context, &field_name, "short")?;
        let long = attributes.single(context, &field_name, "long")?;
        let switched = categories
            .iter()
            .any(|category| matches!(category, DeriveCategory::Flag | DeriveCategory::Option));

        if !switched && (short.is_some() || long.is_some()) {
            return Err(syn::Error::new(
                field_name.span(),
                "Invalid - only a `flag` or `option` field may declare `short` or `long`.",
            ));
        }

        let mut settings = Vec::default();

        if attributes.singletons.contains("required") {
            settings.push(DeriveSetting::Required);
        }

        if let Some(default) = attributes.single(context, &field_name, "default")? {
            if attributes.singletons.contains("required") {
                return Err(incompatible_error(
                    context,
                    &field_name,
                    "#[confer(required)]",
                    "#[confer(default = ..)]",
                ));
            }

            settings.push(DeriveSetting::Default(default));
        }

        if let Some(example) = attributes.single(context, &field_name, "example")? {
            settings.push(DeriveSetting::Example(example));
        }

        if let Some(description) = attributes.single(context, &field_name, "description")? {
            settings.push(DeriveSetting::Description(description));
        }

        let rename = attributes.single(context, &field_name, "rename")?;
        let (shape, element_type) = shape(&value.ty);

        Ok(DeriveField {
            field_name,
            public: matches!(value.vis, syn::Visibility::Public(_)),
            field_type: DeriveValue {
                tokens: value.ty.to_token_stream(),
            },
            shape,
            element_type: DeriveValue {
                tokens: element_type.to_token_stream(),
            },
            categories,
            short,
            long,
            settings,
            rename,
        })
    }
}
