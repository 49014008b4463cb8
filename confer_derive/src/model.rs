use proc_macro2::TokenStream as TokenStream2;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct DeriveValue {
    pub tokens: TokenStream2,
}

impl PartialEq for DeriveValue {
    fn eq(&self, other: &Self) -> bool {
        let st = &self.tokens.to_string();
        let ot = &other.tokens.to_string();
        st == ot
    }
}

impl Eq for DeriveValue {}

/// The raw contents of a `#[confer(..)]` attribute.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IntermediateAttributes {
    pub singletons: HashSet<String>,
    pub pairs: HashMap<String, Vec<DeriveValue>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Scalar,
    Optional,
    Collection,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeriveCategory {
    Flag,
    Option,
    Positional(DeriveValue),
    Environment(DeriveValue),
    Property(DeriveValue),
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeriveSetting {
    Required,
    Default(DeriveValue),
    Example(DeriveValue),
    Description(DeriveValue),
}

#[derive(Debug, PartialEq, Eq)]
pub struct DeriveField {
    pub field_name: syn::Ident,
    pub public: bool,
    pub field_type: DeriveValue,
    pub shape: ValueShape,
    pub element_type: DeriveValue,
    pub categories: Vec<DeriveCategory>,
    pub short: Option<DeriveValue>,
    pub long: Option<DeriveValue>,
    pub settings: Vec<DeriveSetting>,
    pub rename: Option<DeriveValue>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeriveCreator {
    Default,
    Initializer {
        name: String,
        function: DeriveValue,
    },
    Designated {
        name: String,
        function: DeriveValue,
        parameters: Vec<syn::Ident>,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub struct DeriveVariant {
    pub variant_name: syn::Ident,
    pub subcommand_type: DeriveValue,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeriveBody {
    Struct {
        creator: DeriveCreator,
        fields: Vec<DeriveField>,
    },
    Enum {
        variants: Vec<DeriveVariant>,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub struct DeriveConfigurable {
    pub type_name: syn::Ident,
    /// The configurable marker settings (name, description, discriminator, version).
    pub tag: BTreeMap<String, DeriveValue>,
    pub body: DeriveBody,
}
