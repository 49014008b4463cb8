use std::any::{type_name, Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

type ParseFn = fn(&str) -> Result<Box<dyn Any>, String>;
type AssembleFn = fn(Vec<Box<dyn Any>>) -> Option<Box<dyn Any>>;
type AbsentFn = fn() -> Box<dyn Any>;

/// How the values received for one property are reduced into its fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A single `T`; the last received value wins.
    Scalar,
    /// An `Option<T>`; `None` when nothing is received.
    Optional,
    /// A `Vec<T>`; every received value, in order.
    Collection,
}

/// Type-erased description of a property's value.
///
/// A `ValueType` knows how to parse a single element from its textual form, and how to assemble the parsed elements into the fact which is handed to creators and sinks.
/// The fact type is `T`, `Option<T>`, or `Vec<T>` for the [`Shape::Scalar`], [`Shape::Optional`], and [`Shape::Collection`] shapes, respectively.
#[derive(Clone)]
pub struct ValueType {
    type_name: &'static str,
    element_name: &'static str,
    element_id: TypeId,
    shape: Shape,
    parse: ParseFn,
    assemble: AssembleFn,
    absent: Option<AbsentFn>,
}

fn parse_from_str<T>(value: &str) -> Result<Box<dyn Any>, String>
where
    T: FromStr + 'static,
    T::Err: Display,
{
    T::from_str(value)
        .map(|t| Box::new(t) as Box<dyn Any>)
        .map_err(|error| error.to_string())
}

fn assemble_scalar<T: 'static>(values: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
    let last = values.into_iter().last()?;
    last.is::<T>().then_some(last)
}

fn assemble_optional<T: 'static>(values: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
    match values.into_iter().last() {
        Some(last) => {
            let value = last.downcast::<T>().ok()?;
            Some(Box::new(Some(*value)))
        }
        None => Some(Box::new(None::<T>)),
    }
}

fn assemble_collection<T: 'static>(values: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
    let mut collection: Vec<T> = Vec::with_capacity(values.len());

    for value in values {
        collection.push(*value.downcast::<T>().ok()?);
    }

    Some(Box::new(collection))
}

fn absent_optional<T: 'static>() -> Box<dyn Any> {
    Box::new(None::<T>)
}

fn absent_collection<T: 'static>() -> Box<dyn Any> {
    Box::new(Vec::<T>::new())
}

impl ValueType {
    /// A single value `T`.
    pub fn scalar<T>() -> Self
    where
        T: FromStr + Clone + 'static,
        T::Err: Display,
    {
        Self {
            type_name: type_name::<T>(),
            element_name: type_name::<T>(),
            element_id: TypeId::of::<T>(),
            shape: Shape::Scalar,
            parse: parse_from_str::<T>,
            assemble: assemble_scalar::<T>,
            absent: None,
        }
    }

    /// An optional value `Option<T>`.
    pub fn optional<T>() -> Self
    where
        T: FromStr + Clone + 'static,
        T::Err: Display,
    {
        Self {
            type_name: type_name::<Option<T>>(),
            element_name: type_name::<T>(),
            element_id: TypeId::of::<T>(),
            shape: Shape::Optional,
            parse: parse_from_str::<T>,
            assemble: assemble_optional::<T>,
            absent: Some(absent_optional::<T>),
        }
    }

    /// A collection of values `Vec<T>`.
    pub fn collection<T>() -> Self
    where
        T: FromStr + Clone + 'static,
        T::Err: Display,
    {
        Self {
            type_name: type_name::<Vec<T>>(),
            element_name: type_name::<T>(),
            element_id: TypeId::of::<T>(),
            shape: Shape::Collection,
            parse: parse_from_str::<T>,
            assemble: assemble_collection::<T>,
            absent: Some(absent_collection::<T>),
        }
    }

    /// The name of the fact type (ex: `alloc::vec::Vec<u32>`).
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The name of the element type (ex: `u32`).
    pub fn element_name(&self) -> &'static str {
        self.element_name
    }

    /// The [`TypeId`] of the element type.
    pub fn element_id(&self) -> TypeId {
        self.element_id
    }

    /// The reduction shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Whether this is the `bool` scalar used by flags.
    pub fn is_boolean(&self) -> bool {
        self.shape == Shape::Scalar && self.element_id == TypeId::of::<bool>()
    }

    /// Parse a single element via the element type's [`FromStr`].
    pub fn parse_element(&self, value: &str) -> Result<Box<dyn Any>, String> {
        (self.parse)(value)
    }

    /// Assemble parsed elements into the fact value.
    /// Returns `None` when an element is not of the element type, or a scalar receives no elements.
    pub(crate) fn assemble(&self, values: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
        (self.assemble)(values)
    }

    /// The fact value used when nothing is received, if this shape has one.
    pub(crate) fn absent(&self) -> Option<Box<dyn Any>> {
        self.absent.map(|absent| absent())
    }
}

impl std::fmt::Debug for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueType")
            .field("type_name", &self.type_name)
            .field("shape", &self.shape)
            .finish()
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.element_id == other.element_id && self.shape == other.shape
    }
}

impl Eq for ValueType {}

/// Failure to read a typed fact.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FactError {
    /// No fact by that name.
    #[error("fact '{name}' is not available.")]
    Missing {
        /// The fact name.
        name: String,
    },

    /// The fact holds another type.
    #[error("fact '{name}' is not a {expected}.")]
    Mismatch {
        /// The fact name.
        name: String,
        /// The requested type.
        expected: &'static str,
    },
}

/// Failure raised by a creator or sink while building an instance.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// A fact could not be read.
    #[error(transparent)]
    Fact(#[from] FactError),

    /// The sink was handed an instance of another type.
    #[error("instance is not a {expected}.")]
    Instance {
        /// The sink's instance type.
        expected: &'static str,
    },

    /// The sink was handed a value of another type.
    #[error("value is not a {expected}.")]
    Value {
        /// The sink's value type.
        expected: &'static str,
    },

    /// The user code failed.
    #[error("{0}")]
    Failed(String),
}

impl From<String> for InvocationError {
    fn from(message: String) -> Self {
        InvocationError::Failed(message)
    }
}

impl From<&str> for InvocationError {
    fn from(message: &str) -> Self {
        InvocationError::Failed(message.to_string())
    }
}

/// The named facts available to the rules engine.
///
/// Facts are owned values; readers receive clones so that no two rules alias the same value.
/// The fact named [`INSTANCE`](crate::INSTANCE) is the instance under construction.
#[derive(Default)]
pub struct Facts {
    values: HashMap<String, Box<dyn Any>>,
}

impl Facts {
    /// Create an empty fact map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fact, returning the previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: Box<dyn Any>) -> Option<Box<dyn Any>> {
        self.values.insert(name.into(), value)
    }

    /// Whether the named fact is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Clone out the named fact as a `T`.
    pub fn get<T: Clone + 'static>(&self, name: &str) -> Result<T, FactError> {
        match self.values.get(name) {
            Some(value) => value
                .downcast_ref::<T>()
                .cloned()
                .ok_or_else(|| FactError::Mismatch {
                    name: name.to_string(),
                    expected: type_name::<T>(),
                }),
            None => Err(FactError::Missing {
                name: name.to_string(),
            }),
        }
    }

    /// Clone out the named fact as a `T`, or `None` when it is absent.
    pub fn get_optional<T: Clone + 'static>(&self, name: &str) -> Result<Option<T>, FactError> {
        if self.contains(name) {
            self.get(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Borrow the named fact without committing to its type.
    pub fn get_any(&self, name: &str) -> Option<&dyn Any> {
        self.values.get(name).map(|value| value.as_ref())
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Box<dyn Any>> {
        self.values.remove(name)
    }

    /// The names of all present facts.
    pub fn names(&self) -> BTreeSet<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    /// The number of present facts.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no facts are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for Facts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
