use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::describe::ValueType;

/// Behaviour to convert a single textual value into an element of some type.
pub trait ValueDeserializer: Send + Sync {
    /// Deserialize `value`, or explain why it cannot be.
    fn deserialize(&self, value: &str) -> Result<Box<dyn Any>, String>;
}

/// Behaviour to offer a [`ValueDeserializer`] for a value type.
///
/// Factories are consulted in order; the first to offer a deserializer wins.
pub trait ValueDeserializerFactory: Send + Sync {
    /// Offer a deserializer for the elements of `value_type`, or `None` to decline.
    fn deserializer(&self, value_type: &ValueType) -> Option<Arc<dyn ValueDeserializer>>;
}

/// Deserializes `bool` leniently: `true`/`false`, `yes`/`no`, `on`/`off`, `1`/`0` (case insensitive).
#[derive(Debug, Default)]
pub struct LenientBool;

impl ValueDeserializer for LenientBool {
    fn deserialize(&self, value: &str) -> Result<Box<dyn Any>, String> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Box::new(true)),
            "false" | "no" | "off" | "0" => Ok(Box::new(false)),
            _ => Err(format!("'{value}' is not a boolean")),
        }
    }
}

/// Offers [`LenientBool`] for `bool` elements.
#[derive(Debug, Default)]
pub struct LenientBoolFactory;

impl ValueDeserializerFactory for LenientBoolFactory {
    fn deserializer(&self, value_type: &ValueType) -> Option<Arc<dyn ValueDeserializer>> {
        (value_type.element_id() == TypeId::of::<bool>())
            .then(|| Arc::new(LenientBool) as Arc<dyn ValueDeserializer>)
    }
}

struct FnDeserializer<T> {
    deserialize: fn(&str) -> Result<T, String>,
}

impl<T: 'static> ValueDeserializer for FnDeserializer<T> {
    fn deserialize(&self, value: &str) -> Result<Box<dyn Any>, String> {
        (self.deserialize)(value).map(|t| Box::new(t) as Box<dyn Any>)
    }
}

struct FnDeserializerFactory<T> {
    deserialize: fn(&str) -> Result<T, String>,
}

impl<T: 'static> ValueDeserializerFactory for FnDeserializerFactory<T> {
    fn deserializer(&self, value_type: &ValueType) -> Option<Arc<dyn ValueDeserializer>> {
        (value_type.element_id() == TypeId::of::<T>()).then(|| {
            Arc::new(FnDeserializer {
                deserialize: self.deserialize,
            }) as Arc<dyn ValueDeserializer>
        })
    }
}

/// The ordered chain of deserializer factories.
///
/// User factories are consulted first, followed by the built-in [`LenientBoolFactory`].
/// When no factory offers a deserializer, the element type's own [`FromStr`](std::str::FromStr) is used.
///
/// ### Example
/// ```
/// # use confer_core as confer;
/// use confer::{DeserializerRegistry, ValueType};
///
/// let registry = DeserializerRegistry::default()
///     .register_fn::<u32>(|value| u32::from_str_radix(value, 16).map_err(|e| e.to_string()));
/// let value = registry.deserialize(&ValueType::scalar::<u32>(), "ff").unwrap();
/// assert_eq!(*value.downcast::<u32>().unwrap(), 255);
/// ```
#[derive(Clone)]
pub struct DeserializerRegistry {
    factories: Vec<Arc<dyn ValueDeserializerFactory>>,
}

impl Default for DeserializerRegistry {
    fn default() -> Self {
        Self {
            factories: vec![Arc::new(LenientBoolFactory)],
        }
    }
}

impl fmt::Debug for DeserializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeserializerRegistry")
            .field("factories", &self.factories.len())
            .finish()
    }
}

impl DeserializerRegistry {
    /// A registry with no factories; every element falls back to its `FromStr`.
    pub fn empty() -> Self {
        Self {
            factories: Vec::default(),
        }
    }

    /// Consult `factory` ahead of the existing factories.
    pub fn register(mut self, factory: impl ValueDeserializerFactory + 'static) -> Self {
        self.factories.insert(0, Arc::new(factory));
        self
    }

    /// Consult `deserialize` for elements of type `T`, ahead of the existing factories.
    pub fn register_fn<T: 'static>(self, deserialize: fn(&str) -> Result<T, String>) -> Self {
        self.register(FnDeserializerFactory { deserialize })
    }

    /// Deserialize a single element of `value_type`.
    pub fn deserialize(&self, value_type: &ValueType, value: &str) -> Result<Box<dyn Any>, String> {
        for factory in &self.factories {
            if let Some(deserializer) = factory.deserializer(value_type) {
                return deserializer.deserialize(value);
            }
        }

        trace!(
            "No deserializer factory for '{}'; falling back to {}::from_str.",
            value_type.type_name(),
            value_type.element_name()
        );
        value_type.parse_element(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("true", true)]
    #[case("TRUE", true)]
    #[case("yes", true)]
    #[case("on", true)]
    #[case("1", true)]
    #[case("false", false)]
    #[case("No", false)]
    #[case("off", false)]
    #[case("0", false)]
    fn lenient_bool(#[case] value: &str, #[case] expected: bool) {
        // Setup
        let registry = DeserializerRegistry::default();

        // Execute
        let result = registry.deserialize(&ValueType::scalar::<bool>(), value);

        // Verify
        assert_eq!(*result.unwrap().downcast::<bool>().unwrap(), expected);
    }

    #[test]
    fn lenient_bool_invalid() {
        let registry = DeserializerRegistry::default();
        let message = registry
            .deserialize(&ValueType::scalar::<bool>(), "maybe")
            .unwrap_err();
        assert_eq!(message, "'maybe' is not a boolean");
    }

    #[test]
    fn strict_bool() {
        let registry = DeserializerRegistry::empty();
        assert!(registry
            .deserialize(&ValueType::scalar::<bool>(), "yes")
            .is_err());
        assert!(registry
            .deserialize(&ValueType::scalar::<bool>(), "true")
            .is_ok());
    }

    #[rstest]
    #[case(ValueType::scalar::<u32>())]
    #[case(ValueType::optional::<u32>())]
    #[case(ValueType::collection::<u32>())]
    fn from_str_fallback(#[case] value_type: ValueType) {
        let registry = DeserializerRegistry::default();
        assert_eq!(
            *registry
                .deserialize(&value_type, "12")
                .unwrap()
                .downcast::<u32>()
                .unwrap(),
            12
        );
        assert!(registry.deserialize(&value_type, "x").is_err());
    }

    #[test]
    fn register_fn_precedence() {
        // Setup
        let registry = DeserializerRegistry::default()
            .register_fn::<bool>(|value| Ok(value == "y"))
            .register_fn::<u8>(|_| Err("never".to_string()));

        // Execute & verify
        assert!(
            *registry
                .deserialize(&ValueType::scalar::<bool>(), "y")
                .unwrap()
                .downcast::<bool>()
                .unwrap()
        );
        assert!(
            !*registry
                .deserialize(&ValueType::scalar::<bool>(), "true")
                .unwrap()
                .downcast::<bool>()
                .unwrap()
        );
        assert_eq!(
            registry
                .deserialize(&ValueType::scalar::<u8>(), "1")
                .unwrap_err(),
            "never"
        );
        assert!(registry
            .deserialize(&ValueType::scalar::<u16>(), "1")
            .is_ok());
    }
}
