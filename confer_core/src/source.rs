use std::collections::HashMap;

/// Behaviour to look up a textual value by name, outside of the command line.
pub trait ValueSource: Send + Sync {
    /// The value named `name`, if present.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Looks up process environment variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvironmentVariables;

impl ValueSource for EnvironmentVariables {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Process properties: a name to value map supplied by the application.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    /// An empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ValueSource for Properties {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

impl ValueSource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties() {
        let properties = Properties::new().with("app.port", "8080");
        assert_eq!(properties.lookup("app.port"), Some("8080".to_string()));
        assert_eq!(properties.lookup("app.host"), None);

        let properties: Properties = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(properties.lookup("b"), Some("2".to_string()));
    }

    #[test]
    fn environment_variables() {
        // Cargo always sets this for the test process.
        assert!(EnvironmentVariables.lookup("CARGO_PKG_NAME").is_some());
        assert_eq!(
            EnvironmentVariables.lookup("CONFER_CORE_DEFINITELY_NOT_SET_2f9c"),
            None
        );
    }

    #[test]
    fn hash_map() {
        let map = HashMap::from([("k".to_string(), "v".to_string())]);
        assert_eq!(map.lookup("k"), Some("v".to_string()));
    }
}
