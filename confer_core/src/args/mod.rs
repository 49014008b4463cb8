//! The argument syntax pipeline: tokenize, parse, group, map, reduce.
mod group;
mod parse;
mod preprocess;
mod reduce;
mod token;

use std::sync::Arc;

use tracing::trace;

use crate::model::Coordinate;
use crate::scan::NamedSyntax;
use crate::source::ValueSource;

pub use group::*;
pub use parse::*;
pub use preprocess::*;
pub use reduce::*;
pub use token::*;

/// The lexical half of the pipeline: how raw arguments become tokens.
///
/// Argument preprocessors run first, then the tokenizer on each argument, then the token preprocessors.
/// All of them run before any coordinate is assigned.
#[derive(Clone)]
pub struct ArgumentSyntax {
    tokenizer: Arc<dyn Tokenizer>,
    arguments_preprocessors: Vec<Arc<dyn ArgumentsPreprocessor>>,
    tokens_preprocessors: Vec<Arc<dyn TokensPreprocessor>>,
}

impl Default for ArgumentSyntax {
    fn default() -> Self {
        Self {
            tokenizer: Arc::new(StandardTokenizer),
            arguments_preprocessors: Vec::default(),
            tokens_preprocessors: vec![
                Arc::new(BundledSwitchExpander),
                Arc::new(AttachedValueExpander),
            ],
        }
    }
}

impl std::fmt::Debug for ArgumentSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgumentSyntax")
            .field("arguments_preprocessors", &self.arguments_preprocessors.len())
            .field("tokens_preprocessors", &self.tokens_preprocessors.len())
            .finish_non_exhaustive()
    }
}

impl ArgumentSyntax {
    /// Replace the tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Arc::new(tokenizer);
        self
    }

    /// Append an argument preprocessor.
    pub fn with_arguments_preprocessor(
        mut self,
        preprocessor: impl ArgumentsPreprocessor + 'static,
    ) -> Self {
        self.arguments_preprocessors.push(Arc::new(preprocessor));
        self
    }

    /// Append a token preprocessor.
    pub fn with_tokens_preprocessor(
        mut self,
        preprocessor: impl TokensPreprocessor + 'static,
    ) -> Self {
        self.tokens_preprocessors.push(Arc::new(preprocessor));
        self
    }

    /// Tokenize `arguments`, preserving their order.
    pub fn tokenize(&self, arguments: &[String]) -> Vec<Token> {
        let arguments = self
            .arguments_preprocessors
            .iter()
            .fold(arguments.to_vec(), |arguments, preprocessor| {
                preprocessor.preprocess(arguments)
            });
        let tokens: Vec<Token> = arguments
            .iter()
            .flat_map(|argument| self.tokenizer.tokenize(argument))
            .collect();
        let tokens = self
            .tokens_preprocessors
            .iter()
            .fold(tokens, |tokens, preprocessor| preprocessor.preprocess(tokens));
        trace!("Tokenized {} argument(s) into {} token(s).", arguments.len(), tokens.len());
        tokens
    }
}

/// Read the environment and property coordinates of `syntax` from their sources.
///
/// Only coordinates with a value are returned.
/// Callers place these ahead of the command line pairs; a scalar keeps its last value, so the command line takes
/// precedence.
pub fn lookup(
    syntax: &[NamedSyntax],
    environment: &dyn ValueSource,
    properties: &dyn ValueSource,
) -> Vec<(Coordinate, String)> {
    let mut pairs = Vec::default();

    for property in syntax {
        for coordinate in property.coordinates() {
            let value = match coordinate {
                Coordinate::EnvironmentVariable(name) => environment.lookup(name),
                Coordinate::Property(name) => properties.lookup(name),
                _ => None,
            };

            if let Some(value) = value {
                trace!("Found '{}' at {coordinate}.", property.name());
                pairs.push((coordinate.clone(), value));
            }
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deserialize::DeserializerRegistry;
    use crate::describe::ValueType;
    use crate::model::SwitchName;
    use crate::scan::syntax::test::{flag, option, positional, syntax};
    use crate::scan::SyntaxKind;
    use crate::source::Properties;

    struct Lowercase;

    impl ArgumentsPreprocessor for Lowercase {
        fn preprocess(&self, arguments: Vec<String>) -> Vec<String> {
            arguments.into_iter().map(|a| a.to_lowercase()).collect()
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn tokenize_sugar() {
        // Setup
        let syntax = ArgumentSyntax::default();

        // Execute
        let tokens = syntax.tokenize(&strings(&["-ab", "--name=x", "value"]));

        // Verify
        assert_eq!(
            tokens,
            vec![
                Token::Switch(SwitchName::Short('a')),
                Token::Switch(SwitchName::Short('b')),
                Token::Switch(SwitchName::Long("name".to_string())),
                Token::Value(ValueToken::attached("x")),
                Token::Value(ValueToken::new("value")),
            ]
        );
    }

    #[test]
    fn tokenize_arguments_preprocessor() {
        let syntax = ArgumentSyntax::default().with_arguments_preprocessor(Lowercase);
        assert_eq!(
            syntax.tokenize(&strings(&["--NAME"])),
            vec![Token::Switch(SwitchName::Long("name".to_string()))]
        );
    }

    #[test]
    fn tokenize_empty() {
        assert_eq!(
            ArgumentSyntax::default().tokenize(&strings(empty::slice())),
            Vec::default()
        );
    }

    #[test]
    fn pipeline_round_trip() {
        // Setup
        let syntax = vec![
            flag("flag", 'f'),
            option("option", 'o', ValueType::scalar::<String>()),
            positional("position0", 0, ValueType::scalar::<String>()),
        ];
        let registry = DeserializerRegistry::default();
        let tokens = ArgumentSyntax::default().tokenize(&strings(&["-f", "-o", "alpha", "bravo"]));

        // Execute
        let pairs = parse(tokens, &syntax).unwrap();
        let grouped = group(pairs, &syntax).unwrap();
        let mapped = map(grouped, &syntax, &registry).unwrap();
        let facts = reduce(mapped, &syntax, &registry).unwrap();

        // Verify
        assert!(facts.get::<bool>("flag").unwrap());
        assert_eq!(facts.get::<String>("option").unwrap(), "alpha");
        assert_eq!(facts.get::<String>("position0").unwrap(), "bravo");
    }

    #[test]
    fn lookup_sources() {
        // Setup
        let syntax = vec![
            syntax(
                "home",
                SyntaxKind::Environment,
                vec![Coordinate::EnvironmentVariable("CONFER_TEST_HOME".to_string())],
                ValueType::scalar::<String>(),
            ),
            syntax(
                "level",
                SyntaxKind::Property,
                vec![Coordinate::Property("app.level".to_string())],
                ValueType::scalar::<u8>(),
            ),
            syntax(
                "missing",
                SyntaxKind::Property,
                vec![Coordinate::Property("app.missing".to_string())],
                ValueType::scalar::<u8>(),
            ),
        ];
        let environment = Properties::new().with("CONFER_TEST_HOME", "/home/confer");
        let properties = Properties::new().with("app.level", "3");

        // Execute
        let pairs = lookup(&syntax, &environment, &properties);

        // Verify
        assert_eq!(
            pairs,
            vec![
                (
                    Coordinate::EnvironmentVariable("CONFER_TEST_HOME".to_string()),
                    "/home/confer".to_string()
                ),
                (Coordinate::Property("app.level".to_string()), "3".to_string()),
            ]
        );
    }
}
