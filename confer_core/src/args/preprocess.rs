use crate::args::token::{Token, ValueToken};
use crate::model::{is_long_switch, is_short_switch, SwitchName};

/// Behaviour to rewrite the raw arguments before they are tokenized.
pub trait ArgumentsPreprocessor: Send + Sync {
    /// Rewrite `arguments`.
    fn preprocess(&self, arguments: Vec<String>) -> Vec<String>;
}

/// Behaviour to rewrite the tokens before they are parsed.
pub trait TokensPreprocessor: Send + Sync {
    /// Rewrite `tokens`.
    fn preprocess(&self, tokens: Vec<Token>) -> Vec<Token>;
}

fn expand(tokens: Vec<Token>, f: impl Fn(&ValueToken) -> Option<Vec<Token>>) -> Vec<Token> {
    let mut expanded = Vec::with_capacity(tokens.len());

    for token in tokens {
        let replacement = match &token {
            Token::Value(value) if !value.attached => f(value),
            _ => None,
        };

        match replacement {
            Some(replacement) => expanded.extend(replacement),
            None => expanded.push(token),
        }
    }

    expanded
}

/// Expands `--name=value` and `-c=value` into a switch followed by an attached value.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttachedValueExpander;

impl TokensPreprocessor for AttachedValueExpander {
    fn preprocess(&self, tokens: Vec<Token>) -> Vec<Token> {
        expand(tokens, |token| {
            let (switch, value) = token.value.split_once('=')?;

            let switch = if let Some(name) = switch.strip_prefix("--") {
                is_long_switch(name).then(|| SwitchName::Long(name.to_string()))?
            } else {
                let mut chars = switch.strip_prefix('-')?.chars();

                match (chars.next(), chars.next()) {
                    (Some(c), None) if is_short_switch(c) => SwitchName::Short(c),
                    _ => return None,
                }
            };

            Some(vec![
                Token::Switch(switch),
                Token::Value(ValueToken::attached(value)),
            ])
        })
    }
}

/// Expands bundled short switches `-abc` into `-a -b -c`, and `-abc=value` into `-a -b -c` followed by an attached value.
#[derive(Debug, Default, Clone, Copy)]
pub struct BundledSwitchExpander;

impl TokensPreprocessor for BundledSwitchExpander {
    fn preprocess(&self, tokens: Vec<Token>) -> Vec<Token> {
        expand(tokens, |token| {
            let rest = token.value.strip_prefix('-')?;

            if rest.starts_with('-') {
                return None;
            }

            let (bundle, value) = match rest.split_once('=') {
                Some((bundle, value)) => (bundle, Some(value)),
                None => (rest, None),
            };

            if bundle.chars().count() < 2 || !bundle.chars().all(is_short_switch) {
                return None;
            }

            let mut expanded: Vec<Token> = bundle
                .chars()
                .map(|c| Token::Switch(SwitchName::Short(c)))
                .collect();

            if let Some(value) = value {
                expanded.push(Token::Value(ValueToken::attached(value)));
            }

            Some(expanded)
        })
    }
}
