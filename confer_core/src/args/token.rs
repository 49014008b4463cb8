use crate::model::{is_long_switch, is_short_switch, SwitchName};

/// A value token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueToken {
    /// The textual value.
    pub value: String,
    /// Whether the value was attached to the preceding switch (ex: `--name=value`).
    pub attached: bool,
}

impl ValueToken {
    /// A free-standing value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            attached: false,
        }
    }

    /// A value attached to the preceding switch.
    pub fn attached(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            attached: true,
        }
    }
}

/// A lexical unit of the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A switch reference: `-x` or `--name`.
    Switch(SwitchName),
    /// Anything else.
    Value(ValueToken),
}

/// Behaviour to split a single command line argument into tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize `argument`.
    fn tokenize(&self, argument: &str) -> Vec<Token>;
}

/// Recognizes `--name` (for a valid long name) and `-c` (for an ASCII letter) as switches; everything else is a value.
///
/// Sugar such as `--name=value` or `-abc` is left as a value, for the token preprocessors to expand.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardTokenizer;

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, argument: &str) -> Vec<Token> {
        if let Some(name) = argument.strip_prefix("--") {
            if is_long_switch(name) {
                return vec![Token::Switch(SwitchName::Long(name.to_string()))];
            }
        } else if let Some(rest) = argument.strip_prefix('-') {
            let mut chars = rest.chars();

            if let (Some(c), None) = (chars.next(), chars.next()) {
                if is_short_switch(c) {
                    return vec![Token::Switch(SwitchName::Short(c))];
                }
            }
        }

        vec![Token::Value(ValueToken::new(argument))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("--flag", Token::Switch(SwitchName::Long("flag".to_string())))]
    #[case("--dry-run", Token::Switch(SwitchName::Long("dry-run".to_string())))]
    #[case("-f", Token::Switch(SwitchName::Short('f')))]
    #[case("alpha", Token::Value(ValueToken::new("alpha")))]
    #[case("-", Token::Value(ValueToken::new("-")))]
    #[case("--", Token::Value(ValueToken::new("--")))]
    #[case("-1", Token::Value(ValueToken::new("-1")))]
    #[case("-abc", Token::Value(ValueToken::new("-abc")))]
    #[case("--opt=v", Token::Value(ValueToken::new("--opt=v")))]
    #[case("---x", Token::Value(ValueToken::new("---x")))]
    #[case("", Token::Value(ValueToken::new("")))]
    fn tokenize(#[case] argument: &str, #[case] expected: Token) {
        assert_eq!(StandardTokenizer.tokenize(argument), vec![expected]);
    }
}
