//! Rendering failures for the user: the formatter chain, and a minimal usage renderer.
use terminal_size::{terminal_size, Width};
use tracing::debug;

use crate::command::{Command, MultiCommand, SingleCommand};
use crate::constant::{EXIT_ERROR, EXIT_HELP, HELP_LONG, HELP_SHORT};
use crate::describe::Shape;
use crate::error::Error;
use crate::model::{Coordinate, Discriminator};
use crate::scan::{NamedSyntax, SyntaxKind};

const HELP_MESSAGE: &str = "Show this help message and exit.";
// We'll target 95% of the total width, to ensure the renderer doesn't literally use the full space.
const TARGET_TOTAL_FACTOR: f64 = 0.95;
// Let's assume the average word length is 5.
// Then 17 is a good minimum, because it allows precisely 3 words with a space between them.
const MINIMUM_MIDDLE_WIDTH: usize = 17;
const PADDING_WIDTH: usize = 3;
const MAIN_INDENT: usize = 1;

/// A rendered failure: what to show, and how the process should exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The rendered message.
    pub message: String,
    /// The process exit code.
    pub exit_code: i32,
    /// Whether the message is help (shown as a regular message) rather than an error.
    pub help: bool,
}

/// What a formatter knows about the failed invocation.
#[derive(Debug, Clone, Copy)]
pub struct FormatContext<'a> {
    /// The program name.
    pub program: &'a str,
    /// The scanned root command.
    pub root: &'a Command,
    /// The arguments, excluding the program name.
    pub arguments: &'a [String],
    /// The terminal width, when known.
    pub width: Option<usize>,
}

/// Behaviour to render an error.
pub trait ErrorFormatter: Send + Sync {
    /// Render `error`, or decline with `None`.
    fn format(&self, error: &Error, context: &FormatContext<'_>) -> Option<Report>;
}

/// Renders help for explicit help requests, and for syntax or argument failures when no arguments were given.
#[derive(Debug, Default, Clone, Copy)]
pub struct HelpFormatter;

impl ErrorFormatter for HelpFormatter {
    fn format(&self, error: &Error, context: &FormatContext<'_>) -> Option<Report> {
        let wants_help = error.is_help_request()
            || (context.arguments.is_empty() && !matches!(error, Error::Scan(_)));

        if !wants_help {
            return None;
        }

        let (path, command) = help_target(context.root, context.arguments);
        let usage = Usage::new(program_path(context.program, &path), context.width);
        Some(Report {
            message: usage.help(command),
            exit_code: EXIT_HELP,
            help: true,
        })
    }
}

/// Renders syntax errors as the usage summary followed by the error.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntaxErrorFormatter;

impl ErrorFormatter for SyntaxErrorFormatter {
    fn format(&self, error: &Error, context: &FormatContext<'_>) -> Option<Report> {
        let Error::Syntax(error) = error else {
            return None;
        };
        let (path, command) = help_target(context.root, context.arguments);
        let usage = Usage::new(program_path(context.program, &path), context.width);
        Some(Report {
            message: format!("{}\nerror: {error}", usage.summary(command)),
            exit_code: EXIT_ERROR,
            help: false,
        })
    }
}

/// Renders argument errors, along with their causes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArgumentErrorFormatter;

impl ErrorFormatter for ArgumentErrorFormatter {
    fn format(&self, error: &Error, _context: &FormatContext<'_>) -> Option<Report> {
        let Error::Argument(error) = error else {
            return None;
        };
        Some(Report {
            message: format!("error: {error}"),
            exit_code: EXIT_ERROR,
            help: false,
        })
    }
}

/// An ordered chain of formatters; the first to render an error wins.
pub struct ErrorFormatters {
    formatters: Vec<Box<dyn ErrorFormatter>>,
}

impl Default for ErrorFormatters {
    fn default() -> Self {
        Self {
            formatters: vec![
                Box::new(HelpFormatter),
                Box::new(SyntaxErrorFormatter),
                Box::new(ArgumentErrorFormatter),
            ],
        }
    }
}

impl std::fmt::Debug for ErrorFormatters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorFormatters")
            .field("formatters", &self.formatters.len())
            .finish()
    }
}

impl ErrorFormatters {
    /// Consult `formatter` ahead of the existing formatters.
    pub fn with_formatter(mut self, formatter: impl ErrorFormatter + 'static) -> Self {
        self.formatters.insert(0, Box::new(formatter));
        self
    }

    /// Render `error`; errors no formatter accepts are rendered by their message.
    pub fn format(&self, error: &Error, context: &FormatContext<'_>) -> Report {
        self.formatters
            .iter()
            .find_map(|formatter| formatter.format(error, context))
            .unwrap_or_else(|| Report {
                message: format!("error: {error}"),
                exit_code: EXIT_ERROR,
                help: false,
            })
    }
}

/// The terminal width, when attached to a terminal.
pub fn terminal_width() -> Option<usize> {
    if let Some((Width(width), _)) = terminal_size() {
        Some(width as usize)
    } else {
        None
    }
}

fn program_path(program: &str, path: &[Discriminator]) -> String {
    std::iter::once(program.to_string())
        .chain(path.iter().map(Discriminator::to_string))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The deepest command reachable by the leading discriminators of `arguments`, along with the discriminators taken.
pub(crate) fn help_target<'c>(
    root: &'c Command,
    arguments: &[String],
) -> (Vec<Discriminator>, &'c Command) {
    let mut path = Vec::default();
    let mut current = root;

    for argument in arguments {
        let Command::Multi(multi) = current else {
            break;
        };
        let Ok(discriminator) = argument.parse::<Discriminator>() else {
            break;
        };
        let Some(subcommand) = multi.subcommands().get(&discriminator) else {
            break;
        };

        current = subcommand.command();
        path.push(discriminator);
    }

    (path, current)
}

/// A minimal usage renderer.
#[derive(Debug)]
pub struct Usage {
    program: String,
    width: Option<usize>,
}

impl Usage {
    /// A renderer for the command invoked as `program`, wrapping to `width` when given.
    pub fn new(program: impl Into<String>, width: Option<usize>) -> Self {
        Self {
            program: program.into(),
            width,
        }
    }

    /// The one line usage summary of `command`.
    pub fn summary(&self, command: &Command) -> String {
        let mut summary = vec![format!("usage: {}", self.program), format!("[-{HELP_SHORT}]")];

        match command {
            Command::Single(single) => {
                summary.extend(single.syntax().iter().filter_map(switch_summary));
                summary.extend(single.syntax().iter().filter_map(positional_summary));
            }
            Command::Multi(multi) => {
                let discriminators: Vec<String> = multi
                    .subcommands()
                    .keys()
                    .map(Discriminator::to_string)
                    .collect();
                summary.push(format!("{{{}}}", discriminators.join(",")));
                summary.push("...".to_string());
            }
        }

        summary.join(" ")
    }

    /// The full help of `command`.
    pub fn help(&self, command: &Command) -> String {
        let tag = command.tag();
        let mut sections = Vec::default();

        if let Some(version) = &tag.version {
            sections.push(vec![format!("{} {version}", command.name())]);
        }

        sections.push(vec![self.summary(command)]);

        if let Some(description) = &tag.description {
            sections.push(self.paragraph(description));
        }

        match command {
            Command::Single(single) => self.single_sections(single, &mut sections),
            Command::Multi(multi) => self.multi_sections(multi, &mut sections),
        }

        debug!("Rendered help for '{}'.", command.name());
        sections
            .into_iter()
            .map(|lines| lines.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn single_sections(&self, single: &SingleCommand, sections: &mut Vec<Vec<String>>) {
        let positionals: Vec<(String, String)> = single
            .syntax()
            .iter()
            .filter_map(|syntax| positional_summary(syntax).map(|left| (left, describe(syntax))))
            .collect();
        let mut options = vec![(
            format!("-{HELP_SHORT}, --{HELP_LONG}"),
            HELP_MESSAGE.to_string(),
        )];
        options.extend(
            single
                .syntax()
                .iter()
                .filter_map(|syntax| switch_columns(syntax).map(|left| (left, describe(syntax)))),
        );

        self.section("positional arguments:", positionals, sections);
        self.section("options:", options, sections);

        for (kind, title) in [
            (SyntaxKind::Environment, "environment:"),
            (SyntaxKind::Property, "properties:"),
        ] {
            let rows = single
                .syntax()
                .iter()
                .filter(|syntax| syntax.kind() == kind)
                .map(|syntax| (variables(syntax), describe(syntax)))
                .collect();
            self.section(title, rows, sections);
        }
    }

    fn multi_sections(&self, multi: &MultiCommand, sections: &mut Vec<Vec<String>>) {
        let rows = multi
            .subcommands()
            .iter()
            .map(|(discriminator, subcommand)| {
                (
                    discriminator.to_string(),
                    subcommand
                        .command()
                        .tag()
                        .description
                        .clone()
                        .unwrap_or_default(),
                )
            })
            .collect();
        let options = vec![(
            format!("-{HELP_SHORT}, --{HELP_LONG}"),
            HELP_MESSAGE.to_string(),
        )];

        self.section("subcommands:", rows, sections);
        self.section("options:", options, sections);
    }

    fn section(&self, title: &str, rows: Vec<(String, String)>, sections: &mut Vec<Vec<String>>) {
        if rows.is_empty() {
            return;
        }

        let mut lines = vec![title.to_string()];
        lines.extend(self.columns(&rows));
        sections.push(lines);
    }

    fn paragraph(&self, text: &str) -> Vec<String> {
        match self.width {
            Some(width) => wrap(text, std::cmp::max(width, MINIMUM_MIDDLE_WIDTH)),
            None => vec![text.to_string()],
        }
    }

    fn columns(&self, rows: &[(String, String)]) -> Vec<String> {
        let left = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
        let indent = MAIN_INDENT + left + PADDING_WIDTH;
        let middle = self
            .width
            .map(|width| ((width as f64) * TARGET_TOTAL_FACTOR) as usize)
            .map(|target| target.saturating_sub(indent))
            .filter(|middle| *middle >= MINIMUM_MIDDLE_WIDTH);
        let mut lines = Vec::default();

        for (name, description) in rows {
            let mut wrapped = match middle {
                Some(middle) => wrap(description, middle),
                None => vec![description.clone()],
            }
            .into_iter();
            let first = wrapped.next().unwrap_or_default();
            let line = format!(
                "{:MAIN_INDENT$}{name:left$}{:PADDING_WIDTH$}{first}",
                "", ""
            );
            lines.push(line.trim_end().to_string());

            for rest in wrapped {
                lines.push(format!("{:indent$}{rest}", ""));
            }
        }

        lines
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut line = String::default();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }

        if !line.is_empty() {
            line.push(' ');
        }

        line.push_str(word);
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines
}

fn metavariable(syntax: &NamedSyntax) -> String {
    syntax.name().to_ascii_uppercase().replace('-', "_")
}

fn short_long(syntax: &NamedSyntax) -> (Option<char>, Option<&str>) {
    let mut short = None;
    let mut long = None;

    for coordinate in syntax.coordinates() {
        match coordinate {
            Coordinate::ShortSwitch(c) => short = Some(*c),
            Coordinate::LongSwitch(name) => long = Some(name.as_str()),
            _ => {}
        }
    }

    (short, long)
}

fn switch_summary(syntax: &NamedSyntax) -> Option<String> {
    let (short, long) = short_long(syntax);
    let switch = match (short, long) {
        (Some(c), _) => format!("-{c}"),
        (None, Some(name)) => format!("--{name}"),
        (None, None) => return None,
    };

    match syntax.kind() {
        SyntaxKind::Flag => Some(format!("[{switch}]")),
        SyntaxKind::Option => {
            let grammar = format!("{switch} {}", metavariable(syntax));

            if syntax.value_type().shape() == Shape::Collection {
                Some(format!("[{grammar}]..."))
            } else if syntax.is_required() && syntax.default_value().is_none() {
                Some(grammar)
            } else {
                Some(format!("[{grammar}]"))
            }
        }
        _ => None,
    }
}

fn switch_columns(syntax: &NamedSyntax) -> Option<String> {
    let grammar = match syntax.kind() {
        SyntaxKind::Flag => String::default(),
        SyntaxKind::Option => format!(" {}", metavariable(syntax)),
        _ => return None,
    };
    let switches: Vec<String> = syntax
        .coordinates()
        .iter()
        .filter_map(|coordinate| match coordinate {
            Coordinate::ShortSwitch(c) => Some(format!("-{c}{grammar}")),
            Coordinate::LongSwitch(name) => Some(format!("--{name}{grammar}")),
            _ => None,
        })
        .collect();
    Some(switches.join(", "))
}

fn positional_summary(syntax: &NamedSyntax) -> Option<String> {
    syntax.position()?;
    let name = metavariable(syntax);
    let required = syntax.is_required() && syntax.default_value().is_none();

    Some(match (syntax.value_type().shape(), required) {
        (Shape::Collection, true) => format!("{name} [...]"),
        (Shape::Collection, false) => format!("[{name} ...]"),
        (_, true) => name,
        (_, false) => format!("[{name}]"),
    })
}

fn variables(syntax: &NamedSyntax) -> String {
    syntax
        .coordinates()
        .iter()
        .map(|coordinate| match coordinate {
            Coordinate::EnvironmentVariable(name) | Coordinate::Property(name) => name.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe(syntax: &NamedSyntax) -> String {
    let mut parts = Vec::default();

    if let Some(description) = syntax.description() {
        parts.push(description.to_string());
    }

    if let Some(default) = syntax.default_value() {
        parts.push(format!("(default: {default})"));
    }

    if let Some(example) = syntax.example_value() {
        parts.push(format!("(ex: {example})"));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Subcommand;
    use crate::describe::{ConfigurableTag, InvocationError, ValueType};
    use crate::error::{ArgumentError, ScanError, SyntaxError};
    use crate::scan::syntax::test::{flag, option, positional, syntax};
    use std::any::Any;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn single(name: &str, description: Option<&str>, syntax: Vec<NamedSyntax>) -> Command {
        let mut tag = ConfigurableTag::new().name(name);
        tag.description = description.map(str::to_string);
        Command::Single(SingleCommand {
            type_name: "Config",
            name: name.to_string(),
            tag,
            syntax,
            rules: Vec::default(),
        })
    }

    fn multi(name: &str, children: Vec<(&str, Command)>) -> Command {
        let subcommands: BTreeMap<Discriminator, Subcommand> = children
            .into_iter()
            .map(|(discriminator, command)| {
                (
                    discriminator.parse().unwrap(),
                    Subcommand {
                        command,
                        wrap: Arc::new(
                            |built: Box<dyn Any>| -> Result<Box<dyn Any>, InvocationError> {
                                Ok(built)
                            },
                        ),
                    },
                )
            })
            .collect();
        Command::Multi(MultiCommand {
            type_name: "Tool",
            name: name.to_string(),
            tag: ConfigurableTag::new().name(name),
            subcommands,
        })
    }

    fn described(mut syntax: NamedSyntax, description: &str) -> NamedSyntax {
        syntax.description = Some(description.to_string());
        syntax
    }

    fn required(mut syntax: NamedSyntax) -> NamedSyntax {
        syntax.required = true;
        syntax
    }

    fn greet() -> Command {
        single(
            "greet",
            Some("Say hello."),
            vec![
                described(flag("verbose", 'v'), "Talk more."),
                option("name", 'n', ValueType::scalar::<String>()),
                required(positional("greeting", 0, ValueType::scalar::<String>())),
                positional("items", 1, ValueType::collection::<String>()),
                syntax(
                    "home",
                    SyntaxKind::Environment,
                    vec![Coordinate::EnvironmentVariable("HOME".to_string())],
                    ValueType::scalar::<String>(),
                ),
            ],
        )
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn summary_single() {
        assert_eq!(
            Usage::new("greet", None).summary(&greet()),
            "usage: greet [-h] [-v] [-n NAME] GREETING [ITEMS ...]"
        );
    }

    #[test]
    fn help_single() {
        // Setup
        let usage = Usage::new("greet", None);

        // Execute
        let help = usage.help(&greet());

        // Verify
        assert_eq!(
            help,
            r#"usage: greet [-h] [-v] [-n NAME] GREETING [ITEMS ...]

Say hello.

positional arguments:
 GREETING
 [ITEMS ...]

options:
 -h, --help             Show this help message and exit.
 -v, --verbose          Talk more.
 -n NAME, --name NAME

environment:
 HOME"#
        );
    }

    #[test]
    fn help_multi() {
        // Setup
        let tool = multi(
            "tool",
            vec![
                ("fetch", single("fetch", Some("Fetch things."), Vec::default())),
                ("push", single("push", None, Vec::default())),
            ],
        );

        // Execute
        let help = Usage::new("tool", None).help(&tool);

        // Verify
        assert_eq!(
            help,
            r#"usage: tool [-h] {fetch,push} ...

subcommands:
 fetch   Fetch things.
 push

options:
 -h, --help   Show this help message and exit."#
        );
    }

    #[test]
    fn columns_wrap() {
        // Setup
        let usage = Usage::new("program", Some(40));
        let rows = vec![(
            "-a".to_string(),
            "one two three four five six seven eight".to_string(),
        )];

        // Execute
        let lines = usage.columns(&rows);

        // Verify
        assert_eq!(
            lines,
            vec![
                " -a   one two three four five six".to_string(),
                "      seven eight".to_string(),
            ]
        );
    }

    #[test]
    fn target_nested() {
        // Setup
        let tool = multi(
            "tool",
            vec![("remote", multi("remote", vec![("add", single("add", None, Vec::default()))]))],
        );

        // Execute
        let (path, command) = help_target(&tool, &strings(&["remote", "add", "--help"]));

        // Verify
        assert_eq!(
            path.iter().map(Discriminator::to_string).collect::<Vec<_>>(),
            vec!["remote", "add"]
        );
        assert_eq!(command.name(), "add");
    }

    #[test]
    fn format_chain() {
        // Setup
        let root = greet();
        let formatters = ErrorFormatters::default();
        let arguments = strings(&["--bogus"]);
        let context = FormatContext {
            program: "greet",
            root: &root,
            arguments: &arguments,
            width: None,
        };

        // Execute
        let help = formatters.format(
            &Error::from(SyntaxError::HelpRequested {
                command: "greet".to_string(),
            }),
            &context,
        );
        let syntax = formatters.format(
            &Error::from(SyntaxError::UnrecognizedSwitch {
                switch: Coordinate::LongSwitch("bogus".to_string()),
            }),
            &context,
        );
        let argument = formatters.format(
            &Error::from(ArgumentError::NotConstructed {
                type_name: "Config".to_string(),
            }),
            &context,
        );
        let scan = formatters.format(
            &Error::from(ScanError::NoCreator {
                type_name: "Config".to_string(),
            }),
            &context,
        );

        // Verify
        assert!(help.help);
        assert_eq!(help.exit_code, 0);
        assert!(help.message.starts_with("usage: greet [-h]"));
        assert_eq!(
            syntax,
            Report {
                message: "usage: greet [-h] [-v] [-n NAME] GREETING [ITEMS ...]\nerror: Unrecognized switch '--bogus'.".to_string(),
                exit_code: 1,
                help: false,
            }
        );
        assert_eq!(argument.message, "error: Instance of 'Config' was not constructed.");
        assert_eq!(argument.exit_code, 1);
        assert_eq!(scan.exit_code, 1);
        assert!(!scan.help);
    }

    #[test]
    fn format_empty_arguments() {
        // Setup
        let root = greet();
        let arguments = Vec::default();
        let context = FormatContext {
            program: "greet",
            root: &root,
            arguments: &arguments,
            width: None,
        };

        // Execute
        let report = ErrorFormatters::default().format(
            &Error::from(ArgumentError::MissingRequired {
                name: "greeting".to_string(),
                coordinates: "0".to_string(),
            }),
            &context,
        );

        // Verify
        assert!(report.help);
        assert_eq!(report.exit_code, 0);
    }
}
