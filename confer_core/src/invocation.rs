//! The orchestrator: scan, resolve, read the arguments, and run the rules which build the instance.
use std::any::{type_name, Any, TypeId};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::args::{self, ArgumentSyntax, Grouped, Token};
use crate::cache::ScanCache;
use crate::command::{resolve, Command, Resolution, SingleCommand};
use crate::constant::{HELP_LONG, HELP_SHORT, INSTANCE};
use crate::describe::{Describable, Facts};
use crate::deserialize::DeserializerRegistry;
use crate::error::{ArgumentError, Error, ScanError, SyntaxError};
use crate::format::{terminal_width, ErrorFormatters, FormatContext};
use crate::interface::{ConsoleInterface, UserInterface};
use crate::model::Coordinate;
use crate::rules::{Reaction, RulesEngine};
use crate::scan::Scanner;
use crate::source::{EnvironmentVariables, Properties, ValueSource};

/// Hooks into the stages of an invocation.
///
/// Every stage hands over its output by shared reference.
#[allow(unused_variables)]
pub trait InvocationListener: Send + Sync {
    /// The root command was scanned (or found in the cache).
    fn scanned(&self, command: &Command) {}

    /// The discriminators were dereferenced.
    fn resolved(&self, resolution: &Resolution<'_>) {}

    /// The remaining arguments were tokenized.
    fn tokenized(&self, tokens: &[Token]) {}

    /// The tokens were parsed, and the environment and property sources consulted.
    fn parsed(&self, pairs: &[(Coordinate, String)]) {}

    /// The values were grouped by property.
    fn grouped(&self, grouped: &Grouped) {}

    /// The values were deserialized and reduced into facts.
    fn reduced(&self, facts: &Facts) {}

    /// The rules were run.
    fn built(&self, reaction: &Reaction) {}
}

/// The configured construction pipeline.
///
/// ### Example
/// ```ignore
/// let config: Config = Pipeline::default()
///     .with_properties(Properties::new().with("app.level", "3"))
///     .invoke(&["--verbose", "input.txt"])?;
/// ```
#[derive(Clone)]
pub struct Pipeline {
    scanner: Arc<Scanner>,
    syntax: ArgumentSyntax,
    registry: DeserializerRegistry,
    environment: Arc<dyn ValueSource>,
    properties: Arc<dyn ValueSource>,
    engine: Arc<RulesEngine>,
    listeners: Vec<Arc<dyn InvocationListener>>,
    formatters: Arc<ErrorFormatters>,
    cache: Arc<ScanCache>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            scanner: Arc::new(Scanner::default()),
            syntax: ArgumentSyntax::default(),
            registry: DeserializerRegistry::default(),
            environment: Arc::new(EnvironmentVariables),
            properties: Arc::new(Properties::new()),
            engine: Arc::new(RulesEngine::default()),
            listeners: Vec::default(),
            formatters: Arc::new(ErrorFormatters::default()),
            cache: ScanCache::global(),
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("scanner", &self.scanner)
            .field("syntax", &self.syntax)
            .field("registry", &self.registry)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Scan with `scanner`; the pipeline gets its own scan cache.
    pub fn with_scanner(mut self, scanner: Scanner) -> Self {
        self.scanner = Arc::new(scanner);
        self.cache = Arc::new(ScanCache::default());
        self
    }

    /// Deserialize with `registry`; the pipeline gets its own scan cache.
    pub fn with_registry(mut self, registry: DeserializerRegistry) -> Self {
        self.registry = registry;
        self.cache = Arc::new(ScanCache::default());
        self
    }

    /// Tokenize with `syntax`.
    pub fn with_syntax(mut self, syntax: ArgumentSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Read environment coordinates from `source`.
    pub fn with_environment(mut self, source: impl ValueSource + 'static) -> Self {
        self.environment = Arc::new(source);
        self
    }

    /// Read property coordinates from `source`.
    pub fn with_properties(mut self, source: impl ValueSource + 'static) -> Self {
        self.properties = Arc::new(source);
        self
    }

    /// Run rules with `engine`.
    pub fn with_engine(mut self, engine: RulesEngine) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    /// Notify `listener` of every stage.
    pub fn with_listener(mut self, listener: impl InvocationListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Render failures with `formatters`.
    pub fn with_formatters(mut self, formatters: ErrorFormatters) -> Self {
        self.formatters = Arc::new(formatters);
        self
    }

    /// Memoize scans in `cache`.
    pub fn with_cache(mut self, cache: Arc<ScanCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Scan `T`, or fetch it from the cache.
    pub fn scan<T: Describable>(&self) -> Result<Arc<Command>, ScanError> {
        let command = self.cache.get_or_scan(TypeId::of::<T>(), || {
            self.scanner.scan(&T::describe(), &self.registry)
        })?;
        self.notify(|listener| listener.scanned(&command));
        Ok(command)
    }

    /// Build a `T` from `arguments` (excluding the program name).
    pub fn invoke<T: Describable>(&self, arguments: &[impl AsRef<str>]) -> Result<T, Error> {
        let arguments: Vec<String> = arguments
            .iter()
            .map(|argument| argument.as_ref().to_string())
            .collect();
        let root = self.scan::<T>()?;
        self.construct(&root, &arguments)
    }

    /// Build a `T` from `arguments` (excluding the program name), rendering any failure on `interface`.
    ///
    /// Returns the exit code on failure: `0` when help was shown, `1` otherwise.
    ///
    /// ### Panics
    /// When `T` does not scan.
    pub fn run<T: Describable>(
        &self,
        program: &str,
        arguments: &[impl AsRef<str>],
        interface: &(impl UserInterface + ?Sized),
    ) -> Result<T, i32> {
        let arguments: Vec<String> = arguments
            .iter()
            .map(|argument| argument.as_ref().to_string())
            .collect();
        let root = match self.scan::<T>() {
            Ok(root) => root,
            Err(error) => panic!("Invalid configurable type '{}': {error}", type_name::<T>()),
        };

        match self.construct(&root, &arguments) {
            Ok(instance) => Ok(instance),
            Err(error) => {
                let program = root
                    .tag()
                    .name
                    .clone()
                    .unwrap_or_else(|| program_name(program));
                let context = FormatContext {
                    program: &program,
                    root: &root,
                    arguments: &arguments,
                    width: terminal_width(),
                };
                let report = self.formatters.format(&error, &context);
                debug!("Invocation failed with exit code {}: {error}", report.exit_code);

                if report.help {
                    interface.print(report.message);
                } else {
                    interface.print_error(report.message);
                }

                Err(report.exit_code)
            }
        }
    }

    fn construct<T: Describable>(&self, root: &Command, arguments: &[String]) -> Result<T, Error> {
        let built = self.build(root, arguments)?;
        let instance = built
            .downcast::<T>()
            .map_err(|_| ArgumentError::NotConstructed {
                type_name: type_name::<T>().to_string(),
            })?;
        info!("Built '{}'.", root.name());
        Ok(*instance)
    }

    fn build(&self, root: &Command, arguments: &[String]) -> Result<Box<dyn Any>, Error> {
        let resolution = resolve(root, arguments)?;
        self.notify(|listener| listener.resolved(&resolution));
        let command = resolution.command();
        let syntax = command.syntax();

        let tokens = self.syntax.tokenize(resolution.remaining());
        self.notify(|listener| listener.tokenized(&tokens));

        let parsed = args::parse(tokens, syntax).map_err(|error| help_switch(error, command))?;
        // The last value of a scalar wins, so the command line goes after the other sources.
        let mut pairs = args::lookup(syntax, self.environment.as_ref(), self.properties.as_ref());
        pairs.extend(parsed);
        self.notify(|listener| listener.parsed(&pairs));

        let grouped = args::group(pairs, syntax)?;
        self.notify(|listener| listener.grouped(&grouped));

        let mapped = args::map(grouped, syntax, &self.registry)?;
        let facts = args::reduce(mapped, syntax, &self.registry)?;
        self.notify(|listener| listener.reduced(&facts));

        let (mut facts, reaction) = self
            .engine
            .run(command.rules(), facts)
            .map_err(ArgumentError::from)?;
        self.notify(|listener| listener.built(&reaction));

        let instance = facts
            .remove(INSTANCE)
            .ok_or_else(|| ArgumentError::NotConstructed {
                type_name: command.type_name().to_string(),
            })?;
        let wrapped = resolution
            .wrap(instance)
            .map_err(|(type_name, source)| ArgumentError::RuleEvaluation {
                rule: format!("{type_name}::wrap"),
                source,
            })?;
        Ok(wrapped)
    }

    fn notify(&self, f: impl Fn(&dyn InvocationListener)) {
        for listener in &self.listeners {
            f(listener.as_ref());
        }
    }
}

// An undeclared help switch at a single command is a help request.
fn help_switch(error: SyntaxError, command: &SingleCommand) -> SyntaxError {
    match &error {
        SyntaxError::UnrecognizedSwitch { switch }
            if *switch == Coordinate::ShortSwitch(HELP_SHORT)
                || *switch == Coordinate::LongSwitch(HELP_LONG.to_string()) =>
        {
            SyntaxError::HelpRequested {
                command: command.name().to_string(),
            }
        }
        _ => error,
    }
}

fn program_name(program: &str) -> String {
    Path::new(program)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(program)
        .to_string()
}

/// Entry points for every describable type.
pub trait Configurable: Describable + Sized {
    /// Build an instance from `arguments` (excluding the program name) with the standard pipeline.
    fn from_args(arguments: &[impl AsRef<str>]) -> Result<Self, Error> {
        Pipeline::default().invoke(arguments)
    }

    /// Build an instance from the process arguments with the standard pipeline.
    ///
    /// On failure, help or the error is printed to the console and the process exits: with code `0` when help was
    /// shown, `1` otherwise.
    ///
    /// ### Panics
    /// When the type does not scan.
    fn configure() -> Self {
        let mut arguments = std::env::args();
        let program = arguments.next().unwrap_or_default();
        let arguments: Vec<String> = arguments.collect();

        match Pipeline::default().run(&program, &arguments, &ConsoleInterface::default()) {
            Ok(instance) => instance,
            Err(exit_code) => std::process::exit(exit_code),
        }
    }
}

impl<T: Describable> Configurable for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::{
        ConfigurableTag, InvocationError, MemberDescriptor, ParameterDescriptor, PositionalTag,
        SubcommandDescriptor, SwitchTag, Tag, TypeDescriptor, ValueType, VariableTag, Visibility,
    };
    use crate::interface::InMemoryInterface;
    use crate::scan::{CandidateSyntax, NamedSyntax, SyntaxDetector, SyntaxKind};
    use crate::test::assert_contains;
    use assert_matches::assert_matches;
    use std::sync::Mutex;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Server {
        verbose: bool,
        port: u16,
        host: Option<String>,
        tags: Vec<String>,
        home: String,
    }

    impl Describable for Server {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::concrete::<Self>()
                .configurable(
                    ConfigurableTag::new()
                        .name("server")
                        .description("Serve things.")
                        .discriminator("server"),
                )
                .member(MemberDescriptor::creator(
                    "default",
                    Visibility::Public,
                    Vec::default(),
                    |_: &Facts| Ok(Server::default()),
                ))
                .member(
                    MemberDescriptor::field(
                        "verbose",
                        Visibility::Public,
                        ValueType::scalar::<bool>(),
                        |server: &mut Server, verbose: bool| server.verbose = verbose,
                    )
                    .tag(Tag::Flag(SwitchTag::new().short('v').long("verbose"))),
                )
                .member(
                    MemberDescriptor::field(
                        "port",
                        Visibility::Public,
                        ValueType::scalar::<u16>(),
                        |server: &mut Server, port: u16| server.port = port,
                    )
                    .tag(Tag::Option(
                        SwitchTag::new().short('p').long("port").default_value("8080"),
                    )),
                )
                .member(
                    MemberDescriptor::field(
                        "host",
                        Visibility::Public,
                        ValueType::optional::<String>(),
                        |server: &mut Server, host: Option<String>| server.host = host,
                    )
                    .tag(Tag::Positional(PositionalTag::new(0))),
                )
                .member(
                    MemberDescriptor::field(
                        "tags",
                        Visibility::Public,
                        ValueType::collection::<String>(),
                        |server: &mut Server, tags: Vec<String>| server.tags = tags,
                    )
                    .tag(Tag::Option(SwitchTag::new().long("tag"))),
                )
                .member(
                    MemberDescriptor::field(
                        "home",
                        Visibility::Public,
                        ValueType::scalar::<String>(),
                        |server: &mut Server, home: String| server.home = home,
                    )
                    .tag(Tag::Environment(
                        VariableTag::new("SERVER_HOME").default_value("/srv"),
                    )),
                )
        }
    }

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl Describable for Point {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::concrete::<Self>()
                .configurable(ConfigurableTag::new().name("point").discriminator("point"))
                .member(
                    MemberDescriptor::creator(
                        "new",
                        Visibility::Public,
                        vec![
                            ParameterDescriptor::new("x", ValueType::scalar::<i32>())
                                .tag(Tag::Positional(PositionalTag::new(0).required())),
                            ParameterDescriptor::new("y", ValueType::scalar::<i32>())
                                .tag(Tag::Positional(PositionalTag::new(1).required())),
                        ],
                        |facts: &Facts| {
                            let x = facts.get::<i32>("x")?;
                            let y = facts.get::<i32>("y")?;

                            if x < 0 {
                                return Err(InvocationError::Failed("x must not be negative".to_string()));
                            }

                            Ok(Point { x, y })
                        },
                    )
                    .tag(Tag::Creator),
                )
        }
    }

    #[derive(Debug, PartialEq)]
    enum Shape {
        Point(Point),
        Server(Server),
    }

    impl Describable for Shape {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::abstract_type::<Self>()
                .configurable(ConfigurableTag::new().name("shape"))
                .permitted(SubcommandDescriptor::new::<Shape, Point, _>(Shape::Point))
                .permitted(SubcommandDescriptor::new::<Shape, Server, _>(Shape::Server))
        }
    }

    #[derive(Debug)]
    struct Unconfigurable;

    impl Describable for Unconfigurable {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::concrete::<Self>()
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline::default()
            .with_cache(Arc::new(ScanCache::default()))
            .with_environment(Properties::new())
    }

    #[test]
    fn invoke_single() {
        // Setup
        let pipeline = pipeline().with_environment(Properties::new().with("SERVER_HOME", "/home"));

        // Execute
        let server: Server = pipeline
            .invoke(&["-v", "--port=9000", "--tag", "a", "example.com", "--tag", "b"])
            .unwrap();

        // Verify
        assert_eq!(
            server,
            Server {
                verbose: true,
                port: 9000,
                host: Some("example.com".to_string()),
                tags: vec!["a".to_string(), "b".to_string()],
                home: "/home".to_string(),
            }
        );
    }

    #[test]
    fn invoke_absent() {
        let server: Server = pipeline().invoke(empty::slice::<&str>()).unwrap();
        assert_eq!(
            server,
            Server {
                verbose: false,
                port: 8080,
                host: None,
                tags: Vec::default(),
                home: "/srv".to_string(),
            }
        );
    }

    struct EnvironmentPort;

    impl SyntaxDetector for EnvironmentPort {
        fn detect(&self, candidate: &CandidateSyntax) -> Option<Result<NamedSyntax, ScanError>> {
            match candidate.tag {
                Tag::Option(_) if candidate.name == "port" => Some(Ok(NamedSyntax::new(
                    "port",
                    SyntaxKind::Option,
                    vec![
                        Coordinate::LongSwitch("port".to_string()),
                        Coordinate::EnvironmentVariable("SERVER_PORT".to_string()),
                    ],
                    candidate.value_type.clone(),
                )
                .with_default_value("8080"))),
                _ => None,
            }
        }
    }

    #[test]
    fn invoke_command_line_precedence() {
        // Setup
        let pipeline = pipeline()
            .with_scanner(Scanner::default().with_syntax_detector(EnvironmentPort))
            .with_environment(Properties::new().with("SERVER_PORT", "7000"));

        // Execute
        let overridden: Server = pipeline.invoke(&["--port", "9000"]).unwrap();
        let looked_up: Server = pipeline.invoke(empty::slice::<&str>()).unwrap();

        // Verify
        assert_eq!(overridden.port, 9000);
        assert_eq!(looked_up.port, 7000);
    }

    #[test]
    fn invoke_designated_creator() {
        let point: Point = pipeline().invoke(&["3", "-4"]).unwrap();
        assert_eq!(point, Point { x: 3, y: -4 });
    }

    #[test]
    fn invoke_multi() {
        // Setup
        let pipeline = pipeline();

        // Execute
        let point: Shape = pipeline.invoke(&["point", "1", "2"]).unwrap();
        let server: Shape = pipeline.invoke(&["server", "-p", "1"]).unwrap();

        // Verify
        assert_eq!(point, Shape::Point(Point { x: 1, y: 2 }));
        assert_matches!(server, Shape::Server(Server { port: 1, .. }));
    }

    #[test]
    fn invoke_syntax_errors() {
        let pipeline = pipeline();

        assert_matches!(
            pipeline.invoke::<Server>(&["--bogus"]),
            Err(Error::Syntax(SyntaxError::UnrecognizedSwitch { .. }))
        );
        assert_matches!(
            pipeline.invoke::<Server>(&["--help"]),
            Err(Error::Syntax(SyntaxError::HelpRequested { command })) if command == "server"
        );
        assert_matches!(
            pipeline.invoke::<Shape>(&["point", "-h"]),
            Err(Error::Syntax(SyntaxError::HelpRequested { command })) if command == "point"
        );
        assert_matches!(
            pipeline.invoke::<Shape>(&["help"]),
            Err(Error::Syntax(SyntaxError::HelpRequested { command })) if command == "shape"
        );
        assert_matches!(
            pipeline.invoke::<Shape>(&["circle"]),
            Err(Error::Syntax(SyntaxError::UnrecognizedDiscriminator { .. }))
        );
    }

    #[test]
    fn invoke_argument_errors() {
        let pipeline = pipeline();

        assert_matches!(
            pipeline.invoke::<Server>(&["--port", "http"]),
            Err(Error::Argument(ArgumentError::Deserialization { name, .. })) if name == "port"
        );
        assert_matches!(
            pipeline.invoke::<Point>(&["1"]),
            Err(Error::Argument(ArgumentError::MissingRequired { name, .. })) if name == "y"
        );
        assert_matches!(
            pipeline.invoke::<Point>(&["-1", "2"]),
            Err(Error::Argument(ArgumentError::RuleEvaluation { rule, .. })) if rule == "Point::new"
        );
    }

    #[test]
    fn invoke_scan_error() {
        assert_matches!(
            pipeline().invoke::<Unconfigurable>(empty::slice::<&str>()),
            Err(Error::Scan(ScanError::NotConfigurable { .. }))
        );
    }

    #[derive(Default)]
    struct Recorder {
        stages: Mutex<Vec<String>>,
    }

    impl InvocationListener for Arc<Recorder> {
        fn scanned(&self, command: &Command) {
            self.record(format!("scanned {}", command.name()));
        }

        fn resolved(&self, resolution: &Resolution<'_>) {
            self.record(format!("resolved {}", resolution.command().name()));
        }

        fn tokenized(&self, tokens: &[Token]) {
            self.record(format!("tokenized {}", tokens.len()));
        }

        fn parsed(&self, pairs: &[(Coordinate, String)]) {
            self.record(format!("parsed {}", pairs.len()));
        }

        fn grouped(&self, grouped: &Grouped) {
            self.record(format!("grouped {}", grouped.len()));
        }

        fn reduced(&self, facts: &Facts) {
            self.record(format!("reduced {}", facts.len()));
        }

        fn built(&self, reaction: &Reaction) {
            self.record(format!("built {}", reaction.evaluated.len()));
        }
    }

    impl Recorder {
        fn record(&self, stage: String) {
            self.stages.lock().unwrap().push(stage);
        }
    }

    #[test]
    fn listeners() {
        // Setup
        let recorder = Arc::new(Recorder::default());
        let pipeline = pipeline().with_listener(recorder.clone());

        // Execute
        let _: Point = pipeline.invoke(&["1", "2"]).unwrap();

        // Verify
        assert_eq!(
            *recorder.stages.lock().unwrap(),
            vec![
                "scanned point",
                "resolved point",
                "tokenized 2",
                "parsed 2",
                "grouped 2",
                "reduced 2",
                "built 1",
            ]
        );
    }

    #[test]
    fn run_help() {
        // Setup
        let interface = InMemoryInterface::default();

        // Execute
        let result = pipeline().run::<Shape>("/usr/bin/shape", &["--help"], &interface);

        // Verify
        assert_eq!(result.unwrap_err(), 0);
        let (message, error) = interface.consume();
        let message = message.unwrap();
        assert!(message.starts_with("usage: shape [-h] {point,server} ..."));
        assert_contains!(message, "subcommands:");
        assert_contains!(message, " server   Serve things.");
        assert_eq!(error, None);
    }

    #[test]
    fn run_error() {
        // Setup
        let interface = InMemoryInterface::default();

        // Execute
        let result = pipeline().run::<Shape>("shape", &["point", "1", "2", "3"], &interface);

        // Verify
        assert_eq!(result.unwrap_err(), 1);
        let (message, error) = interface.consume();
        assert_eq!(message, None);
        assert_eq!(
            error.unwrap(),
            "usage: shape point [-h] X Y\nerror: Unrecognized argument '3' at position 2."
        );
    }

    #[test]
    fn run_empty() {
        let interface = InMemoryInterface::default();
        let result = pipeline().run::<Shape>("shape", empty::slice::<&str>(), &interface);
        assert_eq!(result.unwrap_err(), 0);
        assert!(interface.consume().0.is_some());
    }

    #[test]
    #[should_panic]
    fn run_scan_error() {
        let _ = pipeline().run::<Unconfigurable>("program", empty::slice::<&str>(), &InMemoryInterface::default());
    }
}
