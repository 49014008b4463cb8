//! `confer` builds typed, validated configuration objects from command line arguments, environment variables, and
//! properties.
//!
//! A configurable type describes *what* it accepts: flags, options, positional arguments, environment variables, and
//! properties.
//! `confer` works out *how* to build it:
//! * The type is scanned once into a command: its argument syntax, and the rules which create and modify an instance.
//! The scan statically verifies every required property is consumed by a rule, and that every rule can eventually run.
//! * Each invocation tokenizes, parses, groups, maps, and reduces the arguments into facts.
//! A forward-chaining rules engine then creates the instance and applies the facts to it.
//! * Multi-command types select their concrete command with leading discriminators (ex: `toolbox fetch ..`).
//!
//! Errors are grouped by phase: [`ScanError`] for a type which cannot be configured (a programming error),
//! [`SyntaxError`] for malformed arguments, and [`ArgumentError`] for well formed arguments which still fail to build.
//!
//! # Usage
//! Describe the type with `#[derive(Configurable)]`, and build it with [`Configurable::configure`]:
//! ```no_run
#![doc = include_str!("../demos/greet.rs")]
//! ```
//!
//! This generates the following program:
//! ```console
//! $ greet -h
//! greet 0.3.0
//! usage: greet [-h] [-v] [-n NAME] [--times REPEAT] [WORDS ...]
//!
//! Greet someone, politely.
//! ..
//!
//! $ GREET_PUNCTUATION=? greet -n there Hi
//! Hi, there?
//! ```
//!
//! Multi-commands are enums whose variants each hold one subcommand:
//! ```no_run
#![doc = include_str!("../demos/toolbox.rs")]
//! ```
//!
//! The [`Pipeline`] exposes every phase for configuration: the tokenizer and its preprocessors, the deserializers,
//! the value sources, the rules engine, listeners, and error formatters.
//! Without the derive macro, implement [`Describable`] by hand with the [`TypeDescriptor`] builder.
pub use confer_core::*;
pub use confer_derive::*;
