//! Core module for `confer`.
//! Turns a described type into a runtime procedure for building it from command line arguments, environment variables,
//! and properties.
//!
//! The construction pipeline is:
//! 1. [`scan`]: the type description becomes a validated [`command::Command`], statically verified by the
//!    [`rules::analysis`].
//! 2. [`command::resolve`]: the leading discriminators select the concrete command.
//! 3. [`args`]: the remaining arguments are tokenized, parsed, grouped, mapped, and reduced into facts.
//! 4. [`rules::RulesEngine`]: the facts drive the rules which create and modify the instance.
//!
//! See [`Pipeline`] for the configurable orchestrator, and [`Configurable`] for the entry points.
#![deny(missing_docs)]
pub mod args;
mod cache;
pub mod command;
mod constant;
mod describe;
mod deserialize;
mod error;
pub mod format;
mod interface;
mod invocation;
mod model;
pub mod rules;
pub mod scan;
mod source;

pub use cache::ScanCache;
pub use constant::INSTANCE;
pub use describe::*;
pub use deserialize::*;
pub use error::*;
pub use interface::*;
pub use invocation::*;
pub use model::{Coordinate, Discriminator, InvalidDiscriminator, SwitchName};
pub use source::*;
