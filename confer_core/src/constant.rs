/// The fact name of the instance under construction.
pub const INSTANCE: &str = "";

pub(crate) const HELP_DISCRIMINATOR: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';
pub(crate) const HELP_LONG: &str = "help";

pub(crate) const EXIT_HELP: i32 = 0;
pub(crate) const EXIT_ERROR: i32 = 1;
