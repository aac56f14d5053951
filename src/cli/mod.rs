pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ModeArg};
pub use commands::run;
