//! Interactive command console
//!
//! Provides a line-oriented interpreter for:
//! - create / show / destroy / all / count / update
//! - `<Class>.<method>(<args>)` dotted calls
//! - help / quit / EOF

mod args;
mod commands;
mod errors;
mod interpreter;
mod io;
mod parse;

pub use args::Cli;
pub use commands::{boot, run, run_with};
pub use errors::{CliError, CliErrorCode, CliResult, CommandError, CommandResult};
pub use interpreter::{Console, Flow};
pub use io::run_loop;
