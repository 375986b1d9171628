//! Line I/O for the console
//!
//! - Input: one command per line, UTF-8
//! - Output: replies on the console's writer, diagnostics on stderr
//! - A prompt is written only when one is given (interactive terminal)

use std::io::{BufRead, Write};

use super::errors::CliResult;
use super::interpreter::{Console, Flow};

/// Reads lines from `input` and executes them until `quit`, `EOF` or end of input.
///
/// End of input behaves like the `EOF` command: a newline is printed and the
/// loop ends.
pub fn run_loop<R: BufRead, W: Write>(
    console: &mut Console<W>,
    mut input: R,
    prompt: Option<&str>,
) -> CliResult<()> {
    let mut line = String::new();
    loop {
        if let Some(prompt) = prompt {
            console.prompt(prompt)?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            console.end_of_input()?;
            return Ok(());
        }

        if console.execute(&line)? == Flow::Exit {
            return Ok(());
        }
    }
}
