//! hbnb CLI entry point
//!
//! Parses arguments, runs the console, prints fatal errors to stderr and
//! exits non-zero on failure. Everything else lives in the console module.

use hbnb::console;

fn main() {
    if let Err(e) = console::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
