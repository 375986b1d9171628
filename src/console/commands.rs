//! Console boot sequence
//!
//! 1. Resolve configuration
//! 2. Apply log level
//! 3. Load the data file (fatal on corruption or unknown kinds)
//! 4. Run the read loop over stdin
//! 5. Log shutdown

use std::io::{self, IsTerminal};

use crate::config::ConsoleConfig;
use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::storage::StorageEngine;

use super::args::Cli;
use super::errors::CliResult;
use super::interpreter::Console;
use super::io::run_loop;

/// Main entry point: parse arguments and run the console
pub fn run() -> CliResult<()> {
    run_with(Cli::parse_args())
}

/// Run the console with already-parsed arguments
pub fn run_with(cli: Cli) -> CliResult<()> {
    let config = ConsoleConfig::resolve(cli.config.as_deref())?;
    Logger::set_min_severity(config.severity());

    log_event(Event::BootStart);
    let file_path = config.file_path.display().to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("file_path", file_path.as_str()),
            ("log_level", config.log_level.as_str()),
        ],
    );

    let storage = boot(&config)?;

    let stdin = io::stdin();
    let prompt = stdin.is_terminal().then_some(config.prompt.as_str());
    let mut console = Console::new(storage, io::stdout());
    run_loop(&mut console, stdin.lock(), prompt)?;

    log_event(Event::ShutdownComplete);
    Ok(())
}

/// Opens the storage engine named by `config`.
pub fn boot(config: &ConsoleConfig) -> CliResult<StorageEngine> {
    Ok(StorageEngine::open(&config.file_path)?)
}
