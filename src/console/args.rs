//! CLI argument definitions using clap
//!
//! - hbnb [--config <path>]

use clap::Parser;
use std::path::PathBuf;

/// hbnb - command console over a JSON-backed object store
#[derive(Parser, Debug)]
#[command(name = "hbnb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default ./hbnb.json when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
