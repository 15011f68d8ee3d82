// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - analyze: lint a source file (or stdin) and print a health report
// - verify:  check a list of URLs directly
//
// Probe settings can come from flags or environment variables, so CI jobs
// can tune them without changing the command line.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use code_health::LanguageTag;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "code-health",
    version,
    about = "Lint source code, measure it, and verify the links it references",
    long_about = "code-health guesses the language of a source file, runs pattern rules for style and \
                  security issues, computes size metrics, optionally checks every URL in the code, \
                  and reduces everything to a 0-100 quality score."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a source file and print its health report
    ///
    /// Example: code-health analyze src/app.js --verify-links
    Analyze {
        /// File to analyze; reads stdin when omitted or "-"
        path: Option<PathBuf>,

        /// Filename hint for language detection (defaults to PATH's file name)
        #[arg(long)]
        filename: Option<String>,

        /// Skip detection and use this language
        #[arg(long, value_parser = clap::value_parser!(LanguageTag))]
        language: Option<LanguageTag>,

        /// Extract URLs from the code and check that they respond
        #[arg(long)]
        verify_links: bool,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        probe: ProbeArgs,
    },

    /// Check that URLs respond (1 to 50 at a time)
    ///
    /// Example: code-health verify https://www.rust-lang.org https://crates.io
    Verify {
        /// URLs to check
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        probe: ProbeArgs,
    },
}

/// Link probe tuning shared by both subcommands
#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Seconds before a single link check gives up
    #[arg(long, env = "CODE_HEALTH_PROBE_TIMEOUT_SECS", default_value_t = 5)]
    pub timeout_secs: u64,

    /// How many links are checked at the same time
    #[arg(long, env = "CODE_HEALTH_BATCH_SIZE", default_value_t = 5)]
    pub batch_size: usize,
}
