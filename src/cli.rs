//! Command-line interface, built with clap derive.
//!
//! `replay` drives a scenario file through the grading engine; `demo`
//! runs the built-in worked example.

use clap::{Parser, Subcommand};

/// Retry-with-penalty grading engine for quiz attempts.
#[derive(Debug, Parser)]
#[command(name = "retrymark", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Also print the full attempt history as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a scenario file (question, config and action list).
    Replay {
        /// Path to the scenario TOML file.
        file: String,

        /// Persist tries counters in this JSON file instead of memory.
        #[arg(long)]
        store: Option<String>,

        /// Take the question configuration from a quiz bank file
        /// instead of the scenario.
        #[arg(long, requires = "quiz")]
        bank: Option<String>,

        /// Quiz id to look the question up under in the bank.
        #[arg(long)]
        quiz: Option<String>,
    },

    /// Run the built-in three-tries demonstration.
    Demo,
}
