//! Command-line interface, built on clap.
//!
//! Defines the [`Cli`] struct with subcommands [`Command`] (provision,
//! status, demo) and global flags (--max-attempts, --poll-delay-ms,
//! --verbose).

use clap::{Parser, Subcommand};

/// scribe — managed ledger client demo.
#[derive(Debug, Parser)]
#[command(name = "scribe", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Maximum readiness-poll attempts before reporting a timeout.
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Delay between readiness-poll attempts, in milliseconds.
    #[arg(long, global = true)]
    pub poll_delay_ms: Option<u64>,

    /// Enable verbose output.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the ledger if needed and wait until it is ACTIVE.
    Provision {
        /// Ledger name; falls back to the configured `ledger_name`.
        name: Option<String>,
    },

    /// Show the ledger's current state.
    Status {
        /// Ledger name; falls back to the configured `ledger_name`.
        name: Option<String>,
    },

    /// Run the embedded end-to-end demo against an in-memory service.
    Demo {
        /// Ledger name; falls back to the configured `ledger_name`.
        name: Option<String>,

        /// Table to create and write to.
        #[arg(long, default_value = "People")]
        table: String,
    },
}
