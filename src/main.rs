mod cli;
mod config;
mod error;
mod journal;
mod ledger;
mod memory;
mod poller;
mod txn;
mod ui;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};
use config::ScribeConfig;
use error::ScribeError;
use journal::{Person, record_person};
use ledger::{LedgerClient, LedgerControl, LedgerState, ensure_ledger};
use memory::{MemoryExecutor, MemoryLedgerControl, RetryPolicy};
use poller::ReadinessPoller;
use txn::TransactionRunner;
use ui::WaitProgress;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ScribeConfig::load()?;
    if let Some(n) = cli.max_attempts {
        config.max_attempts = n;
    }
    if let Some(ms) = cli.poll_delay_ms {
        config.poll_delay_ms = ms;
    }

    match cli.command {
        Command::Provision { name } => provision(&config, name).await?,
        Command::Status { name } => status(&config, name).await?,
        Command::Demo { name, table } => demo(&config, name, &table).await?,
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "scribe=debug" } else { "scribe=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Create the ledger if needed and block until it reports ACTIVE.
async fn provision(config: &ScribeConfig, name: Option<String>) -> Result<(), ScribeError> {
    let name = name.unwrap_or_else(|| config.ledger_name.clone());
    let client = LedgerClient::new(config.api_token.clone(), config.endpoint.clone());

    ensure_ledger(&client, &name).await?;

    let poller = ReadinessPoller::new(
        config.max_attempts,
        Duration::from_millis(config.poll_delay_ms),
    );
    let progress = WaitProgress::start(&name);
    let outcome = poller.wait_for(&client, &name, LedgerState::Active).await?;
    progress.complete(&outcome);

    if outcome.timed_out {
        return Err(ScribeError::ProvisioningTimeout {
            name,
            attempts: outcome.attempts_used,
            last_state: outcome.final_state,
        });
    }
    Ok(())
}

/// Print the ledger's current state.
async fn status(config: &ScribeConfig, name: Option<String>) -> Result<(), ScribeError> {
    let name = name.unwrap_or_else(|| config.ledger_name.clone());
    let client = LedgerClient::new(config.api_token.clone(), config.endpoint.clone());

    let desc = client.describe(&name).await?;
    match desc.created_at {
        Some(created_at) => println!("Ledger {}: {} (created {created_at})", desc.name, desc.state),
        None => println!("Ledger {}: {}", desc.name, desc.state),
    }
    Ok(())
}

/// Full end-to-end run against the in-memory service: provision, poll to
/// ACTIVE, then record a person inside one transaction and print the result.
async fn demo(config: &ScribeConfig, name: Option<String>, table: &str) -> Result<(), ScribeError> {
    let name = name.unwrap_or_else(|| config.ledger_name.clone());

    // The simulated control plane activates after two polls; clamp the
    // configured delays so the demo finishes in a moment.
    let control = MemoryLedgerControl::with_activation_polls(2);
    ensure_ledger(&control, &name).await?;

    let poller = ReadinessPoller::new(
        config.max_attempts,
        Duration::from_millis(config.poll_delay_ms.min(300)),
    );
    let progress = WaitProgress::start(&name);
    let outcome = poller.wait_for(&control, &name, LedgerState::Active).await?;
    progress.complete(&outcome);
    if outcome.timed_out {
        return Err(ScribeError::ProvisioningTimeout {
            name,
            attempts: outcome.attempts_used,
            last_state: outcome.final_state,
        });
    }

    let policy = RetryPolicy {
        retry_limit: config.retry_limit,
        base_delay_ms: config.base_delay_ms.min(100),
    };
    // One injected commit conflict shows the executor retrying the lambda.
    let runner = TransactionRunner::new(MemoryExecutor::with_injected_conflicts(policy, 1));

    let person = Person {
        first_name: "John".into(),
        last_name: "Doe".into(),
        age: 42,
    };
    let people = runner
        .run(|txn| record_person(txn, table, "firstName", &person, "Stiles"))
        .await?;

    println!(
        "this is a people list {}",
        serde_json::to_string_pretty(&people).unwrap_or_default()
    );
    progress.print_journal(&runner.executor().journal());
    Ok(())
}
