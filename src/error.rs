use thiserror::Error;

use crate::ledger::{LedgerApiError, LedgerState};
use crate::txn::TransactionError;

#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Ledger API error: {0}")]
    Ledger(#[from] LedgerApiError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error(
        "ledger {name} did not become ACTIVE within {attempts} attempts (last state {last_state})"
    )]
    ProvisioningTimeout {
        name: String,
        attempts: u32,
        last_state: LedgerState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
