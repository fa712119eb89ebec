use thiserror::Error;

/// Failures returned by the ledger control-plane API or its transport.
#[derive(Debug, Error)]
pub enum LedgerApiError {
    #[error("API returned status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl LedgerApiError {
    /// True when the control plane reported that the ledger does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerApiError::ApiError { status: 404, .. })
    }
}
