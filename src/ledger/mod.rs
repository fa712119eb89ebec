pub mod client;
pub mod error;
pub mod types;

pub use client::LedgerClient;
pub use error::LedgerApiError;
pub use types::{CreateLedgerRequest, LedgerDescription, LedgerState, PermissionsMode};

/// Narrow capability over the control plane: observe a ledger's state and
/// request creation. Implemented by [`LedgerClient`] for the real API and by
/// scripted fakes in tests.
pub trait LedgerControl {
    async fn describe(&self, name: &str) -> Result<LedgerDescription, LedgerApiError>;

    async fn create(
        &self,
        req: &CreateLedgerRequest,
    ) -> Result<LedgerDescription, LedgerApiError>;
}

/// Make sure a ledger with the given name exists, creating it when the
/// control plane has never heard of it.
///
/// Idempotent across restarts: an already-ACTIVE ledger is returned as-is,
/// and a ledger still provisioning is returned without a second create call.
/// Any other control-plane failure propagates unchanged.
pub async fn ensure_ledger(
    control: &impl LedgerControl,
    name: &str,
) -> Result<LedgerDescription, LedgerApiError> {
    match control.describe(name).await {
        Ok(desc) => {
            tracing::info!(ledger = name, state = %desc.state, "ledger already exists");
            Ok(desc)
        }
        Err(err) if err.is_not_found() => {
            tracing::info!(ledger = name, "ledger not found, creating");
            let req = CreateLedgerRequest {
                name: name.to_string(),
                permissions_mode: PermissionsMode::AllowAll,
            };
            control.create(&req).await
        }
        Err(err) => Err(err),
    }
}
