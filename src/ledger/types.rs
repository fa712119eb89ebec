//! Request and response types for the ledger control-plane API.
//!
//! All structs derive `Serialize` and `Deserialize` for JSON conversion
//! matching the wire format of the `/ledgers` endpoints. Ledger states are
//! carried as SCREAMING_SNAKE_CASE strings on the wire.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state reported by the control plane for a named ledger.
///
/// A freshly created ledger starts in `Creating` and becomes `Active`
/// asynchronously; deletion goes through `Deleting` before `Deleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerState {
    Creating,
    Active,
    Deleting,
    Deleted,
}

impl fmt::Display for LedgerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerState::Creating => write!(f, "CREATING"),
            LedgerState::Active => write!(f, "ACTIVE"),
            LedgerState::Deleting => write!(f, "DELETING"),
            LedgerState::Deleted => write!(f, "DELETED"),
        }
    }
}

/// Permissions mode requested at ledger creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionsMode {
    AllowAll,
    Standard,
}

/// Body of a `POST /ledgers` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLedgerRequest {
    /// Unique ledger name, supplied by the caller.
    pub name: String,
    /// Access policy for the new ledger.
    pub permissions_mode: PermissionsMode,
}

/// Snapshot of a ledger as reported by `describe` or `create`.
///
/// The state is an immutable observation; callers never write it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerDescription {
    pub name: String,
    pub state: LedgerState,
    /// Creation timestamp, absent while the control plane is still
    /// provisioning metadata.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
