//! In-memory stand-ins for the managed service, used by the demo command
//! and by tests.
//!
//! [`MemoryExecutor`] provides the transactional-executor capability without
//! a live backend: statements stay opaque, each successful unit of work
//! commits its buffered statements as one append-only journal entry, and
//! transient conflicts are retried executor-side with exponential backoff.
//! [`MemoryLedgerControl`] simulates asynchronous ledger provisioning so the
//! readiness poller has something to wait on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::sleep;
use uuid::Uuid;

use crate::ledger::{
    CreateLedgerRequest, LedgerApiError, LedgerControl, LedgerDescription, LedgerState,
};
use crate::txn::{ExecuteError, StatementExecutor, TransactionalExecutor};

/// Executor-side retry policy for transient transaction conflicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of re-invocations of a unit of work after a conflict.
    pub retry_limit: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_limit: 4,
            base_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Calculate the delay for a given retry attempt using exponential backoff.
    /// delay = base_delay_ms * 2^(attempt - 1)
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        self.base_delay_ms * 2u64.pow(attempt.saturating_sub(1))
    }
}

/// One statement as recorded inside a transaction attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementRecord {
    pub statement: String,
    pub params: Vec<Value>,
}

/// A committed transaction: all statements of one successful attempt,
/// appended atomically to the journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub committed_at: DateTime<Utc>,
    pub statements: Vec<StatementRecord>,
}

/// Transaction handle for one attempt; buffers statements until the
/// executor commits or discards them.
pub struct MemoryTransaction {
    buffer: Arc<Mutex<Vec<StatementRecord>>>,
}

impl StatementExecutor for MemoryTransaction {
    /// Record the statement and echo the parameters back as the result set.
    async fn execute(
        &mut self,
        statement: &str,
        params: Vec<Value>,
    ) -> Result<Vec<Value>, ExecuteError> {
        if statement.trim().is_empty() {
            return Err(ExecuteError::InvalidStatement(
                "statement text is empty".into(),
            ));
        }
        self.buffer.lock().unwrap().push(StatementRecord {
            statement: statement.to_string(),
            params: params.clone(),
        });
        Ok(params)
    }
}

/// In-memory transactional executor with an append-only journal.
pub struct MemoryExecutor {
    retry: RetryPolicy,
    journal: Mutex<Vec<JournalEntry>>,
    // Commit-time conflicts left to simulate, for demo and tests.
    inject_conflicts: AtomicU32,
}

impl MemoryExecutor {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            retry,
            journal: Mutex::new(Vec::new()),
            inject_conflicts: AtomicU32::new(0),
        }
    }

    /// Make the next `count` commits fail with a simulated optimistic
    /// concurrency conflict, exercising executor-side retry.
    pub fn with_injected_conflicts(retry: RetryPolicy, count: u32) -> Self {
        let executor = Self::new(retry);
        executor.inject_conflicts.store(count, Ordering::SeqCst);
        executor
    }

    /// Snapshot of all committed journal entries, oldest first.
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.journal.lock().unwrap().clone()
    }

    fn commit(&self, buffer: &Arc<Mutex<Vec<StatementRecord>>>) -> Result<String, ExecuteError> {
        let pending = self
            .inject_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if pending {
            return Err(ExecuteError::Conflict(
                "optimistic concurrency check failed at commit".into(),
            ));
        }

        let statements = std::mem::take(&mut *buffer.lock().unwrap());
        let entry = JournalEntry {
            id: Uuid::new_v4().to_string(),
            committed_at: Utc::now(),
            statements,
        };
        let id = entry.id.clone();
        tracing::debug!(
            entry = %id,
            statements = entry.statements.len(),
            "transaction committed"
        );
        self.journal.lock().unwrap().push(entry);
        Ok(id)
    }
}

impl TransactionalExecutor for MemoryExecutor {
    type Txn = MemoryTransaction;

    async fn run_lambda<T, F, Fut>(&self, work: F) -> Result<T, ExecuteError>
    where
        F: Fn(MemoryTransaction) -> Fut,
        Fut: std::future::Future<Output = Result<T, ExecuteError>>,
    {
        let mut attempt = 0u32;
        loop {
            // Fresh buffer per attempt; a failed attempt leaves no trace.
            let buffer = Arc::new(Mutex::new(Vec::new()));
            let txn = MemoryTransaction {
                buffer: Arc::clone(&buffer),
            };

            let err = match work(txn).await {
                Ok(value) => match self.commit(&buffer) {
                    Ok(_) => return Ok(value),
                    Err(err) => err,
                },
                Err(err) => err,
            };

            match err {
                ExecuteError::Conflict(reason) if attempt < self.retry.retry_limit => {
                    attempt += 1;
                    let delay_ms = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        attempt,
                        limit = self.retry.retry_limit,
                        delay_ms,
                        reason = %reason,
                        "transaction conflict, retrying"
                    );
                    sleep(Duration::from_millis(delay_ms)).await;
                }
                other => return Err(other),
            }
        }
    }
}

/// Simulated control plane: ledgers become ACTIVE after a configurable
/// number of describe calls, mimicking asynchronous provisioning.
pub struct MemoryLedgerControl {
    activation_polls: u32,
    ledgers: Mutex<HashMap<String, LedgerRecord>>,
}

struct LedgerRecord {
    state: LedgerState,
    polls_until_active: u32,
    created_at: DateTime<Utc>,
}

impl MemoryLedgerControl {
    /// Ledgers created here report CREATING for `activation_polls` describe
    /// calls before flipping to ACTIVE.
    pub fn with_activation_polls(activation_polls: u32) -> Self {
        Self {
            activation_polls,
            ledgers: Mutex::new(HashMap::new()),
        }
    }
}

impl LedgerControl for MemoryLedgerControl {
    async fn describe(&self, name: &str) -> Result<LedgerDescription, LedgerApiError> {
        let mut ledgers = self.ledgers.lock().unwrap();
        let record = ledgers.get_mut(name).ok_or(LedgerApiError::ApiError {
            status: 404,
            message: format!("ledger {name} not found"),
        })?;

        if record.state == LedgerState::Creating {
            if record.polls_until_active == 0 {
                record.state = LedgerState::Active;
            } else {
                record.polls_until_active -= 1;
            }
        }

        Ok(LedgerDescription {
            name: name.to_string(),
            state: record.state,
            created_at: Some(record.created_at),
        })
    }

    async fn create(
        &self,
        req: &CreateLedgerRequest,
    ) -> Result<LedgerDescription, LedgerApiError> {
        let mut ledgers = self.ledgers.lock().unwrap();
        let created_at = Utc::now();
        ledgers.insert(
            req.name.clone(),
            LedgerRecord {
                state: LedgerState::Creating,
                polls_until_active: self.activation_polls,
                created_at,
            },
        );
        Ok(LedgerDescription {
            name: req.name.clone(),
            state: LedgerState::Creating,
            created_at: Some(created_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::PermissionsMode;
    use serde_json::json;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            retry_limit: 4,
            base_delay_ms: 1,
        }
    }

    #[test]
    fn retry_policy_exponential_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(1), 1000);
        assert_eq!(policy.delay_for_attempt(2), 2000);
        assert_eq!(policy.delay_for_attempt(3), 4000);
        assert_eq!(policy.delay_for_attempt(4), 8000);
    }

    #[tokio::test]
    async fn successful_work_commits_one_journal_entry() {
        let executor = MemoryExecutor::new(fast_retry());
        let docs = executor
            .run_lambda(|mut txn| async move {
                txn.execute("CREATE TABLE People", Vec::new()).await?;
                txn.execute(
                    "INSERT INTO People ?",
                    vec![json!({"firstName": "John", "lastName": "Doe", "age": 42})],
                )
                .await
            })
            .await
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["firstName"], "John");

        let journal = executor.journal();
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0].statements.len(), 2);
        assert_eq!(journal[0].statements[0].statement, "CREATE TABLE People");
        assert!(!journal[0].id.is_empty());
    }

    #[tokio::test]
    async fn failed_work_leaves_journal_untouched() {
        let executor = MemoryExecutor::new(fast_retry());
        let result = executor
            .run_lambda(|mut txn| async move {
                txn.execute("CREATE TABLE People", Vec::new()).await?;
                txn.execute("", Vec::new()).await
            })
            .await;

        assert!(matches!(result, Err(ExecuteError::InvalidStatement(_))));
        assert!(executor.journal().is_empty());
    }

    #[tokio::test]
    async fn commit_conflict_is_retried_then_committed() {
        let executor = MemoryExecutor::with_injected_conflicts(fast_retry(), 2);
        let value = executor
            .run_lambda(|mut txn| async move {
                txn.execute("INSERT INTO People ?", vec![json!({"firstName": "John"})])
                    .await?;
                Ok(7)
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        // Conflicted attempts were discarded; only the final attempt landed.
        assert_eq!(executor.journal().len(), 1);
    }

    #[tokio::test]
    async fn conflicts_beyond_retry_limit_surface() {
        let policy = RetryPolicy {
            retry_limit: 1,
            base_delay_ms: 1,
        };
        let executor = MemoryExecutor::with_injected_conflicts(policy, 5);
        let result = executor
            .run_lambda(|mut txn| async move {
                txn.execute("INSERT INTO People ?", vec![json!({})]).await?;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(ExecuteError::Conflict(_))));
        assert!(executor.journal().is_empty());
    }

    #[tokio::test]
    async fn simulated_ledger_activates_after_configured_polls() {
        let control = MemoryLedgerControl::with_activation_polls(2);
        let req = CreateLedgerRequest {
            name: "community-journal".into(),
            permissions_mode: PermissionsMode::AllowAll,
        };
        control.create(&req).await.unwrap();

        let first = control.describe("community-journal").await.unwrap();
        assert_eq!(first.state, LedgerState::Creating);
        let second = control.describe("community-journal").await.unwrap();
        assert_eq!(second.state, LedgerState::Creating);
        let third = control.describe("community-journal").await.unwrap();
        assert_eq!(third.state, LedgerState::Active);
    }

    #[tokio::test]
    async fn unknown_ledger_describes_as_not_found() {
        let control = MemoryLedgerControl::with_activation_polls(0);
        let err = control.describe("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
