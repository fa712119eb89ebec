//! Lambda-based transaction execution.
//!
//! A unit of work is a plain async function handed a transaction-scoped
//! [`StatementExecutor`]. The injected [`TransactionalExecutor`] owns
//! atomicity, conflict retry and backoff; [`TransactionRunner`] is a thin
//! boundary that surfaces the unit of work's value unchanged and wraps any
//! failure with context, never retrying on its own.
//!
//! Because the executor may re-invoke the unit of work on a transient
//! conflict, the work must be idempotent or otherwise safe to re-run.

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

/// Failures raised while executing statements or committing a transaction.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("invalid statement: {0}")]
    InvalidStatement(String),

    #[error("transaction conflict: {0}")]
    Conflict(String),

    #[error("parameter encoding failed: {0}")]
    Parameter(#[from] serde_json::Error),
}

/// Statement execution capability scoped to one transaction attempt.
///
/// Statement text is opaque to this crate; parameters and result rows are
/// JSON documents.
pub trait StatementExecutor {
    async fn execute(
        &mut self,
        statement: &str,
        params: Vec<Value>,
    ) -> Result<Vec<Value>, ExecuteError>;
}

/// External transactional executor: runs a unit of work inside a single
/// transaction boundary, retrying it on transient conflict with its own
/// backoff policy. The work function receives a fresh transaction handle per
/// attempt.
pub trait TransactionalExecutor {
    type Txn: StatementExecutor;

    async fn run_lambda<T, F, Fut>(&self, work: F) -> Result<T, ExecuteError>
    where
        F: Fn(Self::Txn) -> Fut,
        Fut: Future<Output = Result<T, ExecuteError>>;
}

/// Error surfaced by [`TransactionRunner`]: the fixed marker message plus
/// the original failure as `source()`.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("transactional operation failed: {0}")]
    Failed(#[source] ExecuteError),
}

/// Executes units of work through an injected executor.
///
/// Pure pass-through plus error wrapping: the runner observes only the
/// terminal outcome of a transaction and has no visibility into the
/// executor's intermediate retry attempts.
pub struct TransactionRunner<E> {
    executor: E,
}

impl<E: TransactionalExecutor> TransactionRunner<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run the unit of work within one logical transaction, returning its
    /// value unchanged or the wrapped failure.
    pub async fn run<T, F, Fut>(&self, work: F) -> Result<T, TransactionError>
    where
        F: Fn(E::Txn) -> Fut,
        Fut: Future<Output = Result<T, ExecuteError>>,
    {
        self.executor
            .run_lambda(work)
            .await
            .map_err(TransactionError::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Transaction handle that accepts anything and returns no rows.
    struct NullTxn;

    impl StatementExecutor for NullTxn {
        async fn execute(
            &mut self,
            _statement: &str,
            _params: Vec<Value>,
        ) -> Result<Vec<Value>, ExecuteError> {
            Ok(Vec::new())
        }
    }

    /// Executor that invokes the work once, with no retry.
    struct OneShotExecutor;

    impl TransactionalExecutor for OneShotExecutor {
        type Txn = NullTxn;

        async fn run_lambda<T, F, Fut>(&self, work: F) -> Result<T, ExecuteError>
        where
            F: Fn(NullTxn) -> Fut,
            Fut: Future<Output = Result<T, ExecuteError>>,
        {
            work(NullTxn).await
        }
    }

    /// Executor that re-invokes the work while it reports a conflict, up to
    /// a small bound — stands in for provider-side retry.
    struct RetryingExecutor {
        max_retries: u32,
    }

    impl TransactionalExecutor for RetryingExecutor {
        type Txn = NullTxn;

        async fn run_lambda<T, F, Fut>(&self, work: F) -> Result<T, ExecuteError>
        where
            F: Fn(NullTxn) -> Fut,
            Fut: Future<Output = Result<T, ExecuteError>>,
        {
            let mut attempt = 0;
            loop {
                match work(NullTxn).await {
                    Err(ExecuteError::Conflict(_)) if attempt < self.max_retries => {
                        attempt += 1;
                    }
                    other => return other,
                }
            }
        }
    }

    #[tokio::test]
    async fn result_passes_through_unchanged() {
        let runner = TransactionRunner::new(OneShotExecutor);
        let count = runner
            .run(|mut txn| async move {
                txn.execute("SELECT * FROM People", Vec::new()).await?;
                Ok(3usize)
            })
            .await
            .unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn failure_is_wrapped_with_marker_and_cause() {
        let runner = TransactionRunner::new(OneShotExecutor);
        let err = runner
            .run(|_txn| async {
                Err::<(), _>(ExecuteError::InvalidStatement("DROP EVERYTHING".into()))
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("transactional operation failed"));
        let cause = err.source().expect("cause must be preserved");
        assert!(cause.to_string().contains("DROP EVERYTHING"));
    }

    #[tokio::test]
    async fn runner_does_not_retry_on_its_own() {
        let invocations = AtomicU32::new(0);
        let runner = TransactionRunner::new(OneShotExecutor);
        let result: Result<(), _> = runner
            .run(|_txn| {
                invocations.fetch_add(1, Ordering::SeqCst);
                async { Err(ExecuteError::Conflict("write collision".into())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn executor_may_reinvoke_work_on_conflict() {
        let invocations = AtomicU32::new(0);
        let runner = TransactionRunner::new(RetryingExecutor { max_retries: 4 });
        let value = runner
            .run(|_txn| {
                let n = invocations.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(ExecuteError::Conflict("first attempt collides".into()))
                    } else {
                        Ok("committed")
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, "committed");
        assert_eq!(invocations.load(Ordering::SeqCst), 2);
    }
}
