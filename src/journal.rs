//! The demonstration workload: a People table in a community journal.
//!
//! Each helper issues one statement against a transaction-scoped executor;
//! [`record_person`] composes the full sequence the demo runs inside a
//! single transaction. Table names, index fields and document values are
//! caller-supplied — nothing here is hardcoded beyond the statement shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::txn::{ExecuteError, StatementExecutor};

/// A journal document. Field names follow the wire convention of the
/// ledger service (camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
}

pub async fn create_table(
    txn: &mut impl StatementExecutor,
    table: &str,
) -> Result<(), ExecuteError> {
    txn.execute(&format!("CREATE TABLE {table}"), Vec::new())
        .await?;
    Ok(())
}

pub async fn create_index(
    txn: &mut impl StatementExecutor,
    table: &str,
    field: &str,
) -> Result<(), ExecuteError> {
    txn.execute(&format!("CREATE INDEX ON {table} ({field})"), Vec::new())
        .await?;
    Ok(())
}

pub async fn insert_document(
    txn: &mut impl StatementExecutor,
    table: &str,
    person: &Person,
) -> Result<Vec<Value>, ExecuteError> {
    let doc = serde_json::to_value(person)?;
    txn.execute(&format!("INSERT INTO {table} ?"), vec![doc])
        .await
}

pub async fn update_last_name(
    txn: &mut impl StatementExecutor,
    table: &str,
    first_name: &str,
    last_name: &str,
) -> Result<(), ExecuteError> {
    txn.execute(
        &format!("UPDATE {table} SET lastName = ? WHERE firstName = ?"),
        vec![Value::from(last_name), Value::from(first_name)],
    )
    .await?;
    Ok(())
}

pub async fn fetch_by_first_name(
    txn: &mut impl StatementExecutor,
    table: &str,
    first_name: &str,
) -> Result<Vec<Value>, ExecuteError> {
    txn.execute(
        &format!("SELECT firstName, lastName, age FROM {table} WHERE firstName = ?"),
        vec![Value::from(first_name)],
    )
    .await
}

/// The full demo sequence as one unit of work: create the table and index,
/// insert the person, rename them, and fetch the matching documents.
///
/// Safe to re-invoke by a retrying executor — every statement is replayed
/// against a fresh transaction handle.
pub async fn record_person(
    mut txn: impl StatementExecutor,
    table: &str,
    index_field: &str,
    person: &Person,
    new_last_name: &str,
) -> Result<Vec<Value>, ExecuteError> {
    create_table(&mut txn, table).await?;
    create_index(&mut txn, table, index_field).await?;
    insert_document(&mut txn, table, person).await?;
    update_last_name(&mut txn, table, &person.first_name, new_last_name).await?;
    fetch_by_first_name(&mut txn, table, &person.first_name).await
}
