//! redb-based storage layer
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `identities` | `subject_id` | `Identity` | Role directory |
//! | `issues` | `issue_id` | `Issue` | Issue snapshots (timeline embedded) |
//! | `processed_payments` | `payment_id` | `()` | Webhook idempotency |
//!
//! # Atomicity
//!
//! Every read-check-write sequence runs inside a single redb write
//! transaction. redb serializes writers, so two concurrent updates of the
//! same issue can never both pass their precondition check against the same
//! prior state. If the closure fails the transaction is aborted and nothing
//! is written.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::error::{AppError, ErrorCode};
use shared::issue::Issue;
use shared::models::Identity;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Identities: key = subject_id, value = JSON-serialized Identity
const IDENTITIES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("identities");

/// Issues: key = issue_id, value = JSON-serialized Issue
const ISSUES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("issues");

/// Processed payments: key = payment_id, value = empty (existence check)
const PROCESSED_PAYMENTS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_payments");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Storage failure");
        AppError::with_message(ErrorCode::DatabaseError, err.to_string())
    }
}

/// CityFix storage backed by redb
#[derive(Clone)]
pub struct Storage {
    db: Arc<Database>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// Open or create the database at the given path
    ///
    /// redb commits are durable as soon as `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and ephemeral dev servers)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(IDENTITIES_TABLE)?;
            let _ = write_txn.open_table(ISSUES_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_PAYMENTS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Run `f` in one write transaction: commit on `Ok`, abort on `Err`
    pub fn write<T, E>(&self, f: impl FnOnce(&WriteTransaction) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let txn = self.begin_write()?;
        match f(&txn) {
            Ok(output) => {
                txn.commit().map_err(StorageError::from)?;
                Ok(output)
            }
            Err(e) => {
                txn.abort().map_err(StorageError::from)?;
                Err(e)
            }
        }
    }

    /// Row counts of the identity and issue tables
    pub fn counts(&self) -> StorageResult<(u64, u64)> {
        let read_txn = self.db.begin_read()?;
        let identities = read_txn.open_table(IDENTITIES_TABLE)?.len()?;
        let issues = read_txn.open_table(ISSUES_TABLE)?.len()?;
        Ok((identities, issues))
    }

    // ========== Identities ==========

    pub fn get_identity(&self, subject_id: &str) -> StorageResult<Option<Identity>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(IDENTITIES_TABLE)?;
        match table.get(subject_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn list_identities(&self) -> StorageResult<Vec<Identity>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(IDENTITIES_TABLE)?;
        let mut identities = Vec::with_capacity(table.len()? as usize);
        for entry in table.iter()? {
            let (_, value) = entry?;
            identities.push(serde_json::from_slice(value.value())?);
        }
        Ok(identities)
    }

    /// Insert the identity unless one already exists for the subject
    ///
    /// Returns the stored identity and whether it was newly created.
    pub fn insert_identity_if_absent(&self, identity: Identity) -> StorageResult<(Identity, bool)> {
        let txn = self.db.begin_write()?;
        if let Some(existing) = Self::read_identity(&txn, &identity.subject_id)? {
            txn.abort()?;
            return Ok((existing, false));
        }
        Self::write_identity(&txn, &identity)?;
        txn.commit()?;
        Ok((identity, true))
    }

    /// Read-modify-write of one identity in a single transaction
    ///
    /// Returns `Ok(None)` when the identity does not exist.
    pub fn update_identity<T, E>(
        &self,
        subject_id: &str,
        f: impl FnOnce(&mut Identity) -> Result<T, E>,
    ) -> Result<Option<(Identity, T)>, E>
    where
        E: From<StorageError>,
    {
        let txn = self.begin_write()?;
        let Some(mut identity) = Self::read_identity(&txn, subject_id)? else {
            txn.abort().map_err(StorageError::from)?;
            return Ok(None);
        };
        let output = match f(&mut identity) {
            Ok(output) => output,
            Err(e) => {
                txn.abort().map_err(StorageError::from)?;
                return Err(e);
            }
        };
        Self::write_identity(&txn, &identity)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(Some((identity, output)))
    }

    /// Read an identity inside a write transaction
    pub fn read_identity(
        txn: &WriteTransaction,
        subject_id: &str,
    ) -> StorageResult<Option<Identity>> {
        let table = txn.open_table(IDENTITIES_TABLE)?;
        match table.get(subject_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Write an identity inside a write transaction
    pub fn write_identity(txn: &WriteTransaction, identity: &Identity) -> StorageResult<()> {
        let mut table = txn.open_table(IDENTITIES_TABLE)?;
        let value = serde_json::to_vec(identity)?;
        table.insert(identity.subject_id.as_str(), value.as_slice())?;
        Ok(())
    }

    // ========== Issues ==========

    pub fn get_issue(&self, issue_id: &str) -> StorageResult<Option<Issue>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ISSUES_TABLE)?;
        match table.get(issue_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All issues, unordered
    pub fn list_issues(&self) -> StorageResult<Vec<Issue>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ISSUES_TABLE)?;
        let mut issues = Vec::with_capacity(table.len()? as usize);
        for entry in table.iter()? {
            let (_, value) = entry?;
            issues.push(serde_json::from_slice(value.value())?);
        }
        Ok(issues)
    }

    /// Read-modify-write of one issue in a single transaction
    ///
    /// The closure sees the committed state and either mutates it (the
    /// result is written back) or fails (nothing is written). It also gets
    /// the transaction, so related rows it reads are checked atomically with
    /// the write. Returns `Ok(None)` when the issue does not exist.
    pub fn update_issue<T, E>(
        &self,
        issue_id: &str,
        f: impl FnOnce(&WriteTransaction, &mut Issue) -> Result<T, E>,
    ) -> Result<Option<(Issue, T)>, E>
    where
        E: From<StorageError>,
    {
        let txn = self.begin_write()?;
        let Some(mut issue) = Self::read_issue(&txn, issue_id)? else {
            txn.abort().map_err(StorageError::from)?;
            return Ok(None);
        };
        let output = match f(&txn, &mut issue) {
            Ok(output) => output,
            Err(e) => {
                txn.abort().map_err(StorageError::from)?;
                return Err(e);
            }
        };
        Self::write_issue(&txn, &issue)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(Some((issue, output)))
    }

    /// Delete an issue if the check passes against the committed state
    ///
    /// Returns `Ok(false)` when the issue does not exist.
    pub fn delete_issue_if<E>(
        &self,
        issue_id: &str,
        check: impl FnOnce(&Issue) -> Result<(), E>,
    ) -> Result<bool, E>
    where
        E: From<StorageError>,
    {
        let txn = self.begin_write()?;
        let Some(issue) = Self::read_issue(&txn, issue_id)? else {
            txn.abort().map_err(StorageError::from)?;
            return Ok(false);
        };
        if let Err(e) = check(&issue) {
            txn.abort().map_err(StorageError::from)?;
            return Err(e);
        }
        {
            let mut table = txn.open_table(ISSUES_TABLE).map_err(StorageError::from)?;
            table.remove(issue_id).map_err(StorageError::from)?;
        }
        txn.commit().map_err(StorageError::from)?;
        Ok(true)
    }

    /// Read an issue inside a write transaction
    pub fn read_issue(txn: &WriteTransaction, issue_id: &str) -> StorageResult<Option<Issue>> {
        let table = txn.open_table(ISSUES_TABLE)?;
        match table.get(issue_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Write an issue inside a write transaction
    pub fn write_issue(txn: &WriteTransaction, issue: &Issue) -> StorageResult<()> {
        let mut table = txn.open_table(ISSUES_TABLE)?;
        let value = serde_json::to_vec(issue)?;
        table.insert(issue.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Count issues filed by a submitter inside a write transaction
    pub fn count_issues_by_submitter(
        txn: &WriteTransaction,
        submitter_id: &str,
    ) -> StorageResult<usize> {
        let table = txn.open_table(ISSUES_TABLE)?;
        let mut count = 0;
        for entry in table.iter()? {
            let (_, value) = entry?;
            let issue: Issue = serde_json::from_slice(value.value())?;
            if issue.submitter_id == submitter_id {
                count += 1;
            }
        }
        Ok(count)
    }

    // ========== Payments ==========

    /// Check if a payment was already applied (within transaction)
    pub fn is_payment_processed_txn(
        txn: &WriteTransaction,
        payment_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_PAYMENTS_TABLE)?;
        Ok(table.get(payment_id)?.is_some())
    }

    /// Mark a payment as applied (within transaction)
    pub fn mark_payment_processed(txn: &WriteTransaction, payment_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_PAYMENTS_TABLE)?;
        table.insert(payment_id, ())?;
        Ok(())
    }

    pub fn is_payment_processed(&self, payment_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_PAYMENTS_TABLE)?;
        Ok(table.get(payment_id)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::issue::{IssueCreate, IssueStatus, machine};
    use shared::models::Role;

    fn sample_issue(id: &str, submitter: &str) -> Issue {
        machine::report(
            id,
            submitter,
            IssueCreate {
                title: "Broken streetlight".into(),
                description: "Dark corner since Monday".into(),
                category: "Lighting".into(),
                location: "5th Ave".into(),
                image_url: None,
            },
            1_700_000_000_000,
        )
    }

    fn put_issue(storage: &Storage, issue: &Issue) {
        let txn = storage.begin_write().unwrap();
        Storage::write_issue(&txn, issue).unwrap();
        txn.commit().unwrap();
    }

    #[test]
    fn test_identity_insert_if_absent() {
        let storage = Storage::open_in_memory().unwrap();
        let ana = Identity::citizen("ana@example.com", "Ana", 1);

        let (stored, created) = storage.insert_identity_if_absent(ana.clone()).unwrap();
        assert!(created);
        assert_eq!(stored, ana);

        let mut again = ana.clone();
        again.role = Role::Admin;
        let (stored, created) = storage.insert_identity_if_absent(again).unwrap();
        assert!(!created);
        assert_eq!(stored.role, Role::Citizen);
    }

    #[test]
    fn test_update_identity_missing() {
        let storage = Storage::open_in_memory().unwrap();
        let result = storage
            .update_identity("ghost", |identity| -> StorageResult<()> {
                identity.role = Role::Admin;
                Ok(())
            })
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_update_issue_writes_back() {
        let storage = Storage::open_in_memory().unwrap();
        put_issue(&storage, &sample_issue("i-1", "ana"));

        let (updated, ()) = storage
            .update_issue("i-1", |_, issue| -> StorageResult<()> {
                issue.assigned_staff_id = Some("staff-a".into());
                Ok(())
            })
            .unwrap()
            .unwrap();
        assert_eq!(updated.assigned_staff_id.as_deref(), Some("staff-a"));

        let reloaded = storage.get_issue("i-1").unwrap().unwrap();
        assert_eq!(reloaded.assigned_staff_id.as_deref(), Some("staff-a"));
    }

    #[test]
    fn test_update_issue_error_writes_nothing() {
        let storage = Storage::open_in_memory().unwrap();
        put_issue(&storage, &sample_issue("i-1", "ana"));

        let result = storage.update_issue("i-1", |_, issue| -> Result<(), AppError> {
            issue.status = IssueStatus::Closed;
            Err(AppError::new(ErrorCode::InvalidTransition))
        });
        assert_eq!(result.unwrap_err().code, ErrorCode::InvalidTransition);

        let reloaded = storage.get_issue("i-1").unwrap().unwrap();
        assert_eq!(reloaded.status, IssueStatus::Pending);
    }

    #[test]
    fn test_delete_issue_if() {
        let storage = Storage::open_in_memory().unwrap();
        put_issue(&storage, &sample_issue("i-1", "ana"));

        let refused = storage.delete_issue_if("i-1", |_| -> Result<(), AppError> {
            Err(AppError::forbidden("no"))
        });
        assert!(refused.is_err());
        assert!(storage.get_issue("i-1").unwrap().is_some());

        let deleted = storage
            .delete_issue_if("i-1", |_| -> StorageResult<()> { Ok(()) })
            .unwrap();
        assert!(deleted);
        assert!(storage.get_issue("i-1").unwrap().is_none());

        let missing = storage
            .delete_issue_if("i-1", |_| -> StorageResult<()> { Ok(()) })
            .unwrap();
        assert!(!missing);
    }

    #[test]
    fn test_count_by_submitter() {
        let storage = Storage::open_in_memory().unwrap();
        put_issue(&storage, &sample_issue("i-1", "ana"));
        put_issue(&storage, &sample_issue("i-2", "ana"));
        put_issue(&storage, &sample_issue("i-3", "ben"));

        let txn = storage.begin_write().unwrap();
        assert_eq!(Storage::count_issues_by_submitter(&txn, "ana").unwrap(), 2);
        assert_eq!(Storage::count_issues_by_submitter(&txn, "ben").unwrap(), 1);
        assert_eq!(Storage::count_issues_by_submitter(&txn, "cy").unwrap(), 0);
        txn.abort().unwrap();

        assert_eq!(storage.list_issues().unwrap().len(), 3);
    }

    #[test]
    fn test_payment_marker() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(!storage.is_payment_processed("pi_1").unwrap());

        let txn = storage.begin_write().unwrap();
        Storage::mark_payment_processed(&txn, "pi_1").unwrap();
        txn.commit().unwrap();

        assert!(storage.is_payment_processed("pi_1").unwrap());
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cityfix.redb");

        {
            let storage = Storage::open(&path).unwrap();
            put_issue(&storage, &sample_issue("i-1", "ana"));
            storage
                .insert_identity_if_absent(Identity::citizen("ana", "Ana", 1))
                .unwrap();
        }

        let storage = Storage::open(&path).unwrap();
        assert!(storage.get_issue("i-1").unwrap().is_some());
        assert_eq!(storage.list_identities().unwrap().len(), 1);
    }
}
