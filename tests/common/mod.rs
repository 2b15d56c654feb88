// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use spendlog::application::LedgerStore;
use spendlog::domain::{validate, ExpenseInput, ValidatedRecord};
use spendlog::storage::Repository;
use tempfile::TempDir;

/// Helper to create a test store with a temporary database
pub async fn test_store() -> Result<(LedgerStore, TempDir)> {
    let temp_dir = TempDir::new()?;
    let store = LedgerStore::open(db_path(&temp_dir).as_str()).await?;
    Ok((store, temp_dir))
}

/// Helper to create a store plus a separate raw connection to the same
/// database file, for reading and planting stored bytes
pub async fn test_store_with_repo() -> Result<(LedgerStore, Repository, TempDir)> {
    let temp_dir = TempDir::new()?;
    let path = db_path(&temp_dir);
    let store = LedgerStore::open(&path).await?;
    let repo = Repository::init(&path).await?;
    Ok((store, repo, temp_dir))
}

/// Path of the ledger database inside a temp dir
pub fn db_path(temp_dir: &TempDir) -> String {
    temp_dir.path().join("ledger.db").to_string_lossy().into_owned()
}

/// Helper to build a validated record from raw text
pub fn expense(amount: &str, category: &str, date: &str) -> ValidatedRecord {
    validate(&ExpenseInput::new(amount, category, date)).unwrap()
}
