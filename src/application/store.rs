use crate::domain::{
    find_duplicate_id, sort_newest_first, total, validate, Amount, ExpenseInput, ExpenseRecord,
    ValidatedRecord,
};
use crate::storage::Repository;

use super::{AppError, StorageError};

/// Key the whole ledger is persisted under.
pub const EXPENSES_KEY: &str = "expenses";

/// Serialized form of an empty ledger.
const EMPTY_LEDGER: &str = "[]";

/// Owning handle to the on-device expense ledger.
///
/// Writes are a read-modify-write of the entire collection, which is only
/// sound with one writer. The store owns its `Repository`, neither of them is
/// `Clone`, and `append` takes `&mut self`: holding the handle is holding the
/// write lock.
///
/// ```compile_fail
/// fn assert_clone<T: Clone>() {}
/// assert_clone::<spendlog::LedgerStore>();
/// ```
pub struct LedgerStore {
    repo: Repository,
}

impl LedgerStore {
    /// Create a ledger store over an already migrated repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open (creating if needed) the ledger database at the given path.
    pub async fn open(database_path: &str) -> Result<Self, StorageError> {
        let repo = Repository::init(database_path)
            .await
            .map_err(StorageError::Open)?;
        Ok(Self::new(repo))
    }

    /// Open a ledger that lives only in memory.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let repo = Repository::in_memory()
            .await
            .map_err(StorageError::Open)?;
        Ok(Self::new(repo))
    }

    /// Validate raw input and append it to the ledger.
    /// Returns the record as saved.
    pub async fn add(&mut self, input: &ExpenseInput) -> Result<ExpenseRecord, AppError> {
        let validated = validate(input)?;
        let record = validated.record().clone();
        self.append(validated).await?;
        Ok(record)
    }

    /// Append a validated record, rewriting the whole ledger in one write.
    ///
    /// A missing ledger counts as empty. If this returns an error the record
    /// was not saved and the stored ledger is unchanged.
    pub async fn append(&mut self, record: ValidatedRecord) -> Result<(), StorageError> {
        let mut records = self.read_records().await?.unwrap_or_default();
        records.push(record.into_record());

        let encoded = serde_json::to_string(&records)
            .map_err(|e| StorageError::Write(anyhow::Error::new(e)))?;
        self.repo
            .put(EXPENSES_KEY, &encoded)
            .await
            .map_err(StorageError::Write)?;

        tracing::debug!(count = records.len(), "appended expense");
        Ok(())
    }

    /// Load every record, most recent date first. Records sharing a date keep
    /// their insertion order.
    ///
    /// On a ledger that was never written this stores an empty collection and
    /// returns no records. Existing data is never overwritten.
    pub async fn load_all(&self) -> Result<Vec<ExpenseRecord>, StorageError> {
        let mut records = match self.read_records().await? {
            Some(records) => records,
            None => {
                let created = self
                    .repo
                    .put_if_absent(EXPENSES_KEY, EMPTY_LEDGER)
                    .await
                    .map_err(StorageError::Write)?;
                if created {
                    tracing::debug!("initialized empty ledger");
                    Vec::new()
                } else {
                    // Another connection to the same database file (another
                    // process) wrote the ledger between our read and the insert.
                    self.read_records().await?.unwrap_or_default()
                }
            }
        };

        sort_newest_first(&mut records);
        tracing::debug!(count = records.len(), "loaded expenses");
        Ok(records)
    }

    /// Sum of amounts over already loaded records. Never touches storage.
    pub fn total(records: &[ExpenseRecord]) -> Amount {
        total(records)
    }

    /// Stored records in insertion order, or `None` if the ledger was never
    /// written.
    async fn read_records(&self) -> Result<Option<Vec<ExpenseRecord>>, StorageError> {
        let Some(raw) = self
            .repo
            .get(EXPENSES_KEY)
            .await
            .map_err(StorageError::Read)?
        else {
            return Ok(None);
        };

        let records = decode_ledger(&raw).inspect_err(|err| {
            tracing::warn!("{err}");
        })?;
        Ok(Some(records))
    }
}

fn decode_ledger(raw: &str) -> Result<Vec<ExpenseRecord>, StorageError> {
    let records: Vec<ExpenseRecord> =
        serde_json::from_str(raw).map_err(|e| StorageError::Corrupt(e.to_string()))?;

    if let Some(id) = find_duplicate_id(&records) {
        return Err(StorageError::Corrupt(format!("duplicate expense id {}", id)));
    }
    Ok(records)
}
