use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{is_date_pattern, Amount};

/// Opaque identifier of an expense. Stored as text so identifiers written by
/// other tools (timestamps, counters) load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single user-entered expense. Records are immutable once created.
///
/// Deserialization re-checks the record invariants, so a stored record that
/// breaks them fails to load instead of being coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredExpense")]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    /// Always strictly positive
    #[serde(with = "super::amount_json")]
    pub amount: Amount,
    /// Trimmed, never empty
    pub category: String,
    /// `YYYY-MM-DD` text, no timezone
    pub date: String,
}

/// Wire shape of a record before its invariants are checked.
#[derive(Deserialize)]
struct StoredExpense {
    id: ExpenseId,
    #[serde(with = "super::amount_json")]
    amount: Amount,
    category: String,
    date: String,
}

impl TryFrom<StoredExpense> for ExpenseRecord {
    type Error = String;

    fn try_from(stored: StoredExpense) -> Result<Self, Self::Error> {
        if stored.amount <= Amount::ZERO {
            return Err(format!(
                "expense {} has non-positive amount {}",
                stored.id, stored.amount
            ));
        }
        if stored.category.trim().is_empty() {
            return Err(format!("expense {} has an empty category", stored.id));
        }
        if !is_date_pattern(&stored.date) {
            return Err(format!(
                "expense {} has malformed date '{}'",
                stored.id, stored.date
            ));
        }
        Ok(Self {
            id: stored.id,
            amount: stored.amount,
            category: stored.category,
            date: stored.date,
        })
    }
}

/// A record that passed validation. Only the validator can build one, which
/// makes it the single way into the store. Not `Clone`, so the same record
/// cannot be appended twice.
#[derive(Debug, PartialEq)]
pub struct ValidatedRecord(ExpenseRecord);

impl ValidatedRecord {
    pub(crate) fn new(record: ExpenseRecord) -> Self {
        Self(record)
    }

    pub fn record(&self) -> &ExpenseRecord {
        &self.0
    }

    pub fn into_record(self) -> ExpenseRecord {
        self.0
    }
}
