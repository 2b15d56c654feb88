use std::collections::HashSet;

use super::{Amount, ExpenseId, ExpenseRecord};

/// Sum of amounts over a set of records. Zero for an empty slice.
pub fn total(records: &[ExpenseRecord]) -> Amount {
    records
        .iter()
        .fold(Amount::ZERO, |sum, record| sum + record.amount)
}

/// Order records most recent first. Records sharing a date keep their
/// relative order.
///
/// Dates are compared as text, which matches calendar order for the fixed
/// `YYYY-MM-DD` shape.
pub fn sort_newest_first(records: &mut [ExpenseRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Returns the first id that appears more than once, if any.
pub fn find_duplicate_id(records: &[ExpenseRecord]) -> Option<&ExpenseId> {
    let mut seen = HashSet::with_capacity(records.len());
    records.iter().map(|r| &r.id).find(|id| !seen.insert(*id))
}
