use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::domain::{amount_json, total, Amount, ExpenseRecord};

/// Ledger snapshot written by the JSON export
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot<'a> {
    pub version: &'static str,
    pub exported_at: DateTime<Utc>,
    #[serde(with = "amount_json")]
    pub total: Amount,
    pub expenses: &'a [ExpenseRecord],
}

/// Exporter for rendering loaded expenses to various formats
pub struct Exporter<'a> {
    records: &'a [ExpenseRecord],
}

impl<'a> Exporter<'a> {
    pub fn new(records: &'a [ExpenseRecord]) -> Self {
        Self { records }
    }

    /// Export expenses to CSV format
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "amount", "category", "date"])?;

        // Trailing zeros dropped: 250.50 and 250.5 export alike
        let mut count = 0;
        for record in self.records {
            csv_writer.write_record([
                record.id.as_str(),
                record.amount.normalize().to_string().as_str(),
                record.category.as_str(),
                record.date.as_str(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export expenses as a JSON snapshot
    pub fn export_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION"),
            exported_at: Utc::now(),
            total: total(self.records),
            expenses: self.records,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        Ok(self.records.len())
    }
}
