use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::application::{AppError, LedgerStore};
use crate::domain::{format_amount, ExpenseInput, ExpenseRecord};
use crate::io::export::Exporter;

/// Shown when an expense could not be persisted.
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save expense. Please try again.";

/// Shown when the ledger could not be read.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load expenses. Please try again.";

/// Spendlog - Expense Ledger
#[derive(Parser)]
#[command(name = "spendlog")]
#[command(about = "A local-first expense tracker")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "SPENDLOG_DATABASE", default_value = "spendlog.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new ledger
    Init,

    /// Record a new expense
    Add {
        /// Amount spent (e.g., "250.50" or "12")
        #[arg(short, long, default_value = "")]
        amount: String,

        /// Category (e.g., "Food", "Transport")
        #[arg(short, long, default_value = "")]
        category: String,

        /// Date of the expense (YYYY-MM-DD)
        #[arg(short, long, default_value = "")]
        date: String,
    },

    /// List expenses, most recent first
    List {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show the total of all expenses
    Total,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "spendlog=debug"
        } else {
            "spendlog=warn"
        }
    }

    pub async fn run(self) -> Result<()> {
        let mut store = match LedgerStore::open(&self.database).await {
            Ok(store) => store,
            Err(err) => {
                tracing::error!("{err}");
                bail!(LOAD_FAILED_MESSAGE);
            }
        };

        match self.command {
            Commands::Init => {
                load_or_report(&store).await?;
                println!("Ledger initialized: {}", self.database);
            }

            Commands::Add {
                amount,
                category,
                date,
            } => {
                let input = ExpenseInput::new(amount, category, date);
                run_add_command(&mut store, &input).await?;
            }

            Commands::List { format } => {
                let records = load_or_report(&store).await?;
                run_list_command(&records, &format)?;
            }

            Commands::Total => {
                let records = load_or_report(&store).await?;
                println!("{}", format_amount(LedgerStore::total(&records)));
            }
        }

        Ok(())
    }
}

async fn load_or_report(store: &LedgerStore) -> Result<Vec<ExpenseRecord>> {
    match store.load_all().await {
        Ok(records) => Ok(records),
        Err(err) => {
            tracing::error!("{err}");
            bail!(LOAD_FAILED_MESSAGE)
        }
    }
}

async fn run_add_command(store: &mut LedgerStore, input: &ExpenseInput) -> Result<()> {
    match store.add(input).await {
        Ok(record) => {
            println!("Expense added successfully!");
            tracing::info!(id = %record.id, "saved expense");
            Ok(())
        }
        Err(AppError::Validation(errors)) => {
            for (field, error) in errors.iter() {
                eprintln!("  {:<10} {}", format!("{}:", field), error);
            }
            bail!("Expense not saved")
        }
        Err(AppError::Storage(err)) => {
            tracing::error!("{err}");
            bail!(SAVE_FAILED_MESSAGE)
        }
    }
}

fn run_list_command(records: &[ExpenseRecord], format: &str) -> Result<()> {
    match format {
        "json" => {
            Exporter::new(records).export_json(std::io::stdout().lock())?;
        }
        "csv" => {
            Exporter::new(records).export_csv(std::io::stdout().lock())?;
        }
        "table" => print_table(records),
        other => bail!("Unknown format '{}'. Valid: table, json, csv", other),
    }
    Ok(())
}

fn print_table(records: &[ExpenseRecord]) {
    if records.is_empty() {
        println!("No expenses recorded");
        println!("Run `spendlog add` to add your first expense");
        return;
    }

    println!("{:<24} {:<14} {:>12}", "CATEGORY", "DATE", "AMOUNT");
    println!("{}", "-".repeat(52));

    for record in records {
        println!(
            "{:<24} {:<14} {:>12}",
            truncate(&record.category, 24),
            display_date(&record.date),
            format_amount(record.amount)
        );
    }

    println!("{}", "-".repeat(52));
    println!(
        "{:<39} {:>12}",
        "TOTAL",
        format_amount(LedgerStore::total(records))
    );
}

/// Human-friendly date ("May 10, 2024"). Text that is not a real calendar
/// date is shown unchanged.
fn display_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(day) => day.format("%b %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2024-05-10"), "May 10, 2024");
        assert_eq!(display_date("2024-01-02"), "Jan 2, 2024");
        assert_eq!(display_date("2024-02-31"), "2024-02-31");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Food", 10), "Food");
        assert_eq!(truncate("Groceries and more", 10), "Groceri...");
        assert_eq!(truncate("Café au lait", 7), "Café...");
    }

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from([
            "spendlog",
            "--database",
            "test.db",
            "add",
            "--amount",
            "250.50",
            "--category",
            "Food",
            "--date",
            "2024-05-10",
        ])
        .unwrap();

        assert_eq!(cli.database, "test.db");
        match cli.command {
            Commands::Add {
                amount,
                category,
                date,
            } => {
                assert_eq!(amount, "250.50");
                assert_eq!(category, "Food");
                assert_eq!(date, "2024-05-10");
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_cli_add_fields_default_to_empty() {
        let cli = Cli::try_parse_from(["spendlog", "add"]).unwrap();
        match cli.command {
            Commands::Add {
                amount,
                category,
                date,
            } => assert!(amount.is_empty() && category.is_empty() && date.is_empty()),
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_verbose_raises_log_level() {
        let cli = Cli::try_parse_from(["spendlog", "total", "--verbose"]).unwrap();
        assert_eq!(cli.default_log_filter(), "spendlog=debug");
    }
}
