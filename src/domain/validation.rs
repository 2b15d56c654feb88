use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::{parse_amount, Amount, ExpenseId, ExpenseRecord, ValidatedRecord};

/// Raw text entered by the user, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseInput {
    pub amount: String,
    pub category: String,
    pub date: String,
}

impl ExpenseInput {
    pub fn new(
        amount: impl Into<String>,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            category: category.into(),
            date: date.into(),
        }
    }
}

/// Input field an error is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Amount,
    Category,
    Date,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Amount => "amount",
            Field::Category => "category",
            Field::Date => "date",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single field-level validation failure. The display text is the message
/// shown next to the field.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("Amount is required")]
    AmountRequired,

    #[error("Enter a valid positive number")]
    AmountInvalid,

    #[error("Category is required")]
    CategoryRequired,

    #[error("Date is required")]
    DateRequired,

    #[error("Use YYYY-MM-DD format")]
    DateFormatInvalid,
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::AmountRequired | FieldError::AmountInvalid => Field::Amount,
            FieldError::CategoryRequired => Field::Category,
            FieldError::DateRequired | FieldError::DateFormatInvalid => Field::Date,
        }
    }
}

/// Every failing field of one validation pass, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, FieldError>);

impl FieldErrors {
    fn push(&mut self, error: FieldError) {
        self.0.insert(error.field(), error);
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, error: FieldError) -> bool {
        self.get(error.field()) == Some(error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Errors in field order: amount, category, date.
    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.0.iter().map(|(field, error)| (*field, *error))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .iter()
            .map(|(field, error)| format!("{}: {}", field, error))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Returns true for text shaped like `YYYY-MM-DD` (ASCII digits only).
/// Calendar validity is not checked, so `2024-02-31` matches.
pub fn is_date_pattern(date: &str) -> bool {
    let bytes = date.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn validate_amount(raw: &str) -> Result<Amount, FieldError> {
    if raw.trim().is_empty() {
        return Err(FieldError::AmountRequired);
    }
    match parse_amount(raw) {
        Ok(amount) if amount > Amount::ZERO => Ok(amount),
        _ => Err(FieldError::AmountInvalid),
    }
}

fn validate_category(raw: &str) -> Result<String, FieldError> {
    let category = raw.trim();
    if category.is_empty() {
        return Err(FieldError::CategoryRequired);
    }
    Ok(category.to_string())
}

fn validate_date(raw: &str) -> Result<String, FieldError> {
    if raw.trim().is_empty() {
        return Err(FieldError::DateRequired);
    }
    if !is_date_pattern(raw) {
        return Err(FieldError::DateFormatInvalid);
    }
    Ok(raw.to_string())
}

/// Validate raw input into a record ready for the store.
///
/// All fields are checked on every call and every failure is reported, so the
/// caller can show all messages at once. The id is only generated once every
/// field passed.
pub fn validate(input: &ExpenseInput) -> Result<ValidatedRecord, FieldErrors> {
    let mut errors = FieldErrors::default();

    let amount = validate_amount(&input.amount).map_err(|e| errors.push(e)).ok();
    let category = validate_category(&input.category)
        .map_err(|e| errors.push(e))
        .ok();
    let date = validate_date(&input.date).map_err(|e| errors.push(e)).ok();

    match (amount, category, date) {
        (Some(amount), Some(category), Some(date)) => Ok(ValidatedRecord::new(ExpenseRecord {
            id: ExpenseId::generate(),
            amount,
            category,
            date,
        })),
        _ => Err(errors),
    }
}
