//! Reconciliation of raw statement rows into candidate transactions.

use std::fmt;

use serde::{Serialize, Serializer};
use time::Date;

use crate::{
    Error,
    import::{
        ColumnMapping, RawRow, TypeConfig,
        mapping::{cell, keywords, mapped},
        parse_amount, parse_date,
    },
    transaction::{BulkTransactionItem, TransactionType},
};

/// The title given to imported transactions whose description is blank.
pub const DEFAULT_IMPORT_DESCRIPTION: &str = "Imported transaction";

/// A problem found while reconciling a statement row.
///
/// Serialized as its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowError {
    /// No column is mapped to the named field.
    MissingMapping(&'static str),
    MissingDate,
    InvalidDate,
    MissingAmount,
    InvalidAmount,
    /// Both the credit and debit columns hold a nonzero amount.
    BothColumnsHaveValues,
    /// The amount was read but not whether it is income or an expense.
    TypeUndetermined,
    /// The type was read but not the amount.
    AmountUndetermined,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::MissingMapping(field) => write!(f, "no column is mapped to the {field}"),
            RowError::MissingDate => write!(f, "missing date"),
            RowError::InvalidDate => write!(f, "invalid date"),
            RowError::MissingAmount => write!(f, "missing amount"),
            RowError::InvalidAmount => write!(f, "invalid amount"),
            RowError::BothColumnsHaveValues => write!(f, "both columns have values"),
            RowError::TypeUndetermined => write!(f, "could not determine the transaction type"),
            RowError::AmountUndetermined => write!(f, "could not determine the amount"),
        }
    }
}

impl Serialize for RowError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A statement row after reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRow {
    /// The position of the row in the statement, starting from zero.
    pub index: usize,
    pub date: Option<Date>,
    pub description: String,
    /// The absolute amount.
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
    pub errors: Vec<RowError>,
    pub excluded: bool,
}

impl PreviewRow {
    /// Whether the row can be submitted: not excluded, error free and fully determined.
    pub fn is_importable(&self) -> bool {
        !self.excluded
            && self.errors.is_empty()
            && self.date.is_some()
            && self.amount.is_some()
            && self.transaction_type.is_some()
    }

    fn to_bulk_item(&self) -> Option<BulkTransactionItem> {
        if !self.is_importable() {
            return None;
        }

        let description = match self.description.trim() {
            "" => DEFAULT_IMPORT_DESCRIPTION.to_owned(),
            description => description.to_owned(),
        };

        Some(BulkTransactionItem {
            date: self.date?,
            description,
            amount: self.amount?,
            transaction_type: self.transaction_type?,
            category: self.category.clone(),
        })
    }
}

/// The reconciled rows of a statement.
///
/// The mutations only patch the stored rows. Nothing is parsed again.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportPreview {
    pub rows: Vec<PreviewRow>,
}

impl ImportPreview {
    /// Flip whether the row at `index` is excluded from the import.
    ///
    /// # Errors
    /// Returns [Error::ValidationError] if there is no row at `index`.
    pub fn toggle_exclude(&mut self, index: usize) -> Result<(), Error> {
        let row = self.row_mut(index)?;
        row.excluded = !row.excluded;

        Ok(())
    }

    /// Override the type of the row at `index`.
    ///
    /// # Errors
    /// Returns [Error::ValidationError] if there is no row at `index`.
    pub fn set_type(&mut self, index: usize, transaction_type: TransactionType) -> Result<(), Error> {
        let row = self.row_mut(index)?;
        row.transaction_type = Some(transaction_type);
        row.errors.retain(|error| *error != RowError::TypeUndetermined);

        Ok(())
    }

    /// Set the category name of the row at `index`, or clear it with `None` or a blank name.
    ///
    /// The category does not need to exist yet, the bulk endpoint creates it.
    ///
    /// # Errors
    /// Returns [Error::ValidationError] if there is no row at `index`.
    pub fn set_category(&mut self, index: usize, category: Option<String>) -> Result<(), Error> {
        let row = self.row_mut(index)?;
        row.category = category
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());

        Ok(())
    }

    /// The number of rows that would be submitted.
    pub fn importable_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_importable()).count()
    }

    /// The importable rows as bulk transaction items, in statement order.
    pub fn bulk_items(&self) -> Vec<BulkTransactionItem> {
        self.rows.iter().filter_map(PreviewRow::to_bulk_item).collect()
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut PreviewRow, Error> {
        let row_count = self.rows.len();

        self.rows.get_mut(index).ok_or_else(|| {
            Error::ValidationError(format!(
                "row {index} does not exist, the statement has {row_count} rows"
            ))
        })
    }
}

/// Reconcile every row of a statement with the confirmed mapping and type strategy.
pub fn reconcile_rows(
    rows: &[RawRow],
    mapping: &ColumnMapping,
    type_config: &TypeConfig,
) -> ImportPreview {
    let rows = rows
        .iter()
        .enumerate()
        .map(|(index, row)| reconcile_row(index, row, mapping, type_config))
        .collect();

    ImportPreview { rows }
}

fn reconcile_row(
    index: usize,
    row: &RawRow,
    mapping: &ColumnMapping,
    type_config: &TypeConfig,
) -> PreviewRow {
    let mut errors = Vec::new();

    let date = read_date(row, mapping.date.as_deref(), &mut errors);
    let (transaction_type, amount) = match type_config {
        TypeConfig::Sign => read_signed_amount(row, mapping.amount.as_deref(), &mut errors),
        TypeConfig::SeparateColumns {
            credit_column,
            debit_column,
        } => read_separate_columns(row, credit_column, debit_column, &mut errors),
        TypeConfig::TypeColumn {
            type_column,
            income_values,
            expense_values,
        } => {
            let amount = read_amount(row, mapping.amount.as_deref(), "amount", &mut errors);
            let transaction_type =
                read_type_column(row, type_column, income_values, expense_values, &mut errors);

            (transaction_type, amount.map(f64::abs))
        }
    };

    if amount.is_some() && transaction_type.is_none() {
        errors.push(RowError::TypeUndetermined);
    }

    if transaction_type.is_some() && amount.is_none() {
        errors.push(RowError::AmountUndetermined);
    }

    PreviewRow {
        index,
        date,
        description: cell(row, mapping.description.as_deref())
            .unwrap_or_default()
            .to_owned(),
        amount,
        transaction_type,
        category: cell(row, mapping.category.as_deref()).map(str::to_owned),
        errors,
        excluded: false,
    }
}

fn read_date(row: &RawRow, column: Option<&str>, errors: &mut Vec<RowError>) -> Option<Date> {
    if mapped(column).is_none() {
        errors.push(RowError::MissingMapping("date"));
        return None;
    }

    let Some(text) = cell(row, column) else {
        errors.push(RowError::MissingDate);
        return None;
    };

    let date = parse_date(text);
    if date.is_none() {
        errors.push(RowError::InvalidDate);
    }

    date
}

/// Read the signed amount in `column`, recording an error if it is unmapped,
/// empty or not a number.
fn read_amount(
    row: &RawRow,
    column: Option<&str>,
    field: &'static str,
    errors: &mut Vec<RowError>,
) -> Option<f64> {
    if mapped(column).is_none() {
        errors.push(RowError::MissingMapping(field));
        return None;
    }

    let Some(text) = cell(row, column) else {
        errors.push(RowError::MissingAmount);
        return None;
    };

    let amount = parse_amount(text);
    if amount.is_none() {
        errors.push(RowError::InvalidAmount);
    }

    amount
}

fn read_signed_amount(
    row: &RawRow,
    column: Option<&str>,
    errors: &mut Vec<RowError>,
) -> (Option<TransactionType>, Option<f64>) {
    let Some(amount) = read_amount(row, column, "amount", errors) else {
        return (None, None);
    };

    let transaction_type = if amount > 0.0 {
        Some(TransactionType::Income)
    } else if amount < 0.0 {
        Some(TransactionType::Expense)
    } else {
        None
    };

    (transaction_type, Some(amount.abs()))
}

fn read_separate_columns(
    row: &RawRow,
    credit_column: &str,
    debit_column: &str,
    errors: &mut Vec<RowError>,
) -> (Option<TransactionType>, Option<f64>) {
    let mut is_mapped = true;
    for (column, field) in [(credit_column, "credit column"), (debit_column, "debit column")] {
        if mapped(Some(column)).is_none() {
            errors.push(RowError::MissingMapping(field));
            is_mapped = false;
        }
    }

    if !is_mapped {
        return (None, None);
    }

    let mut is_invalid = false;
    let mut read_nonzero = |column: &str| match cell(row, Some(column)) {
        None => None,
        Some(text) => match parse_amount(text) {
            Some(amount) if amount != 0.0 => Some(amount.abs()),
            Some(_) => None,
            None => {
                is_invalid = true;
                None
            }
        },
    };

    let credit = read_nonzero(credit_column);
    let debit = read_nonzero(debit_column);

    if is_invalid {
        errors.push(RowError::InvalidAmount);
    }

    match (credit, debit) {
        (Some(credit), Some(_)) => {
            errors.push(RowError::BothColumnsHaveValues);
            (Some(TransactionType::Income), Some(credit))
        }
        (Some(credit), None) => (Some(TransactionType::Income), Some(credit)),
        (None, Some(debit)) => (Some(TransactionType::Expense), Some(debit)),
        (None, None) => {
            if !is_invalid {
                errors.push(RowError::MissingAmount);
            }
            (None, None)
        }
    }
}

fn read_type_column(
    row: &RawRow,
    type_column: &str,
    income_values: &str,
    expense_values: &str,
    errors: &mut Vec<RowError>,
) -> Option<TransactionType> {
    if mapped(Some(type_column)).is_none() {
        errors.push(RowError::MissingMapping("type column"));
        return None;
    }

    let value = cell(row, Some(type_column))?.to_lowercase();

    if keywords(income_values).contains(&value) {
        Some(TransactionType::Income)
    } else if keywords(expense_values).contains(&value) {
        Some(TransactionType::Expense)
    } else {
        None
    }
}
