//! How the columns of a statement map onto transaction fields.

use serde::{Deserialize, Serialize};

use crate::import::RawRow;

/// The default keywords that mark a row, or a column header, as income.
pub const DEFAULT_INCOME_KEYWORDS: &str = "income,credit,in,deposit,entrate,entrata,accredito";

/// The default keywords that mark a row, or a column header, as an expense.
pub const DEFAULT_EXPENSE_KEYWORDS: &str = "expense,debit,out,withdrawal,uscite,uscita,addebito";

/// Which statement column holds each transaction field.
///
/// A field that is `None` or blank is unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// How the type (income or expense) of each row is worked out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "strategy",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum TypeConfig {
    /// Positive amounts are income and negative amounts are expenses.
    #[default]
    Sign,
    /// Income and expenses are in two columns.
    SeparateColumns {
        credit_column: String,
        debit_column: String,
    },
    /// A column names the type, matched against comma separated keywords.
    TypeColumn {
        type_column: String,
        income_values: String,
        expense_values: String,
    },
}

/// Look up the cell for `column` in `row`.
///
/// Returns `None` if the column is unmapped, missing from the row or the cell is blank.
pub(crate) fn cell<'a>(row: &'a RawRow, column: Option<&str>) -> Option<&'a str> {
    let column = mapped(column)?;

    row.get(column)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

/// `column` with blank names treated as unmapped.
pub(crate) fn mapped(column: Option<&str>) -> Option<&str> {
    column.map(str::trim).filter(|column| !column.is_empty())
}

/// Split a comma separated keyword list into trimmed, lowercase keywords.
pub(crate) fn keywords(list: &str) -> Vec<String> {
    list.split(',')
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}
