//! Transaction data aggregation for the summary report and charts.
//!
//! Transactions are loaded with their category names and then totalled in
//! memory by type, category and calendar month.

use std::collections::HashMap;

use rusqlite::Connection;
use serde::Serialize;
use time::{Date, Month};

use crate::{Error, auth::UserID, transaction::DateRange, transaction::TransactionType};

/// The label used for expenses without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The fields of a transaction needed for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub date: Date,
    pub transaction_type: TransactionType,
    pub amount: f64,
    /// The category name, or [UNCATEGORIZED_LABEL].
    pub category: String,
}

/// The total expenses in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// The income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    /// The month as `YYYY-MM`.
    pub month: String,
    pub income: f64,
    pub expenses: f64,
}

/// Income and expense totals over a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub from: Date,
    pub to: Date,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net: f64,
    /// The share of income that was not spent, `net / total_income`, or zero
    /// when there was no income.
    pub savings_rate: f64,
    /// Sorted from largest to smallest.
    pub expenses_by_category: Vec<CategoryTotal>,
    /// One entry per calendar month in the range, oldest first.
    pub monthly_totals: Vec<MonthlyTotal>,
}

/// Load the user's transactions in `range` for reporting.
pub fn get_report_entries(
    user_id: UserID,
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<ReportEntry>, Error> {
    connection
        .prepare(
            "SELECT t.date, t.type, t.amount, c.name
             FROM \"transaction\" t
             LEFT JOIN category c ON c.id = t.category_id
             WHERE t.user_id = ?1 AND t.date BETWEEN ?2 AND ?3
             ORDER BY t.date ASC",
        )?
        .query_map((user_id.as_i64(), range.start, range.end), |row| {
            let category: Option<String> = row.get(3)?;

            Ok(ReportEntry {
                date: row.get(0)?,
                transaction_type: row.get(1)?,
                amount: row.get(2)?,
                category: category.unwrap_or_else(|| UNCATEGORIZED_LABEL.to_owned()),
            })
        })?
        .map(|entry| entry.map_err(Error::from))
        .collect()
}

/// Total `entries` into a [Summary] over `range`.
pub fn summarize(entries: &[ReportEntry], range: DateRange) -> Summary {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;

    for entry in entries {
        match entry.transaction_type {
            TransactionType::Income => total_income += entry.amount,
            TransactionType::Expense => total_expenses += entry.amount,
        }
    }

    let net = total_income - total_expenses;
    let savings_rate = if total_income > 0.0 {
        net / total_income
    } else {
        0.0
    };

    Summary {
        from: range.start,
        to: range.end,
        total_income,
        total_expenses,
        net,
        savings_rate,
        expenses_by_category: expenses_by_category(entries),
        monthly_totals: monthly_totals(entries, range),
    }
}

/// Sum expenses per category, largest first. Ties are ordered by name.
pub fn expenses_by_category(entries: &[ReportEntry]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for entry in entries
        .iter()
        .filter(|entry| entry.transaction_type == TransactionType::Expense)
    {
        *totals.entry(entry.category.as_str()).or_insert(0.0) += entry.amount;
    }

    let mut totals: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_owned(),
            total,
        })
        .collect();
    totals.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });

    totals
}

/// Sum income and expenses per calendar month, including months without
/// transactions.
pub fn monthly_totals(entries: &[ReportEntry], range: DateRange) -> Vec<MonthlyTotal> {
    let mut totals: HashMap<(i32, u8), (f64, f64)> = HashMap::new();

    for entry in entries {
        let (income, expenses) = totals.entry(month_key(entry.date)).or_insert((0.0, 0.0));

        match entry.transaction_type {
            TransactionType::Income => *income += entry.amount,
            TransactionType::Expense => *expenses += entry.amount,
        }
    }

    months_in_range(range)
        .into_iter()
        .map(|(year, month)| {
            let (income, expenses) = totals.get(&(year, month)).copied().unwrap_or((0.0, 0.0));

            MonthlyTotal {
                month: format!("{year:04}-{month:02}"),
                income,
                expenses,
            }
        })
        .collect()
}

/// Formats a `YYYY-MM` month as a short label, e.g. "Mar 2025".
pub fn format_month_label(month: &str) -> String {
    let Some((year, month_number)) = month.split_once('-') else {
        return month.to_owned();
    };

    match month_number.parse::<u8>().map(Month::try_from) {
        Ok(Ok(month)) => {
            let name = month.to_string();
            format!("{} {year}", &name[..3])
        }
        _ => month.to_owned(),
    }
}

fn month_key(date: Date) -> (i32, u8) {
    (date.year(), date.month() as u8)
}

/// Every (year, month number) pair from the start to the end of `range`.
fn months_in_range(range: DateRange) -> Vec<(i32, u8)> {
    let (mut year, mut month) = month_key(range.start);
    let last = month_key(range.end);
    let mut months = Vec::new();

    while (year, month) <= last {
        months.push((year, month));

        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }

    months
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::transaction::{DateRange, TransactionType};

    use super::{
        CategoryTotal, ReportEntry, UNCATEGORIZED_LABEL, format_month_label, monthly_totals,
        summarize,
    };

    fn entry(
        date: time::Date,
        transaction_type: TransactionType,
        amount: f64,
        category: &str,
    ) -> ReportEntry {
        ReportEntry {
            date,
            transaction_type,
            amount,
            category: category.to_owned(),
        }
    }

    fn sample_entries() -> Vec<ReportEntry> {
        vec![
            entry(date!(2025 - 01 - 05), TransactionType::Income, 1000.0, "Salary"),
            entry(date!(2025 - 01 - 06), TransactionType::Expense, 100.0, "Food"),
            entry(date!(2025 - 02 - 10), TransactionType::Expense, 300.0, "Rent"),
            entry(date!(2025 - 02 - 11), TransactionType::Expense, 50.0, "Food"),
            entry(
                date!(2025 - 03 - 01),
                TransactionType::Expense,
                50.0,
                UNCATEGORIZED_LABEL,
            ),
        ]
    }

    #[test]
    fn summary_totals() {
        let range = DateRange::new(date!(2025 - 01 - 01), date!(2025 - 03 - 31)).unwrap();

        let summary = summarize(&sample_entries(), range);

        assert_eq!(summary.total_income, 1000.0);
        assert_eq!(summary.total_expenses, 500.0);
        assert_eq!(summary.net, 500.0);
        assert_eq!(summary.savings_rate, 0.5);
        assert_eq!(
            summary.expenses_by_category,
            vec![
                CategoryTotal {
                    category: "Rent".to_owned(),
                    total: 300.0
                },
                CategoryTotal {
                    category: "Food".to_owned(),
                    total: 150.0
                },
                CategoryTotal {
                    category: UNCATEGORIZED_LABEL.to_owned(),
                    total: 50.0
                },
            ]
        );
    }

    #[test]
    fn savings_rate_is_zero_without_income() {
        let range = DateRange::new(date!(2025 - 02 - 01), date!(2025 - 02 - 28)).unwrap();
        let entries = vec![entry(
            date!(2025 - 02 - 10),
            TransactionType::Expense,
            300.0,
            "Rent",
        )];

        let summary = summarize(&entries, range);

        assert_eq!(summary.savings_rate, 0.0);
        assert_eq!(summary.net, -300.0);
    }

    #[test]
    fn monthly_totals_include_empty_months_across_years() {
        let range = DateRange::new(date!(2024 - 11 - 15), date!(2025 - 02 - 01)).unwrap();
        let entries = vec![
            entry(date!(2024 - 11 - 20), TransactionType::Income, 10.0, "Salary"),
            entry(date!(2025 - 02 - 01), TransactionType::Expense, 5.0, "Food"),
        ];

        let totals = monthly_totals(&entries, range);

        let months: Vec<&str> = totals.iter().map(|total| total.month.as_str()).collect();
        assert_eq!(months, ["2024-11", "2024-12", "2025-01", "2025-02"]);
        assert_eq!(totals[0].income, 10.0);
        assert_eq!(totals[1].income, 0.0);
        assert_eq!(totals[3].expenses, 5.0);
    }

    #[test]
    fn month_labels_are_short() {
        assert_eq!(format_month_label("2025-03"), "Mar 2025");
        assert_eq!(format_month_label("garbage"), "garbage");
    }
}
