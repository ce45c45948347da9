//! Budget models and database queries.

use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::{
    Error,
    auth::{UserID, ensure_owner},
    category::{CategoryEmoji, CategoryId, category_name_key},
    database_id::DatabaseId,
    transaction::DateRange,
};

/// Database identifier for a budget.
pub type BudgetId = DatabaseId;

/// The color used when a budget is created without one.
pub const DEFAULT_BUDGET_COLOR: &str = "#3b82f6";

/// A monthly spending cap.
///
/// The budget tracks the expenses in `category_id`, or if it has no category,
/// the expenses in the category with the same name as the budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserID,
    pub name: String,
    pub emoji: CategoryEmoji,
    pub amount: f64,
    pub color: String,
    pub category_id: Option<CategoryId>,
}

/// A budget together with how much of it was used in a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSpending {
    #[serde(flatten)]
    pub budget: Budget,
    pub spent: f64,
    pub remaining: f64,
}

/// The validated, user-editable fields of a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetFields {
    pub name: String,
    pub emoji: CategoryEmoji,
    pub amount: f64,
    pub color: String,
    pub category_id: Option<CategoryId>,
}

impl BudgetFields {
    /// Validate raw budget fields, filling in the default emoji and color.
    ///
    /// # Errors
    /// Returns [Error::ValidationError] for a blank name, a negative or
    /// non-finite amount or a color that is not `#rrggbb`, and
    /// [Error::InvalidEmoji] for a bad emoji.
    pub fn new(
        name: &str,
        emoji: Option<&str>,
        amount: f64,
        color: Option<&str>,
        category_id: Option<CategoryId>,
    ) -> Result<Self, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::ValidationError("budget name is required".to_owned()));
        }

        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::ValidationError(format!(
                "budget amount must be a non-negative number, got {amount}"
            )));
        }

        let color = color.map(str::trim).unwrap_or(DEFAULT_BUDGET_COLOR);
        if !is_hex_color(color) {
            return Err(Error::ValidationError(format!(
                "\"{color}\" is not a color in the form #rrggbb"
            )));
        }

        Ok(Self {
            name: name.to_owned(),
            emoji: CategoryEmoji::new_or_default(emoji)?,
            amount,
            color: color.to_owned(),
            category_id,
        })
    }
}

fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Create a budget for `user_id`.
///
/// The caller should check that the category belongs to the user.
pub fn create_budget(
    user_id: UserID,
    fields: BudgetFields,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "INSERT INTO budget (user_id, name, emoji, amount, color, category_id, name_key)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, name, emoji, amount, color, category_id",
        )?
        .query_row(
            (
                user_id.as_i64(),
                &fields.name,
                fields.emoji.as_ref(),
                fields.amount,
                &fields.color,
                fields.category_id,
                category_name_key(&fields.name),
            ),
            map_budget_row,
        )
        .map_err(Error::from)
}

/// Retrieve a budget that must belong to `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if it does not exist or [Error::Forbidden] if
/// another user owns it.
pub fn get_owned_budget(
    id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    let budget = connection
        .prepare(
            "SELECT id, user_id, name, emoji, amount, color, category_id
             FROM budget WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_budget_row)?;

    ensure_owner(budget.user_id, user_id)?;

    Ok(budget)
}

/// Get the user's budgets, ordered by name, with the expenses counted against
/// each of them within `range`.
pub fn get_budget_spending(
    user_id: UserID,
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<BudgetSpending>, Error> {
    connection
        .prepare(
            "SELECT b.id, b.user_id, b.name, b.emoji, b.amount, b.color, b.category_id,
                COALESCE((
                    SELECT SUM(t.amount)
                    FROM \"transaction\" t
                    LEFT JOIN category c ON c.id = t.category_id
                    WHERE t.user_id = b.user_id
                      AND t.type = 'EXPENSE'
                      AND t.date BETWEEN ?2 AND ?3
                      AND CASE
                          WHEN b.category_id IS NOT NULL THEN t.category_id = b.category_id
                          ELSE c.name_key = b.name_key
                      END
                ), 0.0) AS spent
             FROM budget b
             WHERE b.user_id = ?1
             ORDER BY b.name_key, b.id",
        )?
        .query_map((user_id.as_i64(), range.start, range.end), |row| {
            let budget = map_budget_row(row)?;
            let spent: f64 = row.get(7)?;

            Ok(BudgetSpending {
                remaining: budget.amount - spent,
                budget,
                spent,
            })
        })?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Replace the editable fields of budget `id`.
///
/// # Errors
/// Returns [Error::NotFound] if the budget does not exist.
pub fn update_budget(
    id: BudgetId,
    fields: BudgetFields,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "UPDATE budget
             SET name = ?1, emoji = ?2, amount = ?3, color = ?4, category_id = ?5,
                 name_key = ?7
             WHERE id = ?6
             RETURNING id, user_id, name, emoji, amount, color, category_id",
        )?
        .query_row(
            (
                &fields.name,
                fields.emoji.as_ref(),
                fields.amount,
                &fields.color,
                fields.category_id,
                id,
                category_name_key(&fields.name),
            ),
            map_budget_row,
        )
        .map_err(Error::from)
}

/// Delete budget `id`.
///
/// # Errors
/// Returns [Error::NotFound] if the budget does not exist.
pub fn delete_budget(id: BudgetId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM budget WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the budget table.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            name_key TEXT NOT NULL,
            emoji TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            color TEXT NOT NULL,
            category_id INTEGER REFERENCES category(id) ON DELETE SET NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_emoji: String = row.get(3)?;

    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        emoji: CategoryEmoji::new_unchecked(&raw_emoji),
        amount: row.get(4)?,
        color: row.get(5)?,
        category_id: row.get(6)?,
    })
}

#[cfg(test)]
mod budget_fields_tests {
    use crate::{Error, budget::BudgetFields};

    #[test]
    fn defaults_color_and_emoji() {
        let fields = BudgetFields::new(" Food ", None, 300.0, None, None).unwrap();

        assert_eq!(fields.name, "Food");
        assert_eq!(fields.color, "#3b82f6");
        assert_eq!(fields.emoji.as_ref(), "📁");
    }

    #[test]
    fn rejects_invalid_fields() {
        assert!(matches!(
            BudgetFields::new("", None, 1.0, None, None),
            Err(Error::ValidationError(_))
        ));
        assert!(matches!(
            BudgetFields::new("Food", None, -1.0, None, None),
            Err(Error::ValidationError(_))
        ));
        assert!(matches!(
            BudgetFields::new("Food", None, 1.0, Some("blue"), None),
            Err(Error::ValidationError(_))
        ));
        assert!(matches!(
            BudgetFields::new("Food", Some("ab"), 1.0, None, None),
            Err(Error::InvalidEmoji(_))
        ));
    }
}
