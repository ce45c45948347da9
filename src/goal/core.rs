//! Savings goal models and database queries.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::{UserID, ensure_owner},
    database_id::DatabaseId,
};

/// Database identifier for a goal.
pub type GoalId = DatabaseId;

/// The category given to goals created without one.
pub const DEFAULT_GOAL_CATEGORY: &str = "Savings";

/// A target amount of money to save by a deadline.
///
/// `current_amount` is updated by the user as they save towards the goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserID,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: Date,
    pub category: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Goal {
    /// How much of the target has been saved as a percentage between 0 and 100.
    pub fn progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }

        (self.current_amount / self.target_amount * 100.0).clamp(0.0, 100.0)
    }
}

/// A goal with its progress, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress: f64,
}

impl From<Goal> for GoalProgress {
    fn from(goal: Goal) -> Self {
        Self {
            progress: goal.progress(),
            goal,
        }
    }
}

/// The validated, user-editable fields of a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalFields {
    pub title: String,
    pub description: Option<String>,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: Date,
    pub category: String,
}

impl GoalFields {
    /// Validate the fields of a goal.
    ///
    /// # Errors
    /// Returns [Error::ValidationError] if the title is blank, the target is
    /// not positive or the current amount is negative.
    pub fn new(
        title: &str,
        description: Option<&str>,
        target_amount: f64,
        current_amount: f64,
        deadline: Date,
        category: Option<&str>,
    ) -> Result<Self, Error> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::ValidationError("goal title is required".to_owned()));
        }

        if !target_amount.is_finite() || target_amount <= 0.0 {
            return Err(Error::ValidationError(format!(
                "target amount must be greater than zero, got {target_amount}"
            )));
        }

        if !current_amount.is_finite() || current_amount < 0.0 {
            return Err(Error::ValidationError(format!(
                "current amount must be a non-negative number, got {current_amount}"
            )));
        }

        let category = match category.map(str::trim) {
            Some(category) if !category.is_empty() => category,
            _ => DEFAULT_GOAL_CATEGORY,
        };

        Ok(Self {
            title: title.to_owned(),
            description: description
                .map(str::trim)
                .filter(|description| !description.is_empty())
                .map(str::to_owned),
            target_amount,
            current_amount,
            deadline,
            category: category.to_owned(),
        })
    }
}

/// Create a goal for `user_id`, stamped with the current time.
pub fn create_goal(
    user_id: UserID,
    fields: GoalFields,
    connection: &Connection,
) -> Result<Goal, Error> {
    connection
        .prepare(
            "INSERT INTO goal
                (user_id, title, description, target_amount, current_amount, deadline, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, user_id, title, description, target_amount, current_amount,
                deadline, category, created_at",
        )?
        .query_row(
            (
                user_id.as_i64(),
                &fields.title,
                &fields.description,
                fields.target_amount,
                fields.current_amount,
                fields.deadline,
                &fields.category,
                OffsetDateTime::now_utc(),
            ),
            map_goal_row,
        )
        .map_err(Error::from)
}

/// Retrieve a goal that must belong to `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if it does not exist or [Error::Forbidden] if
/// another user owns it.
pub fn get_owned_goal(id: GoalId, user_id: UserID, connection: &Connection) -> Result<Goal, Error> {
    let goal = connection
        .prepare(
            "SELECT id, user_id, title, description, target_amount, current_amount,
                deadline, category, created_at
             FROM goal WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_goal_row)?;

    ensure_owner(goal.user_id, user_id)?;

    Ok(goal)
}

/// Get the user's goals ordered by deadline, soonest first.
pub fn get_goals(user_id: UserID, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, title, description, target_amount, current_amount,
                deadline, category, created_at
             FROM goal WHERE user_id = :user_id
             ORDER BY deadline ASC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_goal_row)?
        .map(|goal| goal.map_err(Error::from))
        .collect()
}

/// Replace the editable fields of goal `id`. The creation time is kept.
pub fn update_goal(id: GoalId, fields: GoalFields, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(
            "UPDATE goal
             SET title = ?1, description = ?2, target_amount = ?3, current_amount = ?4,
                 deadline = ?5, category = ?6
             WHERE id = ?7
             RETURNING id, user_id, title, description, target_amount, current_amount,
                deadline, category, created_at",
        )?
        .query_row(
            (
                &fields.title,
                &fields.description,
                fields.target_amount,
                fields.current_amount,
                fields.deadline,
                &fields.category,
                id,
            ),
            map_goal_row,
        )
        .map_err(Error::from)
}

/// Delete goal `id`.
///
/// # Errors
/// Returns [Error::NotFound] if the goal does not exist.
pub fn delete_goal(id: GoalId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM goal WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the goal table.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            target_amount REAL NOT NULL CHECK (target_amount > 0),
            current_amount REAL NOT NULL CHECK (current_amount >= 0),
            deadline TEXT NOT NULL,
            category TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        target_amount: row.get(4)?,
        current_amount: row.get(5)?,
        deadline: row.get(6)?,
        category: row.get(7)?,
        created_at: row.get(8)?,
    })
}
