//! Savings goals track progress towards a target amount by a deadline.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod core;
mod endpoints;

pub use core::{
    DEFAULT_GOAL_CATEGORY, Goal, GoalFields, GoalProgress, create_goal, create_goal_table,
    get_goals, get_owned_goal,
};
pub use endpoints::{
    create_goal_endpoint, delete_goal_endpoint, get_goals_endpoint, update_goal_endpoint,
};

#[cfg(test)]
pub use core::{delete_goal, update_goal};

/// The state needed by the goal endpoints.
#[derive(Debug, Clone)]
pub struct GoalState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
