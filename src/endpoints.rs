//! The API endpoints URIs.
//!
//! Updates and deletes address a single resource through the request body
//! (`PUT`) or the `id` query parameter (`DELETE`), e.g. `DELETE /api/categories?id=3`.

/// The route to register a new user.
pub const USERS: &str = "/api/users";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route for getting the user of the current session.
pub const SESSION: &str = "/api/session";
/// The route to access categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to access transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to create many transactions in one request.
pub const BULK_TRANSACTIONS: &str = "/api/transactions/bulk";
/// The route to access budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route to access savings goals.
pub const GOALS: &str = "/api/goals";
/// The route for the income and expense summary.
pub const REPORT_SUMMARY: &str = "/api/reports/summary";
/// The route for chart configurations.
pub const REPORT_CHARTS: &str = "/api/reports/charts";
/// The route to upload a statement and extract its rows.
pub const IMPORT_EXTRACT: &str = "/api/import/extract";
/// The route to reconcile extracted rows into candidate transactions.
pub const IMPORT_PREVIEW: &str = "/api/import/preview";
/// The route to access the user's interface preferences.
pub const PREFERENCES: &str = "/api/preferences";

/// Append `?id={id}` to `endpoint_path`, the form used by `DELETE` routes.
#[cfg(test)]
pub fn with_id_query(endpoint_path: &str, id: i64) -> String {
    format!("{endpoint_path}?id={id}")
}
