//! Reports summarize a user's income and expenses over a date range.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod aggregation;
mod charts;
mod endpoints;

pub use aggregation::{Summary, get_report_entries, summarize};
pub use charts::ReportCharts;
pub use endpoints::{get_charts_endpoint, get_summary_endpoint};

/// The state needed by the report endpoints.
#[derive(Debug, Clone)]
pub struct ReportState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical timezone used to work out "today" for default date ranges.
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
