//! Route handlers for the summary report and charts.

use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use time::{Date, Duration, Month};

use crate::{
    Error,
    app_state::lock_connection,
    auth::UserID,
    extract::QueryParams,
    report::{
        ReportCharts, ReportState, Summary, aggregation::expenses_by_category,
        aggregation::monthly_totals, get_report_entries, summarize,
    },
    timezone::get_local_date,
    transaction::DateRange,
};

/// How far back the summary goes when `from` is not given.
const DEFAULT_SUMMARY_SPAN: Duration = Duration::days(30);

/// How many calendar months the charts cover when `from` is not given,
/// including the month of `to`.
const DEFAULT_CHART_MONTHS: u32 = 12;

/// The optional date range of a report.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

/// A route handler for the income and expense summary.
///
/// The range defaults to the 30 days up to today.
pub async fn get_summary_endpoint(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<ReportQuery>,
) -> Result<Json<Summary>, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let range = DateRange::from_query(query.from, query.to, today, DEFAULT_SUMMARY_SPAN)?;

    let connection = lock_connection(&state.db_connection)?;
    let entries = get_report_entries(user_id, range, &connection)?;

    Ok(Json(summarize(&entries, range)))
}

/// A route handler for the report charts.
///
/// The range defaults to the last twelve calendar months, including the current one.
pub async fn get_charts_endpoint(
    State(state): State<ReportState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<ReportQuery>,
) -> Result<Json<ReportCharts>, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let to = query.to.unwrap_or(today);
    let from = match query.from {
        Some(from) => from,
        None => start_of_trailing_months(to, DEFAULT_CHART_MONTHS)?,
    };
    let range = DateRange::new(from, to)?;

    let entries = {
        let connection = lock_connection(&state.db_connection)?;
        get_report_entries(user_id, range, &connection)?
    };

    let charts = ReportCharts::new(
        &monthly_totals(&entries, range),
        &expenses_by_category(&entries),
    )?;

    Ok(Json(charts))
}

/// The first day of the calendar month `months - 1` months before `date`.
fn start_of_trailing_months(date: Date, months: u32) -> Result<Date, Error> {
    let months_back = months.saturating_sub(1) as i32;
    let month_index = date.year() * 12 + (date.month() as i32 - 1) - months_back;
    let year = month_index.div_euclid(12);
    let month = Month::try_from((month_index.rem_euclid(12) + 1) as u8)
        .map_err(|error| Error::InternalError(error.to_string()))?;

    Date::from_calendar_date(year, month, 1).map_err(|_| Error::InvalidDateRange)
}
