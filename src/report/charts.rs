//! ECharts option objects for the reports page.
//!
//! The charts are built with `charming` and sent to the client as JSON, which
//! passes them straight to `echarts.setOption`.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, Tooltip, Trigger},
    series::bar,
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    Error,
    report::aggregation::{CategoryTotal, MonthlyTotal, format_month_label},
};

/// The chart options for the reports page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCharts {
    pub monthly_income_expenses: Value,
    pub expenses_by_category: Value,
}

impl ReportCharts {
    /// Build the charts and convert them to JSON.
    ///
    /// # Errors
    /// Returns [Error::InternalError] if a chart cannot be serialized.
    pub fn new(
        monthly_totals: &[MonthlyTotal],
        category_totals: &[CategoryTotal],
    ) -> Result<Self, Error> {
        Ok(Self {
            monthly_income_expenses: chart_to_json(&monthly_income_expenses_chart(
                monthly_totals,
            ))?,
            expenses_by_category: chart_to_json(&expenses_by_category_chart(category_totals))?,
        })
    }
}

fn chart_to_json(chart: &Chart) -> Result<Value, Error> {
    serde_json::to_value(chart).map_err(|error| {
        tracing::error!("could not serialize chart: {error}");
        Error::InternalError(format!("could not serialize chart: {error}"))
    })
}

/// Side by side income and expense bars for each month.
pub fn monthly_income_expenses_chart(monthly_totals: &[MonthlyTotal]) -> Chart {
    let labels: Vec<String> = monthly_totals
        .iter()
        .map(|total| format_month_label(&total.month))
        .collect();
    let income: Vec<f64> = monthly_totals.iter().map(|total| total.income).collect();
    let expenses: Vec<f64> = monthly_totals.iter().map(|total| total.expenses).collect();

    Chart::new()
        .title(Title::new().text("Income vs Expenses").subtext("Monthly totals"))
        .tooltip(axis_tooltip())
        .legend(Legend::new().left("right"))
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(
            bar::Bar::new()
                .name("Income")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(income),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(expenses),
        )
}

/// One bar per category, largest first.
pub fn expenses_by_category_chart(category_totals: &[CategoryTotal]) -> Chart {
    let labels: Vec<String> = category_totals
        .iter()
        .map(|total| total.category.clone())
        .collect();
    let totals: Vec<f64> = category_totals.iter().map(|total| total.total).collect();

    Chart::new()
        .title(Title::new().text("Expenses by Category"))
        .tooltip(axis_tooltip())
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(bar::Bar::new().name("Expenses").data(totals))
}

fn default_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .contain_label(true)
}

fn axis_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
