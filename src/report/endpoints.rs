//! Defines the JSON endpoints for the report and chart-data queries.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::Claims,
    report::core::{
        BudgetComparisonEntry, CashFlowEntry, CategoryBreakdownEntry, ExpenseSlice, HeatmapCell,
        MonthlySummary, budget_comparison, cash_flow, category_breakdown, expense_distribution,
        month_bounds, monthly_summary, months_before, spending_heatmap,
    },
};

/// The calendar month a summary is requested for.
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    /// The calendar year.
    pub year: i32,
    /// The calendar month, 1-12.
    pub month: u8,
}

/// An inclusive date range for range-scoped reports.
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    /// The first day of the range, inclusive.
    pub start_date: Date,
    /// The last day of the range, inclusive.
    pub end_date: Date,
}

impl DateRangeQuery {
    fn validate(&self) -> Result<(), Error> {
        if self.end_date < self.start_date {
            return Err(Error::InvalidDateRange);
        }

        Ok(())
    }
}

/// How many months back the cash flow report should reach.
#[derive(Debug, Deserialize)]
pub struct CashFlowQuery {
    /// The number of months to look back from today.
    #[serde(default = "default_months")]
    pub months: u32,
}

fn default_months() -> u32 {
    12
}

/// The calendar year a heatmap is requested for.
#[derive(Debug, Deserialize)]
pub struct YearQuery {
    /// The calendar year.
    pub year: i32,
}

/// A route handler for income, expense and savings totals over one calendar
/// month.
pub async fn monthly_summary_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlySummary>, Error> {
    let (start_date, end_date) = month_bounds(query.year, query.month)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    monthly_summary(claims.user_id, start_date, end_date, &connection).map(Json)
}

/// A route handler for per-category totals and counts over a date range.
pub async fn category_breakdown_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<CategoryBreakdownEntry>>, Error> {
    query.validate()?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    category_breakdown(claims.user_id, query.start_date, query.end_date, &connection).map(Json)
}

/// A route handler for month-by-month income and expense totals looking back
/// from today.
pub async fn cash_flow_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<CashFlowQuery>,
) -> Result<Json<Vec<CashFlowEntry>>, Error> {
    let today = OffsetDateTime::now_utc().date();
    let start_date = months_before(today, query.months)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    cash_flow(claims.user_id, start_date, today, &connection).map(Json)
}

/// A route handler for the expense distribution pie chart data.
pub async fn expense_distribution_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<ExpenseSlice>>, Error> {
    query.validate()?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    expense_distribution(claims.user_id, query.start_date, query.end_date, &connection).map(Json)
}

/// A route handler for the budgeted versus actual spending bar chart data.
pub async fn budget_comparison_endpoint(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<BudgetComparisonEntry>>, Error> {
    let today = OffsetDateTime::now_utc().date();

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    budget_comparison(claims.user_id, today, &connection).map(Json)
}

/// A route handler for the calendar heatmap chart data.
pub async fn spending_heatmap_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<YearQuery>,
) -> Result<Json<Vec<HeatmapCell>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    spending_heatmap(claims.user_id, query.year, &connection).map(Json)
}
