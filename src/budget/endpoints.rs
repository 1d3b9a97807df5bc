//! Defines the JSON endpoints for managing budgets and for reading their
//! evaluated status.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use time::Date;

use crate::{
    AppState, Error,
    auth::Claims,
    budget::{
        core::{Budget, BudgetId, BudgetPeriod, NewBudget, create_budget, delete_budget, update_budget},
        status::{BudgetStatus, BudgetSummary, get_budget_statuses, get_budget_summaries, today},
    },
    category::CategoryId,
    money::non_negative_cents_from_dollars,
};

/// The expected fields for creating or replacing a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetData {
    /// The ID of the category the budget limits.
    pub category_id: CategoryId,
    /// The spending limit in dollars, must not be negative.
    pub amount: f64,
    /// The recurrence the limit is meant for.
    pub period: BudgetPeriod,
    /// The first day of the budget window, inclusive.
    pub start_date: Date,
    /// The last day of the budget window, inclusive.
    pub end_date: Date,
}

impl BudgetData {
    fn validate(self) -> Result<NewBudget, Error> {
        Ok(NewBudget {
            category_id: self.category_id,
            amount: non_negative_cents_from_dollars(self.amount)?,
            period: self.period,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

/// A route handler for listing the caller's budgets with current spending,
/// most recently created first.
pub async fn get_budgets_endpoint(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<BudgetSummary>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_budget_summaries(claims.user_id, &connection).map(Json)
}

/// A route handler for creating a budget, responds with 201 CREATED.
pub async fn create_budget_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Json(data): Json<BudgetData>,
) -> Result<impl IntoResponse, Error> {
    let data = data.validate()?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let budget = create_budget(claims.user_id, &data, &connection)?;

    Ok((StatusCode::CREATED, Json(budget)))
}

/// A route handler for replacing a budget's fields.
pub async fn update_budget_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(budget_id): Path<BudgetId>,
    Json(data): Json<BudgetData>,
) -> Result<Json<Budget>, Error> {
    let data = data.validate()?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    update_budget(budget_id, claims.user_id, &data, &connection).map(Json)
}

/// A route handler for deleting a budget.
pub async fn delete_budget_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(budget_id): Path<BudgetId>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_budget(budget_id, claims.user_id, &connection)?;

    Ok(Json(json!({ "message": "Budget deleted successfully" })))
}

/// A route handler for evaluating the caller's budgets whose window is still
/// open today.
pub async fn get_budget_status_endpoint(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<BudgetStatus>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_budget_statuses(claims.user_id, today(), &connection).map(Json)
}
