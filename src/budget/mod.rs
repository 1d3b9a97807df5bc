//! Budgets: per-category spending limits over a date window, and the status
//! evaluator that classifies spending against them.

mod core;
mod endpoints;
mod status;

pub use core::{
    Budget, BudgetId, BudgetPeriod, NewBudget, create_budget, create_budget_table,
    current_spending, delete_budget, get_budget, get_budgets, update_budget,
};
pub use endpoints::{
    BudgetData, create_budget_endpoint, delete_budget_endpoint, get_budget_status_endpoint,
    get_budgets_endpoint, update_budget_endpoint,
};
pub use status::{
    BudgetHealth, BudgetStatus, BudgetSummary, classify, get_budget_statuses,
    get_budget_summaries, percentage_used,
};
