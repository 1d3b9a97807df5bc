//! Reports and chart data: on-demand aggregations over the transaction
//! history, nothing persisted.

mod core;
mod endpoints;

pub use core::{
    BudgetComparisonEntry, CashFlowEntry, CategoryBreakdownEntry, ExpenseSlice, HeatmapCell,
    MonthlySummary, budget_comparison, cash_flow, category_breakdown, expense_distribution,
    month_bounds, monthly_summary, months_before, spending_heatmap,
};
pub use endpoints::{
    budget_comparison_endpoint, cash_flow_endpoint, category_breakdown_endpoint,
    expense_distribution_endpoint, monthly_summary_endpoint, spending_heatmap_endpoint,
};
