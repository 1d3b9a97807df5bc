//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/accounts/{account_id}',
//! use [format_endpoint].

/// The route for registering a new user.
pub const REGISTER: &str = "/api/auth/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/auth/login";

/// The route to list and create accounts.
pub const ACCOUNTS: &str = "/api/accounts";
/// The route to access a single account.
pub const ACCOUNT: &str = "/api/accounts/{account_id}";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to access a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to create a subcategory under a category.
pub const SUBCATEGORIES: &str = "/api/categories/{category_id}/subcategories";
/// The route to access a single subcategory.
pub const SUBCATEGORY: &str = "/api/subcategories/{subcategory_id}";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// The route to list and create budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route to check spending against active budgets.
pub const BUDGET_STATUS: &str = "/api/budgets/status";
/// The route to access a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";

/// The route for income, expense and savings totals for a calendar month.
pub const MONTHLY_SUMMARY: &str = "/api/reports/monthly-summary";
/// The route for per-category expense totals over a date range.
pub const CATEGORY_BREAKDOWN: &str = "/api/reports/category-breakdown";
/// The route for month-by-month income and expense totals.
pub const CASH_FLOW: &str = "/api/reports/cash-flow";

/// The route for expense distribution chart data.
pub const EXPENSE_DISTRIBUTION: &str = "/api/visualization/expense-distribution";
/// The route for budgeted versus actual spending chart data.
pub const BUDGET_COMPARISON: &str = "/api/visualization/budget-comparison";
/// The route for calendar heatmap chart data.
pub const SPENDING_HEATMAP: &str = "/api/visualization/spending-heatmap";

/// The route to list unread notifications.
pub const NOTIFICATIONS: &str = "/api/notifications";
/// The route to delete a single notification.
pub const NOTIFICATION: &str = "/api/notifications/{notification_id}";
/// The route to mark a notification as read.
pub const NOTIFICATION_READ: &str = "/api/notifications/{notification_id}/read";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/accounts/{account_id}',
/// '{account_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
