//! Application router configuration.
//!
//! Every route except register and log-in requires a bearer token, enforced
//! by the [crate::auth::Claims] extractor in each handler.

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};
use serde_json::json;

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, get_accounts_endpoint,
        update_account_endpoint,
    },
    auth::{log_in_endpoint, register_endpoint},
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budget_status_endpoint,
        get_budgets_endpoint, update_budget_endpoint,
    },
    category::{
        create_category_endpoint, create_subcategory_endpoint, delete_category_endpoint,
        delete_subcategory_endpoint, get_categories_endpoint, update_category_endpoint,
    },
    endpoints,
    notification::{
        delete_notification_endpoint, get_notifications_endpoint,
        mark_notification_read_endpoint,
    },
    report::{
        budget_comparison_endpoint, cash_flow_endpoint, category_breakdown_endpoint,
        expense_distribution_endpoint, monthly_summary_endpoint, spending_heatmap_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_endpoint,
        update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::REGISTER, post(register_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(
            endpoints::ACCOUNTS,
            get(get_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::ACCOUNT,
            put(update_account_endpoint).delete(delete_account_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            put(update_category_endpoint).delete(delete_category_endpoint),
        )
        .route(
            endpoints::SUBCATEGORIES,
            post(create_subcategory_endpoint),
        )
        .route(endpoints::SUBCATEGORY, delete(delete_subcategory_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(get_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(endpoints::BUDGET_STATUS, get(get_budget_status_endpoint))
        .route(
            endpoints::BUDGET,
            put(update_budget_endpoint).delete(delete_budget_endpoint),
        )
        .route(endpoints::MONTHLY_SUMMARY, get(monthly_summary_endpoint))
        .route(
            endpoints::CATEGORY_BREAKDOWN,
            get(category_breakdown_endpoint),
        )
        .route(endpoints::CASH_FLOW, get(cash_flow_endpoint))
        .route(
            endpoints::EXPENSE_DISTRIBUTION,
            get(expense_distribution_endpoint),
        )
        .route(endpoints::BUDGET_COMPARISON, get(budget_comparison_endpoint))
        .route(endpoints::SPENDING_HEATMAP, get(spending_heatmap_endpoint))
        .route(endpoints::NOTIFICATIONS, get(get_notifications_endpoint))
        .route(
            endpoints::NOTIFICATION_READ,
            patch(mark_notification_read_endpoint),
        )
        .route(endpoints::NOTIFICATION, delete(delete_notification_endpoint))
        .fallback(not_found)
        .with_state(state)
}

/// The JSON 404 response for routes outside the API surface.
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "the requested resource could not be found" })),
    )
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;

    use crate::{endpoints, test_utils::new_test_server};

    #[tokio::test]
    async fn unknown_routes_return_json_not_found() {
        let server = new_test_server();

        let response = server.get("/api/not-a-route").await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&serde_json::json!({
            "error": "the requested resource could not be found"
        }));
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let server = new_test_server();

        for route in [
            endpoints::ACCOUNTS,
            endpoints::CATEGORIES,
            endpoints::TRANSACTIONS,
            endpoints::BUDGETS,
            endpoints::BUDGET_STATUS,
            endpoints::NOTIFICATIONS,
            endpoints::CASH_FLOW,
        ] {
            server
                .get(route)
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
        }
    }
}
