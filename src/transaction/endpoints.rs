//! Defines the JSON endpoints for recording, amending and deleting
//! transactions, and for listing them with filters.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use time::Date;

use crate::{
    AppState, Error,
    account::AccountId,
    auth::Claims,
    category::{CategoryId, SubcategoryId},
    money::positive_cents_from_dollars,
    transaction::{
        core::{
            NewTransaction, Transaction, TransactionFilter, TransactionId, TransactionKind,
            get_transactions,
        },
        ledger::{create_transaction, delete_transaction, update_transaction},
    },
};

/// The expected fields for creating or replacing a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionData {
    /// The ID of the account the money moved through.
    pub account_id: AccountId,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The ID of the subcategory, if any.
    #[serde(default)]
    pub subcategory_id: Option<SubcategoryId>,
    /// The amount in dollars, must be positive.
    pub amount: f64,
    /// Whether the money came in or went out.
    pub kind: TransactionKind,
    /// A free-text note about the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// When the transaction happened.
    pub date: Date,
}

impl TransactionData {
    fn validate(self) -> Result<NewTransaction, Error> {
        Ok(NewTransaction {
            account_id: self.account_id,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            amount: positive_cents_from_dollars(self.amount)?,
            kind: self.kind,
            description: self.description,
            date: self.date,
        })
    }
}

/// The optional query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    /// Keep transactions dated on or after this date.
    #[serde(default)]
    pub start_date: Option<Date>,
    /// Keep transactions dated on or before this date.
    #[serde(default)]
    pub end_date: Option<Date>,
    /// Keep transactions for this account only.
    #[serde(default)]
    pub account_id: Option<AccountId>,
    /// Keep transactions for this category only.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// A route handler for listing the caller's transactions, newest date first.
pub async fn get_transactions_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let filter = TransactionFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        account_id: query.account_id,
        category_id: query.category_id,
    };

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_transactions(claims.user_id, &filter, &connection).map(Json)
}

/// A route handler for recording a transaction, responds with 201 CREATED.
///
/// The account balance is adjusted in the same atomic unit as the insert.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Json(data): Json<TransactionData>,
) -> Result<impl IntoResponse, Error> {
    let data = data.validate()?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = create_transaction(claims.user_id, &data, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for replacing a transaction's fields.
///
/// The old effect is reversed and the new effect applied in one atomic unit,
/// so the balances come out as if the transaction had been deleted and
/// recreated with the new fields.
pub async fn update_transaction_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(transaction_id): Path<TransactionId>,
    Json(data): Json<TransactionData>,
) -> Result<Json<Transaction>, Error> {
    let data = data.validate()?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    update_transaction(transaction_id, claims.user_id, &data, &connection).map(Json)
}

/// A route handler for deleting a transaction and reversing its effect on the
/// account balance.
pub async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(transaction_id): Path<TransactionId>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_transaction(transaction_id, claims.user_id, &connection)?;

    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}

#[cfg(test)]
mod transaction_endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        account::Account,
        category::Category,
        endpoints::{self, format_endpoint},
        test_utils::{create_app_with_user, register_user_with_email},
        transaction::core::Transaction,
    };

    async fn create_account(server: &TestServer, token: &str, balance: f64) -> Account {
        let response = server
            .post(endpoints::ACCOUNTS)
            .authorization_bearer(token)
            .json(&json!({ "name": "Checking", "kind": "bank", "balance": balance }))
            .await;
        response.assert_status(StatusCode::CREATED);

        response.json::<Account>()
    }

    async fn create_category(server: &TestServer, token: &str, kind: &str) -> Category {
        let response = server
            .post(endpoints::CATEGORIES)
            .authorization_bearer(token)
            .json(&json!({ "name": "Groceries", "kind": kind }))
            .await;
        response.assert_status(StatusCode::CREATED);

        response.json::<Category>()
    }

    async fn account_balance(server: &TestServer, token: &str, account_id: i64) -> f64 {
        server
            .get(endpoints::ACCOUNTS)
            .authorization_bearer(token)
            .await
            .json::<Vec<Account>>()
            .into_iter()
            .find(|account| account.id == account_id)
            .map(|account| account.balance as f64 / 100.0)
            .expect("account not in listing")
    }

    #[tokio::test]
    async fn full_create_update_delete_scenario() {
        let (server, _, token) = create_app_with_user().await;
        let account = create_account(&server, &token, 500.0).await;
        let category = create_category(&server, &token, "expense").await;

        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .json(&json!({
                "account_id": account.id,
                "category_id": category.id,
                "amount": 50.0,
                "kind": "expense",
                "date": "2025-06-15",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let transaction = response.json::<Transaction>();
        assert_eq!(account_balance(&server, &token, account.id).await, 450.0);

        server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(&token)
            .json(&json!({
                "account_id": account.id,
                "category_id": category.id,
                "amount": 50.0,
                "kind": "income",
                "date": "2025-06-15",
            }))
            .await
            .assert_status_ok();
        assert_eq!(account_balance(&server, &token, account.id).await, 550.0);

        server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(&token)
            .await
            .assert_status_ok();
        assert_eq!(account_balance(&server, &token, account.id).await, 500.0);
    }

    #[tokio::test]
    async fn create_rejects_non_positive_amounts() {
        let (server, _, token) = create_app_with_user().await;
        let account = create_account(&server, &token, 100.0).await;
        let category = create_category(&server, &token, "expense").await;

        for amount in [0.0, -12.5] {
            server
                .post(endpoints::TRANSACTIONS)
                .authorization_bearer(&token)
                .json(&json!({
                    "account_id": account.id,
                    "category_id": category.id,
                    "amount": amount,
                    "kind": "expense",
                    "date": "2025-06-15",
                }))
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }

        assert_eq!(account_balance(&server, &token, account.id).await, 100.0);
    }

    #[tokio::test]
    async fn create_with_unknown_account_is_not_found() {
        let (server, _, token) = create_app_with_user().await;
        let category = create_category(&server, &token, "expense").await;

        server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .json(&json!({
                "account_id": 999,
                "category_id": category.id,
                "amount": 10.0,
                "kind": "expense",
                "date": "2025-06-15",
            }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_of_another_users_transaction_is_not_found() {
        let (server, _, token) = create_app_with_user().await;
        let account = create_account(&server, &token, 100.0).await;
        let category = create_category(&server, &token, "expense").await;

        let transaction = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .json(&json!({
                "account_id": account.id,
                "category_id": category.id,
                "amount": 10.0,
                "kind": "expense",
                "date": "2025-06-15",
            }))
            .await
            .json::<Transaction>();

        let (_, other_token) = register_user_with_email(&server, "other@test.com").await;

        server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(&other_token)
            .json(&json!({
                "account_id": account.id,
                "category_id": category.id,
                "amount": 99.0,
                "kind": "income",
                "date": "2025-06-15",
            }))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        assert_eq!(account_balance(&server, &token, account.id).await, 90.0);
    }

    #[tokio::test]
    async fn account_with_transactions_cannot_be_deleted() {
        let (server, _, token) = create_app_with_user().await;
        let account = create_account(&server, &token, 100.0).await;
        let category = create_category(&server, &token, "expense").await;

        server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .json(&json!({
                "account_id": account.id,
                "category_id": category.id,
                "amount": 10.0,
                "kind": "expense",
                "date": "2025-06-15",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .delete(&format_endpoint(endpoints::ACCOUNT, account.id))
            .authorization_bearer(&token)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(account_balance(&server, &token, account.id).await, 90.0);
    }

    #[tokio::test]
    async fn list_filters_by_date_range() {
        let (server, _, token) = create_app_with_user().await;
        let account = create_account(&server, &token, 1000.0).await;
        let category = create_category(&server, &token, "expense").await;

        for date in ["2025-01-10", "2025-02-10", "2025-03-10"] {
            server
                .post(endpoints::TRANSACTIONS)
                .authorization_bearer(&token)
                .json(&json!({
                    "account_id": account.id,
                    "category_id": category.id,
                    "amount": 5.0,
                    "kind": "expense",
                    "date": date,
                }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let transactions = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .add_query_param("start_date", "2025-02-01")
            .add_query_param("end_date", "2025-02-28")
            .await
            .json::<Vec<Transaction>>();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].date.to_string(), "2025-02-10");
    }
}
