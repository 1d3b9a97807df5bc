//! Defines the JSON endpoints for account CRUD.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error,
    account::core::{
        Account, AccountId, AccountKind, NewAccount, create_account, delete_account, get_accounts,
        update_account,
    },
    auth::Claims,
    money::cents_from_dollars,
};

/// The expected fields for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountData {
    /// The display name of the account.
    pub name: String,
    /// What kind of money store the account is.
    pub kind: AccountKind,
    /// The starting balance in dollars. Defaults to zero.
    #[serde(default)]
    pub balance: f64,
}

/// The expected fields for updating an account.
///
/// The balance is absent on purpose: it only changes through transactions.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountData {
    /// The new display name.
    pub name: String,
    /// The new account kind.
    pub kind: AccountKind,
}

/// A route handler for listing the caller's accounts, most recent first.
pub async fn get_accounts_endpoint(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<Account>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_accounts(claims.user_id, &connection).map(Json)
}

/// A route handler for creating an account, responds with 201 CREATED and the
/// new account.
pub async fn create_account_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Json(data): Json<CreateAccountData>,
) -> Result<impl IntoResponse, Error> {
    let account = NewAccount {
        name: data.name,
        kind: data.kind,
        balance: cents_from_dollars(data.balance)?,
    };

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let account = create_account(claims.user_id, &account, &connection)?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// A route handler for renaming an account or changing its kind.
pub async fn update_account_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(account_id): Path<AccountId>,
    Json(data): Json<UpdateAccountData>,
) -> Result<Json<Account>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    update_account(account_id, claims.user_id, &data.name, data.kind, &connection).map(Json)
}

/// A route handler for deleting an account.
///
/// Deletion is refused with 400 BAD REQUEST while any transaction still
/// references the account.
pub async fn delete_account_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(account_id): Path<AccountId>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_account(account_id, claims.user_id, &connection)?;

    Ok(Json(json!({ "message": "Account deleted successfully" })))
}

#[cfg(test)]
mod account_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        account::core::Account,
        endpoints::{self, format_endpoint},
        test_utils::{create_app_with_user, register_user_with_email},
    };

    #[tokio::test]
    async fn create_and_list_accounts() {
        let (server, _, token) = create_app_with_user().await;

        let response = server
            .post(endpoints::ACCOUNTS)
            .authorization_bearer(&token)
            .json(&json!({
                "name": "Checking",
                "kind": "bank",
                "balance": 500.0,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);

        let account = response.json::<Account>();
        assert_eq!(account.name, "Checking");
        assert_eq!(account.balance, 50_000);

        let accounts = server
            .get(endpoints::ACCOUNTS)
            .authorization_bearer(&token)
            .await
            .json::<Vec<Account>>();

        assert_eq!(accounts, vec![account]);
    }

    #[tokio::test]
    async fn create_account_defaults_balance_to_zero() {
        let (server, _, token) = create_app_with_user().await;

        let response = server
            .post(endpoints::ACCOUNTS)
            .authorization_bearer(&token)
            .json(&json!({
                "name": "Cash box",
                "kind": "cash",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Account>().balance, 0);
    }

    #[tokio::test]
    async fn listing_accounts_requires_auth() {
        let (server, _, _) = create_app_with_user().await;

        server
            .get(endpoints::ACCOUNTS)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn update_account_ignores_other_users() {
        let (server, _, token) = create_app_with_user().await;
        let (_, other_token) = register_user_with_email(&server, "other@test.com").await;

        let account = server
            .post(endpoints::ACCOUNTS)
            .authorization_bearer(&token)
            .json(&json!({ "name": "Checking", "kind": "bank" }))
            .await
            .json::<Account>();

        server
            .put(&format_endpoint(endpoints::ACCOUNT, account.id))
            .authorization_bearer(&other_token)
            .json(&json!({ "name": "Hijacked", "kind": "other" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_account_changes_name() {
        let (server, _, token) = create_app_with_user().await;

        let account = server
            .post(endpoints::ACCOUNTS)
            .authorization_bearer(&token)
            .json(&json!({ "name": "Checking", "kind": "bank", "balance": 10.0 }))
            .await
            .json::<Account>();

        let response = server
            .put(&format_endpoint(endpoints::ACCOUNT, account.id))
            .authorization_bearer(&token)
            .json(&json!({ "name": "Everyday", "kind": "bank" }))
            .await;

        response.assert_status_ok();

        let updated = response.json::<Account>();
        assert_eq!(updated.name, "Everyday");
        assert_eq!(updated.balance, account.balance);
    }

    #[tokio::test]
    async fn delete_account_succeeds() {
        let (server, _, token) = create_app_with_user().await;

        let account = server
            .post(endpoints::ACCOUNTS)
            .authorization_bearer(&token)
            .json(&json!({ "name": "Checking", "kind": "bank" }))
            .await
            .json::<Account>();

        server
            .delete(&format_endpoint(endpoints::ACCOUNT, account.id))
            .authorization_bearer(&token)
            .await
            .assert_status_ok();

        let accounts = server
            .get(endpoints::ACCOUNTS)
            .authorization_bearer(&token)
            .await
            .json::<Vec<Account>>();

        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_account_is_not_found() {
        let (server, _, token) = create_app_with_user().await;

        server
            .delete(&format_endpoint(endpoints::ACCOUNT, 999))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
