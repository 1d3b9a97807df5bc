//! Defines the account model, its database table and queries.
//!
//! An account's `balance` column is denormalized: it always equals the
//! account's initial balance plus the signed sum of its transactions. Only
//! [crate::transaction] mutates it after creation, so the update query here
//! deliberately leaves the balance untouched.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, money::Cents, user::UserID};

/// The id of an account row.
pub type AccountId = i64;

/// The kind of money store an account represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    /// A bank account.
    #[serde(rename = "bank")]
    Bank,
    /// A mobile money wallet.
    #[serde(rename = "mobile money")]
    MobileMoney,
    /// Physical cash.
    #[serde(rename = "cash")]
    Cash,
    /// Anything else.
    #[serde(rename = "other")]
    Other,
}

impl AccountKind {
    /// The text stored in the database for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            AccountKind::Bank => "bank",
            AccountKind::MobileMoney => "mobile money",
            AccountKind::Cash => "cash",
            AccountKind::Other => "other",
        }
    }

    /// Parse the text stored in the database.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "bank" => Some(AccountKind::Bank),
            "mobile money" => Some(AccountKind::MobileMoney),
            "cash" => Some(AccountKind::Cash),
            "other" => Some(AccountKind::Other),
            _ => None,
        }
    }
}

/// A place the user keeps money, e.g. a bank account or a cash box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the account.
    pub id: AccountId,
    /// The ID of the user that owns the account.
    pub user_id: UserID,
    /// The display name of the account.
    pub name: String,
    /// What kind of money store the account is.
    pub kind: AccountKind,
    /// The current balance. Kept consistent with the transaction history by
    /// the ledger updater in [crate::transaction].
    #[serde(with = "crate::money::as_dollars")]
    pub balance: Cents,
    /// When the account was created.
    pub created_at: OffsetDateTime,
}

/// The validated fields for creating an account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    /// The display name of the account.
    pub name: String,
    /// What kind of money store the account is.
    pub kind: AccountKind,
    /// The starting balance in cents.
    pub balance: Cents,
}

/// Create the account table.
///
/// # Errors
/// Returns an error if the SQL query fails.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                balance INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create an account owned by `user_id` and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyName] if the account name is blank,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_account(
    user_id: UserID,
    account: &NewAccount,
    connection: &Connection,
) -> Result<Account, Error> {
    if account.name.trim().is_empty() {
        return Err(Error::EmptyName);
    }

    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO account (user_id, name, kind, balance, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            user_id.as_i64(),
            &account.name,
            account.kind.as_str(),
            account.balance,
            created_at,
        ),
    )?;

    Ok(Account {
        id: connection.last_insert_rowid(),
        user_id,
        name: account.name.clone(),
        kind: account.kind,
        balance: account.balance,
        created_at,
    })
}

/// Retrieve an account by ID, scoped to its owner.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an account owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_account(id: AccountId, user_id: UserID, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, kind, balance, created_at FROM account
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_account_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all accounts owned by `user_id`, most recently created first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, kind, balance, created_at FROM account
             WHERE user_id = :user_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_account_row)?
        .map(|maybe_account| maybe_account.map_err(|error| error.into()))
        .collect()
}

/// Update an account's name and kind.
///
/// The balance is deliberately not updatable here: it only changes through
/// the ledger updater so it cannot drift from the transaction history.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyName] if the new name is blank,
/// - [Error::UpdateMissingAccount] if `id` does not refer to an account owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_account(
    id: AccountId,
    user_id: UserID,
    name: &str,
    kind: AccountKind,
    connection: &Connection,
) -> Result<Account, Error> {
    if name.trim().is_empty() {
        return Err(Error::EmptyName);
    }

    let rows_affected = connection.execute(
        "UPDATE account SET name = ?1, kind = ?2 WHERE id = ?3 AND user_id = ?4",
        (name, kind.as_str(), id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAccount);
    }

    get_account(id, user_id, connection)
}

/// Delete an account that has no transactions referencing it.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingAccount] if `id` does not refer to an account owned by `user_id`,
/// - [Error::AccountInUse] if any transaction still references the account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_account(id: AccountId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    // Ownership first: a non-owner gets the same 404 as a missing id and
    // never reaches the referential guard.
    get_account(id, user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingAccount,
        error => error,
    })?;

    let transaction_count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM \"transaction\" WHERE account_id = :account_id",
        &[(":account_id", &id)],
        |row| row.get(0),
    )?;

    if transaction_count > 0 {
        return Err(Error::AccountInUse);
    }

    connection.execute(
        "DELETE FROM account WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    Ok(())
}

fn map_account_row(row: &Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let name = row.get(2)?;
    let raw_kind: String = row.get(3)?;
    let kind = AccountKind::parse(&raw_kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown account kind: {raw_kind}").into(),
        )
    })?;
    let balance = row.get(4)?;
    let created_at = row.get(5)?;

    Ok(Account {
        id,
        user_id,
        name,
        kind,
        balance,
        created_at,
    })
}
