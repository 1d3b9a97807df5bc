//! Defines the transaction model, its database table and read queries.
//!
//! Writes go through [crate::transaction::ledger], which pairs every row
//! mutation with the matching account balance adjustment.

use rusqlite::{Connection, Row, ToSql, params_from_iter};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    account::AccountId,
    category::{CategoryId, SubcategoryId},
    money::Cents,
    user::UserID,
};

/// The id of a transaction row.
pub type TransactionId = i64;

/// Whether a transaction is money coming in or going out.
///
/// The kind determines the sign of the transaction's effect on its account
/// balance; the stored amount is always a positive magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in, increases the account balance.
    Income,
    /// Money going out, decreases the account balance.
    Expense,
}

impl TransactionKind {
    /// The text stored in the database for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Parse the text stored in the database.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

/// An event where money was spent or earned against an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user that owns the transaction.
    pub user_id: UserID,
    /// The ID of the account the money moved through.
    pub account_id: AccountId,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The ID of the subcategory, if any.
    pub subcategory_id: Option<SubcategoryId>,
    /// The magnitude of the transaction in cents, always positive.
    #[serde(with = "crate::money::as_dollars")]
    pub amount: Cents,
    /// Whether the money came in or went out.
    pub kind: TransactionKind,
    /// A free-text note about the transaction.
    pub description: Option<String>,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

/// The validated fields for creating or replacing a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The ID of the account the money moved through.
    pub account_id: AccountId,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The ID of the subcategory, if any.
    pub subcategory_id: Option<SubcategoryId>,
    /// The magnitude of the transaction in cents, always positive.
    pub amount: Cents,
    /// Whether the money came in or went out.
    pub kind: TransactionKind,
    /// A free-text note about the transaction.
    pub description: Option<String>,
    /// When the transaction happened.
    pub date: Date,
}

/// Optional filters for listing transactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Keep transactions dated on or after this date.
    pub start_date: Option<Date>,
    /// Keep transactions dated on or before this date.
    pub end_date: Option<Date>,
    /// Keep transactions for this account only.
    pub account_id: Option<AccountId>,
    /// Keep transactions for this category only.
    pub category_id: Option<CategoryId>,
}

/// Create the transaction table.
///
/// # Errors
/// Returns an error if the SQL query fails.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                account_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                subcategory_id INTEGER,
                amount INTEGER NOT NULL,
                kind TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
                FOREIGN KEY(account_id) REFERENCES account(id),
                FOREIGN KEY(category_id) REFERENCES category(id),
                FOREIGN KEY(subcategory_id) REFERENCES subcategory(id) ON DELETE SET NULL
                )",
        (),
    )?;

    // Covers the budget evaluator's category + date window aggregation.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_category_date
         ON \"transaction\"(user_id, category_id, date)",
        (),
    )?;

    Ok(())
}

/// Retrieve a transaction by ID, scoped to its owner.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, account_id, category_id, subcategory_id, amount, kind,
                    description, date, created_at
             FROM \"transaction\"
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve the caller's transactions matching `filter`, newest date first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut sql = String::from(
        "SELECT id, user_id, account_id, category_id, subcategory_id, amount, kind,
                description, date, created_at
         FROM \"transaction\"
         WHERE user_id = ?1",
    );
    let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.as_i64())];

    if let Some(start_date) = filter.start_date {
        params.push(Box::new(start_date));
        sql.push_str(&format!(" AND date >= ?{}", params.len()));
    }

    if let Some(end_date) = filter.end_date {
        params.push(Box::new(end_date));
        sql.push_str(&format!(" AND date <= ?{}", params.len()));
    }

    if let Some(account_id) = filter.account_id {
        params.push(Box::new(account_id));
        sql.push_str(&format!(" AND account_id = ?{}", params.len()));
    }

    if let Some(category_id) = filter.category_id {
        params.push(Box::new(category_id));
        sql.push_str(&format!(" AND category_id = ?{}", params.len()));
    }

    sql.push_str(" ORDER BY date DESC, id DESC");

    connection
        .prepare(&sql)?
        .query_map(
            params_from_iter(params.iter().map(|param| param.as_ref())),
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let account_id = row.get(2)?;
    let category_id = row.get(3)?;
    let subcategory_id = row.get(4)?;
    let amount = row.get(5)?;
    let raw_kind: String = row.get(6)?;
    let kind = TransactionKind::parse(&raw_kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Text,
            format!("unknown transaction kind: {raw_kind}").into(),
        )
    })?;
    let description = row.get(7)?;
    let date = row.get(8)?;
    let created_at = row.get(9)?;

    Ok(Transaction {
        id,
        user_id,
        account_id,
        category_id,
        subcategory_id,
        amount,
        kind,
        description,
        date,
        created_at,
    })
}
