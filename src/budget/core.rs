//! Defines the budget model, its database table and queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, category::CategoryId, money::Cents, user::UserID};

/// The id of a budget row.
pub type BudgetId = i64;

/// The recurrence a budget's limit is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// A limit for one month.
    Monthly,
    /// A limit for one year.
    Yearly,
}

impl BudgetPeriod {
    /// The text stored in the database for this period.
    pub fn as_str(self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }

    /// Parse the text stored in the database.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "monthly" => Some(BudgetPeriod::Monthly),
            "yearly" => Some(BudgetPeriod::Yearly),
            _ => None,
        }
    }
}

/// A spending limit for a category over a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The ID of the user that owns the budget.
    pub user_id: UserID,
    /// The ID of the category the budget limits.
    pub category_id: CategoryId,
    /// The spending limit in cents. May be zero, never negative.
    #[serde(with = "crate::money::as_dollars")]
    pub amount: Cents,
    /// The recurrence the limit is meant for.
    pub period: BudgetPeriod,
    /// The first day of the budget window, inclusive.
    pub start_date: Date,
    /// The last day of the budget window, inclusive.
    pub end_date: Date,
    /// When the budget was created.
    pub created_at: OffsetDateTime,
}

/// The validated fields for creating or replacing a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The ID of the category the budget limits.
    pub category_id: CategoryId,
    /// The spending limit in cents.
    pub amount: Cents,
    /// The recurrence the limit is meant for.
    pub period: BudgetPeriod,
    /// The first day of the budget window, inclusive.
    pub start_date: Date,
    /// The last day of the budget window, inclusive.
    pub end_date: Date,
}

/// Create the budget table.
///
/// # Errors
/// Returns an error if the SQL query fails.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                amount INTEGER NOT NULL,
                period TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id)
                )",
        (),
    )?;

    Ok(())
}

/// Create a budget owned by `user_id` and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidDateRange] if the window ends before it starts,
/// - [Error::NotFound] if the category does not exist or is not owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(
    user_id: UserID,
    budget: &NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    validate_window(budget)?;
    verify_category(budget.category_id, user_id, connection)?;

    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO budget (user_id, category_id, amount, period, start_date, end_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            user_id.as_i64(),
            budget.category_id,
            budget.amount,
            budget.period.as_str(),
            budget.start_date,
            budget.end_date,
            created_at,
        ),
    )?;

    Ok(Budget {
        id: connection.last_insert_rowid(),
        user_id,
        category_id: budget.category_id,
        amount: budget.amount,
        period: budget.period,
        start_date: budget.start_date,
        end_date: budget.end_date,
        created_at,
    })
}

/// Retrieve a budget by ID, scoped to its owner.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a budget owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_budget(id: BudgetId, user_id: UserID, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_id, amount, period, start_date, end_date, created_at
             FROM budget
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_budget_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all budgets owned by `user_id` with their category names, most
/// recently created first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_budgets(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<(Budget, String)>, Error> {
    connection
        .prepare(
            "SELECT b.id, b.user_id, b.category_id, b.amount, b.period, b.start_date,
                    b.end_date, b.created_at, c.name
             FROM budget b
             JOIN category c ON c.id = b.category_id
             WHERE b.user_id = :user_id
             ORDER BY b.created_at DESC, b.id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| {
            let budget = map_budget_row(row)?;
            let category_name: String = row.get(8)?;
            Ok((budget, category_name))
        })?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Like [get_budgets], but keeps only budgets whose window has not ended
/// before `today`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_active_budgets(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<(Budget, String)>, Error> {
    connection
        .prepare(
            "SELECT b.id, b.user_id, b.category_id, b.amount, b.period, b.start_date,
                    b.end_date, b.created_at, c.name
             FROM budget b
             JOIN category c ON c.id = b.category_id
             WHERE b.user_id = :user_id AND b.end_date >= :today
             ORDER BY b.created_at DESC, b.id DESC",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64() as &dyn rusqlite::ToSql),
                (":today", &today),
            ],
            |row| {
                let budget = map_budget_row(row)?;
                let category_name: String = row.get(8)?;
                Ok((budget, category_name))
            },
        )?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Replace a budget's fields.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidDateRange] if the window ends before it starts,
/// - [Error::NotFound] if the new category is missing or not owned by `user_id`,
/// - [Error::UpdateMissingBudget] if `id` does not refer to a budget owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    id: BudgetId,
    user_id: UserID,
    budget: &NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    validate_window(budget)?;
    verify_category(budget.category_id, user_id, connection)?;

    let rows_affected = connection.execute(
        "UPDATE budget
         SET category_id = ?1, amount = ?2, period = ?3, start_date = ?4, end_date = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            budget.category_id,
            budget.amount,
            budget.period.as_str(),
            budget.start_date,
            budget.end_date,
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    get_budget(id, user_id, connection)
}

/// Delete a budget.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBudget] if `id` does not refer to a budget owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(id: BudgetId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Sum the caller's expense transactions for `category_id` dated within the
/// inclusive window. An empty window sums to zero.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn current_spending(
    user_id: UserID,
    category_id: CategoryId,
    start_date: Date,
    end_date: Date,
    connection: &Connection,
) -> Result<Cents, Error> {
    connection
        .prepare(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
             WHERE user_id = :user_id
               AND category_id = :category_id
               AND kind = 'expense'
               AND date BETWEEN :start_date AND :end_date",
        )?
        .query_row(
            &[
                (":user_id", &user_id.as_i64() as &dyn rusqlite::ToSql),
                (":category_id", &category_id),
                (":start_date", &start_date),
                (":end_date", &end_date),
            ],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

fn validate_window(budget: &NewBudget) -> Result<(), Error> {
    if budget.end_date < budget.start_date {
        return Err(Error::InvalidDateRange);
    }

    Ok(())
}

fn verify_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    connection
        .prepare("SELECT id FROM category WHERE id = :id AND user_id = :user_id")?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            |row| row.get::<_, i64>(0),
        )
        .map_err(Error::from)?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let category_id = row.get(2)?;
    let amount = row.get(3)?;
    let raw_period: String = row.get(4)?;
    let period = BudgetPeriod::parse(&raw_period).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown budget period: {raw_period}").into(),
        )
    })?;
    let start_date = row.get(5)?;
    let end_date = row.get(6)?;
    let created_at = row.get(7)?;

    Ok(Budget {
        id,
        user_id,
        category_id,
        amount,
        period,
        start_date,
        end_date,
        created_at,
    })
}
