//! The budget status evaluator.
//!
//! Classifies each budget's spending against its limit. The thresholds are
//! compared in integer cents so a budget sitting exactly on a boundary never
//! flips due to float rounding.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    budget::core::{Budget, current_spending, get_active_budgets, get_budgets},
    money::Cents,
    user::UserID,
};

/// How a budget's spending compares to its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetHealth {
    /// Spending is below 80% of the limit.
    #[serde(rename = "OK")]
    Ok,
    /// Spending has reached 80% of the limit but not the limit itself.
    #[serde(rename = "WARNING")]
    Warning,
    /// Spending has reached or passed the limit.
    #[serde(rename = "EXCEEDED")]
    Exceeded,
}

/// A budget annotated with the spending recorded against it so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    #[serde(flatten)]
    pub budget: Budget,
    /// The name of the category the budget limits.
    pub category_name: String,
    /// The expense total for the budget's category within its window.
    #[serde(with = "crate::money::as_dollars")]
    pub current_spending: Cents,
}

/// A budget annotated with spending, usage percentage and health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    #[serde(flatten)]
    pub budget: Budget,
    /// The name of the category the budget limits.
    pub category_name: String,
    /// The expense total for the budget's category within its window.
    #[serde(with = "crate::money::as_dollars")]
    pub current_spending: Cents,
    /// Spending as a percentage of the limit. 100.0 for a zero limit.
    pub percentage_used: f64,
    /// The classification of the spending against the limit.
    pub status: BudgetHealth,
}

/// Classify `spending` against `limit`.
///
/// A zero limit is exceeded by definition, including with zero spending.
pub fn classify(spending: Cents, limit: Cents) -> BudgetHealth {
    if limit == 0 || spending >= limit {
        BudgetHealth::Exceeded
    } else if spending * 10 >= limit * 8 {
        BudgetHealth::Warning
    } else {
        BudgetHealth::Ok
    }
}

/// Spending as a percentage of the limit, 100.0 when the limit is zero.
pub fn percentage_used(spending: Cents, limit: Cents) -> f64 {
    if limit == 0 {
        100.0
    } else {
        spending as f64 / limit as f64 * 100.0
    }
}

/// Retrieve all of the caller's budgets with their current spending, most
/// recently created first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_budget_summaries(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<BudgetSummary>, Error> {
    get_budgets(user_id, connection)?
        .into_iter()
        .map(|(budget, category_name)| {
            let spending = current_spending(
                user_id,
                budget.category_id,
                budget.start_date,
                budget.end_date,
                connection,
            )?;

            Ok(BudgetSummary {
                budget,
                category_name,
                current_spending: spending,
            })
        })
        .collect()
}

/// Evaluate the caller's budgets whose window has not ended before `today`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_budget_statuses(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<BudgetStatus>, Error> {
    get_active_budgets(user_id, today, connection)?
        .into_iter()
        .map(|(budget, category_name)| {
            let spending = current_spending(
                user_id,
                budget.category_id,
                budget.start_date,
                budget.end_date,
                connection,
            )?;

            Ok(BudgetStatus {
                category_name,
                current_spending: spending,
                percentage_used: percentage_used(spending, budget.amount),
                status: classify(spending, budget.amount),
                budget,
            })
        })
        .collect()
}

/// Today's date in UTC, the reference point for active budget windows.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}


#[cfg(test)]
mod evaluator_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        account::{AccountKind, NewAccount, create_account},
        budget::core::{BudgetPeriod, NewBudget, create_budget},
        category::{CategoryKind, create_category},
        db::initialize,
        test_utils::create_test_user,
        transaction::{NewTransaction, TransactionKind, create_transaction},
    };

    use super::{BudgetHealth, get_budget_statuses, get_budget_summaries};

    #[test]
    fn statuses_combine_spending_percentage_and_health() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = create_test_user(&connection);
        let category =
            create_category(user_id, "Groceries", CategoryKind::Expense, &connection).unwrap();
        let account = create_account(
            user_id,
            &NewAccount {
                name: "Checking".to_owned(),
                kind: AccountKind::Bank,
                balance: 100_000,
            },
            &connection,
        )
        .unwrap();
        create_budget(
            user_id,
            &NewBudget {
                category_id: category.id,
                amount: 10_000,
                period: BudgetPeriod::Monthly,
                start_date: date!(2025 - 06 - 01),
                end_date: date!(2025 - 06 - 30),
            },
            &connection,
        )
        .unwrap();
        create_transaction(
            user_id,
            &NewTransaction {
                account_id: account.id,
                category_id: category.id,
                subcategory_id: None,
                amount: 8_500,
                kind: TransactionKind::Expense,
                description: None,
                date: date!(2025 - 06 - 10),
            },
            &connection,
        )
        .unwrap();

        let statuses =
            get_budget_statuses(user_id, date!(2025 - 06 - 15), &connection).unwrap();

        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].current_spending, 8_500);
        assert_eq!(statuses[0].percentage_used, 85.0);
        assert_eq!(statuses[0].status, BudgetHealth::Warning);
    }

    #[test]
    fn statuses_skip_ended_budgets_but_summaries_keep_them() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user_id = create_test_user(&connection);
        let category =
            create_category(user_id, "Groceries", CategoryKind::Expense, &connection).unwrap();
        create_budget(
            user_id,
            &NewBudget {
                category_id: category.id,
                amount: 10_000,
                period: BudgetPeriod::Monthly,
                start_date: date!(2025 - 05 - 01),
                end_date: date!(2025 - 05 - 31),
            },
            &connection,
        )
        .unwrap();

        let statuses =
            get_budget_statuses(user_id, date!(2025 - 06 - 15), &connection).unwrap();
        assert!(statuses.is_empty());

        let summaries = get_budget_summaries(user_id, &connection).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].current_spending, 0);
    }
}
