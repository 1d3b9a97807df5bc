//! The report queries: on-demand aggregations over the transaction history.
//!
//! Nothing here is persisted, every report is computed from the transaction
//! table at request time.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{Error, category::CategoryId, money::Cents, user::UserID};

/// Income, expense and savings totals for one date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// The sum of income transactions in the window.
    #[serde(with = "crate::money::as_dollars")]
    pub total_income: Cents,
    /// The sum of expense transactions in the window.
    #[serde(with = "crate::money::as_dollars")]
    pub total_expenses: Cents,
    /// Income minus expenses. Negative when more was spent than earned.
    #[serde(with = "crate::money::as_dollars")]
    pub net_savings: Cents,
}

/// Per-category totals over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdownEntry {
    /// The name of the category.
    pub category_name: String,
    /// The sum of the category's transactions in the range.
    #[serde(with = "crate::money::as_dollars")]
    pub total_amount: Cents,
    /// How many transactions the category had in the range.
    pub transaction_count: i64,
}

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowEntry {
    /// The calendar month in `YYYY-MM` form.
    pub month: String,
    /// The sum of the month's income transactions.
    #[serde(with = "crate::money::as_dollars")]
    pub income: Cents,
    /// The sum of the month's expense transactions.
    #[serde(with = "crate::money::as_dollars")]
    pub expenses: Cents,
    /// Income minus expenses for the month.
    #[serde(with = "crate::money::as_dollars")]
    pub net_flow: Cents,
}

/// One slice of the expense distribution pie chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSlice {
    /// The ID of the category.
    pub id: CategoryId,
    /// The name of the category.
    pub label: String,
    /// The sum of the category's expenses.
    #[serde(with = "crate::money::as_dollars")]
    pub value: Cents,
}

/// One bar pair of the budgeted versus actual chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetComparisonEntry {
    /// The name of the budgeted category.
    pub category: String,
    /// The budget's limit.
    #[serde(with = "crate::money::as_dollars")]
    pub budgeted: Cents,
    /// The expenses recorded from the budget's start up to today.
    #[serde(with = "crate::money::as_dollars")]
    pub actual: Cents,
}

/// One cell of the spending heatmap: a day and its expense total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    /// The day the expenses were dated.
    pub date: Date,
    /// The sum of the day's expenses.
    #[serde(with = "crate::money::as_dollars")]
    pub value: Cents,
}

/// The first and last day of `month` in `year`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidMonth] if `month` is outside 1-12,
/// - or [Error::InvalidYear] if `year` is outside the supported calendar range.
pub fn month_bounds(year: i32, month: u8) -> Result<(Date, Date), Error> {
    let month = Month::try_from(month).map_err(|_| Error::InvalidMonth(month))?;
    let first = Date::from_calendar_date(year, month, 1).map_err(|_| Error::InvalidYear(year))?;
    let last = Date::from_calendar_date(year, month, month.length(year))
        .map_err(|_| Error::InvalidYear(year))?;

    Ok((first, last))
}

/// The date `months` calendar months before `today`, with the day clamped to
/// the target month's length.
///
/// # Errors
/// This function will return a [Error::InvalidYear] if the shift leaves the
/// supported calendar range.
pub fn months_before(today: Date, months: u32) -> Result<Date, Error> {
    let month_index = today.year() as i64 * 12 + (today.month() as i64 - 1) - months as i64;
    let year = month_index.div_euclid(12) as i32;
    let month_number = (month_index.rem_euclid(12) + 1) as u8;
    let month = Month::try_from(month_number).map_err(|_| Error::InvalidMonth(month_number))?;
    let day = today.day().min(month.length(year));

    Date::from_calendar_date(year, month, day).map_err(|_| Error::InvalidYear(year))
}

/// Sum the caller's income and expenses dated within the inclusive window.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn monthly_summary(
    user_id: UserID,
    start_date: Date,
    end_date: Date,
    connection: &Connection,
) -> Result<MonthlySummary, Error> {
    let (total_income, total_expenses) = connection
        .prepare(
            "SELECT
                COALESCE(SUM(CASE WHEN kind = 'income' THEN amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount ELSE 0 END), 0)
             FROM \"transaction\"
             WHERE user_id = :user_id AND date BETWEEN :start_date AND :end_date",
        )?
        .query_row(
            &[
                (":user_id", &user_id.as_i64() as &dyn rusqlite::ToSql),
                (":start_date", &start_date),
                (":end_date", &end_date),
            ],
            |row| Ok((row.get::<_, Cents>(0)?, row.get::<_, Cents>(1)?)),
        )?;

    Ok(MonthlySummary {
        total_income,
        total_expenses,
        net_savings: total_income - total_expenses,
    })
}

/// Group the caller's transactions in the inclusive window by category, with
/// totals and counts, largest total first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn category_breakdown(
    user_id: UserID,
    start_date: Date,
    end_date: Date,
    connection: &Connection,
) -> Result<Vec<CategoryBreakdownEntry>, Error> {
    connection
        .prepare(
            "SELECT c.name, SUM(t.amount), COUNT(*)
             FROM \"transaction\" t
             JOIN category c ON c.id = t.category_id
             WHERE t.user_id = :user_id AND t.date BETWEEN :start_date AND :end_date
             GROUP BY t.category_id
             ORDER BY SUM(t.amount) DESC, c.name ASC",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64() as &dyn rusqlite::ToSql),
                (":start_date", &start_date),
                (":end_date", &end_date),
            ],
            |row| {
                Ok(CategoryBreakdownEntry {
                    category_name: row.get(0)?,
                    total_amount: row.get(1)?,
                    transaction_count: row.get(2)?,
                })
            },
        )?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Group the caller's transactions in the inclusive window by calendar month,
/// earliest month first. Months with no transactions are absent.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn cash_flow(
    user_id: UserID,
    start_date: Date,
    end_date: Date,
    connection: &Connection,
) -> Result<Vec<CashFlowEntry>, Error> {
    connection
        .prepare(
            "SELECT strftime('%Y-%m', date),
                COALESCE(SUM(CASE WHEN kind = 'income' THEN amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount ELSE 0 END), 0)
             FROM \"transaction\"
             WHERE user_id = :user_id AND date BETWEEN :start_date AND :end_date
             GROUP BY strftime('%Y-%m', date)
             ORDER BY strftime('%Y-%m', date) ASC",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64() as &dyn rusqlite::ToSql),
                (":start_date", &start_date),
                (":end_date", &end_date),
            ],
            |row| {
                let income: Cents = row.get(1)?;
                let expenses: Cents = row.get(2)?;

                Ok(CashFlowEntry {
                    month: row.get(0)?,
                    income,
                    expenses,
                    net_flow: income - expenses,
                })
            },
        )?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Sum the caller's expenses in the inclusive window per category, largest
/// slice first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn expense_distribution(
    user_id: UserID,
    start_date: Date,
    end_date: Date,
    connection: &Connection,
) -> Result<Vec<ExpenseSlice>, Error> {
    connection
        .prepare(
            "SELECT t.category_id, c.name, SUM(t.amount)
             FROM \"transaction\" t
             JOIN category c ON c.id = t.category_id
             WHERE t.user_id = :user_id
               AND t.kind = 'expense'
               AND t.date BETWEEN :start_date AND :end_date
             GROUP BY t.category_id
             ORDER BY SUM(t.amount) DESC, c.name ASC",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64() as &dyn rusqlite::ToSql),
                (":start_date", &start_date),
                (":end_date", &end_date),
            ],
            |row| {
                Ok(ExpenseSlice {
                    id: row.get(0)?,
                    label: row.get(1)?,
                    value: row.get(2)?,
                })
            },
        )?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// For each budget whose window covers `today`, pair its limit with the
/// expenses recorded from the budget's start up to `today`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn budget_comparison(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<BudgetComparisonEntry>, Error> {
    connection
        .prepare(
            "SELECT c.name, b.amount,
                COALESCE((SELECT SUM(t.amount) FROM \"transaction\" t
                          WHERE t.user_id = b.user_id
                            AND t.category_id = b.category_id
                            AND t.kind = 'expense'
                            AND t.date BETWEEN b.start_date AND :today), 0)
             FROM budget b
             JOIN category c ON c.id = b.category_id
             WHERE b.user_id = :user_id
               AND b.start_date <= :today AND b.end_date >= :today
             ORDER BY b.created_at DESC, b.id DESC",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64() as &dyn rusqlite::ToSql),
                (":today", &today),
            ],
            |row| {
                Ok(BudgetComparisonEntry {
                    category: row.get(0)?,
                    budgeted: row.get(1)?,
                    actual: row.get(2)?,
                })
            },
        )?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Sum the caller's expenses per day across `year`, earliest day first. Days
/// with no expenses are absent.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidYear] if `year` is outside the supported calendar range,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn spending_heatmap(
    user_id: UserID,
    year: i32,
    connection: &Connection,
) -> Result<Vec<HeatmapCell>, Error> {
    let (first, _) = month_bounds(year, 1)?;
    let (_, last) = month_bounds(year, 12)?;

    connection
        .prepare(
            "SELECT date, SUM(amount)
             FROM \"transaction\"
             WHERE user_id = :user_id
               AND kind = 'expense'
               AND date BETWEEN :start_date AND :end_date
             GROUP BY date
             ORDER BY date ASC",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64() as &dyn rusqlite::ToSql),
                (":start_date", &first),
                (":end_date", &last),
            ],
            |row| {
                Ok(HeatmapCell {
                    date: row.get(0)?,
                    value: row.get(1)?,
                })
            },
        )?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}


#[cfg(test)]
mod report_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        account::{AccountKind, NewAccount, create_account},
        budget::{BudgetPeriod, NewBudget, create_budget},
        category::{CategoryId, CategoryKind, create_category},
        db::initialize,
        test_utils::create_test_user,
        transaction::{NewTransaction, TransactionKind, create_transaction},
        user::UserID,
    };

    use super::{
        budget_comparison, cash_flow, category_breakdown, expense_distribution, monthly_summary,
        spending_heatmap,
    };

    struct Fixture {
        connection: Connection,
        user_id: UserID,
        account_id: i64,
        groceries: CategoryId,
        salary: CategoryId,
    }

    impl Fixture {
        fn new() -> Self {
            let connection = Connection::open_in_memory().unwrap();
            initialize(&connection).unwrap();
            let user_id = create_test_user(&connection);
            let account = create_account(
                user_id,
                &NewAccount {
                    name: "Checking".to_owned(),
                    kind: AccountKind::Bank,
                    balance: 1_000_000,
                },
                &connection,
            )
            .unwrap();
            let groceries =
                create_category(user_id, "Groceries", CategoryKind::Expense, &connection)
                    .unwrap();
            let salary =
                create_category(user_id, "Salary", CategoryKind::Income, &connection).unwrap();

            Self {
                user_id,
                account_id: account.id,
                groceries: groceries.id,
                salary: salary.id,
                connection,
            }
        }

        fn record(&self, category_id: CategoryId, amount: i64, kind: TransactionKind, date: time::Date) {
            create_transaction(
                self.user_id,
                &NewTransaction {
                    account_id: self.account_id,
                    category_id,
                    subcategory_id: None,
                    amount,
                    kind,
                    description: None,
                    date,
                },
                &self.connection,
            )
            .expect("could not create transaction");
        }
    }

    #[test]
    fn monthly_summary_totals_and_net_savings() {
        let fixture = Fixture::new();
        fixture.record(
            fixture.salary,
            500_000,
            TransactionKind::Income,
            date!(2025 - 06 - 01),
        );
        fixture.record(
            fixture.groceries,
            120_000,
            TransactionKind::Expense,
            date!(2025 - 06 - 20),
        );
        // Outside June, must not count.
        fixture.record(
            fixture.groceries,
            99_999,
            TransactionKind::Expense,
            date!(2025 - 07 - 01),
        );

        let summary = monthly_summary(
            fixture.user_id,
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 30),
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(summary.total_income, 500_000);
        assert_eq!(summary.total_expenses, 120_000);
        assert_eq!(summary.net_savings, 380_000);
    }

    #[test]
    fn category_breakdown_counts_and_orders_by_total() {
        let fixture = Fixture::new();
        fixture.record(
            fixture.groceries,
            4_000,
            TransactionKind::Expense,
            date!(2025 - 06 - 05),
        );
        fixture.record(
            fixture.groceries,
            6_000,
            TransactionKind::Expense,
            date!(2025 - 06 - 12),
        );
        fixture.record(
            fixture.salary,
            500_000,
            TransactionKind::Income,
            date!(2025 - 06 - 01),
        );

        let breakdown = category_breakdown(
            fixture.user_id,
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 30),
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category_name, "Salary");
        assert_eq!(breakdown[0].total_amount, 500_000);
        assert_eq!(breakdown[0].transaction_count, 1);
        assert_eq!(breakdown[1].category_name, "Groceries");
        assert_eq!(breakdown[1].total_amount, 10_000);
        assert_eq!(breakdown[1].transaction_count, 2);
    }

    #[test]
    fn cash_flow_groups_by_month_ascending() {
        let fixture = Fixture::new();
        fixture.record(
            fixture.salary,
            300_000,
            TransactionKind::Income,
            date!(2025 - 05 - 01),
        );
        fixture.record(
            fixture.groceries,
            50_000,
            TransactionKind::Expense,
            date!(2025 - 05 - 20),
        );
        fixture.record(
            fixture.groceries,
            70_000,
            TransactionKind::Expense,
            date!(2025 - 06 - 03),
        );

        let flow = cash_flow(
            fixture.user_id,
            date!(2025 - 05 - 01),
            date!(2025 - 06 - 30),
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(flow.len(), 2);
        assert_eq!(flow[0].month, "2025-05");
        assert_eq!(flow[0].income, 300_000);
        assert_eq!(flow[0].expenses, 50_000);
        assert_eq!(flow[0].net_flow, 250_000);
        assert_eq!(flow[1].month, "2025-06");
        assert_eq!(flow[1].net_flow, -70_000);
    }

    #[test]
    fn expense_distribution_skips_income() {
        let fixture = Fixture::new();
        fixture.record(
            fixture.groceries,
            8_000,
            TransactionKind::Expense,
            date!(2025 - 06 - 05),
        );
        fixture.record(
            fixture.salary,
            500_000,
            TransactionKind::Income,
            date!(2025 - 06 - 01),
        );

        let slices = expense_distribution(
            fixture.user_id,
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 30),
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].id, fixture.groceries);
        assert_eq!(slices[0].label, "Groceries");
        assert_eq!(slices[0].value, 8_000);
    }

    #[test]
    fn budget_comparison_counts_spend_up_to_today_only() {
        let fixture = Fixture::new();
        create_budget(
            fixture.user_id,
            &NewBudget {
                category_id: fixture.groceries,
                amount: 50_000,
                period: BudgetPeriod::Monthly,
                start_date: date!(2025 - 06 - 01),
                end_date: date!(2025 - 06 - 30),
            },
            &fixture.connection,
        )
        .unwrap();
        fixture.record(
            fixture.groceries,
            10_000,
            TransactionKind::Expense,
            date!(2025 - 06 - 05),
        );
        // Dated after "today", must not count.
        fixture.record(
            fixture.groceries,
            20_000,
            TransactionKind::Expense,
            date!(2025 - 06 - 25),
        );

        let comparison =
            budget_comparison(fixture.user_id, date!(2025 - 06 - 15), &fixture.connection)
                .unwrap();

        assert_eq!(comparison.len(), 1);
        assert_eq!(comparison[0].category, "Groceries");
        assert_eq!(comparison[0].budgeted, 50_000);
        assert_eq!(comparison[0].actual, 10_000);
    }

    #[test]
    fn budget_comparison_skips_windows_not_covering_today() {
        let fixture = Fixture::new();
        create_budget(
            fixture.user_id,
            &NewBudget {
                category_id: fixture.groceries,
                amount: 50_000,
                period: BudgetPeriod::Monthly,
                start_date: date!(2025 - 05 - 01),
                end_date: date!(2025 - 05 - 31),
            },
            &fixture.connection,
        )
        .unwrap();

        let comparison =
            budget_comparison(fixture.user_id, date!(2025 - 06 - 15), &fixture.connection)
                .unwrap();

        assert!(comparison.is_empty());
    }

    #[test]
    fn spending_heatmap_sums_per_day_within_the_year() {
        let fixture = Fixture::new();
        fixture.record(
            fixture.groceries,
            2_000,
            TransactionKind::Expense,
            date!(2025 - 03 - 10),
        );
        fixture.record(
            fixture.groceries,
            3_000,
            TransactionKind::Expense,
            date!(2025 - 03 - 10),
        );
        fixture.record(
            fixture.groceries,
            1_000,
            TransactionKind::Expense,
            date!(2024 - 12 - 31),
        );
        // Income never shows up in the heatmap.
        fixture.record(
            fixture.salary,
            500_000,
            TransactionKind::Income,
            date!(2025 - 03 - 10),
        );

        let cells = spending_heatmap(fixture.user_id, 2025, &fixture.connection).unwrap();

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].date, date!(2025 - 03 - 10));
        assert_eq!(cells[0].value, 5_000);
    }
}
