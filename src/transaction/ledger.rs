//! The balance ledger updater.
//!
//! Every transaction write must keep the owning account's stored balance equal
//! to its initial balance plus the signed sum of its transaction history. Each
//! operation here therefore runs as one SQL transaction pairing the row write
//! with the matching balance adjustment: either both commit or neither does.
//!
//! Balance adjustments are expressed as `balance = balance + delta` inside
//! that unit, never as a read followed by a write from application code, so
//! concurrent writers against the same account cannot lose updates.

use rusqlite::Connection;

use crate::{
    Error,
    account::AccountId,
    category::SubcategoryId,
    money::Cents,
    transaction::core::{
        NewTransaction, Transaction, TransactionId, TransactionKind, get_transaction,
        map_transaction_row,
    },
    user::UserID,
};

/// The signed change a transaction applies to its account balance.
///
/// Income adds the amount, an expense subtracts it.
pub fn balance_delta(kind: TransactionKind, amount: Cents) -> Cents {
    match kind {
        TransactionKind::Income => amount,
        TransactionKind::Expense => -amount,
    }
}

/// Record a new transaction and apply its delta to the account balance.
///
/// The referenced account and category must exist and belong to `user_id`;
/// otherwise nothing is written.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the account, category or subcategory does not exist
///   or is not owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    data: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let unit = connection.unchecked_transaction()?;

    verify_references(user_id, data, &unit)?;
    let transaction = insert_transaction_row(user_id, data, &unit)?;
    apply_balance_delta(data.account_id, balance_delta(data.kind, data.amount), &unit)?;

    unit.commit()?;

    Ok(transaction)
}

/// Replace a transaction's fields and restore the balance invariant.
///
/// The original effect is reversed on the old account, then the new effect is
/// applied to the (possibly different) new account, then the row is updated.
/// All steps commit or roll back together: a failure part-way leaves both
/// balances exactly as they were.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by
///   `user_id`, or any new reference is missing or not owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    data: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let unit = connection.unchecked_transaction()?;

    let old = get_transaction(id, user_id, &unit)?;
    let reverse_delta = -balance_delta(old.kind, old.amount);
    let forward_delta = balance_delta(data.kind, data.amount);

    let result = (|| {
        apply_balance_delta(old.account_id, reverse_delta, &unit)?;
        verify_references(user_id, data, &unit)?;
        apply_balance_delta(data.account_id, forward_delta, &unit)?;
        update_transaction_row(id, data, &unit)?;
        get_transaction(id, user_id, &unit)
    })();

    match result {
        Ok(updated) => {
            unit.commit()?;
            Ok(updated)
        }
        Err(error) => {
            if let Error::SqlError(_) = error {
                tracing::error!(
                    "rolling back update of transaction {id}: \
                     reverse {reverse_delta} on account {}, forward {forward_delta} on account {}: {error}",
                    old.account_id,
                    data.account_id,
                );
            }
            Err(error)
        }
    }
}

/// Remove a transaction and reverse its effect on the account balance.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let unit = connection.unchecked_transaction()?;

    let old = get_transaction(id, user_id, &unit)?;
    apply_balance_delta(old.account_id, -balance_delta(old.kind, old.amount), &unit)?;
    unit.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    unit.commit()?;

    Ok(())
}

/// Add `delta` to an account's balance as a single atomic increment.
fn apply_balance_delta(
    account_id: AccountId,
    delta: Cents,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE account SET balance = balance + ?1 WHERE id = ?2",
        (delta, account_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Check that the account, category and subcategory a transaction references
/// exist and belong to `user_id`.
fn verify_references(
    user_id: UserID,
    data: &NewTransaction,
    connection: &Connection,
) -> Result<(), Error> {
    connection
        .prepare("SELECT id FROM account WHERE id = :id AND user_id = :user_id")?
        .query_row(
            &[(":id", &data.account_id), (":user_id", &user_id.as_i64())],
            |row| row.get::<_, i64>(0),
        )
        .map_err(Error::from)?;

    connection
        .prepare("SELECT id FROM category WHERE id = :id AND user_id = :user_id")?
        .query_row(
            &[(":id", &data.category_id), (":user_id", &user_id.as_i64())],
            |row| row.get::<_, i64>(0),
        )
        .map_err(Error::from)?;

    if let Some(subcategory_id) = data.subcategory_id {
        verify_subcategory(subcategory_id, data, connection)?;
    }

    Ok(())
}

fn verify_subcategory(
    subcategory_id: SubcategoryId,
    data: &NewTransaction,
    connection: &Connection,
) -> Result<(), Error> {
    connection
        .prepare("SELECT id FROM subcategory WHERE id = :id AND category_id = :category_id")?
        .query_row(
            &[(":id", &subcategory_id), (":category_id", &data.category_id)],
            |row| row.get::<_, i64>(0),
        )
        .map_err(Error::from)?;

    Ok(())
}

fn insert_transaction_row(
    user_id: UserID,
    data: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\"
                 (user_id, account_id, category_id, subcategory_id, amount, kind,
                  description, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, user_id, account_id, category_id, subcategory_id, amount, kind,
                       description, date, created_at",
        )?
        .query_row(
            (
                user_id.as_i64(),
                data.account_id,
                data.category_id,
                data.subcategory_id,
                data.amount,
                data.kind.as_str(),
                &data.description,
                data.date,
                time::OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

fn update_transaction_row(
    id: TransactionId,
    data: &NewTransaction,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "UPDATE \"transaction\"
         SET account_id = ?1, category_id = ?2, subcategory_id = ?3, amount = ?4,
             kind = ?5, description = ?6, date = ?7
         WHERE id = ?8",
        (
            data.account_id,
            data.category_id,
            data.subcategory_id,
            data.amount,
            data.kind.as_str(),
            &data.description,
            data.date,
            id,
        ),
    )?;

    Ok(())
}

#[cfg(test)]
mod balance_delta_tests {
    use crate::transaction::core::TransactionKind;

    use super::balance_delta;

    #[test]
    fn income_is_positive_expense_is_negative() {
        assert_eq!(balance_delta(TransactionKind::Income, 5000), 5000);
        assert_eq!(balance_delta(TransactionKind::Expense, 5000), -5000);
    }
}
