//! Database initialization for the REST server.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, account::create_account_table, budget::create_budget_table,
    category::create_category_tables, notification::create_notification_table,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create the tables for the application's domain models.
///
/// Tables are created within a single transaction, so either all tables are
/// created or none are.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute("PRAGMA foreign_keys = ON", ())?;

    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_account_table(&transaction)?;
    create_category_tables(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_notification_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_creates_tables() {
        let connection =
            Connection::open_in_memory().expect("could not open database connection");

        initialize(&connection).expect("could not initialize database");

        let table_count: i64 = connection
            .query_row(
                "SELECT COUNT(name) FROM sqlite_master WHERE type = 'table' AND name IN \
                 ('user', 'account', 'category', 'subcategory', 'transaction', 'budget', 'notification')",
                (),
                |row| row.get(0),
            )
            .expect("could not count tables");

        assert_eq!(table_count, 7);
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection =
            Connection::open_in_memory().expect("could not open database connection");

        initialize(&connection).expect("could not initialize database");
        initialize(&connection).expect("could not initialize database twice");
    }
}
