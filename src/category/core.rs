//! Defines the category and subcategory models, tables and queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, user::UserID};

/// The id of a category row.
pub type CategoryId = i64;

/// The id of a subcategory row.
pub type SubcategoryId = i64;

/// Whether a category groups income or expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl CategoryKind {
    /// The text stored in the database for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        }
    }

    /// Parse the text stored in the database.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "income" => Some(CategoryKind::Income),
            "expense" => Some(CategoryKind::Expense),
            _ => None,
        }
    }
}

/// A user-defined grouping for transactions, e.g. "Groceries" or "Salary".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The ID of the user that owns the category.
    pub user_id: UserID,
    /// The display name of the category.
    pub name: String,
    /// Whether the category groups income or expenses.
    pub kind: CategoryKind,
    /// The category's subcategories.
    pub subcategories: Vec<Subcategory>,
}

/// A finer-grained grouping under a category, e.g. "Groceries > Produce".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    /// The ID of the subcategory.
    pub id: SubcategoryId,
    /// The ID of the parent category.
    pub category_id: CategoryId,
    /// The display name of the subcategory.
    pub name: String,
}

/// Create the category and subcategory tables.
///
/// # Errors
/// Returns an error if the SQL query fails.
pub fn create_category_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS subcategory (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE CASCADE
        );",
    )?;

    Ok(())
}

/// Create a category owned by `user_id` and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyName] if the category name is blank,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    user_id: UserID,
    name: &str,
    kind: CategoryKind,
    connection: &Connection,
) -> Result<Category, Error> {
    if name.trim().is_empty() {
        return Err(Error::EmptyName);
    }

    connection.execute(
        "INSERT INTO category (user_id, name, kind) VALUES (?1, ?2, ?3)",
        (user_id.as_i64(), name, kind.as_str()),
    )?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        user_id,
        name: name.to_owned(),
        kind,
        subcategories: Vec::new(),
    })
}

/// Retrieve a category by ID, scoped to its owner, with its subcategories.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a category owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_category(
    id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let mut category = connection
        .prepare(
            "SELECT id, user_id, name, kind FROM category WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_category_row,
        )
        .map_err(Error::from)?;

    category.subcategories = get_subcategories(category.id, connection)?;

    Ok(category)
}

/// Retrieve all categories owned by `user_id` with their subcategories,
/// ordered alphabetically by name.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    let mut categories: Vec<Category> = connection
        .prepare(
            "SELECT id, user_id, name, kind FROM category
             WHERE user_id = :user_id
             ORDER BY name ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect::<Result<_, _>>()?;

    for category in &mut categories {
        category.subcategories = get_subcategories(category.id, connection)?;
    }

    Ok(categories)
}

/// Update a category's name and kind.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyName] if the new name is blank,
/// - [Error::UpdateMissingCategory] if `id` does not refer to a category owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_category(
    id: CategoryId,
    user_id: UserID,
    name: &str,
    kind: CategoryKind,
    connection: &Connection,
) -> Result<Category, Error> {
    if name.trim().is_empty() {
        return Err(Error::EmptyName);
    }

    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, kind = ?2 WHERE id = ?3 AND user_id = ?4",
        (name, kind.as_str(), id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    get_category(id, user_id, connection)
}

/// Delete a category and its subcategories.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingCategory] if `id` does not refer to a category owned by `user_id`,
/// - [Error::CategoryInUse] if any transaction still references the category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_category(
    id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    // Ownership first: a non-owner gets the same 404 as a missing id and
    // never reaches the referential guard.
    get_category(id, user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingCategory,
        error => error,
    })?;

    let transaction_count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM \"transaction\" WHERE category_id = :category_id",
        &[(":category_id", &id)],
        |row| row.get(0),
    )?;

    if transaction_count > 0 {
        return Err(Error::CategoryInUse);
    }

    connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    Ok(())
}

/// Create a subcategory under a category owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyName] if the subcategory name is blank,
/// - [Error::NotFound] if the category does not exist or is not owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_subcategory(
    category_id: CategoryId,
    user_id: UserID,
    name: &str,
    connection: &Connection,
) -> Result<Subcategory, Error> {
    if name.trim().is_empty() {
        return Err(Error::EmptyName);
    }

    // Confirms the parent exists and belongs to the caller.
    get_category(category_id, user_id, connection)?;

    connection.execute(
        "INSERT INTO subcategory (category_id, name) VALUES (?1, ?2)",
        (category_id, name),
    )?;

    Ok(Subcategory {
        id: connection.last_insert_rowid(),
        category_id,
        name: name.to_owned(),
    })
}

/// Delete a subcategory whose parent category is owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingSubcategory] if `id` does not refer to a subcategory
///   under one of the caller's categories,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_subcategory(
    id: SubcategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM subcategory
         WHERE id = ?1
           AND category_id IN (SELECT id FROM category WHERE user_id = ?2)",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingSubcategory);
    }

    Ok(())
}

fn get_subcategories(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Vec<Subcategory>, Error> {
    connection
        .prepare(
            "SELECT id, category_id, name FROM subcategory
             WHERE category_id = :category_id
             ORDER BY name ASC",
        )?
        .query_map(&[(":category_id", &category_id)], |row| {
            Ok(Subcategory {
                id: row.get(0)?,
                category_id: row.get(1)?,
                name: row.get(2)?,
            })
        })?
        .map(|maybe_subcategory| maybe_subcategory.map_err(Error::from))
        .collect()
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let name = row.get(2)?;
    let raw_kind: String = row.get(3)?;
    let kind = CategoryKind::parse(&raw_kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown category kind: {raw_kind}").into(),
        )
    })?;

    Ok(Category {
        id,
        user_id,
        name,
        kind,
        subcategories: Vec::new(),
    })
}
