//! Database operations for categories.
//!
//! Apart from [get_category], every query is scoped to the owner of the category.

use rusqlite::{Connection, Row};

use crate::{
    Error, TransactionType,
    auth::UserID,
    category::{Category, CategoryId, CategoryName, DEFAULT_CATEGORIES, NewCategory},
    db::{is_foreign_key_violation, is_unique_violation, timestamp_now},
    ordering::OrderingSpec,
};

/// The fields clients can order categories by.
pub const CATEGORY_ORDERING: OrderingSpec = OrderingSpec {
    fields: &[("name", "name"), ("created_at", "created_at")],
    default: "name ASC",
    tiebreaker: "id ASC",
};

const SELECT_CATEGORY: &str = "SELECT id, name, type, user_id, created_at FROM category";

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_category_user_type ON category(user_id, type);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(Category {
        id: row.get(0)?,
        name: CategoryName::new_unchecked(&raw_name),
        category_type: row.get(2)?,
        user_id: UserID::new(row.get(3)?),
        created_at: row.get(4)?,
    })
}

fn map_name_conflict(error: rusqlite::Error, name: &CategoryName) -> Error {
    if is_unique_violation(&error) {
        Error::DuplicateCategoryName(name.to_string())
    } else {
        error.into()
    }
}

/// Create a category and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if the user already has a category with the same name.
pub fn create_category(category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    let created_at = timestamp_now();

    connection
        .execute(
            "INSERT INTO category (name, type, user_id, created_at) VALUES (?1, ?2, ?3, ?4);",
            (
                category.name.as_ref(),
                category.category_type,
                category.user_id.as_i64(),
                created_at,
            ),
        )
        .map_err(|error| map_name_conflict(error, &category.name))?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        name: category.name,
        category_type: category.category_type,
        user_id: category.user_id,
        created_at,
    })
}

/// Create the default categories for a new user.
pub fn seed_default_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, category_type)| {
            create_category(
                NewCategory {
                    name: CategoryName::new_unchecked(name),
                    category_type: *category_type,
                    user_id,
                },
                connection,
            )
        })
        .collect()
}

/// Retrieve a single category by ID, regardless of who owns it.
///
/// Used to tell a category that does not exist apart from one that belongs to another user.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare(&format!("{SELECT_CATEGORY} WHERE id = :id;"))?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve a single category owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not exist or belongs to another user.
pub fn get_user_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CATEGORY} WHERE id = :id AND user_id = :user_id;"
        ))?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve the categories of `user_id`, optionally only those of one type.
///
/// `ordering` is the raw `ordering` query parameter, see [CATEGORY_ORDERING].
pub fn list_categories(
    user_id: UserID,
    category_type: Option<TransactionType>,
    ordering: Option<&str>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let query = format!(
        "{SELECT_CATEGORY} WHERE user_id = ?1 AND (?2 IS NULL OR type = ?2) ORDER BY {};",
        CATEGORY_ORDERING.order_by(ordering)
    );

    connection
        .prepare(&query)?
        .query_map((user_id.as_i64(), category_type), map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Whether `user_id` has a category called `name`, ignoring the category `exclude_id`.
pub fn category_name_exists(
    user_id: UserID,
    name: &CategoryName,
    exclude_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM category WHERE user_id = ?1 AND name = ?2 AND (?3 IS NULL OR id != ?3)
            );",
            (user_id.as_i64(), name.as_ref(), exclude_id),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// The number of transactions that reference the category.
pub fn count_category_transactions(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE category_id = ?1;",
            (category_id,),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Update the name and type of a category owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not exist or belongs to another user,
/// or [Error::DuplicateCategoryName] if the new name is taken.
pub fn update_category(
    category_id: CategoryId,
    user_id: UserID,
    name: CategoryName,
    category_type: TransactionType,
    connection: &Connection,
) -> Result<Category, Error> {
    let rows_affected = connection
        .execute(
            "UPDATE category SET name = ?1, type = ?2 WHERE id = ?3 AND user_id = ?4",
            (name.as_ref(), category_type, category_id, user_id.as_i64()),
        )
        .map_err(|error| map_name_conflict(error, &name))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_user_category(category_id, user_id, connection)
}

/// Delete a category owned by `user_id`, along with its budgets.
///
/// # Errors
///
/// Returns [Error::CategoryInUse] if transactions reference the category, or
/// [Error::NotFound] if the category does not exist or belongs to another user.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    get_user_category(category_id, user_id, connection)?;

    let transaction_count = count_category_transactions(category_id, connection)?;

    if transaction_count > 0 {
        return Err(Error::CategoryInUse(transaction_count));
    }

    let rows_affected = connection
        .execute(
            "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
            (category_id, user_id.as_i64()),
        )
        .map_err(|error| {
            if is_foreign_key_violation(&error) {
                Error::CategoryInUse(transaction_count.max(1))
            } else {
                error.into()
            }
        })?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
