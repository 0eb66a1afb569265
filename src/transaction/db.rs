//! Database operations for transactions.
//!
//! Every query is scoped to the owner of the transactions.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Amount, Error, TransactionType,
    auth::UserID,
    category::{CategoryId, CategoryName},
    db::timestamp_now,
    ordering::OrderingSpec,
    pagination::PageRequest,
    transaction::{
        aggregation::{DateRange, SummaryRow},
        domain::{NewTransaction, Transaction, TransactionId},
    },
};

/// The fields clients can order transactions by.
pub const TRANSACTION_ORDERING: OrderingSpec = OrderingSpec {
    fields: &[
        ("date", "t.date"),
        ("amount", "t.amount_cents"),
        ("created_at", "t.created_at"),
    ],
    default: "t.date DESC, t.created_at DESC",
    tiebreaker: "t.id DESC",
};

const SELECT_TRANSACTION: &str = "SELECT t.id, t.user_id, t.type, t.amount_cents, t.category_id, \
    c.name, c.type, t.date, t.description, t.created_at, t.updated_at \
    FROM \"transaction\" t INNER JOIN category c ON c.id = t.category_id";

/// Filters for listing transactions, every bound is inclusive.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    pub date_from: Option<Date>,
    pub date_to: Option<Date>,
    pub amount_min_cents: Option<i64>,
    pub amount_max_cents: Option<i64>,
    pub category_id: Option<CategoryId>,
    pub transaction_type: Option<TransactionType>,
}

const FILTER_CLAUSE: &str = "t.user_id = ?1 \
    AND (?2 IS NULL OR t.date >= ?2) \
    AND (?3 IS NULL OR t.date <= ?3) \
    AND (?4 IS NULL OR t.amount_cents >= ?4) \
    AND (?5 IS NULL OR t.amount_cents <= ?5) \
    AND (?6 IS NULL OR t.category_id = ?6) \
    AND (?7 IS NULL OR t.type = ?7)";

/// Create the transaction table in the database.
///
/// Categories that transactions reference cannot be deleted.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                amount_cents INTEGER NOT NULL CHECK (amount_cents > 0),
                category_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT
                );
        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_category_name: String = row.get(5)?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        transaction_type: row.get(2)?,
        amount: Amount::from_cents_unchecked(row.get(3)?),
        category: row.get(4)?,
        category_name: CategoryName::new_unchecked(&raw_category_name),
        category_type: row.get(6)?,
        date: row.get(7)?,
        description: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Create a new transaction in the database.
///
/// The caller should validate the category of the transaction first.
///
/// # Errors
/// Returns an [Error::SqlError] if the category or user does not exist.
pub fn create_transaction(
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = timestamp_now();

    connection.execute(
        "INSERT INTO \"transaction\" \
            (user_id, type, amount_cents, category_id, date, description, created_at, updated_at) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            transaction.user_id.as_i64(),
            transaction.transaction_type,
            transaction.amount.cents(),
            transaction.category_id,
            transaction.date,
            &transaction.description,
            now,
            now,
        ),
    )?;

    let id = connection.last_insert_rowid();

    get_user_transaction(id, transaction.user_id, connection)
}

/// Retrieve a transaction owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or belongs to another user.
pub fn get_user_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.id = :id AND t.user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Count the transactions of `user_id` that match `filter`.
pub fn count_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<u64, Error> {
    connection
        .query_row(
            &format!("SELECT COUNT(t.id) FROM \"transaction\" t WHERE {FILTER_CLAUSE}"),
            (
                user_id.as_i64(),
                filter.date_from,
                filter.date_to,
                filter.amount_min_cents,
                filter.amount_max_cents,
                filter.category_id,
                filter.transaction_type,
            ),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Get one page of the transactions of `user_id` that match `filter`.
///
/// `ordering` is the raw `ordering` query parameter, see [TRANSACTION_ORDERING].
pub fn query_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    ordering: Option<&str>,
    page: PageRequest,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let query = format!(
        "{SELECT_TRANSACTION} WHERE {FILTER_CLAUSE} ORDER BY {} LIMIT ?8 OFFSET ?9",
        TRANSACTION_ORDERING.order_by(ordering)
    );

    connection
        .prepare(&query)?
        .query_map(
            (
                user_id.as_i64(),
                filter.date_from,
                filter.date_to,
                filter.amount_min_cents,
                filter.amount_max_cents,
                filter.category_id,
                filter.transaction_type,
                page.limit() as i64,
                page.offset() as i64,
            ),
            map_transaction_row,
        )?
        .map(|transaction_result| transaction_result.map_err(|error| error.into()))
        .collect()
}

/// Replace the fields of a transaction owned by `transaction.user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or belongs to another user.
pub fn update_transaction(
    id: TransactionId,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" \
            SET type = ?1, amount_cents = ?2, category_id = ?3, date = ?4, description = ?5, updated_at = ?6 \
            WHERE id = ?7 AND user_id = ?8",
        (
            transaction.transaction_type,
            transaction.amount.cents(),
            transaction.category_id,
            transaction.date,
            &transaction.description,
            timestamp_now(),
            id,
            transaction.user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_user_transaction(id, transaction.user_id, connection)
}

/// Delete a transaction owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or belongs to another user.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Select the rows the financial summary is computed from.
pub fn get_summary_rows(
    user_id: UserID,
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<SummaryRow>, Error> {
    connection
        .prepare(
            "SELECT t.type, t.category_id, c.name, t.date, t.amount_cents \
            FROM \"transaction\" t INNER JOIN category c ON c.id = t.category_id \
            WHERE t.user_id = ?1 AND (?2 IS NULL OR t.date >= ?2) AND (?3 IS NULL OR t.date < ?3)",
        )?
        .query_map((user_id.as_i64(), range.start, range.end), |row| {
            Ok(SummaryRow {
                transaction_type: row.get(0)?,
                category_id: row.get(1)?,
                category_name: row.get(2)?,
                date: row.get(3)?,
                amount_cents: row.get(4)?,
            })
        })?
        .map(|row_result| row_result.map_err(|error| error.into()))
        .collect()
}

/// Sum the expenses of `user_id` dated in `[start, end)`, in cents.
///
/// If `category_id` is set, only expenses in that category are counted.
pub fn total_expenses_between(
    user_id: UserID,
    start: Date,
    end: Date,
    category_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM \"transaction\" \
            WHERE user_id = ?1 AND type = ?2 AND date >= ?3 AND date < ?4 \
            AND (?5 IS NULL OR category_id = ?5)",
            (
                user_id.as_i64(),
                TransactionType::Expense,
                start,
                end,
                category_id,
            ),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}
