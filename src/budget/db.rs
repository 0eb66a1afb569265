//! Database operations for budgets.
//!
//! Every query is scoped to the owner of the budgets.

use rusqlite::{Connection, Row};

use crate::{
    Amount, Error,
    auth::UserID,
    budget::{
        domain::{Budget, BudgetId, BudgetResponse, NewBudget},
        progress::{budget_period, compute_progress},
    },
    category::{CategoryId, CategoryName},
    db::{is_unique_violation, timestamp_now},
    ordering::OrderingSpec,
    transaction::total_expenses_between,
};

/// The fields clients can order budgets by.
pub const BUDGET_ORDERING: OrderingSpec = OrderingSpec {
    fields: &[
        ("year", "b.year"),
        ("month", "b.month"),
        ("amount", "b.amount_cents"),
    ],
    default: "b.year DESC, b.month DESC",
    tiebreaker: "b.id ASC",
};

const SELECT_BUDGET: &str = "SELECT b.id, b.user_id, b.month, b.year, b.amount_cents, \
    b.category_id, c.name, b.created_at, b.updated_at \
    FROM budget b LEFT JOIN category c ON c.id = b.category_id";

/// Filters for listing budgets.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BudgetFilter {
    pub month: Option<i64>,
    pub year: Option<i64>,
    pub category_id: Option<CategoryId>,
}

/// Create the budget table in the database.
///
/// Budgets are deleted along with their category. A user can have one
/// budget per month, year and category, counting the overall budget as its
/// own category.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            year INTEGER NOT NULL CHECK (year BETWEEN 2000 AND 2100),
            amount_cents INTEGER NOT NULL CHECK (amount_cents > 0),
            category_id INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_budget_period
            ON budget(user_id, month, year, IFNULL(category_id, 0));",
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_category_name: Option<String> = row.get(6)?;

    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        month: row.get(2)?,
        year: row.get(3)?,
        amount: Amount::from_cents_unchecked(row.get(4)?),
        category: row.get(5)?,
        category_name: raw_category_name.map(|name| CategoryName::new_unchecked(&name)),
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn map_budget_conflict(error: rusqlite::Error) -> Error {
    if is_unique_violation(&error) {
        Error::DuplicateBudget
    } else {
        error.into()
    }
}

/// Create a new budget in the database.
///
/// # Errors
/// Returns [Error::DuplicateBudget] if the user already has a budget for the
/// same month, year and category.
pub fn create_budget(budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    let now = timestamp_now();

    connection
        .execute(
            "INSERT INTO budget (user_id, month, year, amount_cents, category_id, created_at, updated_at) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                budget.user_id.as_i64(),
                budget.month,
                budget.year,
                budget.amount.cents(),
                budget.category_id,
                now,
                now,
            ),
        )
        .map_err(map_budget_conflict)?;

    let id = connection.last_insert_rowid();

    get_user_budget(id, budget.user_id, connection)
}

/// Retrieve a budget owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the budget does not exist or belongs to another user.
pub fn get_user_budget(
    id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(&format!(
            "{SELECT_BUDGET} WHERE b.id = :id AND b.user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_budget_row,
        )
        .map_err(|error| error.into())
}

/// List the budgets of `user_id` that match `filter`.
///
/// `ordering` is the raw `ordering` query parameter, see [BUDGET_ORDERING].
pub fn list_budgets(
    user_id: UserID,
    filter: &BudgetFilter,
    ordering: Option<&str>,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    let query = format!(
        "{SELECT_BUDGET} WHERE b.user_id = ?1 \
            AND (?2 IS NULL OR b.month = ?2) \
            AND (?3 IS NULL OR b.year = ?3) \
            AND (?4 IS NULL OR b.category_id = ?4) \
            ORDER BY {}",
        BUDGET_ORDERING.order_by(ordering)
    );

    connection
        .prepare(&query)?
        .query_map(
            (
                user_id.as_i64(),
                filter.month,
                filter.year,
                filter.category_id,
            ),
            map_budget_row,
        )?
        .map(|budget_result| budget_result.map_err(|error| error.into()))
        .collect()
}

/// Replace the fields of a budget owned by `budget.user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the budget does not exist or belongs to another user,
/// or [Error::DuplicateBudget] if the new period clashes with another budget.
pub fn update_budget(
    id: BudgetId,
    budget: NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    let rows_affected = connection
        .execute(
            "UPDATE budget \
            SET month = ?1, year = ?2, amount_cents = ?3, category_id = ?4, updated_at = ?5 \
            WHERE id = ?6 AND user_id = ?7",
            (
                budget.month,
                budget.year,
                budget.amount.cents(),
                budget.category_id,
                timestamp_now(),
                id,
                budget.user_id.as_i64(),
            ),
        )
        .map_err(map_budget_conflict)?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_user_budget(id, budget.user_id, connection)
}

/// Delete a budget owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the budget does not exist or belongs to another user.
pub fn delete_budget(id: BudgetId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Attach the actual expenses in its month to `budget`.
///
/// Overall budgets count every expense, category budgets only the expenses
/// in their category.
pub fn with_progress(budget: Budget, connection: &Connection) -> Result<BudgetResponse, Error> {
    let actual_cents = match budget_period(budget.month, budget.year) {
        Some((start, end)) => {
            total_expenses_between(budget.user_id, start, end, budget.category, connection)?
        }
        None => {
            tracing::warn!(
                "Budget {} has an invalid period {}-{}",
                budget.id,
                budget.year,
                budget.month
            );
            0
        }
    };

    Ok(BudgetResponse {
        progress: compute_progress(budget.amount.cents(), actual_cents),
        budget,
    })
}
