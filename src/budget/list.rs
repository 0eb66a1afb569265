//! Endpoints for reading budgets.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{
        FromRef, Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    app_state::{DbState, lock_connection},
    auth::UserID,
    budget::{
        db::{BudgetFilter, get_user_budget, list_budgets, with_progress},
        domain::{BudgetId, BudgetResponse},
    },
    category::parse_category_filter,
    timezone::local_today,
};

/// The state needed for finding the budgets of the current month.
#[derive(Debug, Clone)]
pub struct CurrentMonthState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical timezone that decides what "today" is.
    pub local_timezone: String,
}

impl FromRef<AppState> for CurrentMonthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters for listing budgets.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetQuery {
    pub month: Option<String>,
    pub year: Option<String>,
    pub category: Option<String>,
    /// The raw ordering, e.g. "-amount".
    pub ordering: Option<String>,
}

fn parse_whole_number(raw: &Option<String>, field: &'static str) -> Result<Option<i64>, Error> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| Error::invalid_field(field, "Enter a whole number.")),
    }
}

impl BudgetQuery {
    fn filter(&self) -> Result<BudgetFilter, Error> {
        Ok(BudgetFilter {
            month: parse_whole_number(&self.month, "month")?,
            year: parse_whole_number(&self.year, "year")?,
            category_id: parse_category_filter(self.category.as_deref())?,
        })
    }
}

fn list_with_progress(
    user_id: UserID,
    filter: &BudgetFilter,
    ordering: Option<&str>,
    connection: &Connection,
) -> Result<Vec<BudgetResponse>, Error> {
    list_budgets(user_id, filter, ordering, connection)?
        .into_iter()
        .map(|budget| with_progress(budget, connection))
        .collect()
}

/// List the current user's budgets along with what was spent against them.
pub async fn list_budgets_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<BudgetQuery>, QueryRejection>,
) -> Result<Json<Vec<BudgetResponse>>, Error> {
    let Query(query) = query?;
    let filter = query.filter()?;

    let connection = lock_connection(&state.db_connection)?;

    list_with_progress(user_id, &filter, query.ordering.as_deref(), &connection).map(Json)
}

/// Get one of the current user's budgets.
pub async fn get_budget_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<BudgetId>, PathRejection>,
) -> Result<Json<BudgetResponse>, Error> {
    let Path(budget_id) = path?;
    let connection = lock_connection(&state.db_connection)?;

    let budget = get_user_budget(budget_id, user_id, &connection)?;

    with_progress(budget, &connection).map(Json)
}

/// List the current user's budgets for the month that contains today.
///
/// Today is evaluated in the server's configured timezone.
pub async fn current_month_budgets_endpoint(
    State(state): State<CurrentMonthState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<BudgetResponse>>, Error> {
    let today = local_today(&state.local_timezone)?;
    let filter = BudgetFilter {
        month: Some(i64::from(u8::from(today.month()))),
        year: Some(i64::from(today.year())),
        category_id: None,
    };

    let connection = lock_connection(&state.db_connection)?;

    list_with_progress(user_id, &filter, None, &connection).map(Json)
}

#[cfg(test)]
mod list_budgets_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Path, Query, State},
    };
    use time::OffsetDateTime;

    use crate::{
        Amount, Error, TransactionType,
        app_state::DbState,
        auth::User,
        budget::{create_budget, domain::NewBudget},
        category::Category,
        test_utils::{create_test_category, create_test_user, get_test_connection},
        transaction::{NewTransaction, create_transaction},
    };

    use super::{
        BudgetQuery, CurrentMonthState, current_month_budgets_endpoint, get_budget_endpoint,
        list_budgets_endpoint,
    };

    struct Fixture {
        state: DbState,
        alice: User,
        bob: User,
        rent: Category,
    }

    fn get_fixture() -> Fixture {
        let connection = get_test_connection();
        let alice = create_test_user(&connection, "alice");
        let bob = create_test_user(&connection, "bob");
        let rent = create_test_category(&connection, &alice, "Rent", TransactionType::Expense);

        Fixture {
            state: DbState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            alice,
            bob,
            rent,
        }
    }

    fn add_budget(fixture: &Fixture, month: u8, year: u16, category: Option<&Category>) -> i64 {
        create_budget(
            NewBudget {
                user_id: fixture.alice.id,
                month,
                year,
                amount: Amount::from_cents_unchecked(100_000),
                category_id: category.map(|category| category.id),
            },
            &fixture.state.db_connection.lock().unwrap(),
        )
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn budget_reports_actual_spending() {
        let fixture = get_fixture();
        let budget_id = add_budget(&fixture, 1, 2024, None);
        {
            let connection = fixture.state.db_connection.lock().unwrap();
            for cents in [10_000, 5_000] {
                create_transaction(
                    NewTransaction {
                        user_id: fixture.alice.id,
                        transaction_type: TransactionType::Expense,
                        amount: Amount::from_cents_unchecked(cents),
                        category_id: fixture.rent.id,
                        date: time::macros::date!(2024 - 01 - 15),
                        description: None,
                    },
                    &connection,
                )
                .unwrap();
            }
        }

        let Json(response) = get_budget_endpoint(
            State(fixture.state),
            Extension(fixture.alice.id),
            Ok(Path(budget_id)),
        )
        .await
        .unwrap();

        assert_eq!(response.progress.actual_expenses, 150.0);
        assert_eq!(response.progress.remaining, 850.0);
        assert_eq!(response.progress.percentage_used, 15.0);
    }

    #[tokio::test]
    async fn list_filters_by_year_and_category() {
        let fixture = get_fixture();
        add_budget(&fixture, 1, 2023, None);
        add_budget(&fixture, 1, 2024, None);
        let wanted = add_budget(&fixture, 1, 2024, Some(&fixture.rent));

        let Json(budgets) = list_budgets_endpoint(
            State(fixture.state),
            Extension(fixture.alice.id),
            Ok(Query(BudgetQuery {
                year: Some("2024".to_owned()),
                category: Some(fixture.rent.id.to_string()),
                ..Default::default()
            })),
        )
        .await
        .unwrap();

        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].budget.id, wanted);
    }

    #[tokio::test]
    async fn invalid_month_filter_is_a_field_error() {
        let fixture = get_fixture();

        let result = list_budgets_endpoint(
            State(fixture.state),
            Extension(fixture.alice.id),
            Ok(Query(BudgetQuery {
                month: Some("June".to_owned()),
                ..Default::default()
            })),
        )
        .await;

        assert_eq!(
            result.err(),
            Some(Error::invalid_field("month", "Enter a whole number."))
        );
    }

    #[tokio::test]
    async fn other_users_budget_is_not_found() {
        let fixture = get_fixture();
        let budget_id = add_budget(&fixture, 1, 2024, None);

        let result = get_budget_endpoint(
            State(fixture.state),
            Extension(fixture.bob.id),
            Ok(Path(budget_id)),
        )
        .await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn current_month_only_includes_this_month() {
        let fixture = get_fixture();
        let today = OffsetDateTime::now_utc().date();
        let this_month = u8::from(today.month());
        let other_month = this_month % 12 + 1;
        let year = today.year() as u16;
        let wanted = add_budget(&fixture, this_month, year, None);
        add_budget(&fixture, other_month, year, None);

        let Json(budgets) = current_month_budgets_endpoint(
            State(CurrentMonthState {
                db_connection: fixture.state.db_connection.clone(),
                local_timezone: "Etc/UTC".to_owned(),
            }),
            Extension(fixture.alice.id),
        )
        .await
        .unwrap();

        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].budget.id, wanted);
    }

    #[tokio::test]
    async fn repeated_current_month_requests_are_identical() {
        let fixture = get_fixture();
        let today = OffsetDateTime::now_utc().date();
        add_budget(&fixture, u8::from(today.month()), today.year() as u16, None);
        add_budget(
            &fixture,
            u8::from(today.month()),
            today.year() as u16,
            Some(&fixture.rent),
        );
        let state = CurrentMonthState {
            db_connection: fixture.state.db_connection.clone(),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let Json(first) =
            current_month_budgets_endpoint(State(state.clone()), Extension(fixture.alice.id))
                .await
                .unwrap();
        let Json(second) =
            current_month_budgets_endpoint(State(state), Extension(fixture.alice.id))
                .await
                .unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }
}
