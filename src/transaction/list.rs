//! Endpoints for reading transactions.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{
        FromRef, Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::Uri,
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error,
    amount::{cents_at_least, cents_at_most},
    app_state::{DbState, lock_connection},
    auth::UserID,
    category::{parse_category_filter, parse_type_filter},
    json::iso_date,
    pagination::{Page, PaginationConfig},
    transaction::{
        db::{TransactionFilter, count_transactions, get_user_transaction, query_transactions},
        domain::{Transaction, TransactionId},
    },
};

/// The state needed for listing transactions.
#[derive(Debug, Clone)]
pub struct TransactionListState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to page the transactions.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionListState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters for listing transactions.
///
/// Values are kept as strings so that each one can be reported against its own name.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub amount_min: Option<String>,
    pub amount_max: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Treat a missing or empty query parameter as no value.
fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn parse_date_filter(
    raw: &Option<String>,
    field: &'static str,
) -> Result<Option<time::Date>, Error> {
    non_empty(raw)
        .map(|value| {
            iso_date::parse(value).map_err(|_| Error::invalid_field(field, "Enter a valid date."))
        })
        .transpose()
}

fn parse_number<T: FromStr>(raw: &Option<String>, field: &'static str) -> Result<Option<T>, Error> {
    non_empty(raw)
        .map(|value| {
            value
                .parse()
                .map_err(|_| Error::invalid_field(field, "Enter a number."))
        })
        .transpose()
}

/// Saturate amounts too large for an `i64` number of cents.
fn clamp_cents(amount: Decimal, cents: Option<i64>) -> i64 {
    cents.unwrap_or(if amount.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

impl TransactionQuery {
    /// Validate the filter parameters.
    ///
    /// Amount bounds are rounded inwards to whole cents, so `amount_min=10.005`
    /// matches 10.01 and up.
    fn filter(&self) -> Result<TransactionFilter, Error> {
        let amount_min: Option<Decimal> = parse_number(&self.amount_min, "amount_min")?;
        let amount_max: Option<Decimal> = parse_number(&self.amount_max, "amount_max")?;

        Ok(TransactionFilter {
            date_from: parse_date_filter(&self.date_from, "date_from")?,
            date_to: parse_date_filter(&self.date_to, "date_to")?,
            amount_min_cents: amount_min.map(|amount| clamp_cents(amount, cents_at_least(amount))),
            amount_max_cents: amount_max.map(|amount| clamp_cents(amount, cents_at_most(amount))),
            category_id: parse_category_filter(non_empty(&self.category))?,
            transaction_type: parse_type_filter(non_empty(&self.transaction_type))?,
        })
    }

    /// The requested page number, a page that is not a positive integer does not exist.
    fn page(&self) -> Result<Option<u64>, Error> {
        non_empty(&self.page)
            .map(|value| value.parse().map_err(|_| Error::InvalidPage))
            .transpose()
    }

    /// The requested page size, an invalid size falls back to the default.
    fn page_size(&self) -> Option<u64> {
        non_empty(&self.page_size).and_then(|value| value.parse().ok())
    }
}

/// List one page of the current user's transactions.
///
/// The results can be filtered by date, amount, category and type, and ordered
/// with the `ordering` parameter. The default order is newest first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionListState>,
    Extension(user_id): Extension<UserID>,
    uri: Uri,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<Page<Transaction>>, Error> {
    let Query(query) = query?;
    let filter = query.filter()?;
    let page_request = state
        .pagination_config
        .page_request(query.page()?, query.page_size())?;

    let connection = lock_connection(&state.db_connection)?;
    let count = count_transactions(user_id, &filter, &connection)?;
    page_request.check_in_range(count)?;

    let transactions = query_transactions(
        user_id,
        &filter,
        query.ordering.as_deref(),
        page_request,
        &connection,
    )?;

    Ok(Json(Page::new(transactions, count, page_request, &uri)))
}

/// Get one of the current user's transactions.
pub async fn get_transaction_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<TransactionId>, PathRejection>,
) -> Result<Json<Transaction>, Error> {
    let Path(transaction_id) = path?;
    let connection = lock_connection(&state.db_connection)?;

    get_user_transaction(transaction_id, user_id, &connection).map(Json)
}
