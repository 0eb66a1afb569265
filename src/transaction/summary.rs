//! The financial summary endpoint.

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    app_state::{DbState, lock_connection},
    auth::UserID,
    json::iso_date,
    transaction::{
        aggregation::{DateRange, FinancialSummary, summarize},
        db::get_summary_rows,
    },
};

/// The optional date bounds of a summary, both inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl SummaryQuery {
    /// Convert the inclusive query bounds into a half-open range.
    ///
    /// Dates that cannot be parsed are ignored rather than rejected.
    fn date_range(&self) -> DateRange {
        let parse = |raw: &Option<String>| -> Option<Date> {
            raw.as_deref().and_then(|raw| iso_date::parse(raw.trim()).ok())
        };

        DateRange {
            start: parse(&self.start_date),
            end: parse(&self.end_date).and_then(Date::next_day),
        }
    }
}

/// Summarize the current user's income and expenses.
pub async fn get_summary_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<FinancialSummary>, Error> {
    let Query(query) = query?;
    let range = query.date_range();

    let rows = {
        let connection = lock_connection(&state.db_connection)?;
        get_summary_rows(user_id, range, &connection)?
    };

    tracing::debug!("Summarizing {} transactions for user {user_id}", rows.len());

    Ok(Json(summarize(&rows)))
}
