//! The API endpoints URIs.
//!
//! Paths end with a slash, which clients must include.
//! For endpoints that take a parameter, e.g., '/api/categories/{category_id}/', use [format_endpoint].

/// The route for registering a new user.
pub const REGISTER: &str = "/api/auth/register/";
/// The route for logging in a user and getting their auth token.
pub const LOG_IN: &str = "/api/auth/login/";
/// The route for logging out the current user, which deletes their auth token.
pub const LOG_OUT: &str = "/api/auth/logout/";
/// The route for getting the details of the current user.
pub const CURRENT_USER: &str = "/api/auth/user/";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories/";
/// The route to access a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}/";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions/";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}/";
/// The route for the income and expense summary of the current user.
pub const TRANSACTION_SUMMARY: &str = "/api/transactions/summary/";
/// The route to list and create budgets.
pub const BUDGETS: &str = "/api/budgets/";
/// The route to access a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}/";
/// The route for the budgets of the current month.
pub const CURRENT_MONTH_BUDGETS: &str = "/api/budgets/current_month/";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/budgets/{budget_id}/', '{budget_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
