//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/users/:user_id', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying the current budget period's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for creating a new budget period.
pub const NEW_PERIOD_VIEW: &str = "/periods/new";
/// The page for viewing reports and exporting transactions.
pub const REPORTS_VIEW: &str = "/reports";
/// The page for account settings.
pub const SETTINGS_VIEW: &str = "/settings";
/// The admin page for listing all registered users.
pub const ADMIN_USERS_VIEW: &str = "/admin/users";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/log_out";
/// The route to create users.
pub const USERS: &str = "/api/users";
/// The route to create a budget period.
pub const PERIODS_API: &str = "/api/periods";
/// The route to reset the budget by deleting the user's transactions and periods.
pub const RESET_PERIOD: &str = "/api/periods/reset";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to delete a single transaction.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to download all of the user's transactions as a CSV file.
pub const EXPORT_CSV: &str = "/api/reports/export";
/// The route to update the user's preferred currency.
pub const CURRENCY_API: &str = "/api/settings/currency";
/// The route to delete the user's account and data.
pub const DELETE_ACCOUNT: &str = "/api/settings/delete_account";
/// The route for the admin to delete a user and their data.
pub const DELETE_ADMIN_USER: &str = "/api/admin/users/{user_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
