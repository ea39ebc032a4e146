//! The reports page and the CSV export of the user's transaction history.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    shared_templates::render,
    timezone::get_local_date,
    transaction::{Transaction, get_transactions_for_user},
    user::{UserId, get_user_by_id},
};

/// The state needed for the reports page and the CSV export.
#[derive(Debug, Clone)]
pub struct ReportsState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/London".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the reports page.
///
/// Shows a lifetime summary of money in and out across every period, with a
/// button to download the full transaction history as CSV.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_reports_page(
    State(state): State<ReportsState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire database lock");

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => {
            tracing::error!("Could not get user {user_id}: {error}");
            return error.into_response();
        }
    };

    let transactions = match get_transactions_for_user(user_id, &connection) {
        Ok(transactions) => transactions,
        Err(error) => {
            tracing::error!("Could not get transactions for user {user_id}: {error}");
            return error.into_response();
        }
    };

    let total_in: f64 = transactions
        .iter()
        .filter(|transaction| transaction.signed_amount() > 0.0)
        .map(|transaction| transaction.amount)
        .sum();
    let total_out: f64 = transactions
        .iter()
        .filter(|transaction| transaction.signed_amount() < 0.0)
        .map(|transaction| transaction.amount)
        .sum();

    let nav_bar = if user.is_admin() {
        NavBar::new(endpoints::REPORTS_VIEW).with_admin_link(endpoints::REPORTS_VIEW)
    } else {
        NavBar::new(endpoints::REPORTS_VIEW)
    };

    let card_style = "p-6 bg-white border border-gray-200 rounded-lg shadow-sm \
        dark:bg-gray-800 dark:border-gray-700";

    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl"
            {
                h1 class="text-2xl font-bold mb-6" { "Reports" }

                div class="grid grid-cols-1 sm:grid-cols-3 gap-4 mb-6"
                {
                    div class=(card_style)
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400" { "Transactions logged" }

                        p class="text-2xl font-semibold mt-1" { (transactions.len()) }
                    }

                    div class=(card_style)
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400" { "Money in" }

                        p class="text-2xl font-semibold mt-1"
                        {
                            (format_currency(total_in, user.currency))
                        }
                    }

                    div class=(card_style)
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400" { "Money out" }

                        p class="text-2xl font-semibold mt-1"
                        {
                            (format_currency(total_out, user.currency))
                        }
                    }
                }

                div class="max-w-xs"
                {
                    a href=(endpoints::EXPORT_CSV) download
                    {
                        button type="button" class=(BUTTON_PRIMARY_STYLE) { "Download CSV" }
                    }
                }
            }
        }
    };

    render(StatusCode::OK, base("Reports", &[], &content))
}

const CSV_HEADERS: [&str; 5] = ["Date", "Type", "Amount", "Description", "Category"];

fn write_transactions_csv(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADERS)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for transaction in transactions {
        writer
            .write_record([
                transaction.date.to_string().as_str(),
                transaction.kind.as_str(),
                &format!("{:.2}", transaction.amount),
                &transaction.description,
                transaction.category.name(),
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

/// A route handler that downloads all of the user's transactions, across
/// every period, as a CSV file.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn export_transactions_csv(
    State(state): State<ReportsState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let today = match get_local_date(&state.local_timezone) {
        Some(date) => date,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire database lock");

        match get_transactions_for_user(user_id, &connection) {
            Ok(transactions) => transactions,
            Err(error) => {
                tracing::error!("Could not get transactions for user {user_id}: {error}");
                return error.into_response();
            }
        }
    };

    let csv_bytes = match write_transactions_csv(&transactions) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not write CSV export for user {user_id}: {error}");
            return error.into_response();
        }
    };

    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"transactions_{today}.csv\""),
            ),
        ],
        csv_bytes,
    )
        .into_response()
}
