//! Defines the endpoint for logging a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    alert::AlertTemplate,
    endpoints,
    period::get_current_period,
    shared_templates::render,
    transaction::{Category, NewTransaction, TransactionKind, create_transaction},
    user::UserId,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for logging a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Whether the transaction is money in or money out.
    pub kind: TransactionKind,
    /// The amount of money spent or earned. Must be positive.
    pub amount: f64,
    /// A text description of what the transaction was for.
    #[serde(default)]
    pub description: String,
    /// The display name of the spending category.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
}

/// A route handler for logging a transaction against the user's current
/// budget period, redirects to the transactions view on success.
///
/// Transactions can only be logged while a budget period exists, so that
/// every transaction counts against a budget.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let category = match Category::from_name(&form.category) {
        Some(category) => category,
        None => {
            return render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Unknown category",
                    &format!("{} is not a valid category.", form.category),
                )
                .into_markup(),
            );
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let period = match get_current_period(user_id, &connection) {
        Ok(Some(period)) => period,
        Ok(None) => return Error::NoCurrentPeriod.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not get current period for user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    let new_transaction = NewTransaction {
        user_id,
        period_id: period.id,
        kind: form.kind,
        amount: form.amount,
        description: form.description,
        category,
        date: form.date,
    };

    match create_transaction(new_transaction, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            if !matches!(error, Error::NonPositiveAmount(_)) {
                tracing::error!("Could not create transaction: {error}");
            }
            error.into_alert_response()
        }
    }
}
