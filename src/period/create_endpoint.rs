//! Defines the endpoint for creating a new budget period.

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
    AppState, Error, endpoints, period::create_period, timezone::get_local_date, user::UserId,
};

/// The state needed to create a budget period.
#[derive(Debug, Clone)]
pub struct CreatePeriodState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/London".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreatePeriodState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a budget period.
#[derive(Debug, Deserialize)]
pub struct PeriodForm {
    /// The next payday. The period runs from today up to this date.
    pub end_date: Date,
    /// The amount of money available for the whole period.
    pub initial_budget: f64,
    /// Money carried over from the previous period. Defaults to zero.
    pub rollover: Option<f64>,
}

/// A route handler for starting a new budget period, redirects to the
/// dashboard on success.
///
/// The new period becomes the current one because it has the latest start
/// date. Older periods are kept for the user's records.
pub async fn create_period_endpoint(
    State(state): State<CreatePeriodState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<PeriodForm>,
) -> Response {
    let today = match get_local_date(&state.local_timezone) {
        Some(date) => date,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_period(
        user_id,
        form.end_date,
        form.initial_budget,
        form.rollover.unwrap_or(0.0),
        today,
        &connection,
    ) {
        Ok(_) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            if !matches!(error, Error::EndDateNotInFuture(_)) {
                tracing::error!("Could not create period with {form:?}: {error}");
            }
            error.into_alert_response()
        }
    }
}
