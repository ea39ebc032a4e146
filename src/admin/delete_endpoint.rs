//! Defines the admin endpoint for deleting a user and all of their data.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::AlertTemplate,
    period::delete_periods_for_user,
    shared_templates::render,
    transaction::delete_transactions_for_user,
    user::{UserId, delete_user},
};

/// The state needed to delete a user as the admin.
#[derive(Debug, Clone)]
pub struct DeleteAdminUserState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAdminUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a user and all of their data.
///
/// The admin cannot delete their own account here, that is what the settings
/// page is for.
pub async fn delete_user_endpoint(
    State(state): State<DeleteAdminUserState>,
    Extension(acting_user_id): Extension<UserId>,
    Path(user_id): Path<UserId>,
) -> Response {
    if user_id == acting_user_id {
        return render(
            StatusCode::BAD_REQUEST,
            AlertTemplate::error(
                "Could not delete user",
                "You cannot delete your own account from the admin page. \
                Use the settings page instead.",
            )
            .into_markup(),
        );
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = delete_transactions_for_user(user_id, &connection) {
        tracing::error!("Could not delete transactions for user {user_id}: {error}");
        return error.into_alert_response();
    }

    if let Err(error) = delete_periods_for_user(user_id, &connection) {
        tracing::error!("Could not delete periods for user {user_id}: {error}");
        return error.into_alert_response();
    }

    match delete_user(user_id, &connection) {
        Ok(0) => Error::DeleteMissingUser.into_alert_response(),
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(_) => Html("").into_response(),
        Err(error) => {
            tracing::error!("Could not delete user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}
