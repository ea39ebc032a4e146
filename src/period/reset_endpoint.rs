//! Defines the endpoint for resetting a user's budget.
//!
//! Resetting deletes all of the user's transactions and periods so they can
//! start over from a clean slate.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints, period::delete_periods_for_user,
    transaction::delete_transactions_for_user, user::UserId,
};

/// The state needed to reset a user's budget.
#[derive(Debug, Clone)]
pub struct ResetPeriodState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ResetPeriodState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that deletes all of the user's transactions and periods,
/// then redirects to the dashboard.
pub async fn reset_period(
    State(state): State<ResetPeriodState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    // Transactions first so a failure part way through cannot leave
    // transactions pointing at deleted periods.
    if let Err(error) = delete_transactions_for_user(user_id, &connection) {
        tracing::error!("Could not delete transactions for user {user_id}: {error}");
        return error.into_alert_response();
    }

    if let Err(error) = delete_periods_for_user(user_id, &connection) {
        tracing::error!("Could not delete periods for user {user_id}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod reset_period_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::Duration;

    use crate::{
        auth::PasswordHash,
        db::initialize,
        endpoints,
        period::{create_period, get_current_period},
        timezone::get_local_date,
        transaction::{
            Category, NewTransaction, TransactionKind, create_transaction,
            get_transactions_for_user,
        },
        user::{UserId, create_user},
    };

    use super::{ResetPeriodState, reset_period};

    fn get_test_state_with_data() -> (ResetPeriodState, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            "foo@bar.baz",
            "Foo",
            "Bar",
            PasswordHash::new_unchecked("dummy"),
            &connection,
        )
        .unwrap();
        let today = get_local_date("Etc/UTC").unwrap();
        let period = create_period(
            user.id,
            today + Duration::days(14),
            500.0,
            0.0,
            today,
            &connection,
        )
        .unwrap();
        create_transaction(
            NewTransaction {
                user_id: user.id,
                period_id: period.id,
                kind: TransactionKind::Out,
                amount: 12.5,
                description: "lunch".to_owned(),
                category: Category::FoodToiletries,
                date: today,
            },
            &connection,
        )
        .unwrap();

        (
            ResetPeriodState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn reset_deletes_periods_and_transactions() {
        let (state, user_id) = get_test_state_with_data();

        let response = reset_period(State(state.clone()), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::DASHBOARD_VIEW
        );

        let connection = state.db_connection.lock().unwrap();
        assert!(get_current_period(user_id, &connection).unwrap().is_none());
        assert!(
            get_transactions_for_user(user_id, &connection)
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn reset_with_no_data_still_redirects() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            "foo@bar.baz",
            "Foo",
            "Bar",
            PasswordHash::new_unchecked("dummy"),
            &connection,
        )
        .unwrap();
        let state = ResetPeriodState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = reset_period(State(state), Extension(user.id)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
