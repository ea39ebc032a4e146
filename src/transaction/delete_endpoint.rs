//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{Html, IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    transaction::{TransactionId, delete_transaction},
    user::UserId,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// Only the owning user's transactions are deleted, a transaction ID
/// belonging to someone else behaves the same as a missing one.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(0) => Error::DeleteMissingTransaction.into_alert_response(),
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(_) => Html("").into_response(),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::Duration;

    use crate::{
        auth::PasswordHash,
        db::initialize,
        period::create_period,
        timezone::get_local_date,
        transaction::{
            Category, NewTransaction, TransactionId, TransactionKind, create_transaction,
            get_transactions_for_user,
        },
        user::{UserId, create_user},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    fn get_test_state_with_transaction() -> (DeleteTransactionState, UserId, TransactionId) {
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
        let transaction = create_transaction(
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
            DeleteTransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
            transaction.id,
        )
    }

    #[tokio::test]
    async fn deletes_transaction() {
        let (state, user_id, transaction_id) = get_test_state_with_transaction();

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(transaction_id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert!(
            get_transactions_for_user(user_id, &connection)
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn deleting_missing_transaction_returns_not_found() {
        let (state, user_id, _) = get_test_state_with_transaction();

        let response = delete_transaction_endpoint(
            State(state),
            Extension(user_id),
            Path(TransactionId::new(999)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cannot_delete_another_users_transaction() {
        let (state, _, transaction_id) = get_test_state_with_transaction();
        let other_user_id = {
            let connection = state.db_connection.lock().unwrap();
            create_user(
                "other@bar.baz",
                "Other",
                "User",
                PasswordHash::new_unchecked("dummy"),
                &connection,
            )
            .unwrap()
            .id
        };

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(other_user_id),
            Path(transaction_id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
