//! Middleware that restricts routes to the admin user.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, endpoints,
    user::{UserId, get_user_by_id},
};

/// The state needed to check whether the logged in user is the admin.
#[derive(Debug, Clone)]
pub struct AdminGuardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AdminGuardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Middleware function that only lets the admin user through.
///
/// Must be layered inside [crate::auth::auth_guard] so the user ID extension
/// is present. Non-admin users are redirected to the dashboard.
pub async fn admin_guard(
    State(state): State<AdminGuardState>,
    request: Request,
    next: Next,
) -> Response {
    let user_id = match request.extensions().get::<UserId>() {
        Some(user_id) => *user_id,
        None => {
            tracing::error!("Admin guard ran without a user ID extension. Check the route layers.");
            return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
        }
    };

    let is_admin = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("Could not acquire database lock: {error}");
                return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
            }
        };

        match get_user_by_id(user_id, &connection) {
            Ok(user) => user.is_admin(),
            Err(error) => {
                tracing::error!("Could not get user {user_id}: {error}");
                false
            }
        }
    };

    if !is_admin {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod admin_guard_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Router, http::StatusCode, middleware, response::Html, routing::get,
    };
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        auth::PasswordHash,
        db::initialize,
        endpoints,
        user::{ADMIN_EMAIL, UserId, create_user},
    };

    use super::{AdminGuardState, admin_guard};

    async fn test_handler() -> Html<&'static str> {
        Html("<h1>Admin only</h1>")
    }

    fn get_test_server(acting_user_id: UserId, state: AdminGuardState) -> TestServer {
        let app = Router::new()
            .route(endpoints::ADMIN_USERS_VIEW, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state, admin_guard))
            .layer(Extension(acting_user_id));

        TestServer::new(app)
    }

    fn get_test_state_with_users() -> (AdminGuardState, UserId, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let admin = create_user(
            ADMIN_EMAIL,
            "Admin",
            "User",
            PasswordHash::new_unchecked("dummy"),
            &connection,
        )
        .unwrap();
        let other = create_user(
            "foo@bar.baz",
            "Foo",
            "Bar",
            PasswordHash::new_unchecked("dummy"),
            &connection,
        )
        .unwrap();

        (
            AdminGuardState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            admin.id,
            other.id,
        )
    }

    #[tokio::test]
    async fn admin_passes_through() {
        let (state, admin_id, _) = get_test_state_with_users();
        let server = get_test_server(admin_id, state);

        server
            .get(endpoints::ADMIN_USERS_VIEW)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn non_admin_is_redirected_to_dashboard() {
        let (state, _, other_id) = get_test_state_with_users();
        let server = get_test_server(other_id, state);

        let response = server.get(endpoints::ADMIN_USERS_VIEW).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }
}
