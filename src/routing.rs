//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    middleware,
    response::Redirect,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    admin::{admin_guard, delete_user_endpoint, get_admin_users_page},
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    period::{create_period_endpoint, get_new_period_page, reset_period},
    reports::{export_transactions_csv, get_reports_page},
    settings::{delete_account, get_settings_page, post_currency},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_new_transaction_page,
        get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::NEW_PERIOD_VIEW, get(get_new_period_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_new_transaction_page),
        )
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::SETTINGS_VIEW, get(get_settings_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::PERIODS_API, post(create_period_endpoint))
            .route(endpoints::RESET_PERIOD, post(reset_period))
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction_endpoint),
            )
            .route(
                endpoints::DELETE_TRANSACTION,
                delete(delete_transaction_endpoint),
            )
            .route(endpoints::EXPORT_CSV, get(export_transactions_csv))
            .route(endpoints::CURRENCY_API, post(post_currency))
            .route(endpoints::DELETE_ACCOUNT, post(delete_account))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    // The admin guard runs after the auth guard, it needs the user ID
    // extension the auth guard inserts.
    let admin_routes = Router::new()
        .route(endpoints::ADMIN_USERS_VIEW, get(get_admin_users_page))
        .layer(middleware::from_fn_with_state(state.clone(), admin_guard))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard))
        .merge(
            Router::new()
                .route(endpoints::DELETE_ADMIN_USER, delete(delete_user_endpoint))
                .layer(middleware::from_fn_with_state(state.clone(), admin_guard))
                .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
        );

    protected_routes
        .merge(unprotected_routes)
        .merge(admin_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
