//! Defines the route handler for the admin page that lists every registered
//! user.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    shared_templates::render,
    user::{User, UserId, get_all_users},
};

/// The state needed for the admin users page.
#[derive(Debug, Clone)]
pub struct AdminUsersPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AdminUsersPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn count_transactions(user_id: UserId, connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(*) FROM transaction_entry WHERE user_id = :user_id",
            &[(":user_id", &user_id.as_i64())],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Renders the admin page listing every registered user, oldest account
/// first.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_admin_users_page(
    State(state): State<AdminUsersPageState>,
    Extension(acting_user_id): Extension<UserId>,
) -> Response {
    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire database lock");

    let users = match get_all_users(&connection) {
        Ok(users) => users,
        Err(error) => {
            tracing::error!("Could not list users: {error}");
            return error.into_response();
        }
    };

    let mut rows = Vec::with_capacity(users.len());
    for user in &users {
        let transaction_count = match count_transactions(user.id, &connection) {
            Ok(count) => count,
            Err(error) => {
                tracing::error!("Could not count transactions for user {}: {error}", user.id);
                return error.into_response();
            }
        };

        rows.push(user_row(user, transaction_count, acting_user_id));
    }

    // The admin guard only lets the admin user through.
    let nav_bar = NavBar::new(endpoints::ADMIN_USERS_VIEW).with_admin_link(endpoints::ADMIN_USERS_VIEW);

    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl"
            {
                h1 class="text-2xl font-bold mb-2" { "Users" }

                p class="mb-6 text-sm text-gray-500 dark:text-gray-400"
                {
                    "Total users: " (users.len())
                }

                div class="relative overflow-x-auto shadow-md sm:rounded-lg"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Email" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Joined" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Last login" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Transactions" }
                                th scope="col" class=(TABLE_CELL_STYLE) {
                                    span class="sr-only" { "Delete" }
                                }
                            }
                        }

                        tbody
                        {
                            @for row in rows { (row) }
                        }
                    }
                }
            }
        }
    };

    render(StatusCode::OK, base("Users", &[], &content))
}

fn user_row(user: &User, transaction_count: i64, acting_user_id: UserId) -> Markup {
    let delete_url = format_endpoint(endpoints::DELETE_ADMIN_USER, user.id.as_i64());
    let last_login = user
        .last_login_at
        .map(|datetime| datetime.date().to_string())
        .unwrap_or_else(|| "never".to_owned());

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (user.email) }
            td class=(TABLE_CELL_STYLE) { (user.first_name) " " (user.last_name) }
            td class=(TABLE_CELL_STYLE) { (user.created_at.date()) }
            td class=(TABLE_CELL_STYLE) { (last_login) }
            td class=(TABLE_CELL_STYLE) { (transaction_count) }
            td class=(TABLE_CELL_STYLE) {
                @if user.id != acting_user_id
                {
                    button
                        type="button"
                        class=(BUTTON_DELETE_STYLE)
                        hx-delete=(delete_url)
                        hx-target="closest tr"
                        hx-swap="outerHTML"
                        hx-target-error="#alert-container"
                        hx-confirm={
                            "Delete " (user.email) " and all of their data? This cannot be undone."
                        }
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}
