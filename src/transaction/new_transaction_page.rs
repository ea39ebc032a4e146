//! Defines the route handler for the page for logging a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
        currency_input_styles,
    },
    navigation::NavBar,
    shared_templates::render,
    timezone::get_local_date,
    transaction::{Category, TransactionKind},
    user::{UserId, get_user_by_id},
};

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/London".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for logging a transaction.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_new_transaction_page(
    State(state): State<NewTransactionPageState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire database lock");

        match get_user_by_id(user_id, &connection) {
            Ok(user) => user,
            Err(error) => {
                tracing::error!("Could not get user {user_id}: {error}");
                return error.into_response();
            }
        }
    };

    let max_date = match get_local_date(&state.local_timezone) {
        Some(date) => date,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    let nav_bar = if user.is_admin() {
        NavBar::new(endpoints::NEW_TRANSACTION_VIEW).with_admin_link(endpoints::NEW_TRANSACTION_VIEW)
    } else {
        NavBar::new(endpoints::NEW_TRANSACTION_VIEW)
    };

    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-md"
            {
                h1 class="text-2xl font-bold mb-6" { "Log a transaction" }

                (new_transaction_form(max_date))
            }
        }
    };

    render(
        StatusCode::OK,
        base(
            "New Transaction",
            &[currency_input_styles(user.currency)],
            &content,
        ),
    )
}

fn kind_radio(kind: TransactionKind, checked: bool) -> Markup {
    let id = format!("kind-{}", kind.as_str());

    html! {
        div class="flex items-center gap-2"
        {
            input
                type="radio"
                name="kind"
                id=(id)
                value=(kind.as_str())
                class=(FORM_RADIO_INPUT_STYLE)
                checked[checked];

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (kind.label()) }
        }
    }
}

fn new_transaction_form(max_date: Date) -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            fieldset class=(FORM_RADIO_GROUP_STYLE)
            {
                legend class=(FORM_LABEL_STYLE) { "Type" }

                (kind_radio(TransactionKind::Out, true))
                (kind_radio(TransactionKind::In, false))
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    type="number"
                    name="amount"
                    id="amount"
                    class={(FORM_TEXT_INPUT_STYLE) " currency-input"}
                    required
                    min="0.01"
                    step="0.01"
                    placeholder="0.00";
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    type="text"
                    name="description"
                    id="description"
                    class=(FORM_TEXT_INPUT_STYLE)
                    placeholder="e.g. weekly shop";
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select
                    name="category"
                    id="category"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                {
                    @for category in Category::ALL
                    {
                        option value=(category.name()) { (category.name()) }
                    }
                }
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    type="date"
                    name="date"
                    id="date"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    max=(max_date)
                    value=(max_date);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log transaction" }
        }
    }
}
