//! Defines the route handler for the page for starting a new budget period.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;
use time::{Date, Duration};

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
        currency_input_styles,
    },
    navigation::NavBar,
    shared_templates::render,
    timezone::get_local_date,
    user::{UserId, get_user_by_id},
};

/// The state needed for the new period page.
#[derive(Debug, Clone)]
pub struct NewPeriodPageState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/London".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewPeriodPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for starting a new budget period.
///
/// The period always starts today, so the form only asks for the end date
/// (the next payday), the budget for the period and any rollover from the
/// previous period.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_new_period_page(
    State(state): State<NewPeriodPageState>,
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

    let today = match get_local_date(&state.local_timezone) {
        Some(date) => date,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };
    let min_end_date = today + Duration::days(1);

    let nav_bar = if user.is_admin() {
        NavBar::new(endpoints::NEW_PERIOD_VIEW).with_admin_link(endpoints::NEW_PERIOD_VIEW)
    } else {
        NavBar::new(endpoints::NEW_PERIOD_VIEW)
    };

    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-md"
            {
                h1 class="text-2xl font-bold mb-6" { "Start a budget period" }

                (new_period_form(min_end_date))
            }
        }
    };

    render(
        StatusCode::OK,
        base(
            "New Period",
            &[currency_input_styles(user.currency)],
            &content,
        ),
    )
}

fn new_period_form(min_end_date: Date) -> maud::Markup {
    html! {
        form
            hx-post=(endpoints::PERIODS_API)
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "Next payday" }

                input
                    type="date"
                    name="end_date"
                    id="end_date"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    min=(min_end_date)
                    value=(min_end_date);
            }

            div
            {
                label for="initial_budget" class=(FORM_LABEL_STYLE) { "Budget until payday" }

                input
                    type="number"
                    name="initial_budget"
                    id="initial_budget"
                    class={(FORM_TEXT_INPUT_STYLE) " currency-input"}
                    required
                    min="0.01"
                    step="0.01"
                    placeholder="0.00";
            }

            div
            {
                label for="rollover" class=(FORM_LABEL_STYLE) { "Rollover from last period" }

                input
                    type="number"
                    name="rollover"
                    id="rollover"
                    class={(FORM_TEXT_INPUT_STYLE) " currency-input"}
                    step="0.01"
                    value="0";
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Start period" }
        }
    }
}
