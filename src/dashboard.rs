//! Defines the route handler for the dashboard, the landing page for logged
//! in users.
//!
//! The dashboard answers the one question the app exists for: how much can I
//! spend today without running out before payday?

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
    AppState, Error,
    budget::{BudgetSummary, summarise},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, base, currency_rounded_with_tooltip, format_currency,
    },
    navigation::NavBar,
    period::{Period, get_current_period},
    shared_templates::render,
    timezone::get_local_date,
    transaction::{Transaction, get_transactions_for_period},
    user::{User, UserId, get_user_by_id},
};

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/London".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the dashboard page.
///
/// Shows the daily spending allowance for the current budget period, or a
/// welcome prompt when the user has not started a period yet.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let today = match get_local_date(&state.local_timezone) {
        Some(date) => date,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire database lock");

    let user = match get_user_by_id(user_id, &connection) {
        Ok(user) => user,
        Err(error) => {
            tracing::error!("Could not get user {user_id}: {error}");
            return error.into_response();
        }
    };

    let period_data = match get_current_period(user_id, &connection) {
        Ok(Some(period)) => match get_transactions_for_period(period.id, &connection) {
            Ok(transactions) => Some((period, transactions)),
            Err(error) => {
                tracing::error!("Could not get transactions for user {user_id}: {error}");
                return error.into_response();
            }
        },
        Ok(None) => None,
        Err(error) => {
            tracing::error!("Could not get current period for user {user_id}: {error}");
            return error.into_response();
        }
    };

    let nav_bar = if user.is_admin() {
        NavBar::new(endpoints::DASHBOARD_VIEW).with_admin_link(endpoints::DASHBOARD_VIEW)
    } else {
        NavBar::new(endpoints::DASHBOARD_VIEW)
    };

    let body = match &period_data {
        Some((period, transactions)) => budget_view(period, transactions, &user, today),
        None => welcome_view(&user),
    };

    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl" { (body) }
        }
    };

    render(StatusCode::OK, base("Dashboard", &[], &content))
}

fn welcome_view(user: &User) -> Markup {
    html! {
        div class="text-center"
        {
            h1 class="text-2xl font-bold mb-4" { "Welcome, " (user.first_name) "!" }

            p class="mb-6"
            {
                "Start a budget period to see how much you can spend each day until payday."
            }

            div class="max-w-xs mx-auto"
            {
                a href=(endpoints::NEW_PERIOD_VIEW)
                {
                    button type="button" class=(BUTTON_PRIMARY_STYLE) { "Start a budget period" }
                }
            }
        }
    }
}

fn budget_view(
    period: &Period,
    transactions: &[Transaction],
    user: &User,
    today: Date,
) -> Markup {
    let summary = summarise(period, transactions, today);

    html! {
        h1 class="text-2xl font-bold mb-6" { "Dashboard" }

        (summary_cards(&summary, period, user))

        div class="grid grid-cols-1 sm:grid-cols-3 gap-4 my-6"
        {
            a href=(endpoints::NEW_TRANSACTION_VIEW)
            {
                button type="button" class=(BUTTON_PRIMARY_STYLE) { "Log a transaction" }
            }

            a href=(endpoints::NEW_PERIOD_VIEW)
            {
                button type="button" class=(BUTTON_SECONDARY_STYLE) { "Start a new period" }
            }

            button
                type="button"
                class=(BUTTON_SECONDARY_STYLE)
                hx-post=(endpoints::RESET_PERIOD)
                hx-target-error="#alert-container"
                hx-confirm="Reset your budget? This deletes all of your periods and transactions."
            {
                "Reset budget"
            }
        }

        (recent_transactions(transactions, user))
    }
}

fn summary_cards(summary: &BudgetSummary, period: &Period, user: &User) -> Markup {
    let card_style = "p-6 bg-white border border-gray-200 rounded-lg shadow-sm \
        dark:bg-gray-800 dark:border-gray-700";
    let day_label = if summary.days_remaining == 1 {
        "1 day left".to_owned()
    } else {
        format!("{} days left", summary.days_remaining)
    };

    html! {
        div class="grid grid-cols-1 sm:grid-cols-2 gap-4"
        {
            div class={(card_style) " sm:col-span-2 text-center"}
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "You can spend today" }

                p class="text-5xl font-bold my-2"
                {
                    (currency_rounded_with_tooltip(summary.daily_budget, user.currency))
                }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    (day_label) " until payday on " (period.end_date)
                }
            }

            div class=(card_style)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Left this period" }

                p class="text-2xl font-semibold mt-1"
                {
                    (format_currency(summary.total_remaining, user.currency))
                }
            }

            div class=(card_style)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Started with" }

                p class="text-2xl font-semibold mt-1"
                {
                    (format_currency(period.initial_budget + period.rollover, user.currency))
                }
            }
        }
    }
}

const RECENT_TRANSACTION_COUNT: usize = 5;

fn recent_transactions(transactions: &[Transaction], user: &User) -> Markup {
    html! {
        div class="flex items-center justify-between mb-2"
        {
            h2 class="text-lg font-semibold" { "Recent transactions" }

            a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
        }

        @if transactions.is_empty()
        {
            p { "Nothing logged this period yet." }
        }
        @else
        {
            ul class="divide-y divide-gray-200 dark:divide-gray-700"
            {
                @for transaction in transactions.iter().take(RECENT_TRANSACTION_COUNT)
                {
                    li class="py-3 flex items-center justify-between gap-4"
                    {
                        div
                        {
                            p class="font-medium" { (transaction.description) }

                            p class="text-sm text-gray-500 dark:text-gray-400"
                            {
                                (transaction.date) " · " (transaction.category.name())
                            }
                        }

                        div class="flex items-center gap-4"
                        {
                            span
                            {
                                (format_currency(transaction.signed_amount(), user.currency))
                            }

                            button
                                type="button"
                                class=(BUTTON_DELETE_STYLE)
                                hx-delete=(format_endpoint(
                                    endpoints::DELETE_TRANSACTION,
                                    transaction.id.as_i64(),
                                ))
                                hx-target="closest li"
                                hx-swap="outerHTML"
                                hx-target-error="#alert-container"
                                hx-confirm="Delete this transaction?"
                            {
                                "Delete"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod dashboard_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use time::Duration;

    use crate::{
        auth::PasswordHash,
        db::initialize,
        endpoints,
        period::create_period,
        test_utils::{assert_valid_html, parse_html_document},
        timezone::get_local_date,
        transaction::{Category, NewTransaction, TransactionKind, create_transaction},
        user::{UserId, create_user},
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_test_state() -> (DashboardState, UserId) {
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

        (
            DashboardState {
                local_timezone: "Etc/UTC".to_owned(),
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn dashboard_without_period_shows_welcome() {
        let (state, user_id) = get_test_state();

        let response = get_dashboard_page(State(state), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let text = document.root_element().text().collect::<String>();
        assert!(
            text.contains("Welcome, Foo!"),
            "expected welcome message, got {text}"
        );

        let link_selector =
            scraper::Selector::parse(&format!("a[href=\"{}\"]", endpoints::NEW_PERIOD_VIEW))
                .unwrap();
        assert!(
            document.select(&link_selector).next().is_some(),
            "expected a link to the new period page"
        );
    }

    #[tokio::test]
    async fn dashboard_shows_daily_budget() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let today = get_local_date("Etc/UTC").unwrap();
            let period = create_period(
                user_id,
                today + Duration::days(10),
                300.0,
                20.0,
                today,
                &connection,
            )
            .unwrap();
            create_transaction(
                NewTransaction {
                    user_id,
                    period_id: period.id,
                    kind: TransactionKind::Out,
                    amount: 20.0,
                    description: "lunch".to_owned(),
                    category: Category::FoodToiletries,
                    date: today,
                },
                &connection,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let text = document.root_element().text().collect::<String>();
        // (300 + 20 - 20) / 10 days = 30 per day
        assert!(
            text.contains("£30"),
            "expected daily budget of £30, got {text}"
        );
        assert!(
            text.contains("£300.00"),
            "expected total remaining of £300.00, got {text}"
        );
        assert!(text.contains("10 days left"), "got {text}");
        assert!(text.contains("lunch"), "got {text}");

        let reset_selector = scraper::Selector::parse(&format!(
            "button[hx-post=\"{}\"]",
            endpoints::RESET_PERIOD
        ))
        .unwrap();
        assert!(
            document.select(&reset_selector).next().is_some(),
            "expected a reset budget button"
        );

        let delete_selector = scraper::Selector::parse("button[hx-delete]").unwrap();
        assert_eq!(
            document.select(&delete_selector).count(),
            1,
            "expected a delete button for the listed transaction"
        );
    }
}
