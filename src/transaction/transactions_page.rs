//! Defines the route handler for the page that lists the current budget
//! period's transactions.

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
    AppState,
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
    period::get_current_period,
    shared_templates::render,
    transaction::{Transaction, TransactionKind, get_transactions_for_period},
    user::{User, UserId, get_user_by_id},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page listing the current period's transactions, newest first.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
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

    let transactions = match get_current_period(user_id, &connection) {
        Ok(Some(period)) => match get_transactions_for_period(period.id, &connection) {
            Ok(transactions) => Some(transactions),
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
        NavBar::new(endpoints::TRANSACTIONS_VIEW).with_admin_link(endpoints::TRANSACTIONS_VIEW)
    } else {
        NavBar::new(endpoints::TRANSACTIONS_VIEW)
    };

    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl"
            {
                div class="flex items-center justify-between mb-6"
                {
                    h1 class="text-2xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "Log a transaction" }
                }

                @match &transactions {
                    None => p {
                        "No budget period yet. "
                        (link(endpoints::NEW_PERIOD_VIEW, "Start one"))
                        " to begin logging transactions."
                    },
                    Some(transactions) if transactions.is_empty() => p {
                        "Nothing logged this period yet."
                    },
                    Some(transactions) => (transaction_table(transactions, &user)),
                }
            }
        }
    };

    render(StatusCode::OK, base("Transactions", &[], &content))
}

fn transaction_table(transactions: &[Transaction], user: &User) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md sm:rounded-lg"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) {
                            span class="sr-only" { "Delete" }
                        }
                    }
                }

                tbody
                {
                    @for transaction in transactions
                    {
                        (transaction_row(transaction, user))
                    }
                }
            }
        }
    }
}

fn transaction_row(transaction: &Transaction, user: &User) -> Markup {
    let delete_url = format_endpoint(
        endpoints::DELETE_TRANSACTION,
        transaction.id.as_i64(),
    );
    let amount_style = match transaction.kind {
        TransactionKind::In => "text-green-600 dark:text-green-400",
        TransactionKind::Out => "",
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }
            td class=(TABLE_CELL_STYLE) {
                span class=(BADGE_STYLE) { (transaction.kind.label()) }
            }
            td class={(TABLE_CELL_STYLE) " " (amount_style)} {
                (format_currency(transaction.signed_amount(), user.currency))
            }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE) { (transaction.category.name()) }
            td class=(TABLE_CELL_STYLE) {
                button
                    type="button"
                    class=(BUTTON_DELETE_STYLE)
                    hx-delete=(delete_url)
                    hx-target="closest tr"
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

#[cfg(test)]
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use time::Duration;

    use crate::{
        auth::PasswordHash,
        db::initialize,
        endpoints::{self, format_endpoint},
        period::create_period,
        test_utils::{assert_valid_html, parse_html_document},
        timezone::get_local_date,
        transaction::{Category, NewTransaction, TransactionKind, create_transaction},
        user::{UserId, create_user},
    };

    use super::{TransactionsPageState, get_transactions_page};

    fn get_test_state() -> (TransactionsPageState, UserId) {
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
            TransactionsPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn page_without_period_prompts_to_create_one() {
        let (state, user_id) = get_test_state();

        let response = get_transactions_page(State(state), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let link_selector =
            scraper::Selector::parse(&format!("a[href=\"{}\"]", endpoints::NEW_PERIOD_VIEW))
                .unwrap();
        assert!(
            document.select(&link_selector).next().is_some(),
            "expected a link to the new period page"
        );
    }

    #[tokio::test]
    async fn page_lists_current_period_transactions_with_delete_buttons() {
        let (state, user_id) = get_test_state();
        let transaction_id = {
            let connection = state.db_connection.lock().unwrap();
            let today = get_local_date("Etc/UTC").unwrap();
            let period = create_period(
                user_id,
                today + Duration::days(14),
                500.0,
                0.0,
                today,
                &connection,
            )
            .unwrap();
            create_transaction(
                NewTransaction {
                    user_id,
                    period_id: period.id,
                    kind: TransactionKind::Out,
                    amount: 12.5,
                    description: "lunch".to_owned(),
                    category: Category::FoodToiletries,
                    date: today,
                },
                &connection,
            )
            .unwrap()
            .id
        };

        let response = get_transactions_page(State(state), Extension(user_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let row_selector = scraper::Selector::parse("tbody tr").unwrap();
        assert_eq!(document.select(&row_selector).count(), 1, "want 1 table row");

        let delete_url = format_endpoint(endpoints::DELETE_TRANSACTION, transaction_id.as_i64());
        let button_selector =
            scraper::Selector::parse(&format!("button[hx-delete=\"{delete_url}\"]")).unwrap();
        assert!(
            document.select(&button_selector).next().is_some(),
            "expected a delete button targeting {delete_url}"
        );

        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("lunch"));
        assert!(text.contains("Food/toiletries"));
        assert!(text.contains("Money Out"));
    }
}
