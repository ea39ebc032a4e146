//! The account settings page: currency preference and account deletion.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::AlertTemplate,
    auth::invalidate_auth_cookie,
    currency::Currency,
    endpoints,
    html::{
        BUTTON_DANGER_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
    period::delete_periods_for_user,
    shared_templates::render,
    transaction::delete_transactions_for_user,
    user::{UserId, delete_user, get_user_by_id, set_currency},
};

/// The state needed for the settings page and the currency endpoint.
#[derive(Debug, Clone)]
pub struct SettingsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the settings page.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_settings_page(
    State(state): State<SettingsState>,
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

    let nav_bar = if user.is_admin() {
        NavBar::new(endpoints::SETTINGS_VIEW).with_admin_link(endpoints::SETTINGS_VIEW)
    } else {
        NavBar::new(endpoints::SETTINGS_VIEW)
    };

    let content = maud::html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-8"
            {
                h1 class="text-2xl font-bold" { "Settings" }

                section
                {
                    h2 class="text-lg font-semibold mb-4" { "Currency" }

                    form
                        hx-post=(endpoints::CURRENCY_API)
                        hx-target="#alert-container"
                        hx-target-error="#alert-container"
                        class="space-y-4"
                    {
                        fieldset class=(FORM_RADIO_GROUP_STYLE)
                        {
                            legend class=(FORM_LABEL_STYLE)
                            {
                                "Currency used to display amounts"
                            }

                            @for currency in Currency::ALL
                            {
                                div class="flex items-center gap-2"
                                {
                                    input
                                        type="radio"
                                        name="currency"
                                        id={"currency-" (currency.code())}
                                        value=(currency.code())
                                        class=(FORM_RADIO_INPUT_STYLE)
                                        checked[currency == user.currency];

                                    label
                                        for={"currency-" (currency.code())}
                                        class=(FORM_RADIO_LABEL_STYLE)
                                    {
                                        (currency.symbol()) " " (currency.name())
                                    }
                                }
                            }
                        }

                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                    }
                }

                section
                {
                    h2 class="text-lg font-semibold mb-4 text-red-600 dark:text-red-500"
                    {
                        "Danger zone"
                    }

                    p class="mb-4 text-sm"
                    {
                        "Deleting your account removes your profile and every \
                        period and transaction you have logged. This cannot be undone."
                    }

                    button
                        type="button"
                        class=(BUTTON_DANGER_STYLE)
                        hx-post=(endpoints::DELETE_ACCOUNT)
                        hx-target-error="#alert-container"
                        hx-confirm="Delete your account and all of its data? This cannot be undone."
                    {
                        "Delete account"
                    }
                }
            }
        }
    };

    render(StatusCode::OK, base("Settings", &[], &content))
}

/// The form data for updating the preferred currency.
#[derive(Debug, Deserialize)]
pub struct CurrencyForm {
    /// The ISO 4217 code of the chosen currency.
    pub currency: String,
}

/// A route handler that updates the user's preferred currency.
pub async fn post_currency(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<CurrencyForm>,
) -> Response {
    let currency = match Currency::from_code(&form.currency) {
        Some(currency) => currency,
        None => {
            return render(
                StatusCode::BAD_REQUEST,
                AlertTemplate::error(
                    "Unknown currency",
                    &format!("{} is not a supported currency.", form.currency),
                )
                .into_markup(),
            );
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_currency(user_id, currency, &connection) {
        Ok(_) => render(
            StatusCode::OK,
            AlertTemplate::success(
                "Currency updated",
                &format!("Amounts are now shown in {}.", currency.name()),
            )
            .into_markup(),
        ),
        Err(error) => {
            tracing::error!("Could not set currency for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// The state needed to delete an account.
///
/// Deleting an account logs the user out, so this state also carries the
/// cookie key.
#[derive(Debug, Clone)]
pub struct DeleteAccountState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<DeleteAccountState> for Key {
    fn from_ref(state: &DeleteAccountState) -> Self {
        state.cookie_key.clone()
    }
}

/// A route handler that deletes the user's account and all of their data,
/// then logs them out and redirects to the registration page.
///
/// The deletes are best-effort and sequential. A failure part way through
/// leaves the remaining data in place and reports an error, the user can
/// retry.
pub async fn delete_account(
    State(state): State<DeleteAccountState>,
    Extension(user_id): Extension<UserId>,
    jar: PrivateCookieJar,
) -> Response {
    {
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
            Ok(0) => return Error::DeleteMissingUser.into_alert_response(),
            Ok(_) => {}
            Err(error) => {
                tracing::error!("Could not delete user {user_id}: {error}");
                return error.into_alert_response();
            }
        }
    }

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::REGISTER_VIEW.to_owned()),
        invalidate_auth_cookie(jar),
    )
        .into_response()
}

#[cfg(test)]
mod settings_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        auth::PasswordHash,
        currency::Currency,
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        user::create_user,
    };

    use super::{SettingsState, get_settings_page};

    #[tokio::test]
    async fn settings_page_shows_currency_options_with_default_selected() {
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
        let state = SettingsState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_settings_page(State(state), Extension(user.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let radio_selector = scraper::Selector::parse("input[type=radio][name=currency]").unwrap();
        let radios = document.select(&radio_selector).collect::<Vec<_>>();
        assert_eq!(radios.len(), Currency::ALL.len());

        let checked = radios
            .iter()
            .filter(|radio| radio.value().attr("checked").is_some())
            .collect::<Vec<_>>();
        assert_eq!(checked.len(), 1, "want exactly 1 checked radio");
        assert_eq!(
            checked[0].value().attr("value"),
            Some(Currency::default().code()),
            "new accounts should default to {}",
            Currency::default().code()
        );
    }
}

#[cfg(test)]
mod currency_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        auth::PasswordHash,
        currency::Currency,
        db::initialize,
        user::{UserId, create_user, get_user_by_id},
    };

    use super::{CurrencyForm, SettingsState, post_currency};

    fn get_test_state() -> (SettingsState, UserId) {
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
            SettingsState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn updates_currency() {
        let (state, user_id) = get_test_state();
        let form = CurrencyForm {
            currency: "USD".to_owned(),
        };

        let response = post_currency(State(state.clone()), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_id(user_id, &connection).unwrap();
        assert_eq!(user.currency, Currency::Usd);
    }

    #[tokio::test]
    async fn rejects_unknown_currency() {
        let (state, user_id) = get_test_state();
        let form = CurrencyForm {
            currency: "JPY".to_owned(),
        };

        let response = post_currency(State(state.clone()), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_id(user_id, &connection).unwrap();
        assert_eq!(user.currency, Currency::default());
    }
}
