//! The registration page and the route for creating a new account.
//!
//! New accounts are logged in straight away, so the handler also sets the auth cookie.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::{DEFAULT_COOKIE_DURATION, log_in::email_input, set_auth_cookie},
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner, log_in_register,
        password_input,
    },
    timezone::get_local_offset,
    user::create_user,
};

/// The minimum length of the password input on the registration form.
///
/// This is a hint for the browser. The server still checks password strength
/// with zxcvbn, which rejects most passwords shorter than this anyway.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

fn name_input(field_name: &str, label: &str, value: &str) -> Markup {
    html! {
        div
        {
            label
                for=(field_name)
                class=(FORM_LABEL_STYLE)
            {
                (label)
            }

            input
                type="text"
                name=(field_name)
                id=(field_name)
                class=(FORM_TEXT_INPUT_STYLE)
                required
                value=(value);
        }
    }
}

fn confirm_password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm_password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm_password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(PASSWORD_INPUT_MIN_LENGTH);

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

/// The state of the inputs after a failed registration attempt, so that the user
/// does not have to re-enter everything. Passwords are never echoed back.
#[derive(Default)]
struct RegistrationFormState<'a> {
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    email_error: Option<&'a str>,
    password_error: Option<&'a str>,
    confirm_password_error: Option<&'a str>,
}

fn registration_form(state: RegistrationFormState) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #first_name, #last_name, #password, #confirm_password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(state.email, state.email_error))
            (name_input("first_name", "First name", state.first_name))
            (name_input("last_name", "Last name", state.last_name))
            (password_input("", PASSWORD_INPUT_MIN_LENGTH, state.password_error))
            (confirm_password_input(state.confirm_password_error))

            button
                type="submit" id="submit-button" tabindex="0"
                class="w-full px-4 py-2 bg-blue-500 dark:bg-blue-600 disabled:bg-blue-700
                    hover:enabled:bg-blue-600 hover:enabled:dark:bg-blue-700 text-white rounded"
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Already have an account? "
                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = registration_form(RegistrationFormState::default());
    let content = log_in_register("Create an account", &form);
    base("Register", &[], &content).into_response()
}

/// The state needed to create a new account.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Europe/London".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl RegistrationState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(
        cookie_secret: &str,
        local_timezone: &str,
        db_connection: Arc<Mutex<Connection>>,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection: db_connection.clone(),
        }
    }
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
}

pub const PASSWORDS_DO_NOT_MATCH_ERROR_MSG: &str = "Passwords do not match.";
pub const INVALID_EMAIL_ERROR_MSG: &str = "Please enter a valid email address.";

fn duplicate_email_error_msg(email: &str) -> String {
    format!("The email address {email} is already registered.")
}

/// Handler for registration requests via the POST method.
///
/// On success the auth cookie is set and the client is redirected to the dashboard page.
/// Otherwise, the form is returned with error messages against the offending fields.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    if !EmailAddress::is_valid(&form.email) {
        return registration_form(RegistrationFormState {
            email: &form.email,
            first_name: &form.first_name,
            last_name: &form.last_name,
            email_error: Some(INVALID_EMAIL_ERROR_MSG),
            ..Default::default()
        })
        .into_response();
    }

    if form.password != form.confirm_password {
        return registration_form(RegistrationFormState {
            email: &form.email,
            first_name: &form.first_name,
            last_name: &form.last_name,
            confirm_password_error: Some(PASSWORDS_DO_NOT_MATCH_ERROR_MSG),
            ..Default::default()
        })
        .into_response();
    }

    let password_hash = match crate::auth::PasswordHash::from_raw_password(
        &form.password,
        crate::auth::PasswordHash::DEFAULT_COST,
    ) {
        Ok(hash) => hash,
        Err(Error::TooWeak(reason)) => {
            return registration_form(RegistrationFormState {
                email: &form.email,
                first_name: &form.first_name,
                last_name: &form.last_name,
                password_error: Some(&reason),
                ..Default::default()
            })
            .into_response();
        }
        Err(error) => {
            tracing::error!("Could not hash password: {error}");
            return crate::internal_server_error::get_internal_server_error_redirect();
        }
    };

    let user = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire database lock");

        match create_user(
            &form.email,
            &form.first_name,
            &form.last_name,
            password_hash,
            &connection,
        ) {
            Ok(user) => user,
            Err(Error::DuplicateEmail(email)) => {
                return registration_form(RegistrationFormState {
                    email: &form.email,
                    first_name: &form.first_name,
                    last_name: &form.last_name,
                    email_error: Some(&duplicate_email_error_msg(&email)),
                    ..Default::default()
                })
                .into_response();
            }
            Err(error) => {
                tracing::error!("Could not create user: {error}");
                return crate::internal_server_error::get_internal_server_error_redirect();
            }
        }
    };

    let local_offset = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration, local_offset) {
        Ok(updated_jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            updated_jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            crate::internal_server_error::get_internal_server_error_redirect()
        }
    }
}
