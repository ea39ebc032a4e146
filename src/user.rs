//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::PasswordHash, currency::Currency};

/// The email address that identifies the admin account.
///
/// There is no role system. The account registered with this email is the
/// admin, every other account is a regular user.
pub const ADMIN_EMAIL: &str = "admin@cashday.app";

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The email address the user registered with. Unique.
    pub email: String,
    /// The user's given name.
    pub first_name: String,
    /// The user's family name.
    pub last_name: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The currency amounts are displayed in for this user.
    pub currency: Currency,
    /// When the account was created.
    pub created_at: OffsetDateTime,
    /// When the user last logged in, if they ever have.
    pub last_login_at: Option<OffsetDateTime>,
}

impl User {
    /// Whether this user is the admin account.
    pub fn is_admin(&self) -> bool {
        self.email == ADMIN_EMAIL
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                password TEXT NOT NULL,
                currency TEXT NOT NULL DEFAULT 'GBP',
                created_at TEXT NOT NULL,
                last_login_at TEXT
                )",
        (),
    )?;

    Ok(())
}

fn map_user_row(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(4)?;

    Ok(User {
        id: UserId::new(row.get(0)?),
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        currency: row.get(5)?,
        created_at: row.get(6)?,
        last_login_at: row.get(7)?,
    })
}

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password, currency, created_at, last_login_at";

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if a user with `email` already exists,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(
    email: &str,
    first_name: &str,
    last_name: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection
        .execute(
            "INSERT INTO user (email, first_name, last_name, password, currency, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                email,
                first_name,
                last_name,
                password_hash.to_string(),
                Currency::default(),
                created_at,
            ),
        )
        .map_err(|error| match Error::from(error) {
            Error::DuplicateEmail(_) => Error::DuplicateEmail(email.to_owned()),
            error => error,
        })?;

    let id = UserId::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: email.to_owned(),
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        password_hash,
        currency: Currency::default(),
        created_at,
        last_login_at: None,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the database.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database registered with `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` does not belong to a registered user.
/// - there was an error trying to access the database.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!(
            "SELECT {USER_COLUMNS} FROM user WHERE email = :email"
        ))?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

/// Get every registered user, ordered by when they joined.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_all_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare(&format!(
            "SELECT {USER_COLUMNS} FROM user ORDER BY created_at ASC"
        ))?
        .query_map([], map_user_row)?
        .map(|maybe_user| maybe_user.map_err(|error| error.into()))
        .collect()
}

/// Record that the user logged in just now.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn set_last_login(user_id: UserId, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "UPDATE user SET last_login_at = ?1 WHERE id = ?2",
        (OffsetDateTime::now_utc(), user_id.as_i64()),
    )?;

    Ok(())
}

/// Persist the user's preferred display currency.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn set_currency(
    user_id: UserId,
    currency: Currency,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "UPDATE user SET currency = ?1 WHERE id = ?2",
        (currency, user_id.as_i64()),
    )?;

    Ok(())
}

type RowsAffected = usize;

/// Delete the user row for `user_id`.
///
/// This only removes the profile. Callers that want to remove the user's data
/// as well should delete their transactions and periods first.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn delete_user(user_id: UserId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM user WHERE id = :id", &[(":id", &user_id.as_i64())])
        .map_err(|error| error.into())
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::PasswordHash,
        currency::Currency,
        user::{
            UserId, create_user, delete_user, get_all_users, get_user_by_email, get_user_by_id,
            set_currency, set_last_login,
        },
    };

    use super::{ADMIN_EMAIL, create_user_table};

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    #[test]
    fn insert_user_succeeds() {
        let conn = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user = create_user(
            "foo@bar.baz",
            "Foo",
            "Bar",
            password_hash.clone(),
            &conn,
        )
        .unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.email, "foo@bar.baz");
        assert_eq!(inserted_user.password_hash, password_hash);
        assert_eq!(inserted_user.currency, Currency::Gbp);
        assert_eq!(inserted_user.last_login_at, None);
    }

    #[test]
    fn insert_user_fails_with_duplicate_email() {
        let conn = get_db_connection();

        create_user(
            "foo@bar.baz",
            "Foo",
            "Bar",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        let result = create_user(
            "foo@bar.baz",
            "Other",
            "Person",
            PasswordHash::new_unchecked("hunter3"),
            &conn,
        );

        assert_eq!(result, Err(Error::DuplicateEmail("foo@bar.baz".to_owned())));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let conn = get_db_connection();

        assert_eq!(
            get_user_by_id(UserId::new(42), &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_user_by_email_succeeds() {
        let conn = get_db_connection();
        let test_user = create_user(
            "foo@bar.baz",
            "Foo",
            "Bar",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        let retrieved_user = get_user_by_email("foo@bar.baz", &conn).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn admin_check_uses_email() {
        let conn = get_db_connection();
        let admin = create_user(
            ADMIN_EMAIL,
            "Admin",
            "User",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();
        let regular = create_user(
            "foo@bar.baz",
            "Foo",
            "Bar",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        assert!(admin.is_admin());
        assert!(!regular.is_admin());
    }

    #[test]
    fn set_last_login_records_timestamp() {
        let conn = get_db_connection();
        let test_user = create_user(
            "foo@bar.baz",
            "Foo",
            "Bar",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        set_last_login(test_user.id, &conn).unwrap();

        let retrieved_user = get_user_by_id(test_user.id, &conn).unwrap();
        assert!(retrieved_user.last_login_at.is_some());
    }

    #[test]
    fn set_currency_persists_choice() {
        let conn = get_db_connection();
        let test_user = create_user(
            "foo@bar.baz",
            "Foo",
            "Bar",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        set_currency(test_user.id, Currency::Eur, &conn).unwrap();

        let retrieved_user = get_user_by_id(test_user.id, &conn).unwrap();
        assert_eq!(retrieved_user.currency, Currency::Eur);
    }

    #[test]
    fn get_all_users_returns_every_user() {
        let conn = get_db_connection();
        create_user(
            "foo@bar.baz",
            "Foo",
            "Bar",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();
        create_user(
            "bar@baz.qux",
            "Bar",
            "Qux",
            PasswordHash::new_unchecked("hunter3"),
            &conn,
        )
        .unwrap();

        let users = get_all_users(&conn).unwrap();

        assert_eq!(users.len(), 2);
    }

    #[test]
    fn delete_user_removes_row() {
        let conn = get_db_connection();
        let test_user = create_user(
            "foo@bar.baz",
            "Foo",
            "Bar",
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        let rows_affected = delete_user(test_user.id, &conn).unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(get_user_by_id(test_user.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_user_affects_no_rows() {
        let conn = get_db_connection();

        let rows_affected = delete_user(UserId::new(42), &conn).unwrap();

        assert_eq!(rows_affected, 0);
    }
}
