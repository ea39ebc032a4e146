//! Defines the core data model and database queries for budget periods.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, user::UserId};

/// A newtype wrapper for integer budget period IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct PeriodId(i64);

impl PeriodId {
    /// Create a new period ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the period ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for PeriodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The stretch of time between two paydays that a budget is planned around.
///
/// A user is intended to have one current period at a time. The current
/// period is whichever has the latest start date. This is not enforced with
/// a uniqueness constraint, so two periods created at the same instant can
/// race, and the one with the later row order wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    /// The ID of the period.
    pub id: PeriodId,
    /// The user the period belongs to.
    pub user_id: UserId,
    /// The day the period was created.
    pub start_date: Date,
    /// The next payday. Must be after `start_date`.
    pub end_date: Date,
    /// The amount of money available for the whole period.
    pub initial_budget: f64,
    /// Money carried over from the previous period.
    pub rollover: f64,
}

/// Create the period table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_period_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS period (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                initial_budget REAL NOT NULL,
                rollover REAL NOT NULL DEFAULT 0,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_period_row(row: &Row) -> Result<Period, rusqlite::Error> {
    Ok(Period {
        id: PeriodId::new(row.get(0)?),
        user_id: UserId::new(row.get(1)?),
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        initial_budget: row.get(4)?,
        rollover: row.get(5)?,
    })
}

/// Create a new budget period starting `today` and ending on `end_date`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::EndDateNotInFuture] if `end_date` is today or earlier,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_period(
    user_id: UserId,
    end_date: Date,
    initial_budget: f64,
    rollover: f64,
    today: Date,
    connection: &Connection,
) -> Result<Period, Error> {
    if end_date <= today {
        return Err(Error::EndDateNotInFuture(end_date));
    }

    connection
        .prepare(
            "INSERT INTO period (user_id, start_date, end_date, initial_budget, rollover)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, start_date, end_date, initial_budget, rollover",
        )?
        .query_row(
            (user_id.as_i64(), today, end_date, initial_budget, rollover),
            map_period_row,
        )
        .map_err(|error| error.into())
}

/// Get the user's current budget period, the one with the latest start date.
///
/// Returns `Ok(None)` if the user has not created a period yet.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_current_period(
    user_id: UserId,
    connection: &Connection,
) -> Result<Option<Period>, Error> {
    let result = connection
        .prepare(
            "SELECT id, user_id, start_date, end_date, initial_budget, rollover
             FROM period
             WHERE user_id = :user_id
             ORDER BY start_date DESC, id DESC
             LIMIT 1",
        )?
        .query_row(&[(":user_id", &user_id.as_i64())], map_period_row);

    match result {
        Ok(period) => Ok(Some(period)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

type RowsAffected = usize;

/// Delete all of the user's budget periods.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn delete_periods_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM period WHERE user_id = :user_id",
            &[(":user_id", &user_id.as_i64())],
        )
        .map_err(|error| error.into())
}
