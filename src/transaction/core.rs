//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, period::PeriodId, user::UserId};

// ============================================================================
// MODELS
// ============================================================================

/// A newtype wrapper for integer transaction IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct TransactionId(i64);

impl TransactionId {
    /// Create a new transaction ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the transaction ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether a transaction adds money to the budget or takes it away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in, e.g. a refund or a side job.
    In,
    /// Money going out.
    Out,
}

impl TransactionKind {
    /// The string the kind is stored in the database as.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::In => "in",
            TransactionKind::Out => "out",
        }
    }

    /// A label for display in forms and table badges.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::In => "Money In",
            TransactionKind::Out => "Money Out",
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "in" => Ok(TransactionKind::In),
            "out" => Ok(TransactionKind::Out),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// The spending category a transaction belongs to.
///
/// The set of categories is fixed. There is no user-defined category
/// management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    FoodToiletries,
    Bills,
    Fuel,
    Entertainment,
    Clothing,
    SmokingVapes,
    DebtRepayments,
}

impl Category {
    /// All categories, in the order they are shown in forms.
    pub const ALL: [Category; 7] = [
        Category::FoodToiletries,
        Category::Bills,
        Category::Fuel,
        Category::Entertainment,
        Category::Clothing,
        Category::SmokingVapes,
        Category::DebtRepayments,
    ];

    /// The display name, which is also how the category is stored in the
    /// database and written to CSV exports.
    pub fn name(&self) -> &'static str {
        match self {
            Category::FoodToiletries => "Food/toiletries",
            Category::Bills => "Bills",
            Category::Fuel => "Fuel",
            Category::Entertainment => "Entertainment",
            Category::Clothing => "Clothing",
            Category::SmokingVapes => "Smoking/Vapes",
            Category::DebtRepayments => "Debt Repayments",
        }
    }

    /// Parse a category from its display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Category::ALL
            .into_iter()
            .find(|category| category.name() == name)
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.name()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let name = value.as_str()?;

        Category::from_name(name).ok_or(FromSqlError::InvalidType)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions are immutable once created, except for deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user the transaction belongs to.
    pub user_id: UserId,
    /// The budget period the transaction was logged against.
    pub period_id: PeriodId,
    /// Whether the transaction is money in or money out.
    pub kind: TransactionKind,
    /// The amount of money spent or earned. Always positive, `kind` carries
    /// the sign.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The spending category the transaction belongs to.
    pub category: Category,
    /// When the transaction happened.
    pub date: Date,
}

impl Transaction {
    /// The amount with the sign implied by the transaction kind applied.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::In => self.amount,
            TransactionKind::Out => -self.amount,
        }
    }
}

/// The fields needed to create a [Transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub period_id: PeriodId,
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub category: Category,
    pub date: Date,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// The table is named `transaction_entry` because `transaction` is an SQL
/// keyword.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transaction_entry (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                period_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
                FOREIGN KEY(period_id) REFERENCES period(id) ON DELETE CASCADE
                )",
        (),
    )?;

    // Used by the transactions page and the budget summary.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_entry_period
         ON transaction_entry(period_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: TransactionId::new(row.get(0)?),
        user_id: UserId::new(row.get(1)?),
        period_id: PeriodId::new(row.get(2)?),
        kind: row.get(3)?,
        amount: row.get(4)?,
        description: row.get(5)?,
        category: row.get(6)?,
        date: row.get(7)?,
    })
}

const TRANSACTION_COLUMNS: &str = "id, user_id, period_id, kind, amount, description, category, date";

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is zero or negative,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if new_transaction.amount <= 0.0 {
        return Err(Error::NonPositiveAmount(new_transaction.amount));
    }

    connection
        .prepare(&format!(
            "INSERT INTO transaction_entry (user_id, period_id, kind, amount, description, category, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                new_transaction.user_id.as_i64(),
                new_transaction.period_id.as_i64(),
                new_transaction.kind,
                new_transaction.amount,
                new_transaction.description,
                new_transaction.category,
                new_transaction.date,
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Get the transactions logged against `period_id`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_for_period(
    period_id: PeriodId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transaction_entry
             WHERE period_id = :period_id
             ORDER BY date DESC, id DESC"
        ))?
        .query_map(&[(":period_id", &period_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Get every transaction the user has ever logged, oldest first.
///
/// Used for the CSV export, which covers all periods.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transaction_entry
             WHERE user_id = :user_id
             ORDER BY date ASC, id ASC"
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

type RowsAffected = usize;

/// Delete the transaction with `transaction_id` if it belongs to `user_id`.
///
/// Returns the number of rows deleted, which is zero when the transaction
/// does not exist or belongs to another user.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    transaction_id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM transaction_entry WHERE id = :id AND user_id = :user_id",
            &[
                (":id", &transaction_id.as_i64()),
                (":user_id", &user_id.as_i64()),
            ],
        )
        .map_err(|error| error.into())
}

/// Delete all of the user's transactions across every period.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transactions_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM transaction_entry WHERE user_id = :user_id",
            &[(":user_id", &user_id.as_i64())],
        )
        .map_err(|error| error.into())
}

// ============================================================================
// TESTS
// ============================================================================
