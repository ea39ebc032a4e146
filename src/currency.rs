//! The currencies a user can choose to display amounts in.
//!
//! The choice only affects presentation. Amounts are stored as plain numbers
//! and are never converted between currencies.

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

/// A display currency. Stored in the database as its ISO 4217 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// British Pound (£), the default.
    #[default]
    Gbp,
    /// United States Dollar ($).
    Usd,
    /// Euro (€).
    Eur,
}

impl Currency {
    /// All supported currencies, in display order.
    pub const ALL: [Currency; 3] = [Currency::Gbp, Currency::Usd, Currency::Eur];

    /// The symbol to prefix amounts with, e.g. "£".
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Gbp => "£",
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }

    /// The ISO 4217 code, e.g. "GBP".
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// A human readable name for settings forms.
    pub fn name(&self) -> &'static str {
        match self {
            Currency::Gbp => "British Pound (£)",
            Currency::Usd => "US Dollar ($)",
            Currency::Eur => "Euro (€)",
        }
    }

    /// Parse a currency from its ISO 4217 code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "GBP" => Some(Currency::Gbp),
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            _ => None,
        }
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;

        Currency::from_code(code).ok_or(FromSqlError::InvalidType)
    }
}
