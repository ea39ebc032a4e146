//! Creates the application tables.

use rusqlite::Connection;

use crate::{
    period::create_period_table, transaction::create_transaction_table, user::create_user_table,
};

/// Create the tables for the application in the database if they do not
/// already exist.
///
/// # Errors
///
/// Returns an [rusqlite::Error] if there was an SQL related error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.unchecked_transaction().and_then(|transaction| {
        create_user_table(&transaction)?;
        create_period_table(&transaction)?;
        create_transaction_table(&transaction)?;

        transaction.commit()
    })?;

    // foreign key enforcement is off by default in SQLite
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    Ok(())
}

#[cfg(test)]
mod db_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let table_names: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|name| name.unwrap())
            .collect();

        assert!(table_names.contains(&"user".to_owned()));
        assert!(table_names.contains(&"period".to_owned()));
        assert!(table_names.contains(&"transaction_entry".to_owned()));
    }

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();
        initialize(&conn).unwrap();
    }
}
