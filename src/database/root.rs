use std::{collections::HashMap, path::Path};

use log::debug;

use super::Database;

use crate::errors::MetobsDataErr;

const TABLES: [&str; 7] = [
    "attrs",
    "contexts",
    "data",
    "levtrs",
    "repinfo",
    "station_data",
    "stations",
];

impl Database {
    /// Initialize a new database file.
    pub fn create(path: &dyn AsRef<Path>) -> Result<Self, MetobsDataErr> {
        debug!("creating observation database at {}", path.as_ref().display());

        let db_conn = rusqlite::Connection::open_with_flags(
            path.as_ref(),
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE | rusqlite::OpenFlags::SQLITE_OPEN_CREATE,
        )?;

        db_conn.execute_batch(include_str!("root/create_index.sql"))?;
        Self::seed_repinfo(&db_conn)?;

        Ok(Database {
            db_conn,
            last_data_ids: HashMap::new(),
        })
    }

    /// Open an existing database file.
    pub fn connect(path: &dyn AsRef<Path>) -> Result<Self, MetobsDataErr> {
        debug!("connecting to observation database at {}", path.as_ref().display());

        let db_conn = rusqlite::Connection::open_with_flags(
            path.as_ref(),
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE,
        )?;

        Self::validate_db_structure(&db_conn)?;

        Ok(Database {
            db_conn,
            last_data_ids: HashMap::new(),
        })
    }

    /// Open a private, in-memory database. Useful for tests and one-shot
    /// conversions.
    pub fn open_in_memory() -> Result<Self, MetobsDataErr> {
        let db_conn = rusqlite::Connection::open_in_memory()?;

        db_conn.execute_batch(include_str!("root/create_index.sql"))?;
        Self::seed_repinfo(&db_conn)?;

        Ok(Database {
            db_conn,
            last_data_ids: HashMap::new(),
        })
    }

    /// Remove all stations, contexts, data, and attributes, and restore the
    /// default report table.
    pub fn reset(&mut self) -> Result<(), MetobsDataErr> {
        debug!("resetting observation database");

        self.db_conn.execute_batch(
            "
                DELETE FROM attrs;
                DELETE FROM data;
                DELETE FROM station_data;
                DELETE FROM contexts;
                DELETE FROM levtrs;
                DELETE FROM stations;
                DELETE FROM repinfo;
            ",
        )?;

        Self::seed_repinfo(&self.db_conn)?;
        self.last_data_ids.clear();

        Ok(())
    }

    // Load the default report table. The embedded file uses the classic
    // 6-column repinfo format: code, mnemonic, description, priority,
    // descriptor, table A category.
    fn seed_repinfo(db_conn: &rusqlite::Connection) -> Result<(), MetobsDataErr> {
        for line in include_str!("root/repinfo.csv").lines() {
            let mut fields = line.split(',');

            let id: u32 = fields
                .next()
                .and_then(|v| v.parse().ok())
                .ok_or(MetobsDataErr::LogicError("malformed default repinfo"))?;
            let memo = fields
                .next()
                .ok_or(MetobsDataErr::LogicError("malformed default repinfo"))?;
            let description = fields
                .next()
                .ok_or(MetobsDataErr::LogicError("malformed default repinfo"))?;
            let prio: i64 = fields
                .next()
                .and_then(|v| v.parse().ok())
                .ok_or(MetobsDataErr::LogicError("malformed default repinfo"))?;

            db_conn.execute(
                "INSERT OR IGNORE INTO repinfo (id, memo, description, prio)
                      VALUES (?1, ?2, ?3, ?4)",
                &[
                    &id as &dyn rusqlite::types::ToSql,
                    &memo as &dyn rusqlite::types::ToSql,
                    &description,
                    &prio,
                ],
            )?;
        }

        Ok(())
    }

    /// Validate the database structure is correct.
    fn validate_db_structure(db_conn: &rusqlite::Connection) -> Result<(), MetobsDataErr> {
        // Check the number of tables
        let num_tables: i64 = db_conn.query_row(
            "SELECT COUNT(name) FROM sqlite_master WHERE type='table' ORDER BY name",
            rusqlite::NO_PARAMS,
            |row| row.get(0),
        )?;

        if num_tables != TABLES.len() as i64 {
            return Err(MetobsDataErr::InvalidSchema);
        }

        // Check the table names.
        let mut stmt =
            db_conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;

        let iter = stmt.query_map(rusqlite::NO_PARAMS, |row: &rusqlite::Row| {
            let name: String = row.get(0)?;
            Ok(TABLES.contains(&name.as_str()))
        })?;

        for valid in iter {
            match valid {
                Ok(true) => {}
                Ok(false) => return Err(MetobsDataErr::InvalidSchema),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}
