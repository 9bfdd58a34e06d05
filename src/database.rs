//! A database of surface weather observations.

use std::collections::HashMap;

use crate::vars::Varcode;

/// The observation database.
///
/// One handle is one session: a single logical reader and writer. Cursors
/// returned by the query methods snapshot their results, so they stay
/// coherent if the handle is written to while they are being iterated.
#[derive(Debug)]
pub struct Database {
    db_conn: rusqlite::Connection, // An sqlite connection.
    last_data_ids: HashMap<Varcode, i64>, // Datum ids from the most recent insert.
}

mod attrs;
mod insert;
mod query;
mod root;
