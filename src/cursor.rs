//! Forward-only cursors over query results.
//!
//! Results are materialized when the query runs, so `remaining` is exact
//! from the start and an open cursor is never affected by later writes on
//! the same handle.

use std::collections::VecDeque;

use chrono::NaiveDateTime;

use crate::{
    database::Database,
    errors::MetobsDataErr,
    levtr::{Level, Trange},
    station::StationInfo,
    vars::{Var, Varcode},
};

/// A forward-only cursor with an exact count of rows left.
#[derive(Debug)]
pub struct Cursor<T> {
    rows: VecDeque<T>,
}

impl<T> Cursor<T> {
    pub(crate) fn new(rows: Vec<T>) -> Self {
        Cursor { rows: rows.into() }
    }

    /// The exact number of rows not yet iterated.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl<T> Iterator for Cursor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.rows.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.rows.len(), Some(self.rows.len()))
    }
}

impl<T> ExactSizeIterator for Cursor<T> {}

/// One row of a data query: a datum in its full context.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    /// The station the datum belongs to.
    pub station: StationInfo,
    /// When the datum is valid.
    pub datetime: NaiveDateTime,
    /// The vertical level.
    pub level: Level,
    /// The time range.
    pub trange: Trange,
    /// The variable and its value.
    pub var: Var,
    /// Reference usable for attribute operations on this datum.
    pub context_id: i64,
}

/// A cursor over data rows.
///
/// Besides iterating, the cursor remembers the row it yielded last so
/// attributes for the current datum can be fetched without tracking the
/// context reference by hand.
pub struct DataCursor<'db> {
    db: &'db Database,
    inner: Cursor<DataRow>,
    current: Option<(Varcode, i64)>,
}

impl<'db> DataCursor<'db> {
    pub(crate) fn new(db: &'db Database, rows: Vec<DataRow>) -> Self {
        DataCursor {
            db,
            inner: Cursor::new(rows),
            current: None,
        }
    }

    /// The exact number of rows not yet iterated.
    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }

    /// Query the attributes of the row most recently yielded.
    ///
    /// With `wanted` set, only attributes with the named codes are
    /// returned. Calling this before the first `next()` is a logic error.
    pub fn query_attrs(&self, wanted: Option<&[Varcode]>) -> Result<Vec<Var>, MetobsDataErr> {
        match self.current {
            Some((code, context_id)) => self.db.attr_query(code, context_id, wanted),
            None => Err(MetobsDataErr::LogicError(
                "query_attrs called before the first row",
            )),
        }
    }
}

impl Iterator for DataCursor<'_> {
    type Item = DataRow;

    fn next(&mut self) -> Option<DataRow> {
        let row = self.inner.next();

        if let Some(ref row) = row {
            self.current = Some((row.var.code, row.context_id));
        }

        row
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for DataCursor<'_> {}
