#![deny(missing_docs)]
//! Package to manage and query a database of weather station observations.
//!
//! Observations are indexed by station, network, datetime, vertical level,
//! and statistical time range. Every stored value can carry attributes,
//! and filtered result sets can be exported as delimited text or as BUFR
//! and CREX messages.

//
// Public API
//
pub use crate::coords::Coords;
pub use crate::cursor::{Cursor, DataCursor, DataRow};
pub use crate::database::Database;
pub use crate::errors::MetobsDataErr;
pub use crate::export::{export_to_file, export_to_writer, ExportFormat, MsgEncoder, MsgEntry, ObsMsg};
pub use crate::filter::Filter;
pub use crate::levtr::{Level, Trange};
pub use crate::observation::Observation;
pub use crate::report::{Report, ReportInfo};
pub use crate::station::{Station, StationInfo};
pub use crate::vars::{Var, VarValue, Varcode};
pub use crate::vartable::{varinfo, VarInfo, VarKind};

//
// Implementation only
//
extern crate chrono;
extern crate log;
extern crate rusqlite;
extern crate strum;
#[macro_use]
extern crate strum_macros;

mod coords;
mod cursor;
mod database;
mod errors;
pub mod export;
mod filter;
mod levtr;
mod observation;
mod report;
mod station;
mod vars;
mod vartable;

#[cfg(test)]
extern crate tempdir;
