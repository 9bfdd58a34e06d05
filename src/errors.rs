//! Module for errors.
use std::{error::Error, fmt::Display};

/// Error from the observation database interface.
#[derive(Debug)]
pub enum MetobsDataErr {
    // Inherited errors from std
    /// Error forwarded from std
    IO(::std::io::Error),

    // Other forwarded errors
    /// Database error
    Database(::rusqlite::Error),
    /// Error forwarded from the strum crate
    StrumError(strum::ParseError),

    // My own errors from this crate
    /// A datum with the same context and variable code already exists and
    /// overwriting was not allowed.
    Conflict,
    /// Station, context, or datum not found in the index.
    NotInIndex,
    /// The database structure is wrong.
    InvalidSchema,
    /// A variable code that does not parse or is not in the local table B.
    InvalidVarcode(String),
    /// The value supplied for a variable does not match its declared kind.
    InvalidValue(&'static str),
    /// Malformed or contradictory query filter.
    InvalidFilter(&'static str),
    /// An export codec could not represent the data.
    Encoding(String),
    /// Not enough data to complete the task.
    NotEnoughData,
    /// There was an internal logic error.
    LogicError(&'static str),
}

impl Display for MetobsDataErr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        use crate::errors::MetobsDataErr::*;

        match self {
            IO(err) => write!(f, "std lib io error: {}", err),

            Database(err) => write!(f, "database error: {}", err),
            StrumError(err) => write!(f, "error forwarded from strum crate: {}", err),

            Conflict => write!(f, "datum already exists and overwriting is not allowed"),
            NotInIndex => write!(f, "no match in the index"),
            InvalidSchema => write!(f, "invalid index format"),
            InvalidVarcode(code) => write!(f, "invalid variable code: {}", code),
            InvalidValue(msg) => write!(f, "invalid value for variable: {}", msg),
            InvalidFilter(msg) => write!(f, "invalid query filter: {}", msg),
            Encoding(msg) => write!(f, "encoding error: {}", msg),
            NotEnoughData => write!(f, "not enough data to complete task"),
            LogicError(msg) => write!(f, "internal logic error: {}", msg),
        }
    }
}

impl Error for MetobsDataErr {}

impl From<::std::io::Error> for MetobsDataErr {
    fn from(err: ::std::io::Error) -> MetobsDataErr {
        MetobsDataErr::IO(err)
    }
}

impl From<::rusqlite::Error> for MetobsDataErr {
    fn from(err: ::rusqlite::Error) -> MetobsDataErr {
        MetobsDataErr::Database(err)
    }
}

impl From<strum::ParseError> for MetobsDataErr {
    fn from(err: strum::ParseError) -> MetobsDataErr {
        MetobsDataErr::StrumError(err)
    }
}
