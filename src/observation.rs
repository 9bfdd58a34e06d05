//! The record shape accepted by insert.

use chrono::NaiveDateTime;

use crate::{levtr::Level, levtr::Trange, report::Report, station::Station, vars::Var};

/// One observation to insert: a station, a network, the coordinates of the
/// observation in time and in the vertical, and one or more variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// The station that reported.
    pub station: Station,
    /// The network the report belongs to.
    pub report: Report,
    /// When the observation is valid.
    pub datetime: NaiveDateTime,
    /// The vertical level of the values.
    pub level: Level,
    /// The statistical time range of the values.
    pub trange: Trange,
    /// The values, at least one.
    pub vars: Vec<Var>,
}

impl Observation {
    /// Start an observation with no variables attached yet.
    pub fn new(station: Station, report: impl Into<Report>, datetime: NaiveDateTime) -> Self {
        Observation {
            station,
            report: report.into(),
            datetime,
            level: Level::default(),
            trange: Trange::default(),
            vars: vec![],
        }
    }

    /// Set the vertical level, builder style.
    pub fn with_level(mut self, level: impl Into<Level>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the time range, builder style.
    pub fn with_trange(mut self, trange: impl Into<Trange>) -> Self {
        self.trange = trange.into();
        self
    }

    /// Add a variable, builder style.
    pub fn with_var(mut self, var: Var) -> Self {
        self.vars.push(var);
        self
    }
}
