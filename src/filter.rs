//! Sparse query filters.

use chrono::NaiveDateTime;

use crate::{
    errors::MetobsDataErr,
    levtr::{Level, Trange},
    vars::Varcode,
};

/// A filter over the dimensions of the store.
///
/// Every field left unset is a wildcard; set fields must all match for a
/// row to be included. Level and time range filters are wildcards per
/// component, so a filter level of `103,-,-,-` matches any level with
/// `ltype1 == 103`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// Exact latitude.
    pub lat: Option<f64>,
    /// Exact longitude.
    pub lon: Option<f64>,
    /// Southern bound, inclusive.
    pub latmin: Option<f64>,
    /// Northern bound, inclusive.
    pub latmax: Option<f64>,
    /// Western bound, inclusive.
    pub lonmin: Option<f64>,
    /// Eastern bound, inclusive.
    pub lonmax: Option<f64>,
    /// Mobile station identifier.
    pub ident: Option<String>,
    /// Mobile station flag.
    pub mobile: Option<bool>,
    /// Network numeric code.
    pub rep_cod: Option<u32>,
    /// Network mnemonic.
    pub rep_memo: Option<String>,
    /// Exact datetime.
    pub date: Option<NaiveDateTime>,
    /// Earliest datetime, inclusive.
    pub datemin: Option<NaiveDateTime>,
    /// Latest datetime, inclusive.
    pub datemax: Option<NaiveDateTime>,
    /// Earliest year, inclusive.
    pub yearmin: Option<i32>,
    /// Latest year, inclusive.
    pub yearmax: Option<i32>,
    /// Vertical level, wildcard per component.
    pub level: Level,
    /// Time range, wildcard per component.
    pub trange: Trange,
    /// Variable code.
    pub var: Option<Varcode>,
    /// Observation context reference.
    pub context_id: Option<i64>,
}

impl Filter {
    /// A filter that matches everything.
    pub fn all() -> Self {
        Filter::default()
    }

    /// Check the filter for contradictory bounds.
    pub fn validate(&self) -> Result<(), MetobsDataErr> {
        if let (Some(min), Some(max)) = (self.latmin, self.latmax) {
            if min > max {
                return Err(MetobsDataErr::InvalidFilter("latmin greater than latmax"));
            }
        }

        if let (Some(min), Some(max)) = (self.lonmin, self.lonmax) {
            if min > max {
                return Err(MetobsDataErr::InvalidFilter("lonmin greater than lonmax"));
            }
        }

        if let (Some(min), Some(max)) = (self.datemin, self.datemax) {
            if min > max {
                return Err(MetobsDataErr::InvalidFilter("datemin after datemax"));
            }
        }

        if let (Some(min), Some(max)) = (self.yearmin, self.yearmax) {
            if min > max {
                return Err(MetobsDataErr::InvalidFilter("yearmin after yearmax"));
            }
        }

        Ok(())
    }

    /// True when no data-dimension field is set.
    ///
    /// Station queries without data-dimension fields can skip joining the
    /// data tables, so stations that carry no data yet are still found.
    pub(crate) fn is_station_only(&self) -> bool {
        self.date.is_none()
            && self.datemin.is_none()
            && self.datemax.is_none()
            && self.yearmin.is_none()
            && self.yearmax.is_none()
            && self.level.is_unset()
            && self.trange.is_unset()
            && self.var.is_none()
            && self.context_id.is_none()
    }
}
