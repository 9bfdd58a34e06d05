//! A local subset of WMO table B.
//!
//! Only the entries this crate is commonly used with are carried here; the
//! table decides the kind of value a code may hold and supplies units and
//! descriptions for the export encoders.

use crate::{errors::MetobsDataErr, vars::Varcode};

/// The kind of value a table B entry declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Whole numbers only.
    Integer,
    /// Numbers with a fractional part allowed.
    Decimal,
    /// Character data.
    Text,
}

/// One entry of the local table B.
#[derive(Debug)]
pub struct VarInfo {
    /// The code this entry describes.
    pub code: Varcode,
    /// Official description.
    pub description: &'static str,
    /// Unit of measure, or "CCITTIA5" for character data.
    pub unit: &'static str,
    /// The declared kind of value.
    pub kind: VarKind,
}

const fn entry(
    x: u8,
    y: u8,
    description: &'static str,
    unit: &'static str,
    kind: VarKind,
) -> VarInfo {
    VarInfo {
        code: Varcode::new(x, y),
        description,
        unit,
        kind,
    }
}

// Kept sorted by code.
static TABLE_B: &[VarInfo] = &[
    entry(1, 1, "WMO BLOCK NUMBER", "NUMERIC", VarKind::Integer),
    entry(1, 2, "WMO STATION NUMBER", "NUMERIC", VarKind::Integer),
    entry(1, 8, "AIRCRAFT REGISTRATION NUMBER", "CCITTIA5", VarKind::Text),
    entry(
        1,
        11,
        "SHIP OR MOBILE LAND STATION IDENTIFIER",
        "CCITTIA5",
        VarKind::Text,
    ),
    entry(
        1,
        12,
        "DIRECTION OF MOTION OF MOVING OBSERVING PLATFORM",
        "DEGREE TRUE",
        VarKind::Integer,
    ),
    entry(1, 19, "LONG STATION OR SITE NAME", "CCITTIA5", VarKind::Text),
    entry(1, 194, "REPORT MNEMONIC", "CCITTIA5", VarKind::Text),
    entry(2, 1, "TYPE OF STATION", "CODE TABLE 2001", VarKind::Integer),
    entry(4, 1, "YEAR", "YEAR", VarKind::Integer),
    entry(4, 2, "MONTH", "MONTH", VarKind::Integer),
    entry(4, 3, "DAY", "DAY", VarKind::Integer),
    entry(4, 4, "HOUR", "HOUR", VarKind::Integer),
    entry(4, 5, "MINUTE", "MINUTE", VarKind::Integer),
    entry(4, 6, "SECOND", "SECOND", VarKind::Integer),
    entry(5, 1, "LATITUDE (HIGH ACCURACY)", "DEGREE", VarKind::Decimal),
    entry(6, 1, "LONGITUDE (HIGH ACCURACY)", "DEGREE", VarKind::Decimal),
    entry(
        7,
        30,
        "HEIGHT OF STATION GROUND ABOVE MEAN SEA LEVEL",
        "M",
        VarKind::Decimal,
    ),
    entry(7, 31, "HEIGHT OF BAROMETER ABOVE MEAN SEA LEVEL", "M", VarKind::Decimal),
    entry(10, 4, "PRESSURE", "PA", VarKind::Decimal),
    entry(10, 51, "PRESSURE REDUCED TO MEAN SEA LEVEL", "PA", VarKind::Decimal),
    entry(11, 1, "WIND DIRECTION", "DEGREE TRUE", VarKind::Integer),
    entry(11, 2, "WIND SPEED", "M/S", VarKind::Decimal),
    entry(12, 101, "TEMPERATURE/DRY-BULB TEMPERATURE", "K", VarKind::Decimal),
    entry(12, 103, "DEW-POINT TEMPERATURE", "K", VarKind::Decimal),
    entry(13, 3, "RELATIVE HUMIDITY", "%", VarKind::Integer),
    entry(13, 11, "TOTAL PRECIPITATION / TOTAL WATER EQUIVALENT", "KG/M**2", VarKind::Decimal),
    entry(20, 1, "HORIZONTAL VISIBILITY", "M", VarKind::Decimal),
    entry(33, 7, "PER CENT CONFIDENCE", "%", VarKind::Integer),
    entry(33, 36, "NOMINAL CONFIDENCE THRESHOLD", "%", VarKind::Integer),
    entry(33, 40, "CONFIDENCE INTERVAL", "%", VarKind::Integer),
    entry(33, 209, "SUBSTITUTION CONFIDENCE", "%", VarKind::Integer),
];

/// Look a code up in the local table B.
pub fn varinfo(code: Varcode) -> Result<&'static VarInfo, MetobsDataErr> {
    TABLE_B
        .iter()
        .find(|info| info.code == code)
        .ok_or_else(|| MetobsDataErr::InvalidVarcode(code.to_string()))
}
