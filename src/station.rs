//! Description of observing stations.

use crate::coords::Coords;

/// Description of a station as supplied on insert.
///
/// The identity of a station is the whole tuple (network, coordinates,
/// mobile flag, ident); two networks reporting from the same place are two
/// stations.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Where the station is, or where a mobile station was at report time.
    pub coords: Coords,
    /// Identifier for mobile stations, e.g. a ship call sign.
    pub ident: Option<String>,
    /// True for mobile stations.
    pub mobile: bool,
}

impl Station {
    /// A fixed station at the given coordinates.
    pub fn fixed(coords: impl Into<Coords>) -> Self {
        Station {
            coords: coords.into(),
            ident: None,
            mobile: false,
        }
    }

    /// A mobile station with its identifier.
    pub fn mobile(coords: impl Into<Coords>, ident: &str) -> Self {
        Station {
            coords: coords.into(),
            ident: Some(ident.to_owned()),
            mobile: true,
        }
    }
}

/// A station as stored in the index, with its row id and network resolved.
///
/// This is the row shape yielded by station queries. It deliberately
/// carries no variable data.
#[derive(Debug, Clone, PartialEq)]
pub struct StationInfo {
    /// Stable id of the station row.
    pub id: i64,
    /// The station description.
    pub station: Station,
    /// Numeric code of the network this station reports on.
    pub rep_cod: u32,
    /// Mnemonic of the network this station reports on.
    pub rep_memo: String,
}
