//! Export of filtered query results.
//!
//! CSV export lives in [`csv`]; BUFR and CREX export stream messages
//! through the [`MsgEncoder`] interface, which stands in for the real
//! table-driven codecs.

use std::{fmt, fs::File, io::BufWriter, io::Write, path::Path};

use chrono::NaiveDateTime;
use log::debug;

use crate::{
    cursor::DataRow,
    database::Database,
    errors::MetobsDataErr,
    filter::Filter,
    levtr::{Level, Trange},
    station::StationInfo,
    vars::Var,
};

pub mod codec;
pub mod csv;

use self::codec::{BufrEncoder, CrexEncoder};

/// Binary exchange formats supported for export.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumString, AsStaticStr, EnumIter, Hash)]
pub enum ExportFormat {
    /// WMO FM 94 binary representation.
    #[strum(to_string = "BUFR", serialize = "bufr")]
    Bufr,
    /// WMO FM 95 character representation.
    #[strum(to_string = "CREX", serialize = "crex")]
    Crex,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use strum::AsStaticRef;

        write!(f, "{}", self.as_static())
    }
}

impl ExportFormat {
    fn encoder(self, generic: bool) -> Box<dyn MsgEncoder> {
        match self {
            ExportFormat::Bufr => Box::new(BufrEncoder { generic }),
            ExportFormat::Crex => Box::new(CrexEncoder { generic }),
        }
    }
}

/// One message to encode: every matching datum of one station at one
/// datetime, with attributes resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ObsMsg {
    /// The reporting station.
    pub station: StationInfo,
    /// When the message data is valid.
    pub datetime: NaiveDateTime,
    /// The data values, in query order.
    pub entries: Vec<MsgEntry>,
}

/// One datum inside a message.
#[derive(Debug, Clone, PartialEq)]
pub struct MsgEntry {
    /// The vertical level.
    pub level: Level,
    /// The time range.
    pub trange: Trange,
    /// The variable and its value.
    pub var: Var,
    /// The attributes stored for the datum.
    pub attrs: Vec<Var>,
}

/// The narrow interface to a message codec.
///
/// Encoders are stateless single-pass transformations; a failure aborts
/// the export with no partial-output guarantee.
pub trait MsgEncoder {
    /// Encode one message to the destination.
    fn encode(&self, msg: &ObsMsg, dest: &mut dyn Write) -> Result<(), MetobsDataErr>;
}

/// Export matching data as BUFR or CREX messages to any writer.
///
/// With `generic` set, messages use the generic data category instead of
/// one derived from the network.
pub fn export_to_writer(
    db: &Database,
    filter: &Filter,
    format: ExportFormat,
    generic: bool,
    dest: &mut dyn Write,
) -> Result<(), MetobsDataErr> {
    let msgs = collect_msgs(db, filter)?;
    let encoder = format.encoder(generic);

    debug!("exporting {} messages as {}", msgs.len(), format);

    for msg in &msgs {
        encoder.encode(msg, dest)?;
    }

    Ok(())
}

/// Export matching data as BUFR or CREX messages to a file.
pub fn export_to_file(
    db: &Database,
    filter: &Filter,
    format: ExportFormat,
    path: &dyn AsRef<Path>,
    generic: bool,
) -> Result<(), MetobsDataErr> {
    let file = File::create(path.as_ref())?;
    let mut dest = BufWriter::new(file);

    export_to_writer(db, filter, format, generic, &mut dest)?;
    dest.flush()?;

    Ok(())
}

// Group the matching data rows into one message per station and datetime.
// Rows arrive ordered by datetime then insertion, so grouping consecutive
// rows keeps the export a single pass.
fn collect_msgs(db: &Database, filter: &Filter) -> Result<Vec<ObsMsg>, MetobsDataErr> {
    let mut msgs: Vec<ObsMsg> = vec![];

    for row in db.query_data(filter)? {
        let attrs = db.attr_query(row.var.code, row.context_id, None)?;

        let DataRow {
            station,
            datetime,
            level,
            trange,
            var,
            ..
        } = row;

        let entry = MsgEntry {
            level,
            trange,
            var,
            attrs,
        };

        match msgs.last_mut() {
            Some(msg) if msg.station.id == station.id && msg.datetime == datetime => {
                msg.entries.push(entry);
            }
            _ => msgs.push(ObsMsg {
                station,
                datetime,
                entries: vec![entry],
            }),
        }
    }

    Ok(msgs)
}

// The BUFR/CREX data category for a network. Anything unrecognized, and
// every message in generic mode, exports as generic data (255).
pub(crate) fn data_category(rep_memo: &str) -> u8 {
    match rep_memo {
        "synop" | "metar" => 0,
        "buoy" => 1,
        "temp" | "pilot" => 2,
        "airep" | "amdar" | "acars" => 4,
        "satellite" => 5,
        _ => 255,
    }
}
