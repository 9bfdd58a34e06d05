//! Delimited-text export.
//!
//! The output starts with a station directory line and a fixed column
//! header, then one line per matching datum. Attribute columns are the
//! union of the attribute codes present anywhere in the result set.

use std::{collections::BTreeSet, io::Write};

use crate::{
    database::Database,
    errors::MetobsDataErr,
    filter::Filter,
    vars::{Var, Varcode},
};

const FIXED_HEADER: &str = "Station,Latitude,Longitude,Network,Datetime,\
                            Level1,L1,Level2,L2,Time range,P1,P2,Variable,Value";
const FIXED_COLUMNS: usize = 14;

/// Export the matching data as delimited text.
pub fn export<W: Write>(
    db: &Database,
    filter: &Filter,
    dest: &mut W,
) -> Result<(), MetobsDataErr> {
    let rows: Vec<_> = db.query_data(filter)?.collect();

    let mut row_attrs: Vec<Vec<Var>> = Vec::with_capacity(rows.len());
    let mut attr_codes: BTreeSet<Varcode> = BTreeSet::new();

    for row in &rows {
        let attrs = db.attr_query(row.var.code, row.context_id, None)?;
        attr_codes.extend(attrs.iter().map(|attr| attr.code));
        row_attrs.push(attrs);
    }

    let attr_codes: Vec<Varcode> = attr_codes.into_iter().collect();
    let num_columns = FIXED_COLUMNS + attr_codes.len();

    // Station directory line, padded out to the full column width.
    let mut stations: Vec<i64> = vec![];
    for row in &rows {
        if !stations.contains(&row.station.id) {
            stations.push(row.station.id);
        }
    }

    let mut segments: Vec<String> = vec![];
    for station_id in stations {
        for var in db.station_data(station_id)? {
            segments.push(format!("Station {}: {}", var.code, var.value));
        }
    }

    writeln!(
        dest,
        "{}{}",
        field(&segments.join("; ")),
        ",".repeat(num_columns - 1)
    )?;

    // The header does not depend on the data except for the attribute
    // columns.
    let mut header = FIXED_HEADER.to_owned();
    for code in &attr_codes {
        header.push_str(&format!(",Attr {}", code));
    }
    writeln!(dest, "{}", header)?;

    for (row, attrs) in rows.iter().zip(&row_attrs) {
        let mut fields: Vec<String> = Vec::with_capacity(num_columns);

        fields.push(row.station.id.to_string());
        fields.push(format!("{:?}", row.station.station.coords.lat));
        fields.push(format!("{:?}", row.station.station.coords.lon));
        fields.push(field(&row.station.rep_memo));
        fields.push(row.datetime.format("%Y-%m-%d %H:%M:%S").to_string());

        for component in row.level.components().iter() {
            fields.push(component_field(*component));
        }
        for component in row.trange.components().iter() {
            fields.push(component_field(*component));
        }

        fields.push(row.var.code.to_string());
        fields.push(field(&row.var.value.to_string()));

        for code in &attr_codes {
            let cell = attrs
                .iter()
                .find(|attr| attr.code == *code)
                .map(|attr| field(&attr.value.to_string()))
                .unwrap_or_default();
            fields.push(cell);
        }

        writeln!(dest, "{}", fields.join(","))?;
    }

    Ok(())
}

fn component_field(component: Option<i32>) -> String {
    match component {
        Some(val) => val.to_string(),
        None => "-".to_owned(),
    }
}

// Quote a field if it contains the delimiter, a quote, or a line break.
fn field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_owned()
    }
}

#[cfg(test)]
mod unit {
    use super::*;
    use crate::database::unit::*; // test helpers.
    use crate::{observation::Observation, report::Report, station::Station};

    use chrono::NaiveDate;

    // Build the database behind the classic export example: one station
    // with a name directory and two pressure readings carrying different
    // attribute codes.
    fn fill_export_db(db: &mut Database) {
        let station = Station::fixed((10.0, 15.0));

        db.insert_station_data(
            &station,
            "synop",
            &[
                Var::parse("B01001", 12).unwrap(),
                Var::parse("B01002", 123).unwrap(),
                Var::parse("B01019", "Test of long station name").unwrap(),
            ],
            false,
            true,
        )
        .expect("Error inserting station data.");

        let obs = Observation::new(
            station.clone(),
            Report::memo("synop"),
            NaiveDate::from_ymd(2007, 1, 1).and_hms(0, 0, 0),
        )
        .with_level(1)
        .with_trange(0)
        .with_var(
            Var::parse("B10004", 73810)
                .unwrap()
                .with_attr(Var::parse("B33007", 80).unwrap()),
        );
        db.insert(&obs, false, true).expect("Error inserting.");

        let obs = Observation::new(
            station,
            Report::memo("synop"),
            NaiveDate::from_ymd(2007, 1, 2).and_hms(0, 0, 0),
        )
        .with_level(1)
        .with_trange(0)
        .with_var(
            Var::parse("B10004", 73900)
                .unwrap()
                .with_attr(Var::parse("B33040", 90).unwrap()),
        );
        db.insert(&obs, false, true).expect("Error inserting.");
    }

    fn export_lines(db: &Database) -> Vec<String> {
        let mut out: Vec<u8> = vec![];
        export(db, &Filter::all(), &mut out).expect("Error exporting.");

        String::from_utf8(out)
            .expect("Export must be UTF-8.")
            .lines()
            .map(|line| line.to_owned())
            .collect()
    }

    #[test]
    fn test_export() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_export_db(&mut db);

        let lines = export_lines(&db);

        assert_eq!(
            lines[0],
            "Station B01001: 12; Station B01002: 123; \
             Station B01019: Test of long station name,,,,,,,,,,,,,,,"
        );
        assert_eq!(
            lines[1],
            "Station,Latitude,Longitude,Network,Datetime,Level1,L1,Level2,L2,\
             Time range,P1,P2,Variable,Value,Attr B33007,Attr B33040"
        );
        assert_eq!(
            lines[2],
            "1,10.0,15.0,synop,2007-01-01 00:00:00,1,-,-,-,0,-,-,B10004,73810,80,"
        );
        assert_eq!(
            lines[3],
            "1,10.0,15.0,synop,2007-01-02 00:00:00,1,-,-,-,0,-,-,B10004,73900,,90"
        );
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_export_attr_columns_follow_data() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        let station = Station::mobile((0.0, 0.0), "#000000");

        for (second, temp, confidence) in &[(0u32, 270.96, 98), (1u32, 271.96, 100)] {
            let obs = Observation::new(
                station.clone(),
                Report::memo("synop"),
                NaiveDate::from_ymd(1005, 1, 1).and_hms(1, 1, *second),
            )
            .with_level((103, 2000))
            .with_trange((254, 0, 0))
            .with_var(
                Var::parse("B12101", *temp)
                    .unwrap()
                    .with_attr(Var::parse("B33209", *confidence).unwrap()),
            );
            db.insert(&obs, false, true).expect("Error inserting.");
        }

        let lines = export_lines(&db);

        // No station values, so the directory line is only padding.
        assert_eq!(lines[0], ",".repeat(14));
        assert!(lines[1].ends_with(",Variable,Value,Attr B33209"));
        assert_eq!(
            lines[2],
            "1,0.0,0.0,synop,1005-01-01 01:01:00,103,2000,-,-,254,0,0,B12101,270.96,98"
        );
        assert_eq!(
            lines[3],
            "1,0.0,0.0,synop,1005-01-01 01:01:01,103,2000,-,-,254,0,0,B12101,271.96,100"
        );
    }

    #[test]
    fn test_export_header_fixed_without_attrs() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        let obs = Observation::new(
            Station::fixed((45.0, 11.0)),
            Report::memo("synop"),
            NaiveDate::from_ymd(2018, 1, 1).and_hms(0, 0, 0),
        )
        .with_level((103, 2000))
        .with_trange((254, 0, 0))
        .with_var(Var::parse("B12101", 270.96).unwrap());
        db.insert(&obs, false, true).expect("Error inserting.");

        let lines = export_lines(&db);
        assert_eq!(lines[1], FIXED_HEADER);
    }

    #[test]
    fn test_export_empty_result() {
        let TestDb { tmp: _tmp, db } = create_test_db().expect("Failed to create test database.");

        let lines = export_lines(&db);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], ",".repeat(13));
        assert_eq!(lines[1], FIXED_HEADER);
    }

    #[test]
    fn test_field_quoting() {
        assert_eq!(field("synop"), "synop");
        assert_eq!(field("a,b"), "\"a,b\"");
        assert_eq!(field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
