use chrono::NaiveDateTime;

use super::Database;

use crate::{
    coords::{self, Coords},
    cursor::{Cursor, DataCursor, DataRow},
    errors::MetobsDataErr,
    filter::Filter,
    levtr::{Level, Trange},
    report::ReportInfo,
    station::{Station, StationInfo},
    vars::{Var, VarValue, Varcode},
    vartable,
};

const DATA_FROM: &str = "
    FROM data
    JOIN contexts ON data.id_context = contexts.id
    JOIN stations ON contexts.id_station = stations.id
    JOIN repinfo ON stations.rep = repinfo.id
    JOIN levtrs ON contexts.id_levtr = levtrs.id
";

const STATION_FROM: &str = "
    FROM stations
    JOIN repinfo ON stations.rep = repinfo.id
";

// Collects the WHERE clause and its parameters for a filter. Every set
// filter field contributes one conjunctive condition.
struct CondBuilder {
    conds: Vec<String>,
    params: Vec<Box<dyn rusqlite::types::ToSql>>,
}

impl CondBuilder {
    fn build(filter: &Filter) -> Result<Self, MetobsDataErr> {
        filter.validate()?;

        let mut builder = CondBuilder {
            conds: vec![],
            params: vec![],
        };

        if let Some(lat) = filter.lat {
            builder.push("stations.lat =", Box::new(coords::scaled(lat)));
        }
        if let Some(lat) = filter.latmin {
            builder.push("stations.lat >=", Box::new(coords::scaled(lat)));
        }
        if let Some(lat) = filter.latmax {
            builder.push("stations.lat <=", Box::new(coords::scaled(lat)));
        }
        if let Some(lon) = filter.lon {
            builder.push("stations.lon =", Box::new(coords::scaled(lon)));
        }
        if let Some(lon) = filter.lonmin {
            builder.push("stations.lon >=", Box::new(coords::scaled(lon)));
        }
        if let Some(lon) = filter.lonmax {
            builder.push("stations.lon <=", Box::new(coords::scaled(lon)));
        }
        if let Some(ref ident) = filter.ident {
            builder.push("stations.ident =", Box::new(ident.clone()));
        }
        if let Some(mobile) = filter.mobile {
            builder.push("stations.mobile =", Box::new(mobile));
        }
        if let Some(rep_cod) = filter.rep_cod {
            builder.push("repinfo.id =", Box::new(rep_cod));
        }
        if let Some(ref rep_memo) = filter.rep_memo {
            builder.push("repinfo.memo =", Box::new(rep_memo.clone()));
        }
        if let Some(date) = filter.date {
            builder.push("contexts.datetime =", Box::new(date));
        }
        if let Some(date) = filter.datemin {
            builder.push("contexts.datetime >=", Box::new(date));
        }
        if let Some(date) = filter.datemax {
            builder.push("contexts.datetime <=", Box::new(date));
        }
        if let Some(year) = filter.yearmin {
            builder.push(
                "CAST(strftime('%Y', contexts.datetime) AS INTEGER) >=",
                Box::new(year),
            );
        }
        if let Some(year) = filter.yearmax {
            builder.push(
                "CAST(strftime('%Y', contexts.datetime) AS INTEGER) <=",
                Box::new(year),
            );
        }

        let level_columns = ["levtrs.ltype1 =", "levtrs.l1 =", "levtrs.ltype2 =", "levtrs.l2 ="];
        for (column, component) in level_columns.iter().zip(&filter.level.components()) {
            if let Some(val) = component {
                builder.push(column, Box::new(*val));
            }
        }

        let trange_columns = ["levtrs.pind =", "levtrs.p1 =", "levtrs.p2 ="];
        for (column, component) in trange_columns.iter().zip(&filter.trange.components()) {
            if let Some(val) = component {
                builder.push(column, Box::new(*val));
            }
        }

        if let Some(var) = filter.var {
            builder.push("data.varcode =", Box::new(u32::from(var)));
        }
        if let Some(context_id) = filter.context_id {
            builder.push("contexts.id =", Box::new(context_id));
        }

        Ok(builder)
    }

    fn push(&mut self, expr: &str, param: Box<dyn rusqlite::types::ToSql>) {
        self.conds.push(format!("{} ?{}", expr, self.params.len() + 1));
        self.params.push(param);
    }

    fn where_clause(&self) -> String {
        if self.conds.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conds.join(" AND "))
        }
    }

    fn params(&self) -> Vec<&dyn rusqlite::types::ToSql> {
        self.params.iter().map(|param| param.as_ref()).collect()
    }
}

impl Database {
    /// Query individual data values.
    ///
    /// Rows are ordered by ascending datetime, then by datum insertion
    /// order, so the association between rows and attribute references is
    /// stable across identical queries.
    pub fn query_data(&self, filter: &Filter) -> Result<DataCursor, MetobsDataErr> {
        let builder = CondBuilder::build(filter)?;

        let sql = format!(
            "
                SELECT stations.id, stations.lat, stations.lon, stations.ident, stations.mobile,
                       repinfo.id, repinfo.memo,
                       contexts.datetime,
                       levtrs.ltype1, levtrs.l1, levtrs.ltype2, levtrs.l2,
                       levtrs.pind, levtrs.p1, levtrs.p2,
                       data.varcode, data.value, contexts.id
                {} {}
                ORDER BY contexts.datetime, data.id
            ",
            DATA_FROM,
            builder.where_clause()
        );

        let mut stmt = self.db_conn.prepare(&sql)?;

        let rows: Result<Vec<DataRow>, MetobsDataErr> = stmt
            .query_and_then(&builder.params(), Self::parse_row_to_data_row)?
            .collect();

        Ok(DataCursor::new(self, rows?))
    }

    /// Query the distinct stations with data or station values matching
    /// the filter.
    ///
    /// The result shape is a pure station projection; it never carries
    /// variable data.
    pub fn query_stations(&self, filter: &Filter) -> Result<Cursor<StationInfo>, MetobsDataErr> {
        let builder = CondBuilder::build(filter)?;

        // Only join through the data tables when the filter actually
        // constrains them, so stations without data are still listed.
        let from = if filter.is_station_only() {
            STATION_FROM
        } else {
            DATA_FROM
        };

        let sql = format!(
            "
                SELECT DISTINCT stations.id, stations.lat, stations.lon, stations.ident,
                       stations.mobile, repinfo.id, repinfo.memo
                {} {}
                ORDER BY stations.id
            ",
            from,
            builder.where_clause()
        );

        let mut stmt = self.db_conn.prepare(&sql)?;

        let rows: Result<Vec<StationInfo>, MetobsDataErr> = stmt
            .query_and_then(&builder.params(), |row| {
                Self::parse_row_to_station(row).map_err(MetobsDataErr::Database)
            })?
            .collect();

        Ok(Cursor::new(rows?))
    }

    /// Query the distinct vertical levels of the matching data.
    pub fn query_levels(&self, filter: &Filter) -> Result<Cursor<Level>, MetobsDataErr> {
        let builder = CondBuilder::build(filter)?;

        let sql = format!(
            "
                SELECT DISTINCT levtrs.ltype1, levtrs.l1, levtrs.ltype2, levtrs.l2
                {} {}
                ORDER BY levtrs.ltype1, levtrs.l1, levtrs.ltype2, levtrs.l2
            ",
            DATA_FROM,
            builder.where_clause()
        );

        let mut stmt = self.db_conn.prepare(&sql)?;

        let rows: Result<Vec<Level>, MetobsDataErr> = stmt
            .query_and_then(&builder.params(), |row| {
                Ok(Level {
                    ltype1: row.get(0)?,
                    l1: row.get(1)?,
                    ltype2: row.get(2)?,
                    l2: row.get(3)?,
                })
            })?
            .collect();

        Ok(Cursor::new(rows?))
    }

    /// Query the distinct time ranges of the matching data.
    pub fn query_tranges(&self, filter: &Filter) -> Result<Cursor<Trange>, MetobsDataErr> {
        let builder = CondBuilder::build(filter)?;

        let sql = format!(
            "
                SELECT DISTINCT levtrs.pind, levtrs.p1, levtrs.p2
                {} {}
                ORDER BY levtrs.pind, levtrs.p1, levtrs.p2
            ",
            DATA_FROM,
            builder.where_clause()
        );

        let mut stmt = self.db_conn.prepare(&sql)?;

        let rows: Result<Vec<Trange>, MetobsDataErr> = stmt
            .query_and_then(&builder.params(), |row| {
                Ok(Trange {
                    pind: row.get(0)?,
                    p1: row.get(1)?,
                    p2: row.get(2)?,
                })
            })?
            .collect();

        Ok(Cursor::new(rows?))
    }

    /// Query the distinct networks of the matching data.
    pub fn query_reports(&self, filter: &Filter) -> Result<Cursor<ReportInfo>, MetobsDataErr> {
        let builder = CondBuilder::build(filter)?;

        let sql = format!(
            "
                SELECT DISTINCT repinfo.id, repinfo.memo, repinfo.prio
                {} {}
                ORDER BY repinfo.id
            ",
            DATA_FROM,
            builder.where_clause()
        );

        let mut stmt = self.db_conn.prepare(&sql)?;

        let rows: Result<Vec<ReportInfo>, MetobsDataErr> = stmt
            .query_and_then(&builder.params(), |row| {
                Ok(ReportInfo {
                    rep_cod: row.get(0)?,
                    rep_memo: row.get(1)?,
                    prio: row.get(2)?,
                })
            })?
            .collect();

        Ok(Cursor::new(rows?))
    }

    /// Query the distinct variable codes of the matching data.
    pub fn query_variable_types(&self, filter: &Filter) -> Result<Cursor<Varcode>, MetobsDataErr> {
        let builder = CondBuilder::build(filter)?;

        let sql = format!(
            "
                SELECT DISTINCT data.varcode
                {} {}
                ORDER BY data.varcode
            ",
            DATA_FROM,
            builder.where_clause()
        );

        let mut stmt = self.db_conn.prepare(&sql)?;

        let rows: Result<Vec<Varcode>, MetobsDataErr> = stmt
            .query_and_then(&builder.params(), |row| {
                let code: u32 = row.get(0)?;
                Ok(Varcode::from(code as u16))
            })?
            .collect();

        Ok(Cursor::new(rows?))
    }

    /// The earliest and latest datetime among the matching data, or
    /// `(None, None)` when nothing matches.
    pub fn query_datetime_extremes(
        &self,
        filter: &Filter,
    ) -> Result<(Option<NaiveDateTime>, Option<NaiveDateTime>), MetobsDataErr> {
        let builder = CondBuilder::build(filter)?;

        let sql = format!(
            "SELECT MIN(contexts.datetime), MAX(contexts.datetime) {} {}",
            DATA_FROM,
            builder.where_clause()
        );

        let extremes = self
            .db_conn
            .query_row(&sql, &builder.params(), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;

        Ok(extremes)
    }

    /// The station values stored for one station, ordered by code.
    pub fn station_data(&self, station_id: i64) -> Result<Vec<Var>, MetobsDataErr> {
        let mut stmt = self.db_conn.prepare(
            "
                SELECT varcode, value FROM station_data
                WHERE id_station = ?1
                ORDER BY varcode
            ",
        )?;

        let vals: Result<Vec<Var>, MetobsDataErr> = stmt
            .query_and_then(&[&station_id], Self::parse_row_to_var)?
            .collect();

        vals
    }

    pub(crate) fn parse_row_to_var(row: &rusqlite::Row) -> Result<Var, MetobsDataErr> {
        let code: u32 = row.get(0)?;
        let code = Varcode::from(code as u16);
        let raw: String = row.get(1)?;

        let info = vartable::varinfo(code)?;
        let value = VarValue::parse(info.kind, &raw)?;

        Ok(Var {
            code,
            value,
            attrs: vec![],
        })
    }

    fn parse_row_to_station(row: &rusqlite::Row) -> Result<StationInfo, rusqlite::Error> {
        let id: i64 = row.get(0)?;
        let lat: i64 = row.get(1)?;
        let lon: i64 = row.get(2)?;
        let ident: Option<String> = row.get(3)?;
        let mobile: bool = row.get(4)?;
        let rep_cod: u32 = row.get(5)?;
        let rep_memo: String = row.get(6)?;

        Ok(StationInfo {
            id,
            station: Station {
                coords: Coords::from_scaled(lat, lon),
                ident,
                mobile,
            },
            rep_cod,
            rep_memo,
        })
    }

    fn parse_row_to_data_row(row: &rusqlite::Row) -> Result<DataRow, MetobsDataErr> {
        let station = Self::parse_row_to_station(row)?;

        let datetime: NaiveDateTime = row.get(7)?;

        let level = Level {
            ltype1: row.get(8)?,
            l1: row.get(9)?,
            ltype2: row.get(10)?,
            l2: row.get(11)?,
        };

        let trange = Trange {
            pind: row.get(12)?,
            p1: row.get(13)?,
            p2: row.get(14)?,
        };

        let code: u32 = row.get(15)?;
        let code = Varcode::from(code as u16);
        let raw: String = row.get(16)?;

        let info = vartable::varinfo(code)?;
        let value = VarValue::parse(info.kind, &raw)?;

        let context_id: i64 = row.get(17)?;

        Ok(DataRow {
            station,
            datetime,
            level,
            trange,
            var: Var {
                code,
                value,
                attrs: vec![],
            },
            context_id,
        })
    }
}

#[cfg(test)]
mod unit {
    use super::*;
    use crate::database::unit::*; // test helpers.
    use crate::{observation::Observation, report::Report, vars::VarValue};

    use chrono::NaiveDate;

    #[test]
    fn test_query_stations() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");

        let mut cur = db.query_stations(&Filter::all()).expect("Error querying.");
        assert_eq!(cur.remaining(), 1);

        let mut count = 0;
        while let Some(info) = cur.next() {
            assert_eq!(info.station.coords.lat, 12.34560);
            assert_eq!(info.station.coords.lon, 76.54320);
            assert_eq!(info.rep_cod, 1);
            assert_eq!(info.rep_memo, "synop");
            assert!(!info.station.mobile);
            assert!(info.station.ident.is_none());
            count += 1;
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn test_query_data_remaining() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");

        let filter = Filter {
            latmin: Some(10.0),
            ..Filter::default()
        };

        let mut cur = db.query_data(&filter).expect("Error querying.");
        assert_eq!(cur.remaining(), 2);

        let mut expected = vec![
            ("B01011".parse::<Varcode>().unwrap(), VarValue::from("Hey Hey!!")),
            ("B01012".parse::<Varcode>().unwrap(), VarValue::from(500)),
        ];

        let mut count = 0;
        while let Some(row) = cur.next() {
            count += 1;
            assert_eq!(cur.remaining(), 2 - count);

            let pos = expected
                .iter()
                .position(|(code, _)| *code == row.var.code)
                .expect("Unexpected variable code.");
            let (_, value) = expected.remove(pos);
            assert_eq!(row.var.value, value);
        }
        assert_eq!(count, 2);
        assert!(expected.is_empty());
    }

    #[test]
    fn test_query_data_no_match() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");

        let filter = Filter {
            latmin: Some(80.0),
            ..Filter::default()
        };

        assert_eq!(db.query_data(&filter).unwrap().remaining(), 0);
    }

    #[test]
    fn test_query_levels() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");

        let mut cur = db.query_levels(&Filter::all()).expect("Error querying.");
        assert_eq!(cur.remaining(), 1);

        for level in &mut cur {
            assert_eq!(level, (10, 11, 15, 22).into());
        }
    }

    #[test]
    fn test_query_tranges() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");

        let mut cur = db.query_tranges(&Filter::all()).expect("Error querying.");
        assert_eq!(cur.remaining(), 1);

        for trange in &mut cur {
            assert_eq!(trange, (20, 111, 222).into());
        }
    }

    #[test]
    fn test_query_variable_types() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");

        let cur = db
            .query_variable_types(&Filter::all())
            .expect("Error querying.");
        assert_eq!(cur.remaining(), 2);

        let codes: Vec<Varcode> = cur.collect();
        assert_eq!(codes[0], "B01011".parse().unwrap());
        assert_eq!(codes[1], "B01012".parse().unwrap());
    }

    #[test]
    fn test_query_reports() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");

        let mut cur = db.query_reports(&Filter::all()).expect("Error querying.");
        assert_eq!(cur.remaining(), 1);

        for report in &mut cur {
            assert_eq!(report.rep_cod, 1);
            assert_eq!(report.rep_memo, "synop");
        }
    }

    #[test]
    fn test_query_datetime_extremes() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");

        let (dmin, dmax) = db
            .query_datetime_extremes(&Filter::all())
            .expect("Error querying.");
        assert_eq!(dmin, Some(NaiveDate::from_ymd(1945, 4, 25).and_hms(8, 0, 0)));
        assert_eq!(dmax, Some(NaiveDate::from_ymd(1945, 4, 25).and_hms(8, 0, 0)));

        // An empty result is not an error, just absent bounds.
        let filter = Filter {
            yearmin: Some(2000),
            ..Filter::default()
        };
        let (dmin, dmax) = db
            .query_datetime_extremes(&filter)
            .expect("Error querying.");
        assert_eq!(dmin, None);
        assert_eq!(dmax, None);
    }

    #[test]
    fn test_query_by_context_id() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");
        let attr_ref = fixture_attr_ref(&db);

        let filter = Filter {
            context_id: Some(attr_ref),
            ..Filter::default()
        };

        // Both fixture vars share the context.
        assert_eq!(db.query_data(&filter).unwrap().remaining(), 2);
    }

    #[test]
    fn test_query_ordering_is_stable() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        // Three datetimes inserted out of order.
        for day in &[3, 1, 2] {
            let obs = Observation::new(
                Station::fixed((45.0, 11.0)),
                Report::memo("synop"),
                NaiveDate::from_ymd(2018, 1, *day).and_hms(12, 0, 0),
            )
            .with_level((103, 2000))
            .with_trange((254, 0, 0))
            .with_var(Var::parse("B12101", 270.96).unwrap());

            db.insert(&obs, false, true).expect("Error inserting.");
        }

        let days: Vec<u32> = db
            .query_data(&Filter::all())
            .expect("Error querying.")
            .map(|row| chrono::Datelike::day(&row.datetime))
            .collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn test_query_invalid_filter() {
        let TestDb { tmp: _tmp, db } = create_test_db().expect("Failed to create test database.");

        let filter = Filter {
            latmin: Some(20.0),
            latmax: Some(10.0),
            ..Filter::default()
        };

        match db.query_data(&filter) {
            Err(MetobsDataErr::InvalidFilter(_)) => {}
            Err(err) => panic!("Wrong error type returned: {}", err),
            Ok(_) => panic!("Contradictory filters should not run."),
        }
    }

    #[test]
    fn test_query_level_component_wildcard() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");

        // Only ltype1 given; the other components are wildcards.
        let filter = Filter {
            level: 10.into(),
            ..Filter::default()
        };
        assert_eq!(db.query_data(&filter).unwrap().remaining(), 2);

        let filter = Filter {
            level: 99.into(),
            ..Filter::default()
        };
        assert_eq!(db.query_data(&filter).unwrap().remaining(), 0);
    }
}
