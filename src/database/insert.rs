use std::collections::HashMap;

use chrono::NaiveDateTime;
use log::trace;

use super::Database;

use crate::{
    errors::MetobsDataErr,
    levtr::{Level, Trange},
    observation::Observation,
    report::Report,
    station::Station,
    vars::Var,
};

impl Database {
    /// Insert an observation.
    ///
    /// The report, station, level/time-range, and context rows are looked
    /// up or created as needed, then one datum is written per variable,
    /// along with any attributes carried inline on the variables.
    ///
    /// When `can_replace` is false and a datum already exists for the same
    /// context and variable code the insert fails with `Conflict`; when
    /// true the existing value is overwritten in place, keeping the datum
    /// id (and with it any attribute references) stable.
    ///
    /// When `station_can_add` is false, data can only be added to stations
    /// already in the index.
    pub fn insert(
        &mut self,
        obs: &Observation,
        can_replace: bool,
        station_can_add: bool,
    ) -> Result<(), MetobsDataErr> {
        if obs.vars.is_empty() {
            return Err(MetobsDataErr::NotEnoughData);
        }

        let rep_id = self.rep_id_for(&obs.report)?;
        let station_id = self.station_id_for(rep_id, &obs.station, station_can_add)?;
        let levtr_id = self.levtr_id_for(obs.level, obs.trange)?;
        let context_id = self.context_id_for(station_id, levtr_id, obs.datetime)?;

        trace!(
            "inserting {} vars into context {}",
            obs.vars.len(),
            context_id
        );

        let mut last_data_ids = HashMap::new();

        for var in &obs.vars {
            let data_id = self.upsert_datum(context_id, var, can_replace)?;

            for attr in &var.attrs {
                self.write_attr(data_id, attr)?;
            }

            last_data_ids.insert(var.code, data_id);
        }

        self.last_data_ids = last_data_ids;

        Ok(())
    }

    /// Insert station values: variables attached to the station itself
    /// rather than to any datetime, level, or time range.
    pub fn insert_station_data(
        &mut self,
        station: &Station,
        report: impl Into<Report>,
        vars: &[Var],
        can_replace: bool,
        station_can_add: bool,
    ) -> Result<(), MetobsDataErr> {
        if vars.is_empty() {
            return Err(MetobsDataErr::NotEnoughData);
        }

        let rep_id = self.rep_id_for(&report.into())?;
        let station_id = self.station_id_for(rep_id, station, station_can_add)?;

        for var in vars {
            let existing: Option<i64> = match self.db_conn.query_row(
                "SELECT rowid FROM station_data WHERE id_station = ?1 AND varcode = ?2",
                &[
                    &station_id as &dyn rusqlite::types::ToSql,
                    &u32::from(var.code) as &dyn rusqlite::types::ToSql,
                ],
                |row| row.get(0),
            ) {
                Ok(rowid) => Some(rowid),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(x) => return Err(MetobsDataErr::Database(x)),
            };

            match existing {
                Some(rowid) => {
                    if !can_replace {
                        return Err(MetobsDataErr::Conflict);
                    }

                    self.db_conn.execute(
                        "UPDATE station_data SET value = ?2 WHERE rowid = ?1",
                        &[
                            &rowid as &dyn rusqlite::types::ToSql,
                            &var.value.to_string() as &dyn rusqlite::types::ToSql,
                        ],
                    )?;
                }
                None => {
                    self.db_conn.execute(
                        "INSERT INTO station_data (id_station, varcode, value)
                              VALUES (?1, ?2, ?3)",
                        &[
                            &station_id as &dyn rusqlite::types::ToSql,
                            &u32::from(var.code) as &dyn rusqlite::types::ToSql,
                            &var.value.to_string(),
                        ],
                    )?;
                }
            }
        }

        Ok(())
    }

    // Resolve a report to its numeric code. Mnemonics not yet in the table
    // are added with a priority above the current maximum; numeric codes
    // must already exist.
    fn rep_id_for(&self, report: &Report) -> Result<u32, MetobsDataErr> {
        match report {
            Report::Code(code) => {
                let found: Result<u32, _> = self.db_conn.query_row(
                    "SELECT id FROM repinfo WHERE id = ?1",
                    &[code],
                    |row| row.get(0),
                );

                match found {
                    Ok(id) => Ok(id),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Err(MetobsDataErr::NotInIndex),
                    Err(x) => Err(MetobsDataErr::Database(x)),
                }
            }
            Report::Memo(memo) => {
                let found: Result<u32, _> = self.db_conn.query_row(
                    "SELECT id FROM repinfo WHERE memo = ?1",
                    &[memo],
                    |row| row.get(0),
                );

                match found {
                    Ok(id) => Ok(id),
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        let (next_id, next_prio): (u32, i64) = self.db_conn.query_row(
                            "SELECT MAX(id) + 1, MAX(prio) + 1 FROM repinfo",
                            rusqlite::NO_PARAMS,
                            |row| Ok((row.get(0)?, row.get(1)?)),
                        )?;

                        self.db_conn.execute(
                            "INSERT INTO repinfo (id, memo, description, prio)
                                  VALUES (?1, ?2, ?3, ?4)",
                            &[
                                &next_id as &dyn rusqlite::types::ToSql,
                                &memo as &dyn rusqlite::types::ToSql,
                                &memo,
                                &next_prio,
                            ],
                        )?;

                        Ok(next_id)
                    }
                    Err(x) => Err(MetobsDataErr::Database(x)),
                }
            }
        }
    }

    // Look up a station by its full identity tuple, creating it when
    // allowed.
    fn station_id_for(
        &self,
        rep_id: u32,
        station: &Station,
        station_can_add: bool,
    ) -> Result<i64, MetobsDataErr> {
        let lat = station.coords.lat_scaled();
        let lon = station.coords.lon_scaled();

        let found: Result<i64, _> = self.db_conn.query_row(
            "
                SELECT id FROM stations
                WHERE rep = ?1 AND lat = ?2 AND lon = ?3 AND ident IS ?4 AND mobile = ?5
            ",
            &[
                &rep_id as &dyn rusqlite::types::ToSql,
                &lat as &dyn rusqlite::types::ToSql,
                &lon,
                &station.ident,
                &station.mobile,
            ],
            |row| row.get(0),
        );

        match found {
            Ok(id) => Ok(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                if !station_can_add {
                    return Err(MetobsDataErr::NotInIndex);
                }

                self.db_conn.execute(
                    "INSERT INTO stations (rep, lat, lon, ident, mobile)
                          VALUES (?1, ?2, ?3, ?4, ?5)",
                    &[
                        &rep_id as &dyn rusqlite::types::ToSql,
                        &lat as &dyn rusqlite::types::ToSql,
                        &lon,
                        &station.ident,
                        &station.mobile,
                    ],
                )?;

                Ok(self.db_conn.last_insert_rowid())
            }
            Err(x) => Err(MetobsDataErr::Database(x)),
        }
    }

    // Look up or create the row for a (level, time range) pair. Unset
    // components are stored as NULL; `IS` comparisons keep the rows unique.
    fn levtr_id_for(&self, level: Level, trange: Trange) -> Result<i64, MetobsDataErr> {
        let [ltype1, l1, ltype2, l2] = level.components();
        let [pind, p1, p2] = trange.components();

        let found: Result<i64, _> = self.db_conn.query_row(
            "
                SELECT id FROM levtrs
                WHERE ltype1 IS ?1 AND l1 IS ?2 AND ltype2 IS ?3 AND l2 IS ?4
                  AND pind IS ?5 AND p1 IS ?6 AND p2 IS ?7
            ",
            &[
                &ltype1 as &dyn rusqlite::types::ToSql,
                &l1,
                &ltype2,
                &l2,
                &pind,
                &p1,
                &p2,
            ],
            |row| row.get(0),
        );

        match found {
            Ok(id) => Ok(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                self.db_conn.execute(
                    "INSERT INTO levtrs (ltype1, l1, ltype2, l2, pind, p1, p2)
                          VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    &[
                        &ltype1 as &dyn rusqlite::types::ToSql,
                        &l1,
                        &ltype2,
                        &l2,
                        &pind,
                        &p1,
                        &p2,
                    ],
                )?;

                Ok(self.db_conn.last_insert_rowid())
            }
            Err(x) => Err(MetobsDataErr::Database(x)),
        }
    }

    // Look up or create an observation context row.
    fn context_id_for(
        &self,
        station_id: i64,
        levtr_id: i64,
        datetime: NaiveDateTime,
    ) -> Result<i64, MetobsDataErr> {
        let found: Result<i64, _> = self.db_conn.query_row(
            "
                SELECT id FROM contexts
                WHERE id_station = ?1 AND id_levtr = ?2 AND datetime = ?3
            ",
            &[
                &station_id as &dyn rusqlite::types::ToSql,
                &levtr_id as &dyn rusqlite::types::ToSql,
                &datetime as &dyn rusqlite::types::ToSql,
            ],
            |row| row.get(0),
        );

        match found {
            Ok(id) => Ok(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                self.db_conn.execute(
                    "INSERT INTO contexts (id_station, id_levtr, datetime)
                          VALUES (?1, ?2, ?3)",
                    &[
                        &station_id as &dyn rusqlite::types::ToSql,
                        &levtr_id as &dyn rusqlite::types::ToSql,
                        &datetime as &dyn rusqlite::types::ToSql,
                    ],
                )?;

                Ok(self.db_conn.last_insert_rowid())
            }
            Err(x) => Err(MetobsDataErr::Database(x)),
        }
    }

    // Write one datum, updating in place on conflict when allowed so the
    // datum id stays stable.
    fn upsert_datum(
        &self,
        context_id: i64,
        var: &Var,
        can_replace: bool,
    ) -> Result<i64, MetobsDataErr> {
        let existing: Result<i64, _> = self.db_conn.query_row(
            "SELECT id FROM data WHERE id_context = ?1 AND varcode = ?2",
            &[
                &context_id as &dyn rusqlite::types::ToSql,
                &u32::from(var.code) as &dyn rusqlite::types::ToSql,
            ],
            |row| row.get(0),
        );

        match existing {
            Ok(data_id) => {
                if !can_replace {
                    return Err(MetobsDataErr::Conflict);
                }

                self.db_conn.execute(
                    "UPDATE data SET value = ?2 WHERE id = ?1",
                    &[
                        &data_id as &dyn rusqlite::types::ToSql,
                        &var.value.to_string() as &dyn rusqlite::types::ToSql,
                    ],
                )?;

                Ok(data_id)
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                self.db_conn.execute(
                    "INSERT INTO data (id_context, varcode, value)
                          VALUES (?1, ?2, ?3)",
                    &[
                        &context_id as &dyn rusqlite::types::ToSql,
                        &u32::from(var.code) as &dyn rusqlite::types::ToSql,
                        &var.value.to_string(),
                    ],
                )?;

                Ok(self.db_conn.last_insert_rowid())
            }
            Err(x) => Err(MetobsDataErr::Database(x)),
        }
    }

    pub(crate) fn write_attr(&self, data_id: i64, attr: &Var) -> Result<(), MetobsDataErr> {
        self.db_conn.execute(
            "INSERT OR REPLACE INTO attrs (id_data, varcode, value)
                  VALUES (?1, ?2, ?3)",
            &[
                &data_id as &dyn rusqlite::types::ToSql,
                &u32::from(attr.code) as &dyn rusqlite::types::ToSql,
                &attr.value.to_string(),
            ],
        )?;

        Ok(())
    }
}
