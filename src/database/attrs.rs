use super::Database;

use crate::{
    errors::MetobsDataErr,
    vars::{Var, Varcode},
};

impl Database {
    /// Attach attributes to the datum identified by its variable code and
    /// context reference. An attribute with the same code as an existing
    /// one overwrites it.
    pub fn attr_insert(
        &mut self,
        varcode: Varcode,
        context_id: i64,
        attrs: &[Var],
    ) -> Result<(), MetobsDataErr> {
        let data_id = self.data_id(varcode, context_id)?;

        for attr in attrs {
            self.write_attr(data_id, attr)?;
        }

        Ok(())
    }

    /// Attach attributes to a datum written by the most recent insert on
    /// this handle, identified by its variable code.
    pub fn attr_insert_last(
        &mut self,
        varcode: Varcode,
        attrs: &[Var],
    ) -> Result<(), MetobsDataErr> {
        let data_id = match self.last_data_ids.get(&varcode) {
            Some(&data_id) => data_id,
            None => return Err(MetobsDataErr::NotInIndex),
        };

        for attr in attrs {
            self.write_attr(data_id, attr)?;
        }

        Ok(())
    }

    /// Query the attributes of one datum.
    ///
    /// With `wanted` set, only attributes whose code is in the list are
    /// returned. A datum without attributes yields an empty list; a datum
    /// that does not exist is an error.
    pub fn attr_query(
        &self,
        varcode: Varcode,
        context_id: i64,
        wanted: Option<&[Varcode]>,
    ) -> Result<Vec<Var>, MetobsDataErr> {
        let data_id = self.data_id(varcode, context_id)?;

        let mut stmt = self.db_conn.prepare(
            "
                SELECT varcode, value FROM attrs
                WHERE id_data = ?1
                ORDER BY varcode
            ",
        )?;

        let vals: Result<Vec<Var>, MetobsDataErr> = stmt
            .query_and_then(&[&data_id], Self::parse_row_to_var)?
            .collect();

        let mut vals = vals?;

        if let Some(wanted) = wanted {
            vals.retain(|attr| wanted.contains(&attr.code));
        }

        Ok(vals)
    }

    /// Remove the named attribute codes from one datum.
    ///
    /// Codes that are not present are ignored; a datum that does not exist
    /// is an error.
    pub fn attr_remove(
        &mut self,
        varcode: Varcode,
        context_id: i64,
        codes: &[Varcode],
    ) -> Result<(), MetobsDataErr> {
        let data_id = self.data_id(varcode, context_id)?;

        for code in codes {
            self.db_conn.execute(
                "DELETE FROM attrs WHERE id_data = ?1 AND varcode = ?2",
                &[
                    &data_id as &dyn rusqlite::types::ToSql,
                    &u32::from(*code) as &dyn rusqlite::types::ToSql,
                ],
            )?;
        }

        Ok(())
    }

    // Resolve (variable code, context reference) to the datum row id.
    fn data_id(&self, varcode: Varcode, context_id: i64) -> Result<i64, MetobsDataErr> {
        let found: Result<i64, _> = self.db_conn.query_row(
            "SELECT id FROM data WHERE id_context = ?1 AND varcode = ?2",
            &[
                &context_id as &dyn rusqlite::types::ToSql,
                &u32::from(varcode) as &dyn rusqlite::types::ToSql,
            ],
            |row| row.get(0),
        );

        match found {
            Ok(id) => Ok(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(MetobsDataErr::NotInIndex),
            Err(x) => Err(MetobsDataErr::Database(x)),
        }
    }
}

#[cfg(test)]
mod unit {
    use super::*;
    use crate::database::unit::*; // test helpers.
    use crate::{filter::Filter, vars::VarValue};

    fn b(code: &str) -> Varcode {
        code.parse().expect("Bad code in test.")
    }

    #[test]
    fn test_attr_round_trip() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");
        let attr_ref = fixture_attr_ref(&db);

        let attrs = db
            .attr_query(b("B01011"), attr_ref, None)
            .expect("Error querying attributes.");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].code, b("B33007"));
        assert_eq!(attrs[0].value, VarValue::from(50));
        assert_eq!(attrs[1].code, b("B33036"));
        assert_eq!(attrs[1].value, VarValue::from(75));
    }

    #[test]
    fn test_attr_query_wanted_subset() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");
        let attr_ref = fixture_attr_ref(&db);

        let attrs = db
            .attr_query(b("B01011"), attr_ref, Some(&[b("B33036")]))
            .expect("Error querying attributes.");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].code, b("B33036"));
        assert_eq!(attrs[0].value, VarValue::from(75));

        // A wanted code that is not there yields an empty result.
        let attrs = db
            .attr_query(b("B01011"), attr_ref, Some(&[b("B33040")]))
            .expect("Error querying attributes.");
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_attr_remove() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");
        let attr_ref = fixture_attr_ref(&db);

        db.attr_remove(b("B01011"), attr_ref, &[b("B33007")])
            .expect("Error removing attribute.");

        let attrs = db
            .attr_query(b("B01011"), attr_ref, None)
            .expect("Error querying attributes.");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].code, b("B33036"));

        // Removing a code that was never there is a no-op.
        db.attr_remove(b("B01011"), attr_ref, &[b("B33040")])
            .expect("Removing a missing code should not fail.");

        let attrs = db
            .attr_query(b("B01011"), attr_ref, None)
            .expect("Error querying attributes.");
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_attr_overwrite() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");
        let attr_ref = fixture_attr_ref(&db);

        db.attr_insert(b("B01011"), attr_ref, &[Var::parse("B33007", 99).unwrap()])
            .expect("Error overwriting attribute.");

        let attrs = db
            .attr_query(b("B01011"), attr_ref, Some(&[b("B33007")]))
            .expect("Error querying attributes.");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value, VarValue::from(99));
    }

    #[test]
    fn test_attr_ops_on_missing_datum() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");
        let attr_ref = fixture_attr_ref(&db);

        // Valid context, wrong variable code.
        match db.attr_query(b("B12101"), attr_ref, None) {
            Err(MetobsDataErr::NotInIndex) => {}
            Err(err) => panic!("Wrong error type returned: {}", err),
            Ok(_) => panic!("There is no B12101 datum to query."),
        }

        // Invalid context reference.
        match db.attr_remove(b("B01011"), 99_999, &[b("B33007")]) {
            Err(MetobsDataErr::NotInIndex) => {}
            Err(err) => panic!("Wrong error type returned: {}", err),
            Ok(_) => panic!("There is no such context."),
        }
    }

    #[test]
    fn test_cursor_attr_query() {
        let TestDb { tmp: _tmp, mut db } =
            create_test_db().expect("Failed to create test database.");

        fill_test_db(&mut db).expect("Error filling test database.");

        let filter = Filter {
            var: Some(b("B01011")),
            ..Filter::default()
        };

        let mut cur = db.query_data(&filter).expect("Error querying.");

        // Asking before the first row is a logic error.
        assert!(cur.query_attrs(None).is_err());

        cur.next().expect("Missing row.");

        let attrs = cur.query_attrs(None).expect("Error querying attributes.");
        assert_eq!(attrs.len(), 2);

        let attrs = cur
            .query_attrs(Some(&[b("B33036")]))
            .expect("Error querying attributes.");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].code, b("B33036"));
        assert_eq!(attrs[0].value, VarValue::from(75));
    }
}
