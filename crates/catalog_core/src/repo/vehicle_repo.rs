//! Vehicle repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create, delete and partially edit `car` rows.
//! - Count and page through rows matching a bound-parameter predicate.
//!
//! # Invariants
//! - Pages are ordered by `car_id DESC` (most recently created first).
//! - Filtering never writes; only create/edit resolve owners with an upsert.
//! - Deleting or editing a missing id affects zero rows and is not an error,
//!   and an edit of a missing id never upserts its owner.

use crate::model::vehicle::{NewVehicle, Person, Vehicle, VehicleFilter, VehicleId, VehiclePatch};
use crate::query::predicate::{Assignments, OwnerMatch, Predicate};
use crate::repo::owner_repo::{patronymic_from_db, OwnerRepository, SqliteOwnerRepository};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const VEHICLE_SELECT_SQL: &str = "SELECT
    car_id,
    reg_num,
    mark,
    model,
    year,
    person_id,
    name,
    surname,
    patronymic
FROM car
INNER JOIN person ON person.person_id = car.owner";

/// Repository interface for vehicle operations.
pub trait VehicleRepository {
    /// Resolves the owner and inserts one vehicle; returns its new id.
    fn create_vehicle(&self, vehicle: &NewVehicle) -> RepoResult<VehicleId>;
    /// Loads one vehicle with its owner.
    fn get_vehicle(&self, id: VehicleId) -> RepoResult<Option<Vehicle>>;
    /// Deletes one vehicle; returns affected rows.
    fn delete_vehicle(&self, id: VehicleId) -> RepoResult<usize>;
    /// Writes the present fields of `patch`; returns affected rows.
    fn edit_vehicle(&self, id: VehicleId, patch: &VehiclePatch) -> RepoResult<usize>;
    /// Builds the predicate for `filter`, or `None` when nothing can match.
    fn filter_predicate(&self, filter: &VehicleFilter) -> RepoResult<Option<Predicate>>;
    /// Counts rows matching `predicate`.
    fn count_vehicles(&self, predicate: &Predicate) -> RepoResult<u64>;
    /// Lists one page of rows matching `predicate`, newest first.
    fn list_vehicles(
        &self,
        predicate: &Predicate,
        limit: u32,
        offset: u64,
    ) -> RepoResult<Vec<Vehicle>>;
}

/// SQLite-backed vehicle repository.
pub struct SqliteVehicleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteVehicleRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["person", "car"])?;
        Ok(Self { conn })
    }

    fn owners(&self) -> SqliteOwnerRepository<'conn> {
        SqliteOwnerRepository::new_unchecked(self.conn)
    }

    fn vehicle_exists(&self, id: VehicleId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM car WHERE car_id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl VehicleRepository for SqliteVehicleRepository<'_> {
    fn create_vehicle(&self, vehicle: &NewVehicle) -> RepoResult<VehicleId> {
        vehicle.validate()?;

        // Owner and car inserts are separate statements; an orphaned owner
        // row is harmless because owners are keyed by identity.
        let owner_id = self.owners().resolve_owner(&vehicle.owner)?;
        self.conn.execute(
            "INSERT INTO car (reg_num, mark, model, year, owner)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                vehicle.reg_num.as_str(),
                vehicle.mark.as_str(),
                vehicle.model.as_str(),
                vehicle.year,
                owner_id,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_vehicle(&self, id: VehicleId) -> RepoResult<Option<Vehicle>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{VEHICLE_SELECT_SQL} WHERE car_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_vehicle_row(row)?));
        }
        Ok(None)
    }

    fn delete_vehicle(&self, id: VehicleId) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM car WHERE car_id = ?1;", [id])?;
        Ok(changed)
    }

    fn edit_vehicle(&self, id: VehicleId, patch: &VehiclePatch) -> RepoResult<usize> {
        patch.validate()?;
        if patch.is_empty() {
            return Ok(0);
        }

        let owner_id = match &patch.owner {
            Some(owner) => {
                // No owner upsert for a car that is not there.
                if !self.vehicle_exists(id)? {
                    return Ok(0);
                }
                Some(self.owners().resolve_owner(owner)?)
            }
            None => None,
        };
        let assignments = Assignments::for_patch(patch, owner_id);

        let sql = format!(
            "UPDATE car SET {} WHERE car_id = ?{};",
            assignments.set_sql(),
            assignments.next_placeholder()
        );
        let mut bind_values = assignments.values();
        bind_values.push(Value::Integer(id));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed)
    }

    fn filter_predicate(&self, filter: &VehicleFilter) -> RepoResult<Option<Predicate>> {
        let owner = match filter.owner.as_ref().filter(|owner| !owner.is_blank()) {
            None => OwnerMatch::Any,
            Some(owner) => match self.owners().find_owner(owner)? {
                Some(person_id) => OwnerMatch::Person(person_id),
                None => OwnerMatch::Nobody,
            },
        };
        Ok(Predicate::for_filter(filter, owner))
    }

    fn count_vehicles(&self, predicate: &Predicate) -> RepoResult<u64> {
        let sql = format!("SELECT count(car_id) FROM car{};", predicate.where_sql());
        let count: i64 =
            self.conn
                .query_row(&sql, params_from_iter(predicate.values()), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }

    fn list_vehicles(
        &self,
        predicate: &Predicate,
        limit: u32,
        offset: u64,
    ) -> RepoResult<Vec<Vehicle>> {
        let limit_placeholder = predicate.next_placeholder();
        let sql = format!(
            "{VEHICLE_SELECT_SQL}{} ORDER BY car_id DESC LIMIT ?{} OFFSET ?{};",
            predicate.where_sql(),
            limit_placeholder,
            limit_placeholder + 1
        );

        let mut bind_values = predicate.values();
        bind_values.push(Value::Integer(i64::from(limit)));
        bind_values.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut vehicles = Vec::new();
        while let Some(row) = rows.next()? {
            vehicles.push(parse_vehicle_row(row)?);
        }

        Ok(vehicles)
    }
}

fn parse_vehicle_row(row: &Row<'_>) -> RepoResult<Vehicle> {
    let year = match row.get::<_, Option<i64>>("year")? {
        Some(value) => Some(i32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!("invalid year value `{value}` in car.year"))
        })?),
        None => None,
    };

    Ok(Vehicle {
        id: row.get("car_id")?,
        reg_num: row.get("reg_num")?,
        mark: row.get("mark")?,
        model: row.get("model")?,
        year,
        owner: Person {
            id: row.get("person_id")?,
            name: row.get("name")?,
            surname: row.get("surname")?,
            patronymic: patronymic_from_db(row.get("patronymic")?),
        },
    })
}
