//! Owner repository: idempotent owner resolution by identity tuple.
//!
//! # Responsibility
//! - Map an owner identity to its `person_id`, inserting on first sight.
//! - Offer a lookup-only path for read use-cases (filtering).
//!
//! # Invariants
//! - `(name, surname, patronymic)` is unique in `person`; duplicate inserts
//!   are ignored by the store, so concurrent resolvers converge on one row.
//! - Absent patronymic is stored as `''`.

use crate::model::vehicle::{OwnerIdentity, Person, PersonId};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for owner rows.
pub trait OwnerRepository {
    /// Returns the id for `identity`, creating the owner row when missing.
    fn resolve_owner(&self, identity: &OwnerIdentity) -> RepoResult<PersonId>;
    /// Returns the id for `identity` without writing anything.
    fn find_owner(&self, identity: &OwnerIdentity) -> RepoResult<Option<PersonId>>;
    /// Loads one owner by id.
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
}

/// SQLite-backed owner repository.
pub struct SqliteOwnerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOwnerRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["person"])?;
        Ok(Self { conn })
    }

    pub(crate) fn new_unchecked(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl OwnerRepository for SqliteOwnerRepository<'_> {
    fn resolve_owner(&self, identity: &OwnerIdentity) -> RepoResult<PersonId> {
        identity.validate()?;

        self.conn.execute(
            "INSERT INTO person (name, surname, patronymic)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (name, surname, patronymic) DO NOTHING;",
            params![
                identity.name.as_str(),
                identity.surname.as_str(),
                identity.stored_patronymic(),
            ],
        )?;

        self.find_owner(identity)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "owner `{} {}` missing right after upsert",
                identity.name, identity.surname
            ))
        })
    }

    fn find_owner(&self, identity: &OwnerIdentity) -> RepoResult<Option<PersonId>> {
        let person_id = self
            .conn
            .query_row(
                "SELECT person_id
                 FROM person
                 WHERE name = ?1
                   AND surname = ?2
                   AND patronymic = ?3;",
                params![
                    identity.name.as_str(),
                    identity.surname.as_str(),
                    identity.stored_patronymic(),
                ],
                |row| row.get::<_, PersonId>(0),
            )
            .optional()?;
        Ok(person_id)
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let person = self
            .conn
            .query_row(
                "SELECT person_id, name, surname, patronymic
                 FROM person
                 WHERE person_id = ?1;",
                [id],
                |row| {
                    Ok(Person {
                        id: row.get("person_id")?,
                        name: row.get("name")?,
                        surname: row.get("surname")?,
                        patronymic: patronymic_from_db(row.get("patronymic")?),
                    })
                },
            )
            .optional()?;
        Ok(person)
    }
}

pub(crate) fn patronymic_from_db(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
