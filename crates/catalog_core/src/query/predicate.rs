//! Bound-parameter builders for catalog filters and partial updates.
//!
//! # Responsibility
//! - Turn a sparse `VehicleFilter` into an `AND`-joined equality predicate.
//! - Turn a sparse `VehiclePatch` into an `UPDATE ... SET` assignment list.
//!
//! # Invariants
//! - SQL text only ever contains column names from `CarColumn` and
//!   positional placeholders `?N`; every value is bound separately.
//! - Placeholders are numbered from `?1` in insertion order, so callers can
//!   append their own parameters starting at `next_placeholder()`.
//! - A filter whose owner could not be resolved never becomes a predicate
//!   that matches everything.

use crate::model::vehicle::{FieldUpdate, PersonId, VehicleFilter, VehiclePatch};
use rusqlite::types::Value;

/// Columns of the `car` table that may appear in generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarColumn {
    Id,
    RegNum,
    Mark,
    Model,
    Year,
    Owner,
}

impl CarColumn {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Id => "car_id",
            Self::RegNum => "reg_num",
            Self::Mark => "mark",
            Self::Model => "model",
            Self::Year => "year",
            Self::Owner => "owner",
        }
    }
}

/// How the owner part of a filter was resolved against storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerMatch {
    /// Filter does not constrain the owner.
    Any,
    /// Filter owner resolved to this person.
    Person(PersonId),
    /// Filter named an owner that does not exist.
    Nobody,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct BoundTerms {
    terms: Vec<(CarColumn, Value)>,
}

impl BoundTerms {
    fn push(&mut self, column: CarColumn, value: Value) {
        self.terms.push((column, value));
    }

    fn render(&self, separator: &str) -> String {
        self.terms
            .iter()
            .enumerate()
            .map(|(index, (column, _))| format!("{} = ?{}", column.as_sql(), index + 1))
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn values(&self) -> Vec<Value> {
        self.terms.iter().map(|(_, value)| value.clone()).collect()
    }
}

/// Equality predicate over `car` columns, joined by `AND`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    terms: BoundTerms,
}

impl Predicate {
    /// Predicate that matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds the predicate for a sparse filter.
    ///
    /// Returns `None` when the filter can match nothing (unknown owner).
    pub fn for_filter(filter: &VehicleFilter, owner: OwnerMatch) -> Option<Self> {
        let mut predicate = Self::all();

        if let Some(id) = filter.id {
            predicate.push_eq(CarColumn::Id, Value::Integer(id));
        }
        if let Some(reg_num) = &filter.reg_num {
            predicate.push_eq(CarColumn::RegNum, Value::Text(reg_num.clone()));
        }
        if let Some(mark) = &filter.mark {
            predicate.push_eq(CarColumn::Mark, Value::Text(mark.clone()));
        }
        if let Some(model) = &filter.model {
            predicate.push_eq(CarColumn::Model, Value::Text(model.clone()));
        }
        if let Some(year) = filter.year {
            predicate.push_eq(CarColumn::Year, Value::Integer(i64::from(year)));
        }

        match owner {
            OwnerMatch::Any => {}
            OwnerMatch::Person(person_id) => {
                predicate.push_eq(CarColumn::Owner, Value::Integer(person_id));
            }
            OwnerMatch::Nobody => return None,
        }

        Some(predicate)
    }

    pub fn push_eq(&mut self, column: CarColumn, value: Value) {
        self.terms.push(column, value);
    }

    pub fn is_empty(&self) -> bool {
        self.terms.terms.is_empty()
    }

    /// ` WHERE a = ?1 AND b = ?2`, or the empty string for no terms.
    pub fn where_sql(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.terms.render(" AND "))
        }
    }

    /// First placeholder index free for parameters appended by the caller.
    pub fn next_placeholder(&self) -> usize {
        self.terms.terms.len() + 1
    }

    /// Bound values in placeholder order.
    pub fn values(&self) -> Vec<Value> {
        self.terms.values()
    }
}

/// Column assignments for a partial `UPDATE car`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments {
    terms: BoundTerms,
}

impl Assignments {
    /// Builds assignments for every present field of `patch`.
    ///
    /// `owner_id` is the resolved owner when `patch.owner` is present.
    pub fn for_patch(patch: &VehiclePatch, owner_id: Option<PersonId>) -> Self {
        let mut assignments = Self::default();

        if let Some(reg_num) = &patch.reg_num {
            assignments.set(CarColumn::RegNum, Value::Text(reg_num.clone()));
        }
        if let Some(mark) = &patch.mark {
            assignments.set(CarColumn::Mark, Value::Text(mark.clone()));
        }
        if let Some(model) = &patch.model {
            assignments.set(CarColumn::Model, Value::Text(model.clone()));
        }
        match patch.year {
            FieldUpdate::Keep => {}
            FieldUpdate::Clear => assignments.set(CarColumn::Year, Value::Null),
            FieldUpdate::Set(year) => {
                assignments.set(CarColumn::Year, Value::Integer(i64::from(year)));
            }
        }
        if let Some(owner_id) = owner_id {
            assignments.set(CarColumn::Owner, Value::Integer(owner_id));
        }

        assignments
    }

    pub fn set(&mut self, column: CarColumn, value: Value) {
        self.terms.push(column, value);
    }

    pub fn is_empty(&self) -> bool {
        self.terms.terms.is_empty()
    }

    /// `a = ?1, b = ?2`
    pub fn set_sql(&self) -> String {
        self.terms.render(", ")
    }

    pub fn next_placeholder(&self) -> usize {
        self.terms.terms.len() + 1
    }

    pub fn values(&self) -> Vec<Value> {
        self.terms.values()
    }
}

#[cfg(test)]
mod tests {
    use super::{Assignments, OwnerMatch, Predicate};
    use crate::model::vehicle::{FieldUpdate, OwnerIdentity, VehicleFilter, VehiclePatch};
    use rusqlite::types::Value;

    #[test]
    fn empty_filter_has_no_where_clause() {
        let predicate = Predicate::for_filter(&VehicleFilter::default(), OwnerMatch::Any)
            .expect("empty filter should build");
        assert!(predicate.is_empty());
        assert_eq!(predicate.where_sql(), "");
        assert_eq!(predicate.next_placeholder(), 1);
    }

    #[test]
    fn present_fields_become_numbered_placeholders() {
        let filter = VehicleFilter {
            mark: Some("Lada".to_string()),
            year: Some(2002),
            ..VehicleFilter::default()
        };
        let predicate =
            Predicate::for_filter(&filter, OwnerMatch::Person(9)).expect("filter should build");

        assert_eq!(
            predicate.where_sql(),
            " WHERE mark = ?1 AND year = ?2 AND owner = ?3"
        );
        assert_eq!(predicate.next_placeholder(), 4);
        assert_eq!(
            predicate.values(),
            vec![
                Value::Text("Lada".to_string()),
                Value::Integer(2002),
                Value::Integer(9)
            ]
        );
    }

    #[test]
    fn filter_values_never_reach_sql_text() {
        let filter = VehicleFilter {
            model: Some("x'; DROP TABLE car; --".to_string()),
            ..VehicleFilter::default()
        };
        let predicate =
            Predicate::for_filter(&filter, OwnerMatch::Any).expect("filter should build");
        assert!(!predicate.where_sql().contains("DROP"));
    }

    #[test]
    fn unknown_owner_matches_nothing() {
        let filter = VehicleFilter {
            owner: Some(OwnerIdentity::new("No", "Body", None)),
            ..VehicleFilter::default()
        };
        assert!(Predicate::for_filter(&filter, OwnerMatch::Nobody).is_none());
    }

    #[test]
    fn patch_assignments_cover_only_present_fields() {
        let patch = VehiclePatch {
            model: Some("Granta".to_string()),
            year: FieldUpdate::Clear,
            ..VehiclePatch::default()
        };
        let assignments = Assignments::for_patch(&patch, None);
        assert_eq!(assignments.set_sql(), "model = ?1, year = ?2");
        assert_eq!(
            assignments.values(),
            vec![Value::Text("Granta".to_string()), Value::Null]
        );
        assert_eq!(assignments.next_placeholder(), 3);
    }

    #[test]
    fn resolved_owner_is_assigned_last() {
        let patch = VehiclePatch {
            owner: Some(OwnerIdentity::new("Ivan", "Petrov", None)),
            ..VehiclePatch::default()
        };
        let assignments = Assignments::for_patch(&patch, Some(4));
        assert_eq!(assignments.set_sql(), "owner = ?1");
        assert!(Assignments::for_patch(&VehiclePatch::default(), None).is_empty());
    }
}
