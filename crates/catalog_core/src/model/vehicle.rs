//! Vehicle and owner domain model.
//!
//! # Responsibility
//! - Define persisted read models (`Vehicle`, `Person`).
//! - Define write/filter inputs (`NewVehicle`, `VehicleFilter`, `VehiclePatch`).
//! - Validate required-field presence before persistence.
//!
//! # Invariants
//! - Identifiers are assigned by the store and never reused.
//! - An absent patronymic and an empty patronymic are the same identity.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned vehicle identifier.
pub type VehicleId = i64;

/// Store-assigned owner identifier.
pub type PersonId = i64;

/// Persisted owner row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(rename = "personId")]
    pub id: PersonId,
    pub name: String,
    pub surname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patronymic: Option<String>,
}

impl Person {
    /// Returns the natural key of this owner.
    pub fn identity(&self) -> OwnerIdentity {
        OwnerIdentity {
            name: self.name.clone(),
            surname: self.surname.clone(),
            patronymic: self.patronymic.clone(),
        }
    }
}

/// Owner natural key used to deduplicate owner rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerIdentity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patronymic: Option<String>,
}

impl OwnerIdentity {
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        patronymic: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            patronymic,
        }
    }

    /// Patronymic as persisted: absent is stored as the empty string.
    pub fn stored_patronymic(&self) -> &str {
        self.patronymic.as_deref().unwrap_or("")
    }

    /// Returns whether no identity field carries a value.
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.surname.is_empty() && self.stored_patronymic().is_empty()
    }

    /// Checks that name and surname are present.
    pub fn validate(&self) -> Result<(), VehicleValidationError> {
        if self.name.trim().is_empty() {
            return Err(VehicleValidationError::MissingField("owner.name"));
        }
        if self.surname.trim().is_empty() {
            return Err(VehicleValidationError::MissingField("owner.surname"));
        }
        Ok(())
    }
}

/// Persisted vehicle row with its owner hydrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(rename = "carId")]
    pub id: VehicleId,
    pub reg_num: String,
    pub mark: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub owner: Person,
}

/// Input for creating one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    pub reg_num: String,
    pub mark: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<i32>,
    pub owner: OwnerIdentity,
}

impl NewVehicle {
    /// Checks required-field presence.
    pub fn validate(&self) -> Result<(), VehicleValidationError> {
        require_text("regNum", &self.reg_num)?;
        require_text("mark", &self.mark)?;
        require_text("model", &self.model)?;
        self.owner.validate()
    }
}

/// Sparse filter pattern for catalog listing.
///
/// Every `None` field is left out of the predicate; the default value
/// matches every vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleFilter {
    pub id: Option<VehicleId>,
    pub reg_num: Option<String>,
    pub mark: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    /// Exact owner identity; resolved by lookup only, never inserted.
    pub owner: Option<OwnerIdentity>,
}

impl VehicleFilter {
    /// Returns whether this filter matches every vehicle.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Tri-state update for a nullable column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Leave the stored value untouched.
    #[default]
    Keep,
    /// Store `NULL`.
    Clear,
    /// Store the value.
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Set(value),
            None => Self::Clear,
        }
    }
}

/// Sparse partial edit. Only present fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehiclePatch {
    pub reg_num: Option<String>,
    pub mark: Option<String>,
    pub model: Option<String>,
    pub year: FieldUpdate<i32>,
    pub owner: Option<OwnerIdentity>,
}

impl VehiclePatch {
    /// Returns whether applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.reg_num.is_none()
            && self.mark.is_none()
            && self.model.is_none()
            && self.year.is_keep()
            && self.owner.is_none()
    }

    /// Rejects blanking of required columns.
    pub fn validate(&self) -> Result<(), VehicleValidationError> {
        if let Some(reg_num) = &self.reg_num {
            require_text("regNum", reg_num)?;
        }
        if let Some(mark) = &self.mark {
            require_text("mark", mark)?;
        }
        if let Some(model) = &self.model {
            require_text("model", model)?;
        }
        if let Some(owner) = &self.owner {
            owner.validate()?;
        }
        Ok(())
    }
}

/// Required-field validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleValidationError {
    MissingField(&'static str),
}

impl Display for VehicleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field `{field}` is missing or empty"),
        }
    }
}

impl Error for VehicleValidationError {}

fn require_text(field: &'static str, value: &str) -> Result<(), VehicleValidationError> {
    if value.trim().is_empty() {
        return Err(VehicleValidationError::MissingField(field));
    }
    Ok(())
}
