//! Field-level employee updates.
//!
//! # Invariants
//! - Only `first_name`, `last_name`, `patronymic` and `salary` are updatable.
//!   Identity fields (`employee_id`, `passport`) are never touched.
//! - An update is validated as a whole before anything is applied.

use crate::model::employee::{int_value, optional_text_value, validate_salary, Employee};
use crate::model::person::{validate_name, validate_patronymic};
use crate::model::validation::ValidationError;
use serde_json::{Map, Value};

/// Names of fields an update may carry, in canonical order.
pub const UPDATABLE_FIELDS: [&str; 4] = ["first_name", "last_name", "patronymic", "salary"];

/// Requested changes to an existing employee.
///
/// `patronymic: Some(None)` clears the patronymic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub patronymic: Option<Option<String>>,
    pub salary: Option<i64>,
}

impl EmployeeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    pub fn patronymic(mut self, value: Option<impl Into<String>>) -> Self {
        self.patronymic = Some(value.map(Into::into));
        self
    }

    pub fn salary(mut self, value: i64) -> Self {
        self.salary = Some(value);
        self
    }

    /// Reads recognized fields from a name/value mapping.
    ///
    /// Unknown keys, `passport` and `employee_id` included, are ignored.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut update = Self::new();
        for (name, value) in fields {
            match name.as_str() {
                "first_name" => {
                    update.first_name = Some(required_text("first_name", value)?);
                }
                "last_name" => {
                    update.last_name = Some(required_text("last_name", value)?);
                }
                "patronymic" => {
                    update.patronymic =
                        Some(optional_text_value("patronymic", Some(value))?.map(str::to_string));
                }
                "salary" => update.salary = Some(int_value("salary", value)?),
                _ => {}
            }
        }
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.patronymic.is_none()
            && self.salary.is_none()
    }

    /// Names of the fields this update carries, in canonical order.
    pub fn field_names(&self) -> Vec<&'static str> {
        let present = [
            self.first_name.is_some(),
            self.last_name.is_some(),
            self.patronymic.is_some(),
            self.salary.is_some(),
        ];
        UPDATABLE_FIELDS
            .iter()
            .zip(present)
            .filter_map(|(name, is_present)| is_present.then_some(*name))
            .collect()
    }

    /// Returns a copy with every carried value validated and trimmed.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            first_name: self
                .first_name
                .as_deref()
                .map(|value| validate_name("first_name", value))
                .transpose()?,
            last_name: self
                .last_name
                .as_deref()
                .map(|value| validate_name("last_name", value))
                .transpose()?,
            patronymic: self
                .patronymic
                .as_ref()
                .map(|value| validate_patronymic(value.as_deref()))
                .transpose()?,
            salary: self
                .salary
                .map(|value| validate_salary(value).map(i64::from))
                .transpose()?,
        })
    }

    /// Applies this update to a copy of `employee`.
    ///
    /// The original is left untouched when any field fails validation.
    pub fn apply_to(&self, employee: &Employee) -> Result<Employee, ValidationError> {
        let mut updated = employee.clone();
        if let Some(value) = &self.first_name {
            updated.person_mut().set_first_name(value)?;
        }
        if let Some(value) = &self.last_name {
            updated.person_mut().set_last_name(value)?;
        }
        if let Some(value) = &self.patronymic {
            updated.person_mut().set_patronymic(value.as_deref())?;
        }
        if let Some(value) = self.salary {
            updated.set_salary(value)?;
        }
        Ok(updated)
    }
}

fn required_text(field: &'static str, value: &Value) -> Result<String, ValidationError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or(ValidationError::InvalidType {
            field,
            expected: "a string",
        })
}

#[cfg(test)]
mod tests {
    use super::EmployeeUpdate;
    use crate::model::employee::Employee;
    use crate::model::validation::ValidationError;
    use serde_json::json;

    fn sample() -> Employee {
        Employee::new(2, "Anna", "Ivanova", Some("Petrovna"), 1000, "1234567890").unwrap()
    }

    #[test]
    fn from_fields_ignores_unknown_and_identity_keys() {
        let fields = json!({
            "salary": 5000,
            "passport": "9999999999",
            "employee_id": 42,
            "nickname": "Annie"
        });
        let update = EmployeeUpdate::from_fields(fields.as_object().unwrap()).unwrap();
        assert_eq!(update, EmployeeUpdate::new().salary(5000));
        assert_eq!(update.field_names(), vec!["salary"]);
    }

    #[test]
    fn apply_to_changes_only_carried_fields() {
        let updated = EmployeeUpdate::new()
            .salary(5000)
            .patronymic(None::<String>)
            .apply_to(&sample())
            .unwrap();
        assert_eq!(updated.salary(), 5000);
        assert_eq!(updated.patronymic(), None);
        assert_eq!(updated.first_name(), "Anna");
        assert_eq!(updated.passport().as_str(), "1234567890");
    }

    #[test]
    fn apply_to_is_all_or_nothing() {
        let original = sample();
        let err = EmployeeUpdate::new()
            .first_name("Maria")
            .salary(-1)
            .apply_to(&original)
            .unwrap_err();
        assert_eq!(err.field(), Some("salary"));
        assert_eq!(original.first_name(), "Anna");
    }

    #[test]
    fn normalized_trims_and_validates() {
        let update = EmployeeUpdate::new()
            .last_name("  Smirnova ")
            .patronymic(Some("  "))
            .normalized()
            .unwrap();
        assert_eq!(update.last_name.as_deref(), Some("Smirnova"));
        assert_eq!(update.patronymic, Some(None));

        let err = EmployeeUpdate::new().first_name("4ever").normalized().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidName { field: "first_name", .. }));
    }
}
