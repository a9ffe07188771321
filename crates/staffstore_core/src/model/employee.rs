//! Employee domain model.
//!
//! # Responsibility
//! - Build validated employees from every accepted input representation.
//! - Define the wire record shared by snapshot files and events.
//!
//! # Invariants
//! - Every constructor funnels through the same field validation; no partial
//!   employee is ever produced.
//! - `employee_id` and `passport` never change after construction.
//! - Equality and hashing use the passport only.

use crate::model::passport::Passport;
use crate::model::person::{validate_name, validate_patronymic, Person};
use crate::model::validation::{FieldErrors, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Repository-assigned employee identifier. Always positive.
pub type EmployeeId = u32;

const RECORD_FIELD_COUNT: usize = 6;

/// Validated employee value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "EmployeeRecord", into = "EmployeeRecord")]
pub struct Employee {
    employee_id: EmployeeId,
    person: Person,
    salary: u32,
    passport: Passport,
}

/// Plain serialized shape of one employee.
///
/// Used for snapshot files and event payloads. Converting back into
/// `Employee` re-runs validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub patronymic: Option<String>,
    pub salary: u32,
    pub passport: String,
}

/// Short-list row returned by page listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSummary {
    pub employee_id: EmployeeId,
    pub short_info: String,
}

impl Employee {
    /// Typed constructor; integers are checked for range here.
    pub fn new(
        employee_id: i64,
        first_name: &str,
        last_name: &str,
        patronymic: Option<&str>,
        salary: i64,
        passport: &str,
    ) -> Result<Self, ValidationError> {
        let person = Person::new(first_name, last_name, patronymic)?;
        Ok(Self {
            employee_id: validate_employee_id(employee_id)?,
            person,
            salary: validate_salary(salary)?,
            passport: Passport::parse(passport)?,
        })
    }

    /// Builds an employee from a mapping of named fields.
    ///
    /// Required keys: `employee_id`, `first_name`, `last_name`, `salary`,
    /// `passport`. `patronymic` may be absent or `null`.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ValidationError> {
        let employee_id = int_value("employee_id", required(map, "employee_id")?)?;
        let first_name = text_value("first_name", required(map, "first_name")?)?;
        let last_name = text_value("last_name", required(map, "last_name")?)?;
        let patronymic = optional_text_value("patronymic", map.get("patronymic"))?;
        let salary = int_value("salary", required(map, "salary")?)?;
        let passport = optional_text_value("passport", map.get("passport"))?
            .ok_or(ValidationError::MissingField { field: "passport" })?;

        Self::new(
            employee_id,
            first_name,
            last_name,
            patronymic,
            salary,
            passport,
        )
    }

    /// Builds an employee from `[id, first, last, patronymic, salary, passport]`.
    pub fn from_values(values: &[Value]) -> Result<Self, ValidationError> {
        if values.len() != RECORD_FIELD_COUNT {
            return Err(ValidationError::WrongArity {
                expected: RECORD_FIELD_COUNT,
                actual: values.len(),
            });
        }

        let passport = optional_text_value("passport", Some(&values[5]))?
            .ok_or(ValidationError::MissingField { field: "passport" })?;
        Self::new(
            int_value("employee_id", &values[0])?,
            text_value("first_name", &values[1])?,
            text_value("last_name", &values[2])?,
            optional_text_value("patronymic", Some(&values[3]))?,
            int_value("salary", &values[4])?,
            passport,
        )
    }

    /// Builds an employee from `id;first_name;last_name;patronymic;salary;passport`.
    pub fn from_delimited(record: &str) -> Result<Self, ValidationError> {
        let parts: Vec<&str> = record.split(';').map(str::trim).collect();
        if parts.len() != RECORD_FIELD_COUNT {
            return Err(ValidationError::MalformedRecord);
        }
        let employee_id = digits(parts[0]).ok_or_else(|| ValidationError::InvalidEmployeeId {
            value: parts[0].to_string(),
        })?;
        let salary = digits(parts[4]).ok_or_else(|| ValidationError::InvalidSalary {
            value: parts[4].to_string(),
        })?;
        if parts[5].is_empty() {
            return Err(ValidationError::MissingField { field: "passport" });
        }

        Self::new(
            employee_id,
            parts[1],
            parts[2],
            Some(parts[3]),
            salary,
            parts[5],
        )
    }

    /// Builds an employee from a JSON object text.
    pub fn from_json(text: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| ValidationError::MalformedJson(err.to_string()))?;
        match value {
            Value::Object(map) => Self::from_map(&map),
            _ => Err(ValidationError::MalformedJson(
                "expected a JSON object".to_string(),
            )),
        }
    }

    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    pub fn first_name(&self) -> &str {
        self.person.first_name()
    }

    pub fn last_name(&self) -> &str {
        self.person.last_name()
    }

    pub fn patronymic(&self) -> Option<&str> {
        self.person.patronymic()
    }

    pub fn salary(&self) -> u32 {
        self.salary
    }

    pub fn passport(&self) -> &Passport {
        &self.passport
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    pub fn full_name(&self) -> String {
        self.person.full_name()
    }

    pub fn short_info(&self) -> String {
        format!(
            "ID: {}, Salary: {}, Passport: {}",
            self.employee_id, self.salary, self.passport
        )
    }

    pub fn summary(&self) -> EmployeeSummary {
        EmployeeSummary {
            employee_id: self.employee_id,
            short_info: self.short_info(),
        }
    }

    pub fn to_record(&self) -> EmployeeRecord {
        EmployeeRecord::from(self.clone())
    }

    pub(crate) fn person_mut(&mut self) -> &mut Person {
        &mut self.person
    }

    pub(crate) fn set_salary(&mut self, salary: i64) -> Result<(), ValidationError> {
        self.salary = validate_salary(salary)?;
        Ok(())
    }
}

impl PartialEq for Employee {
    fn eq(&self, other: &Self) -> bool {
        self.passport == other.passport
    }
}

impl Eq for Employee {}

impl Hash for Employee {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.passport.hash(state);
    }
}

impl Display for Employee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Employee {}: {}, Salary: {}, Passport: {}",
            self.employee_id,
            self.full_name(),
            self.salary,
            self.passport
        )
    }
}

impl FromStr for Employee {
    type Err = ValidationError;

    /// Parses JSON object text when wrapped in braces, the delimited record
    /// format otherwise.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        if trimmed.starts_with('{') && trimmed.ends_with('}') {
            Self::from_json(trimmed)
        } else {
            Self::from_delimited(trimmed)
        }
    }
}

impl TryFrom<EmployeeRecord> for Employee {
    type Error = ValidationError;

    fn try_from(record: EmployeeRecord) -> Result<Self, Self::Error> {
        Self::new(
            i64::from(record.employee_id),
            &record.first_name,
            &record.last_name,
            record.patronymic.as_deref(),
            i64::from(record.salary),
            &record.passport,
        )
    }
}

impl From<Employee> for EmployeeRecord {
    fn from(employee: Employee) -> Self {
        Self {
            employee_id: employee.employee_id,
            first_name: employee.person.first_name().to_string(),
            last_name: employee.person.last_name().to_string(),
            patronymic: employee.person.patronymic().map(str::to_string),
            salary: employee.salary,
            passport: employee.passport.into(),
        }
    }
}

/// Validated input for creating an employee; the id is assigned later by a
/// repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    person: Person,
    salary: u32,
    passport: Passport,
}

impl NewEmployee {
    pub fn new(
        first_name: &str,
        last_name: &str,
        salary: i64,
        passport: &str,
        patronymic: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            person: Person::new(first_name, last_name, patronymic)?,
            salary: validate_salary(salary)?,
            passport: Passport::parse(passport)?,
        })
    }

    /// Validates every field and reports all failures at once.
    pub fn validate_fields(
        first_name: &str,
        last_name: &str,
        salary: i64,
        passport: &str,
        patronymic: Option<&str>,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let first_name = validate_name("first_name", first_name).map_err(|err| errors.push(err));
        let last_name = validate_name("last_name", last_name).map_err(|err| errors.push(err));
        let patronymic = validate_patronymic(patronymic).map_err(|err| errors.push(err));
        let salary = validate_salary(salary).map_err(|err| errors.push(err));
        let passport = Passport::parse(passport).map_err(|err| errors.push(err));

        match (first_name, last_name, patronymic, salary, passport) {
            (Ok(first_name), Ok(last_name), Ok(patronymic), Ok(salary), Ok(passport))
                if errors.is_empty() =>
            {
                Self::new(
                    &first_name,
                    &last_name,
                    i64::from(salary),
                    passport.as_str(),
                    patronymic.as_deref(),
                )
                .map_err(|err| {
                    let mut errors = FieldErrors::new();
                    errors.push(err);
                    errors
                })
            }
            _ => Err(errors),
        }
    }

    pub fn first_name(&self) -> &str {
        self.person.first_name()
    }

    pub fn last_name(&self) -> &str {
        self.person.last_name()
    }

    pub fn patronymic(&self) -> Option<&str> {
        self.person.patronymic()
    }

    pub fn salary(&self) -> u32 {
        self.salary
    }

    pub fn passport(&self) -> &Passport {
        &self.passport
    }

    /// Attaches a repository-assigned id.
    pub fn into_employee(self, employee_id: EmployeeId) -> Result<Employee, ValidationError> {
        Ok(Employee {
            employee_id: validate_employee_id(i64::from(employee_id))?,
            person: self.person,
            salary: self.salary,
            passport: self.passport,
        })
    }
}

pub(crate) fn validate_employee_id(value: i64) -> Result<EmployeeId, ValidationError> {
    match EmployeeId::try_from(value) {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidEmployeeId {
            value: value.to_string(),
        }),
    }
}

pub(crate) fn validate_salary(value: i64) -> Result<u32, ValidationError> {
    u32::try_from(value).map_err(|_| ValidationError::InvalidSalary {
        value: value.to_string(),
    })
}

fn required<'a>(
    map: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, ValidationError> {
    map.get(field)
        .ok_or(ValidationError::MissingField { field })
}

/// Accepts JSON integers or strings of decimal digits (optionally signed).
pub(crate) fn int_value(field: &'static str, value: &Value) -> Result<i64, ValidationError> {
    let invalid = ValidationError::InvalidType {
        field,
        expected: "an integer",
    };
    match value {
        Value::Number(number) => number.as_i64().ok_or(invalid),
        Value::String(text) => text.trim().parse::<i64>().map_err(|_| invalid),
        _ => Err(invalid),
    }
}

fn text_value<'a>(field: &'static str, value: &'a Value) -> Result<&'a str, ValidationError> {
    value.as_str().ok_or(ValidationError::InvalidType {
        field,
        expected: "a string",
    })
}

pub(crate) fn optional_text_value<'a>(
    field: &'static str,
    value: Option<&'a Value>,
) -> Result<Option<&'a str>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(_) => Err(ValidationError::InvalidType {
            field,
            expected: "a string or null",
        }),
    }
}

fn digits(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
