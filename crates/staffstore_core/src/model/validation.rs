//! Validation failures raised while constructing employees or checking
//! repository arguments.
//!
//! # Invariants
//! - Every failure is raised before any mutation is attempted.
//! - Field-bound failures report the offending field via `field()`.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// One rejected value or malformed input representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be a non-empty string")]
    EmptyName { field: &'static str },
    #[error("{field} must contain only letters, hyphens and spaces, got `{value}`")]
    InvalidName { field: &'static str, value: String },
    #[error("employee_id must be a positive integer, got `{value}`")]
    InvalidEmployeeId { value: String },
    #[error("salary must be a non-negative integer, got `{value}`")]
    InvalidSalary { value: String },
    #[error("passport must be in format `1234123456` or `1234 123456`, got `{value}`")]
    InvalidPassport { value: String },
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("field `{field}` must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("expected exactly {expected} fields, got {actual}")]
    WrongArity { expected: usize, actual: usize },
    #[error("record must be in format `id;first_name;last_name;patronymic;salary;passport`")]
    MalformedRecord,
    #[error("invalid JSON employee: {0}")]
    MalformedJson(String),
    #[error(
        "invalid sort field `{0}`; expected one of employee_id, first_name, last_name, salary"
    )]
    InvalidSortField(String),
    #[error("page size and page index must be positive, got page_size={page_size} page={page}")]
    InvalidPage { page_size: usize, page: usize },
}

impl ValidationError {
    /// Returns the input field this failure is about, if it is field-bound.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::EmptyName { field }
            | Self::InvalidName { field, .. }
            | Self::MissingField { field }
            | Self::InvalidType { field, .. } => Some(field),
            Self::InvalidEmployeeId { .. } => Some("employee_id"),
            Self::InvalidSalary { .. } => Some("salary"),
            Self::InvalidPassport { .. } => Some("passport"),
            Self::InvalidSortField(_) => Some("sort_field"),
            Self::WrongArity { .. }
            | Self::MalformedRecord
            | Self::MalformedJson(_)
            | Self::InvalidPage { .. } => None,
        }
    }
}

/// Every field-level failure found in one form-style submission.
///
/// Keys are field names; at most one failure is kept per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, ValidationError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `error` under its field, keeping the first failure per field.
    pub fn push(&mut self, error: ValidationError) {
        let field = error.field().unwrap_or("record");
        self.errors.entry(field).or_insert(error);
    }

    pub fn get(&self, field: &str) -> Option<&ValidationError> {
        self.errors.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Field names with failures, sorted.
    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ValidationError)> {
        self.errors.iter().map(|(field, error)| (*field, error))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, error) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {error}")?;
            first = false;
        }
        Ok(())
    }
}

impl Error for FieldErrors {}
