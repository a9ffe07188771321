//! Passport identity key.
//!
//! # Invariants
//! - Stored form is always exactly ten ASCII digits.
//! - `"DDDD DDDDDD"` input is accepted and stored without the space.

use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static PASSPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4}) ?([0-9]{6})$").expect("valid passport regex"));

/// Canonical 10-digit passport number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Passport(String);

impl Passport {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        let captures = PASSPORT_RE
            .captures(trimmed)
            .ok_or_else(|| ValidationError::InvalidPassport {
                value: trimmed.to_string(),
            })?;
        Ok(Self(format!("{}{}", &captures[1], &captures[2])))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Passport {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Passport {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Passport> for String {
    fn from(value: Passport) -> Self {
        value.0
    }
}

impl Display for Passport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
