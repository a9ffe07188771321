//! Person name fields shared by every employee.
//!
//! # Invariants
//! - `first_name` and `last_name` are trimmed, non-empty and contain only
//!   Latin/Cyrillic letters (diacritics included), hyphens and spaces.
//! - `patronymic` follows the same character rule; blank input becomes `None`.

use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[[\p{Latin}\p{Cyrillic}]&&\p{L}]\p{M}*|[\- ])+$")
        .expect("valid person name regex")
});

/// Validated name triple of a person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    first_name: String,
    last_name: String,
    patronymic: Option<String>,
}

impl Person {
    pub fn new(
        first_name: &str,
        last_name: &str,
        patronymic: Option<&str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            first_name: validate_name("first_name", first_name)?,
            last_name: validate_name("last_name", last_name)?,
            patronymic: validate_patronymic(patronymic)?,
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn patronymic(&self) -> Option<&str> {
        self.patronymic.as_deref()
    }

    pub fn set_first_name(&mut self, value: &str) -> Result<(), ValidationError> {
        self.first_name = validate_name("first_name", value)?;
        Ok(())
    }

    pub fn set_last_name(&mut self, value: &str) -> Result<(), ValidationError> {
        self.last_name = validate_name("last_name", value)?;
        Ok(())
    }

    pub fn set_patronymic(&mut self, value: Option<&str>) -> Result<(), ValidationError> {
        self.patronymic = validate_patronymic(value)?;
        Ok(())
    }

    /// Returns `"last first"` or `"last first patronymic"`.
    pub fn full_name(&self) -> String {
        match &self.patronymic {
            Some(patronymic) => format!("{} {} {}", self.last_name, self.first_name, patronymic),
            None => format!("{} {}", self.last_name, self.first_name),
        }
    }
}

/// Validates one required name field and returns its trimmed form.
pub fn validate_name(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName { field });
    }
    if !NAME_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidName {
            field,
            value: trimmed.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Validates the optional patronymic; blank input normalizes to `None`.
pub fn validate_patronymic(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => validate_name("patronymic", trimmed).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_name, validate_patronymic, Person};
    use crate::model::validation::ValidationError;

    #[test]
    fn accepts_latin_cyrillic_diacritics_hyphen_and_space() {
        assert_eq!(validate_name("first_name", " Иван ").unwrap(), "Иван");
        assert_eq!(validate_name("first_name", "Jean-Luc").unwrap(), "Jean-Luc");
        assert_eq!(validate_name("last_name", "Müller Šimić").unwrap(), "Müller Šimić");
        assert_eq!(validate_name("last_name", "Ёлкин").unwrap(), "Ёлкин");
    }

    #[test]
    fn rejects_digits_and_punctuation() {
        let err = validate_name("first_name", "R2D2").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidName {
                field: "first_name",
                value: "R2D2".to_string()
            }
        );
        assert!(validate_name("last_name", "O'Brien").is_err());
    }

    #[test]
    fn combining_marks_must_follow_a_letter() {
        assert_eq!(
            validate_name("first_name", "Jose\u{301}").unwrap(),
            "Jose\u{301}"
        );
        assert!(matches!(
            validate_name("first_name", "\u{301}\u{301}"),
            Err(ValidationError::InvalidName { .. })
        ));
    }

    #[test]
    fn latin_script_symbols_that_are_not_letters_are_rejected() {
        assert!(matches!(
            validate_name("last_name", "Louis \u{216B}"),
            Err(ValidationError::InvalidName { .. })
        ));
    }

    #[test]
    fn rejects_blank_required_name() {
        assert_eq!(
            validate_name("last_name", "   ").unwrap_err(),
            ValidationError::EmptyName { field: "last_name" }
        );
    }

    #[test]
    fn blank_patronymic_is_absent() {
        assert_eq!(validate_patronymic(Some("  ")).unwrap(), None);
        assert_eq!(validate_patronymic(None).unwrap(), None);
        assert_eq!(
            validate_patronymic(Some(" Петрович ")).unwrap().as_deref(),
            Some("Петрович")
        );
    }

    #[test]
    fn full_name_puts_last_name_first() {
        let person = Person::new("Иван", "Петров", Some("Сергеевич")).unwrap();
        assert_eq!(person.full_name(), "Петров Иван Сергеевич");

        let person = Person::new("Ada", "Lovelace", None).unwrap();
        assert_eq!(person.full_name(), "Lovelace Ada");
    }
}
