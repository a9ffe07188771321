use serde_json::json;
use staffstore_core::{Employee, EmployeeRecord, Passport, ValidationError};
use std::collections::HashSet;

fn assert_same_fields(left: &Employee, right: &Employee) {
    assert_eq!(left.employee_id(), right.employee_id());
    assert_eq!(left.first_name(), right.first_name());
    assert_eq!(left.last_name(), right.last_name());
    assert_eq!(left.patronymic(), right.patronymic());
    assert_eq!(left.salary(), right.salary());
    assert_eq!(left.passport(), right.passport());
}

#[test]
fn every_construction_path_yields_the_same_employee() {
    let from_map = Employee::from_map(
        json!({
            "employee_id": 5,
            "first_name": "Иван",
            "last_name": "Петров",
            "patronymic": "Сергеевич",
            "salary": "1500",
            "passport": "1234 567890"
        })
        .as_object()
        .unwrap(),
    )
    .unwrap();
    let from_values = Employee::from_values(&[
        json!(5),
        json!("Иван"),
        json!("Петров"),
        json!("Сергеевич"),
        json!(1500),
        json!("1234567890"),
    ])
    .unwrap();
    let from_delimited =
        Employee::from_delimited("5;Иван;Петров;Сергеевич;1500;1234 567890").unwrap();
    let from_json = Employee::from_json(
        r#"{"employee_id": 5, "first_name": " Иван ", "last_name": "Петров",
            "patronymic": "Сергеевич", "salary": 1500, "passport": "1234567890"}"#,
    )
    .unwrap();
    let parsed: Employee = "5;Иван;Петров;Сергеевич;1500;1234567890".parse().unwrap();

    for other in [&from_values, &from_delimited, &from_json, &parsed] {
        assert_same_fields(&from_map, other);
    }
    assert_eq!(from_map.full_name(), "Петров Иван Сергеевич");
}

#[test]
fn equality_and_hash_use_passport_only() {
    let anna = Employee::new(1, "Anna", "Ivanova", None, 100, "1234567890").unwrap();
    let renamed = Employee::new(9, "Maria", "Smirnova", None, 900, "1234 567890").unwrap();
    let other = Employee::new(1, "Anna", "Ivanova", None, 100, "0987654321").unwrap();

    assert_eq!(anna, renamed);
    assert_ne!(anna, other);

    let set: HashSet<Employee> = [anna, renamed, other].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn missing_or_mistyped_fields_name_the_field() {
    let missing = Employee::from_map(
        json!({"employee_id": 1, "first_name": "Anna", "last_name": "Ivanova", "salary": 1})
            .as_object()
            .unwrap(),
    )
    .unwrap_err();
    assert_eq!(missing, ValidationError::MissingField { field: "passport" });

    let mistyped = Employee::from_map(
        json!({"employee_id": 1, "first_name": 7, "last_name": "Ivanova",
               "salary": 1, "passport": "1234567890"})
        .as_object()
        .unwrap(),
    )
    .unwrap_err();
    assert_eq!(mistyped.field(), Some("first_name"));

    let arity = Employee::from_values(&[json!(1), json!("Anna")]).unwrap_err();
    assert_eq!(
        arity,
        ValidationError::WrongArity {
            expected: 6,
            actual: 2
        }
    );
}

#[test]
fn name_rules_accept_diacritics_and_hyphens_only() {
    assert!(Employee::new(1, "José", "García-Márquez", None, 1, "1234567890").is_ok());
    assert!(Employee::new(1, "Anna", "Ivanova", Some("  "), 1, "1234567890")
        .unwrap()
        .patronymic()
        .is_none());

    let err = Employee::new(1, "Anna", "O'Brien", None, 1, "1234567890").unwrap_err();
    assert!(matches!(err, ValidationError::InvalidName { field: "last_name", .. }));

    let err = Employee::new(1, "   ", "Ivanova", None, 1, "1234567890").unwrap_err();
    assert_eq!(err, ValidationError::EmptyName { field: "first_name" });
}

#[test]
fn negative_salary_and_non_positive_id_are_rejected() {
    let salary = Employee::new(1, "Anna", "Ivanova", None, -1, "1234567890").unwrap_err();
    assert_eq!(salary.field(), Some("salary"));
    let id = Employee::new(-3, "Anna", "Ivanova", None, 1, "1234567890").unwrap_err();
    assert_eq!(id.field(), Some("employee_id"));
}

#[test]
fn malformed_json_text_is_a_validation_error() {
    assert!(matches!(
        Employee::from_json("{not json"),
        Err(ValidationError::MalformedJson(_))
    ));
    assert!(matches!(
        Employee::from_json("[1, 2]"),
        Err(ValidationError::MalformedJson(_))
    ));
}

#[test]
fn record_round_trip_revalidates() {
    let employee = Employee::new(4, "Anna", "Ivanova", Some("Petrovna"), 10, "1234567890").unwrap();
    let text = serde_json::to_string(&employee).unwrap();
    let back: Employee = serde_json::from_str(&text).unwrap();
    assert_same_fields(&employee, &back);

    let mut record: EmployeeRecord = employee.to_record();
    record.passport = "12-34".to_string();
    let text = serde_json::to_string(&record).unwrap();
    assert!(serde_json::from_str::<Employee>(&text).is_err());
}

#[test]
fn passport_normalization_is_idempotent() {
    let once = Passport::parse("4321 765432").unwrap();
    assert_eq!(Passport::parse(once.as_str()).unwrap(), once);
    assert_eq!(once.to_string(), "4321765432");
}
