use rusqlite::Connection;
use staffstore_core::db::migrations::latest_version;
use staffstore_core::db::{open_db, open_db_in_memory, open_with_config, DbConfig, DbError};
use staffstore_core::{RepoError, SqliteEmployeeStore};
use std::time::Duration;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "employees");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staff.sqlite3");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO employees (first_name, last_name, salary, passport)
             VALUES ('Anna', 'Ivanova', 100, '1234567890');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_with_config(
        &DbConfig::file(&path).with_busy_timeout(Duration::from_millis(250)),
    )
    .unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let rows: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn salary_check_constraint_rejects_negative_values() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO employees (first_name, last_name, salary, passport)
         VALUES ('Anna', 'Ivanova', -1, '1234567890');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn store_refuses_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteEmployeeStore::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn store_refuses_foreign_schema() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "PRAGMA user_version = {};",
        latest_version()
    ))
    .unwrap();
    assert!(matches!(
        SqliteEmployeeStore::try_new(&conn).err().unwrap(),
        RepoError::MissingRequiredTable("employees")
    ));

    conn.execute_batch("CREATE TABLE employees (employee_id INTEGER PRIMARY KEY, first_name TEXT);")
        .unwrap();
    assert!(matches!(
        SqliteEmployeeStore::try_new(&conn).err().unwrap(),
        RepoError::MissingRequiredColumn {
            table: "employees",
            column: "last_name"
        }
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
