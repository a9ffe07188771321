//! Row-level SQLite store for the `employees` table.
//!
//! # Responsibility
//! - Translate employee operations into single SQL statements.
//! - Validate every row read back into a domain `Employee`.
//!
//! # Invariants
//! - Constructed only over a connection at the latest schema version that
//!   carries the full `employees` column set.
//! - Invalid persisted rows surface as `RepoError::InvalidData`.
//! - Listings are ordered by `employee_id`.

use crate::db::migrations::latest_version;
use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::model::update::EmployeeUpdate;
use crate::repo::employee_repo::{RepoError, RepoResult};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const EMPLOYEES_TABLE: &str = "employees";

const REQUIRED_COLUMNS: [&str; 7] = [
    "employee_id",
    "first_name",
    "last_name",
    "patronymic",
    "salary",
    "passport",
    "created_at",
];

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    employee_id,
    first_name,
    last_name,
    patronymic,
    salary,
    passport
FROM employees";

/// SQLite-backed employee rows over a borrowed connection.
pub struct SqliteEmployeeStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeStore<'conn> {
    /// Creates a store after verifying the connection schema.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` differs from the
    ///   latest migration.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` for a foreign
    ///   schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_employee_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Wraps a connection (or open transaction) already checked by `try_new`.
    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn get_by_id(&self, employee_id: EmployeeId) -> RepoResult<Option<Employee>> {
        let sql = format!("{EMPLOYEE_SELECT_SQL} WHERE employee_id = ?1;");
        self.conn
            .query_row(&sql, [employee_id], |row| Ok(parse_employee_row(row)))
            .optional()?
            .transpose()
    }

    /// Returns one `LIMIT`/`OFFSET` window ordered by id.
    pub fn get_page(&self, limit: usize, offset: usize) -> RepoResult<Vec<Employee>> {
        let sql = format!("{EMPLOYEE_SELECT_SQL} ORDER BY employee_id ASC LIMIT ?1 OFFSET ?2;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![to_sql_count(limit), to_sql_count(offset)])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }
        Ok(employees)
    }

    pub fn get_all(&self) -> RepoResult<Vec<Employee>> {
        let sql = format!("{EMPLOYEE_SELECT_SQL} ORDER BY employee_id ASC;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }
        Ok(employees)
    }

    /// Inserts a new row and returns it with the generated id.
    pub fn add(&self, new_employee: NewEmployee) -> RepoResult<Employee> {
        self.conn.execute(
            "INSERT INTO employees (first_name, last_name, patronymic, salary, passport)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                new_employee.first_name(),
                new_employee.last_name(),
                new_employee.patronymic(),
                i64::from(new_employee.salary()),
                new_employee.passport().as_str(),
            ],
        )?;

        let row_id = self.conn.last_insert_rowid();
        let employee_id = EmployeeId::try_from(row_id).map_err(|_| {
            RepoError::InvalidData(format!("generated employee id `{row_id}` is out of range"))
        })?;
        Ok(new_employee.into_employee(employee_id)?)
    }

    /// Inserts a row keeping the caller's id.
    pub fn insert_with_id(&self, employee: &Employee) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO employees (employee_id, first_name, last_name, patronymic, salary, passport)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                employee.employee_id(),
                employee.first_name(),
                employee.last_name(),
                employee.patronymic(),
                i64::from(employee.salary()),
                employee.passport().as_str(),
            ],
        )?;
        Ok(())
    }

    /// Applies the carried fields with one dynamic `UPDATE`.
    ///
    /// Returns whether the row exists. An empty update touches nothing.
    pub fn update(&self, employee_id: EmployeeId, update: &EmployeeUpdate) -> RepoResult<bool> {
        let update = update.normalized()?;

        let mut assignments = Vec::new();
        let mut values = Vec::new();
        if let Some(first_name) = update.first_name {
            assignments.push("first_name");
            values.push(SqlValue::Text(first_name));
        }
        if let Some(last_name) = update.last_name {
            assignments.push("last_name");
            values.push(SqlValue::Text(last_name));
        }
        if let Some(patronymic) = update.patronymic {
            assignments.push("patronymic");
            values.push(patronymic.map_or(SqlValue::Null, SqlValue::Text));
        }
        if let Some(salary) = update.salary {
            assignments.push("salary");
            values.push(SqlValue::Integer(salary));
        }

        if assignments.is_empty() {
            return self.exists(employee_id);
        }

        let set_clause = assignments
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE employees SET {set_clause} WHERE employee_id = ?{};",
            values.len() + 1
        );
        values.push(SqlValue::Integer(i64::from(employee_id)));

        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        Ok(changed > 0)
    }

    /// Overwrites every stored column of an existing row, passport included.
    pub fn replace_row(&self, employee: &Employee) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE employees
             SET first_name = ?2, last_name = ?3, patronymic = ?4, salary = ?5, passport = ?6
             WHERE employee_id = ?1;",
            params![
                employee.employee_id(),
                employee.first_name(),
                employee.last_name(),
                employee.patronymic(),
                i64::from(employee.salary()),
                employee.passport().as_str(),
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete(&self, employee_id: EmployeeId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM employees WHERE employee_id = ?1;", [employee_id])?;
        Ok(changed > 0)
    }

    pub fn count(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("invalid employee count `{count}`")))
    }

    pub fn exists(&self, employee_id: EmployeeId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE employee_id = ?1);",
            [employee_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    /// All stored ids in ascending order.
    pub fn ids(&self) -> RepoResult<Vec<EmployeeId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT employee_id FROM employees ORDER BY employee_id ASC;")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, EmployeeId>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let employee_id: i64 = row.get("employee_id")?;
    let first_name: String = row.get("first_name")?;
    let last_name: String = row.get("last_name")?;
    let patronymic: Option<String> = row.get("patronymic")?;
    let salary: i64 = row.get("salary")?;
    let passport: String = row.get("passport")?;

    Employee::new(
        employee_id,
        &first_name,
        &last_name,
        patronymic.as_deref(),
        salary,
        &passport,
    )
    .map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid employees row `{employee_id}`: {err}"
        ))
    })
}

fn to_sql_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn ensure_employee_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, EMPLOYEES_TABLE)? {
        return Err(RepoError::MissingRequiredTable(EMPLOYEES_TABLE));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, EMPLOYEES_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: EMPLOYEES_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::SqliteEmployeeStore;
    use crate::db::open_db_in_memory;
    use crate::model::employee::NewEmployee;
    use crate::model::update::EmployeeUpdate;
    use crate::repo::employee_repo::RepoError;

    fn hire(first: &str, passport: &str) -> NewEmployee {
        NewEmployee::new(first, "Petrov", 1000, passport, None).unwrap()
    }

    #[test]
    fn add_returns_generated_ids_in_order() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteEmployeeStore::try_new(&conn).unwrap();

        let first = store.add(hire("Ivan", "1111111111")).unwrap();
        let second = store.add(hire("Oleg", "2222222222")).unwrap();

        assert_eq!(first.employee_id(), 1);
        assert_eq!(second.employee_id(), 2);
        assert_eq!(store.ids().unwrap(), vec![1, 2]);
    }

    #[test]
    fn empty_update_reports_existence_only() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteEmployeeStore::try_new(&conn).unwrap();
        let created = store.add(hire("Ivan", "1111111111")).unwrap();

        assert!(store
            .update(created.employee_id(), &EmployeeUpdate::new())
            .unwrap());
        assert!(!store.update(99, &EmployeeUpdate::new()).unwrap());
    }

    #[test]
    fn patronymic_can_be_cleared() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteEmployeeStore::try_new(&conn).unwrap();
        let created = store
            .add(NewEmployee::new("Ivan", "Petrov", 1, "1111111111", Some("Ilyich")).unwrap())
            .unwrap();

        store
            .update(
                created.employee_id(),
                &EmployeeUpdate::new().patronymic(None::<String>),
            )
            .unwrap();

        let loaded = store.get_by_id(created.employee_id()).unwrap().unwrap();
        assert_eq!(loaded.patronymic(), None);
    }

    #[test]
    fn invalid_row_is_reported_not_masked() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO employees (first_name, last_name, salary, passport)
             VALUES ('R2D2', 'Droid', 10, '1111111111');",
            [],
        )
        .unwrap();
        let store = SqliteEmployeeStore::try_new(&conn).unwrap();

        assert!(matches!(store.get_all(), Err(RepoError::InvalidData(_))));
    }

    #[test]
    fn get_page_windows_rows_by_id() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteEmployeeStore::try_new(&conn).unwrap();
        store.add(hire("Ivan", "1111111111")).unwrap();
        store.add(hire("Oleg", "2222222222")).unwrap();
        store.add(hire("Gleb", "3333333333")).unwrap();

        let page: Vec<u32> = store
            .get_page(2, 2)
            .unwrap()
            .iter()
            .map(|employee| employee.employee_id())
            .collect();
        assert_eq!(page, vec![3]);
        assert_eq!(store.get_page(2, 0).unwrap().len(), 2);
        assert!(store.get_page(2, 5).unwrap().is_empty());
    }

    #[test]
    fn count_tracks_adds_and_deletes() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteEmployeeStore::try_new(&conn).unwrap();
        assert_eq!(store.count().unwrap(), 0);

        let first = store.add(hire("Ivan", "1111111111")).unwrap();
        store.add(hire("Oleg", "2222222222")).unwrap();
        assert_eq!(store.count().unwrap(), 2);

        assert!(store.delete(first.employee_id()).unwrap());
        assert!(!store.delete(first.employee_id()).unwrap());
        assert_eq!(store.count().unwrap(), 1);
    }
}
