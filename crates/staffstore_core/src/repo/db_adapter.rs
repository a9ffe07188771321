//! Repository adapter over the SQLite store.
//!
//! # Responsibility
//! - Present `SqliteEmployeeStore` through the uniform repository contract.
//! - Keep a read-through mirror of the table for listing operations.
//!
//! # Invariants
//! - The store is the source of truth; the mirror is reloaded in full
//!   (ordered by id) after every mutation attempt.
//! - A committed mutation reports success even when the reload fails; the
//!   mirror is then flagged stale until a later reload succeeds.
//! - `replace_all` reconciles the table inside one transaction.
//! - `sort_by` returns a sorted copy and does not reorder storage.

use crate::db::{open_with_config, DbConfig};
use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::model::update::EmployeeUpdate;
use crate::repo::employee_repo::{
    ensure_unique_ids, page_window, sort_employees, EmployeeRepository, PagePolicy, RepoResult,
    SortField,
};
use crate::repo::sqlite_store::SqliteEmployeeStore;
use log::{error, info, warn};
use rusqlite::{Connection, TransactionBehavior};
use std::collections::HashSet;

/// Employee repository backed by a SQLite connection it owns.
pub struct SqliteEmployeeRepository {
    conn: Connection,
    mirror: Vec<Employee>,
    stale_mirror: Option<String>,
    page_policy: PagePolicy,
}

impl SqliteEmployeeRepository {
    /// Opens (and migrates) the database described by `config`.
    pub fn open(config: &DbConfig) -> RepoResult<Self> {
        let conn = open_with_config(config)?;
        Self::from_connection(conn)
    }

    /// Adopts an already migrated connection.
    pub fn from_connection(conn: Connection) -> RepoResult<Self> {
        let mirror = SqliteEmployeeStore::try_new(&conn)?.get_all()?;
        info!(
            "event=adapter_open module=repo status=ok backend=sqlite count={}",
            mirror.len()
        );
        Ok(Self {
            conn,
            mirror,
            stale_mirror: None,
            page_policy: PagePolicy::default(),
        })
    }

    pub fn with_page_policy(mut self, page_policy: PagePolicy) -> Self {
        self.page_policy = page_policy;
        self
    }

    /// Reloads the mirror from the table.
    pub fn refresh(&mut self) -> RepoResult<()> {
        self.mirror = self.store().get_all()?;
        self.stale_mirror = None;
        Ok(())
    }

    /// True when the last reload after a committed mutation failed.
    pub fn is_mirror_stale(&self) -> bool {
        self.stale_mirror.is_some()
    }

    pub fn last_refresh_error(&self) -> Option<&str> {
        self.stale_mirror.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn store(&self) -> SqliteEmployeeStore<'_> {
        SqliteEmployeeStore::from_ready(&self.conn)
    }

    /// Refreshes the mirror after a mutation, whatever its outcome.
    ///
    /// The mutation outcome wins: a reload failure after a successful write
    /// is logged and recorded, never turned into an error for the caller.
    fn settle<T>(&mut self, op: &'static str, outcome: RepoResult<T>) -> RepoResult<T> {
        let refreshed = self.refresh();
        match outcome {
            Err(err) => {
                error!(
                    "event=adapter_mutation module=repo status=error backend=sqlite op={op} error={err}"
                );
                Err(err)
            }
            Ok(value) => {
                if let Err(err) = refreshed {
                    warn!(
                        "event=adapter_refresh module=repo status=stale backend=sqlite op={op} error={err}"
                    );
                    self.stale_mirror = Some(err.to_string());
                }
                Ok(value)
            }
        }
    }

    fn reconcile(&mut self, employees: &[Employee]) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let store = SqliteEmployeeStore::from_ready(&tx);
            let incoming: HashSet<EmployeeId> =
                employees.iter().map(Employee::employee_id).collect();

            for employee_id in store.ids()? {
                if !incoming.contains(&employee_id) {
                    store.delete(employee_id)?;
                }
            }
            for employee in employees {
                if !store.replace_row(employee)? {
                    store.insert_with_id(employee)?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl EmployeeRepository for SqliteEmployeeRepository {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn page_policy(&self) -> PagePolicy {
        self.page_policy
    }

    fn get_by_id(&self, employee_id: EmployeeId) -> RepoResult<Option<Employee>> {
        self.store().get_by_id(employee_id)
    }

    fn get_all(&self) -> RepoResult<Vec<Employee>> {
        Ok(self.mirror.clone())
    }

    fn get_page(&self, page_size: usize, page: usize) -> RepoResult<Vec<Employee>> {
        let window = page_window(self.mirror.len(), page_size, page, self.page_policy)?;
        Ok(self.mirror[window].to_vec())
    }

    fn sort_by(&mut self, field: SortField, reverse: bool) -> RepoResult<Vec<Employee>> {
        let mut sorted = self.mirror.clone();
        sort_employees(&mut sorted, field, reverse);
        Ok(sorted)
    }

    fn add(&mut self, new_employee: NewEmployee) -> RepoResult<Employee> {
        let outcome = self.store().add(new_employee);
        self.settle("add", outcome)
    }

    fn update(&mut self, employee_id: EmployeeId, update: &EmployeeUpdate) -> RepoResult<bool> {
        let outcome = self.store().update(employee_id, update);
        self.settle("update", outcome)
    }

    fn delete(&mut self, employee_id: EmployeeId) -> RepoResult<bool> {
        let outcome = self.store().delete(employee_id);
        self.settle("delete", outcome)
    }

    fn count(&self) -> RepoResult<usize> {
        Ok(self.mirror.len())
    }

    fn replace_all(&mut self, employees: Vec<Employee>) -> RepoResult<()> {
        ensure_unique_ids(&employees)?;
        let outcome = self.reconcile(&employees);
        self.settle("replace_all", outcome)
    }
}
