//! Filter/sort/pagination over any repository.
//!
//! # Responsibility
//! - Compose an optional predicate and an optional stable sort in front of
//!   the standard page window.
//!
//! # Invariants
//! - Never persists and never mutates the wrapped repository.
//! - Order of work: full read, filter, sort, window.
//! - An empty query pages exactly like the wrapped repository.

use crate::model::employee::Employee;
use crate::repo::employee_repo::{
    page_window, sort_employees, EmployeeRepository, RepoResult, SortField,
};

type Predicate = Box<dyn Fn(&Employee) -> bool>;

/// Filter and ordering applied before paging.
#[derive(Default)]
pub struct EmployeeQuery {
    filters: Vec<Predicate>,
    sort: Option<(SortField, bool)>,
}

impl EmployeeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate; multiple predicates combine by AND.
    pub fn filter(mut self, predicate: impl Fn(&Employee) -> bool + 'static) -> Self {
        self.filters.push(Box::new(predicate));
        self
    }

    /// Inclusive salary range.
    pub fn salary_between(self, min: u32, max: u32) -> Self {
        self.filter(move |employee| (min..=max).contains(&employee.salary()))
    }

    /// Case-insensitive last-name prefix.
    pub fn last_name_starts_with(self, prefix: &str) -> Self {
        let prefix = prefix.trim().to_lowercase();
        self.filter(move |employee| employee.last_name().to_lowercase().starts_with(&prefix))
    }

    pub fn sort_by(mut self, field: SortField, reverse: bool) -> Self {
        self.sort = Some((field, reverse));
        self
    }

    pub fn has_filter(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn sort(&self) -> Option<(SortField, bool)> {
        self.sort
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        self.filters.iter().all(|predicate| predicate(employee))
    }

    fn apply(&self, employees: Vec<Employee>) -> Vec<Employee> {
        let mut selected: Vec<Employee> = employees
            .into_iter()
            .filter(|employee| self.matches(employee))
            .collect();
        if let Some((field, reverse)) = self.sort {
            sort_employees(&mut selected, field, reverse);
        }
        selected
    }
}

/// Read-only query decorator borrowing a repository.
pub struct QueryRepository<'r, R: EmployeeRepository + ?Sized> {
    inner: &'r R,
}

impl<'r, R: EmployeeRepository + ?Sized> QueryRepository<'r, R> {
    pub fn new(inner: &'r R) -> Self {
        Self { inner }
    }

    /// Returns page `page` (1-based, size `page_size`) of the query result,
    /// under the wrapped repository's page policy.
    pub fn get_page(
        &self,
        page_size: usize,
        page: usize,
        query: &EmployeeQuery,
    ) -> RepoResult<Vec<Employee>> {
        let selected = query.apply(self.inner.get_all()?);
        let window = page_window(selected.len(), page_size, page, self.inner.page_policy())?;
        Ok(selected[window].to_vec())
    }

    /// Number of employees matching the query's predicates.
    pub fn count(&self, query: &EmployeeQuery) -> RepoResult<usize> {
        Ok(self
            .inner
            .get_all()?
            .iter()
            .filter(|employee| query.matches(employee))
            .count())
    }
}
