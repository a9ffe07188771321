//! Employee repository contract shared by every backend and wrapper.
//!
//! # Responsibility
//! - Define the uniform CRUD + pagination + sort interface.
//! - Own the page-window arithmetic and the stable sort used everywhere.
//!
//! # Invariants
//! - `get_by_id` reports absence as `Ok(None)`, never as an error.
//! - Sorting is stable; equal keys keep their prior relative order, also
//!   when `reverse` is set.
//! - Validation failures surface before any mutation is attempted.

use crate::db::DbError;
use crate::model::employee::{Employee, EmployeeId, EmployeeSummary, NewEmployee};
use crate::model::update::EmployeeUpdate;
use crate::model::validation::ValidationError;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::ops::Range;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for employee persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("snapshot i/o failed for `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{format} snapshot could not be encoded: {message}")]
    Serialization {
        format: &'static str,
        message: String,
    },
    #[error("page {page} (size {page_size}) is out of range for {total} employees")]
    PageOutOfRange {
        page: usize,
        page_size: usize,
        total: usize,
    },
    #[error("duplicate employee id {0}")]
    DuplicateEmployeeId(EmployeeId),
    #[error("invalid persisted employee data: {0}")]
    InvalidData(String),
    #[error("employee repository requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("employee repository requires table `{0}`")]
    MissingRequiredTable(&'static str),
    #[error("employee repository requires column `{column}` in table `{table}`")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Whether this is a caller input problem rather than a storage fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Fields an employee listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    EmployeeId,
    FirstName,
    LastName,
    Salary,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::EmployeeId,
        SortField::FirstName,
        SortField::LastName,
        SortField::Salary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmployeeId => "employee_id",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Salary => "salary",
        }
    }

    /// Compares two employees by this field only.
    pub fn compare(self, left: &Employee, right: &Employee) -> Ordering {
        match self {
            Self::EmployeeId => left.employee_id().cmp(&right.employee_id()),
            Self::FirstName => left.first_name().cmp(right.first_name()),
            Self::LastName => left.last_name().cmp(right.last_name()),
            Self::Salary => left.salary().cmp(&right.salary()),
        }
    }
}

impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == value.trim())
            .ok_or_else(|| ValidationError::InvalidSortField(value.to_string()))
    }
}

impl Display for SortField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What `get_page` does when the requested page starts past the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PagePolicy {
    /// Return an empty page.
    #[default]
    Empty,
    /// Fail with `RepoError::PageOutOfRange`. Page 1 is always in range.
    Strict,
}

/// Computes the half-open window `[(page-1)*page_size, +page_size)` clipped
/// to `total`.
///
/// # Errors
/// - `ValidationError::InvalidPage` when `page_size` or `page` is zero.
/// - `RepoError::PageOutOfRange` for a start past the end under
///   `PagePolicy::Strict`.
pub fn page_window(
    total: usize,
    page_size: usize,
    page: usize,
    policy: PagePolicy,
) -> RepoResult<Range<usize>> {
    if page_size == 0 || page == 0 {
        return Err(ValidationError::InvalidPage { page_size, page }.into());
    }

    let start = (page - 1).saturating_mul(page_size);
    if start >= total {
        return match policy {
            PagePolicy::Strict if page > 1 => Err(RepoError::PageOutOfRange {
                page,
                page_size,
                total,
            }),
            _ => Ok(total..total),
        };
    }

    Ok(start..start.saturating_add(page_size).min(total))
}

/// Stable in-place sort by `field`.
pub fn sort_employees(employees: &mut [Employee], field: SortField, reverse: bool) {
    if reverse {
        employees.sort_by(|left, right| field.compare(right, left));
    } else {
        employees.sort_by(|left, right| field.compare(left, right));
    }
}

/// Rejects collections that reuse an employee id.
pub(crate) fn ensure_unique_ids(employees: &[Employee]) -> RepoResult<()> {
    let mut seen = HashSet::with_capacity(employees.len());
    for employee in employees {
        if !seen.insert(employee.employee_id()) {
            return Err(RepoError::DuplicateEmployeeId(employee.employee_id()));
        }
    }
    Ok(())
}

/// Uniform employee repository interface.
pub trait EmployeeRepository {
    /// Short backend label used in diagnostics (`json`, `yaml`, `sqlite`).
    fn backend_name(&self) -> &'static str;

    fn page_policy(&self) -> PagePolicy;

    fn get_by_id(&self, employee_id: EmployeeId) -> RepoResult<Option<Employee>>;

    /// Full unpaged read in backing order.
    fn get_all(&self) -> RepoResult<Vec<Employee>>;

    /// Returns page `page` (1-based) of size `page_size`.
    fn get_page(&self, page_size: usize, page: usize) -> RepoResult<Vec<Employee>> {
        let employees = self.get_all()?;
        let window = page_window(employees.len(), page_size, page, self.page_policy())?;
        Ok(employees[window].to_vec())
    }

    /// Same window as `get_page`, projected to short-list rows.
    fn short_page(&self, page_size: usize, page: usize) -> RepoResult<Vec<EmployeeSummary>> {
        Ok(self
            .get_page(page_size, page)?
            .iter()
            .map(Employee::summary)
            .collect())
    }

    fn sort_by(&mut self, field: SortField, reverse: bool) -> RepoResult<Vec<Employee>>;

    /// Assigns the next id, persists and returns the created employee.
    fn add(&mut self, new_employee: NewEmployee) -> RepoResult<Employee>;

    /// Returns whether the target existed.
    fn update(&mut self, employee_id: EmployeeId, update: &EmployeeUpdate) -> RepoResult<bool>;

    /// Returns whether anything was removed.
    fn delete(&mut self, employee_id: EmployeeId) -> RepoResult<bool>;

    fn count(&self) -> RepoResult<usize>;

    /// Replaces the whole collection, keeping the given ids.
    fn replace_all(&mut self, employees: Vec<Employee>) -> RepoResult<()>;
}

#[cfg(test)]
mod tests {
    use super::{page_window, sort_employees, PagePolicy, RepoError, SortField};
    use crate::model::employee::Employee;
    use crate::model::validation::ValidationError;

    fn employee(id: i64, first: &str, salary: i64) -> Employee {
        let passport = format!("{:010}", id);
        Employee::new(id, first, "Test", None, salary, &passport).unwrap()
    }

    #[test]
    fn window_math_matches_one_based_pages() {
        assert_eq!(page_window(3, 2, 1, PagePolicy::Empty).unwrap(), 0..2);
        assert_eq!(page_window(3, 2, 2, PagePolicy::Empty).unwrap(), 2..3);
        assert_eq!(page_window(3, 2, 3, PagePolicy::Empty).unwrap(), 3..3);
    }

    #[test]
    fn strict_policy_rejects_pages_past_the_end_but_not_page_one() {
        assert!(matches!(
            page_window(3, 3, 2, PagePolicy::Strict),
            Err(RepoError::PageOutOfRange {
                page: 2,
                page_size: 3,
                total: 3
            })
        ));
        assert_eq!(page_window(0, 5, 1, PagePolicy::Strict).unwrap(), 0..0);
    }

    #[test]
    fn zero_page_arguments_are_validation_failures() {
        let err = page_window(3, 0, 1, PagePolicy::Empty).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ValidationError::InvalidPage { .. })
        ));
        assert!(err.is_validation());
    }

    #[test]
    fn sort_field_parsing_rejects_unknown_names() {
        assert_eq!("salary".parse::<SortField>().unwrap(), SortField::Salary);
        assert_eq!(
            "passport".parse::<SortField>().unwrap_err(),
            ValidationError::InvalidSortField("passport".to_string())
        );
    }

    #[test]
    fn reverse_sort_keeps_equal_keys_in_prior_order() {
        let mut employees = vec![
            employee(1, "Bob", 100),
            employee(2, "Ann", 200),
            employee(3, "Cid", 100),
        ];
        sort_employees(&mut employees, SortField::Salary, true);
        let ids: Vec<_> = employees.iter().map(Employee::employee_id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
