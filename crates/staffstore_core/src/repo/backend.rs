//! Tagged handle over the concrete backends.
//!
//! Dispatch is a plain `match` per operation, so the set of backends stays
//! closed and visible in one place.

use crate::config::BackendConfig;
use crate::db::DbConfig;
use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::model::update::EmployeeUpdate;
use crate::repo::db_adapter::SqliteEmployeeRepository;
use crate::repo::employee_repo::{EmployeeRepository, PagePolicy, RepoResult, SortField};
use crate::repo::snapshot::{JsonFileRepository, YamlFileRepository};
use log::info;

pub enum EmployeeBackend {
    Json(JsonFileRepository),
    Yaml(YamlFileRepository),
    Sqlite(SqliteEmployeeRepository),
}

/// Opens the backend described by `config`.
///
/// File backends never fail to open; their load outcome is available through
/// `load_status()` on the inner repository.
pub fn open_backend(config: &BackendConfig) -> RepoResult<EmployeeBackend> {
    let backend = match config {
        BackendConfig::Json { path } => EmployeeBackend::Json(JsonFileRepository::open(path)),
        BackendConfig::Yaml { path } => EmployeeBackend::Yaml(YamlFileRepository::open(path)),
        BackendConfig::Sqlite { path } => {
            EmployeeBackend::Sqlite(SqliteEmployeeRepository::open(&DbConfig::file(path))?)
        }
        BackendConfig::SqliteMemory => {
            EmployeeBackend::Sqlite(SqliteEmployeeRepository::open(&DbConfig::in_memory())?)
        }
    };
    info!(
        "event=backend_open module=repo status=ok kind={}",
        config.kind()
    );
    Ok(backend)
}

impl EmployeeBackend {
    pub fn with_page_policy(self, page_policy: PagePolicy) -> Self {
        match self {
            Self::Json(repo) => Self::Json(repo.with_page_policy(page_policy)),
            Self::Yaml(repo) => Self::Yaml(repo.with_page_policy(page_policy)),
            Self::Sqlite(repo) => Self::Sqlite(repo.with_page_policy(page_policy)),
        }
    }
}

macro_rules! dispatch {
    ($self:expr, $repo:ident => $call:expr) => {
        match $self {
            EmployeeBackend::Json($repo) => $call,
            EmployeeBackend::Yaml($repo) => $call,
            EmployeeBackend::Sqlite($repo) => $call,
        }
    };
}

impl EmployeeRepository for EmployeeBackend {
    fn backend_name(&self) -> &'static str {
        dispatch!(self, repo => repo.backend_name())
    }

    fn page_policy(&self) -> PagePolicy {
        dispatch!(self, repo => repo.page_policy())
    }

    fn get_by_id(&self, employee_id: EmployeeId) -> RepoResult<Option<Employee>> {
        dispatch!(self, repo => repo.get_by_id(employee_id))
    }

    fn get_all(&self) -> RepoResult<Vec<Employee>> {
        dispatch!(self, repo => repo.get_all())
    }

    fn get_page(&self, page_size: usize, page: usize) -> RepoResult<Vec<Employee>> {
        dispatch!(self, repo => repo.get_page(page_size, page))
    }

    fn sort_by(&mut self, field: SortField, reverse: bool) -> RepoResult<Vec<Employee>> {
        dispatch!(self, repo => repo.sort_by(field, reverse))
    }

    fn add(&mut self, new_employee: NewEmployee) -> RepoResult<Employee> {
        dispatch!(self, repo => repo.add(new_employee))
    }

    fn update(&mut self, employee_id: EmployeeId, update: &EmployeeUpdate) -> RepoResult<bool> {
        dispatch!(self, repo => repo.update(employee_id, update))
    }

    fn delete(&mut self, employee_id: EmployeeId) -> RepoResult<bool> {
        dispatch!(self, repo => repo.delete(employee_id))
    }

    fn count(&self) -> RepoResult<usize> {
        dispatch!(self, repo => repo.count())
    }

    fn replace_all(&mut self, employees: Vec<Employee>) -> RepoResult<()> {
        dispatch!(self, repo => repo.replace_all(employees))
    }
}
