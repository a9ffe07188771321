//! Core library for staffstore.
//! Employee model, repository backends, notification and query layers.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod query;
pub mod repo;

pub use config::{AppConfig, BackendConfig, ConfigError, OrganizationConfig};
pub use db::{DbConfig, DbError, DbLocation};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::employee::{Employee, EmployeeId, EmployeeRecord, EmployeeSummary, NewEmployee};
pub use model::passport::Passport;
pub use model::person::Person;
pub use model::update::EmployeeUpdate;
pub use model::validation::{FieldErrors, ValidationError};
pub use notify::{
    DeliveryError, DeliveryPolicy, LoggingObserver, ObservableRepository, ObserverError,
    RepositoryEvent, RepositoryObserver, Subject,
};
pub use query::{EmployeeQuery, QueryRepository};
pub use repo::backend::{open_backend, EmployeeBackend};
pub use repo::db_adapter::SqliteEmployeeRepository;
pub use repo::employee_repo::{
    EmployeeRepository, PagePolicy, RepoError, RepoResult, SortField,
};
pub use repo::snapshot::{
    JsonFileRepository, JsonFormat, LoadStatus, SnapshotFormat, SnapshotRepository,
    YamlFileRepository, YamlFormat,
};
pub use repo::sqlite_store::SqliteEmployeeStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
