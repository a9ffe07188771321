//! File-snapshot employee repositories (JSON and YAML variants).
//!
//! # Responsibility
//! - Hold the whole collection in memory and mirror it to one file.
//! - Keep the two text encodings behind one `SnapshotFormat` seam.
//!
//! # Invariants
//! - Every mutation is one scoped cycle: copy, mutate, write the whole file,
//!   then swap the copy in. A failed write leaves memory untouched.
//! - Loading never fails: a missing file is an empty collection, and a
//!   malformed one degrades to empty with `LoadStatus::Degraded`.
//! - Ids are never reused within one repository instance.
//!
//! # Known limitation
//! - No cross-process coordination; concurrent writers to the same file can
//!   lose updates.

use crate::model::employee::{Employee, EmployeeId, EmployeeRecord, NewEmployee};
use crate::model::update::EmployeeUpdate;
use crate::repo::employee_repo::{
    ensure_unique_ids, page_window, sort_employees, EmployeeRepository, PagePolicy, RepoError,
    RepoResult, SortField,
};
use log::{error, info, warn};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Text encoding of one snapshot file.
pub trait SnapshotFormat {
    /// Short label used in diagnostics and errors.
    const NAME: &'static str;

    fn encode(records: &[EmployeeRecord]) -> Result<String, String>;

    fn decode(text: &str) -> Result<Vec<EmployeeRecord>, String>;
}

/// Pretty-printed JSON array of records.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl SnapshotFormat for JsonFormat {
    const NAME: &'static str = "json";

    fn encode(records: &[EmployeeRecord]) -> Result<String, String> {
        let mut text = serde_json::to_string_pretty(records).map_err(|err| err.to_string())?;
        text.push('\n');
        Ok(text)
    }

    fn decode(text: &str) -> Result<Vec<EmployeeRecord>, String> {
        serde_json::from_str(text).map_err(|err| err.to_string())
    }
}

/// YAML block sequence of records.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormat;

impl SnapshotFormat for YamlFormat {
    const NAME: &'static str = "yaml";

    fn encode(records: &[EmployeeRecord]) -> Result<String, String> {
        serde_yaml::to_string(records).map_err(|err| err.to_string())
    }

    fn decode(text: &str) -> Result<Vec<EmployeeRecord>, String> {
        // An empty YAML document is an empty collection.
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_yaml::from_str::<Option<Vec<EmployeeRecord>>>(text)
            .map(Option::unwrap_or_default)
            .map_err(|err| err.to_string())
    }
}

/// Outcome of the load performed on open/reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// The file does not exist yet.
    Missing,
    Loaded { count: usize },
    /// The file could not be read or parsed; the collection was reset to empty.
    Degraded { reason: String },
}

impl LoadStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

pub type JsonFileRepository = SnapshotRepository<JsonFormat>;
pub type YamlFileRepository = SnapshotRepository<YamlFormat>;

/// Whole-collection repository persisted as one snapshot file.
#[derive(Debug)]
pub struct SnapshotRepository<F: SnapshotFormat> {
    path: PathBuf,
    employees: Vec<Employee>,
    last_issued_id: EmployeeId,
    load_status: LoadStatus,
    page_policy: PagePolicy,
    _format: PhantomData<F>,
}

enum Mutation<T> {
    Changed(T),
    Unchanged(T),
}

impl<F: SnapshotFormat> SnapshotRepository<F> {
    /// Opens the snapshot at `path`, loading whatever it currently holds.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let (employees, load_status) = load_snapshot::<F>(&path);
        let last_issued_id = max_id(&employees);
        Self {
            path,
            employees,
            last_issued_id,
            load_status,
            page_policy: PagePolicy::default(),
            _format: PhantomData,
        }
    }

    pub fn with_page_policy(mut self, page_policy: PagePolicy) -> Self {
        self.page_policy = page_policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_status(&self) -> &LoadStatus {
        &self.load_status
    }

    /// Re-reads the file, replacing the in-memory collection.
    ///
    /// The id high-water mark is kept, so ids issued earlier by this
    /// instance are still never reused.
    pub fn reload(&mut self) -> &LoadStatus {
        let (employees, load_status) = load_snapshot::<F>(&self.path);
        self.last_issued_id = self.last_issued_id.max(max_id(&employees));
        self.employees = employees;
        self.load_status = load_status;
        &self.load_status
    }

    /// Renders the current collection in this variant's encoding without
    /// touching the file.
    pub fn export_snapshot(&self) -> RepoResult<String> {
        encode_employees::<F>(&self.employees)
    }

    fn next_id(&self) -> RepoResult<EmployeeId> {
        self.last_issued_id
            .max(max_id(&self.employees))
            .checked_add(1)
            .ok_or_else(|| RepoError::InvalidData("employee id space exhausted".to_string()))
    }

    /// Runs one read-modify-write cycle over a copy of the collection.
    fn commit<T>(
        &mut self,
        op: &'static str,
        mutate: impl FnOnce(&mut Vec<Employee>) -> RepoResult<Mutation<T>>,
    ) -> RepoResult<T> {
        let mut working = self.employees.clone();
        match mutate(&mut working)? {
            Mutation::Unchanged(output) => Ok(output),
            Mutation::Changed(output) => {
                self.write_snapshot(op, &working)?;
                self.employees = working;
                Ok(output)
            }
        }
    }

    fn write_snapshot(&self, op: &'static str, employees: &[Employee]) -> RepoResult<()> {
        let result =
            encode_employees::<F>(employees).and_then(|text| atomic_write(&self.path, &text));
        match &result {
            Ok(()) => info!(
                "event=snapshot_write module=repo status=ok format={} op={op} count={} path={}",
                F::NAME,
                employees.len(),
                self.path.display()
            ),
            Err(err) => error!(
                "event=snapshot_write module=repo status=error format={} op={op} path={} error={}",
                F::NAME,
                self.path.display(),
                err
            ),
        }
        result
    }
}

impl<F: SnapshotFormat> EmployeeRepository for SnapshotRepository<F> {
    fn backend_name(&self) -> &'static str {
        F::NAME
    }

    fn page_policy(&self) -> PagePolicy {
        self.page_policy
    }

    fn get_by_id(&self, employee_id: EmployeeId) -> RepoResult<Option<Employee>> {
        Ok(self
            .employees
            .iter()
            .find(|employee| employee.employee_id() == employee_id)
            .cloned())
    }

    fn get_all(&self) -> RepoResult<Vec<Employee>> {
        Ok(self.employees.clone())
    }

    fn get_page(&self, page_size: usize, page: usize) -> RepoResult<Vec<Employee>> {
        let window = page_window(self.employees.len(), page_size, page, self.page_policy)?;
        Ok(self.employees[window].to_vec())
    }

    /// Sorts and persists the reordered collection.
    fn sort_by(&mut self, field: SortField, reverse: bool) -> RepoResult<Vec<Employee>> {
        self.commit("sort", |employees| {
            sort_employees(employees, field, reverse);
            Ok(Mutation::Changed(employees.clone()))
        })
    }

    fn add(&mut self, new_employee: NewEmployee) -> RepoResult<Employee> {
        let employee_id = self.next_id()?;
        let employee = new_employee.into_employee(employee_id)?;
        let created = self.commit("add", |employees| {
            employees.push(employee.clone());
            Ok(Mutation::Changed(employee))
        })?;
        self.last_issued_id = self.last_issued_id.max(employee_id);
        Ok(created)
    }

    fn update(&mut self, employee_id: EmployeeId, update: &EmployeeUpdate) -> RepoResult<bool> {
        self.commit("update", |employees| {
            match employees
                .iter_mut()
                .find(|employee| employee.employee_id() == employee_id)
            {
                Some(slot) => {
                    *slot = update.apply_to(slot)?;
                    Ok(Mutation::Changed(true))
                }
                None => Ok(Mutation::Unchanged(false)),
            }
        })
    }

    fn delete(&mut self, employee_id: EmployeeId) -> RepoResult<bool> {
        self.commit("delete", |employees| {
            match employees
                .iter()
                .position(|employee| employee.employee_id() == employee_id)
            {
                Some(index) => {
                    employees.remove(index);
                    Ok(Mutation::Changed(true))
                }
                None => Ok(Mutation::Unchanged(false)),
            }
        })
    }

    fn count(&self) -> RepoResult<usize> {
        Ok(self.employees.len())
    }

    fn replace_all(&mut self, employees: Vec<Employee>) -> RepoResult<()> {
        ensure_unique_ids(&employees)?;
        let incoming_max = max_id(&employees);
        self.commit("replace_all", |current| {
            *current = employees;
            Ok(Mutation::Changed(()))
        })?;
        self.last_issued_id = self.last_issued_id.max(incoming_max);
        Ok(())
    }
}

fn load_snapshot<F: SnapshotFormat>(path: &Path) -> (Vec<Employee>, LoadStatus) {
    match read_snapshot::<F>(path) {
        Ok(Some(employees)) => {
            info!(
                "event=snapshot_load module=repo status=ok format={} count={} path={}",
                F::NAME,
                employees.len(),
                path.display()
            );
            let count = employees.len();
            (employees, LoadStatus::Loaded { count })
        }
        Ok(None) => {
            info!(
                "event=snapshot_load module=repo status=missing format={} path={}",
                F::NAME,
                path.display()
            );
            (Vec::new(), LoadStatus::Missing)
        }
        Err(reason) => {
            warn!(
                "event=snapshot_load module=repo status=degraded format={} path={} reason={}",
                F::NAME,
                path.display(),
                reason
            );
            (Vec::new(), LoadStatus::Degraded { reason })
        }
    }
}

fn read_snapshot<F: SnapshotFormat>(path: &Path) -> Result<Option<Vec<Employee>>, String> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(format!("read failed: {err}")),
    };

    let records = F::decode(&text).map_err(|err| format!("parse failed: {err}"))?;
    let employees = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            Employee::try_from(record).map_err(|err| format!("record {index}: {err}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    ensure_unique_ids(&employees).map_err(|err| err.to_string())?;
    Ok(Some(employees))
}

fn encode_employees<F: SnapshotFormat>(employees: &[Employee]) -> RepoResult<String> {
    let records: Vec<EmployeeRecord> = employees.iter().map(Employee::to_record).collect();
    F::encode(&records).map_err(|message| RepoError::Serialization {
        format: F::NAME,
        message,
    })
}

/// Writes through a sibling temp file and renames it over the target, so a
/// crash never leaves a half-written snapshot.
fn atomic_write(target: &Path, content: &str) -> RepoResult<()> {
    let io_error = |source| RepoError::Io {
        path: target.to_path_buf(),
        source,
    };

    if let Some(parent) = target.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut temp_name = target
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("snapshot"));
    temp_name.push(".tmp");
    let temp_path = target.with_file_name(temp_name);

    fs::write(&temp_path, content).map_err(io_error)?;
    if let Err(source) = fs::rename(&temp_path, target) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error(source));
    }
    Ok(())
}

fn max_id(employees: &[Employee]) -> EmployeeId {
    employees
        .iter()
        .map(Employee::employee_id)
        .max()
        .unwrap_or(0)
}
