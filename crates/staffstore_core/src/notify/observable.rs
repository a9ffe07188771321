//! Event-emitting repository wrapper.

use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::model::update::EmployeeUpdate;
use crate::notify::event::RepositoryEvent;
use crate::notify::subject::{DeliveryError, DeliveryPolicy, RepositoryObserver, Subject};
use crate::repo::employee_repo::{EmployeeRepository, PagePolicy, RepoResult, SortField};
use std::cell::RefCell;
use std::sync::Arc;

/// Repository that announces state changes to attached observers.
///
/// Emits one event per visible change: `Added` after a successful add,
/// `Updated`/`Deleted` only when the target existed, `Viewed` on a lookup
/// hit, and `Loaded` on `announce_loaded` and `replace_all`.
pub struct ObservableRepository<R: EmployeeRepository> {
    inner: R,
    subject: Subject,
    last_delivery_error: RefCell<Option<DeliveryError>>,
}

impl<R: EmployeeRepository> ObservableRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            subject: Subject::new(),
            last_delivery_error: RefCell::new(None),
        }
    }

    pub fn with_delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.subject.set_policy(policy);
        self
    }

    pub fn attach(&mut self, observer: Arc<dyn RepositoryObserver>) -> bool {
        self.subject.attach(observer)
    }

    pub fn detach(&mut self, observer: &Arc<dyn RepositoryObserver>) -> bool {
        self.subject.detach(observer)
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Emits `Loaded` with the current count.
    pub fn announce_loaded(&self) -> RepoResult<()> {
        let count = self.inner.count()?;
        self.emit(RepositoryEvent::Loaded { count });
        Ok(())
    }

    /// Most recent failed delivery, if any.
    ///
    /// Successful deliveries leave it in place; only a newer failure or
    /// `take_delivery_error` replaces it.
    pub fn last_delivery_error(&self) -> Option<DeliveryError> {
        self.last_delivery_error.borrow().clone()
    }

    /// Returns the recorded failure and clears it.
    pub fn take_delivery_error(&self) -> Option<DeliveryError> {
        self.last_delivery_error.borrow_mut().take()
    }

    fn emit(&self, event: RepositoryEvent) {
        if let Err(err) = self.subject.notify(&event) {
            *self.last_delivery_error.borrow_mut() = Some(err);
        }
    }
}

impl<R: EmployeeRepository> EmployeeRepository for ObservableRepository<R> {
    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }

    fn page_policy(&self) -> PagePolicy {
        self.inner.page_policy()
    }

    fn get_by_id(&self, employee_id: EmployeeId) -> RepoResult<Option<Employee>> {
        let found = self.inner.get_by_id(employee_id)?;
        if let Some(employee) = &found {
            self.emit(RepositoryEvent::Viewed {
                employee_id: employee.employee_id(),
                full_name: employee.full_name(),
            });
        }
        Ok(found)
    }

    fn get_all(&self) -> RepoResult<Vec<Employee>> {
        self.inner.get_all()
    }

    fn get_page(&self, page_size: usize, page: usize) -> RepoResult<Vec<Employee>> {
        self.inner.get_page(page_size, page)
    }

    fn sort_by(&mut self, field: SortField, reverse: bool) -> RepoResult<Vec<Employee>> {
        self.inner.sort_by(field, reverse)
    }

    fn add(&mut self, new_employee: NewEmployee) -> RepoResult<Employee> {
        let created = self.inner.add(new_employee)?;
        self.emit(RepositoryEvent::Added(created.to_record()));
        Ok(created)
    }

    fn update(&mut self, employee_id: EmployeeId, update: &EmployeeUpdate) -> RepoResult<bool> {
        if !self.inner.update(employee_id, update)? {
            return Ok(false);
        }
        if let Some(employee) = self.inner.get_by_id(employee_id)? {
            self.emit(RepositoryEvent::Updated {
                employee: employee.to_record(),
                updated_fields: update.field_names(),
            });
        }
        Ok(true)
    }

    fn delete(&mut self, employee_id: EmployeeId) -> RepoResult<bool> {
        let removed = self.inner.delete(employee_id)?;
        if removed {
            self.emit(RepositoryEvent::Deleted { employee_id });
        }
        Ok(removed)
    }

    fn count(&self) -> RepoResult<usize> {
        self.inner.count()
    }

    fn replace_all(&mut self, employees: Vec<Employee>) -> RepoResult<()> {
        self.inner.replace_all(employees)?;
        self.announce_loaded()
    }
}
