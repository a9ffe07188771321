//! Observer registry and delivery.

use crate::notify::event::RepositoryEvent;
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by one observer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("observer `{observer}` failed: {message}")]
pub struct ObserverError {
    pub observer: String,
    pub message: String,
}

impl ObserverError {
    pub fn new(observer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            observer: observer.into(),
            message: message.into(),
        }
    }
}

/// Receiver of repository events.
pub trait RepositoryObserver {
    fn on_event(&self, event: &RepositoryEvent) -> Result<(), ObserverError>;

    /// Label used in diagnostics.
    fn name(&self) -> &str {
        "observer"
    }
}

/// What `notify` does when an observer fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Stop at the first failing observer.
    #[default]
    FailFast,
    /// Call every observer and collect all failures.
    Isolated,
}

/// Failures collected while delivering one event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "delivery of `{event}` failed for {} observer(s){}",
    .failures.len(),
    failure_suffix(.failures)
)]
pub struct DeliveryError {
    pub event: &'static str,
    pub failures: Vec<ObserverError>,
}

fn failure_suffix(failures: &[ObserverError]) -> String {
    failures
        .iter()
        .map(|failure| format!("; {failure}"))
        .collect()
}

/// Ordered, identity-deduplicated observer list.
#[derive(Default)]
pub struct Subject {
    observers: Vec<Arc<dyn RepositoryObserver>>,
    policy: DeliveryPolicy,
}

impl Subject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DeliveryPolicy) -> Self {
        Self {
            observers: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> DeliveryPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: DeliveryPolicy) {
        self.policy = policy;
    }

    /// Registers `observer` unless that same instance is already attached.
    ///
    /// Returns whether the list changed.
    pub fn attach(&mut self, observer: Arc<dyn RepositoryObserver>) -> bool {
        if self.position(&observer).is_some() {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Removes `observer` if attached. Returns whether the list changed.
    pub fn detach(&mut self, observer: &Arc<dyn RepositoryObserver>) -> bool {
        match self.position(observer) {
            Some(index) => {
                self.observers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Delivers `event` to every observer in attach order.
    pub fn notify(&self, event: &RepositoryEvent) -> Result<(), DeliveryError> {
        let mut failures = Vec::new();
        for observer in &self.observers {
            if let Err(err) = observer.on_event(event) {
                warn!(
                    "event=observer_delivery module=notify status=error event_name={} observer={} error={}",
                    event.name(),
                    observer.name(),
                    err.message
                );
                failures.push(err);
                if self.policy == DeliveryPolicy::FailFast {
                    break;
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DeliveryError {
                event: event.name(),
                failures,
            })
        }
    }

    fn position(&self, observer: &Arc<dyn RepositoryObserver>) -> Option<usize> {
        self.observers
            .iter()
            .position(|current| Arc::ptr_eq(current, observer))
    }
}

/// Observer that writes every event to the log facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl RepositoryObserver for LoggingObserver {
    fn on_event(&self, event: &RepositoryEvent) -> Result<(), ObserverError> {
        let payload = serde_json::to_string(event)
            .map_err(|err| ObserverError::new(self.name(), err.to_string()))?;
        info!(
            "event=repository_event module=notify status=ok event_name={} payload={}",
            event.name(),
            payload
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "logging"
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DeliveryError, DeliveryPolicy, LoggingObserver, ObserverError, RepositoryObserver, Subject,
    };
    use crate::notify::event::RepositoryEvent;
    use std::sync::{Arc, Mutex};

    struct Recorder {
        label: &'static str,
        fail: bool,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl RepositoryObserver for Recorder {
        fn on_event(&self, _event: &RepositoryEvent) -> Result<(), ObserverError> {
            self.log.lock().unwrap().push(self.label);
            if self.fail {
                Err(ObserverError::new(self.label, "boom"))
            } else {
                Ok(())
            }
        }

        fn name(&self) -> &str {
            self.label
        }
    }

    fn recorder(
        label: &'static str,
        fail: bool,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<dyn RepositoryObserver> {
        Arc::new(Recorder {
            label,
            fail,
            log: Arc::clone(log),
        })
    }

    #[test]
    fn attach_and_detach_are_idempotent() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let observer = recorder("a", false, &log);
        let mut subject = Subject::new();

        assert!(subject.attach(Arc::clone(&observer)));
        assert!(!subject.attach(Arc::clone(&observer)));
        assert_eq!(subject.len(), 1);

        assert!(subject.detach(&observer));
        assert!(!subject.detach(&observer));
        assert!(subject.is_empty());
    }

    #[test]
    fn delivery_error_message_lists_each_failure() {
        let err = DeliveryError {
            event: "employee_added",
            failures: vec![
                ObserverError::new("audit", "disk full"),
                ObserverError::new("mailer", "timeout"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "delivery of `employee_added` failed for 2 observer(s); \
             observer `audit` failed: disk full; observer `mailer` failed: timeout"
        );
        let as_error: &dyn std::error::Error = &err;
        assert!(as_error.source().is_none());
    }

    #[test]
    fn fail_fast_stops_at_first_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut subject = Subject::new();
        subject.attach(recorder("a", false, &log));
        subject.attach(recorder("b", true, &log));
        subject.attach(recorder("c", false, &log));

        let err = subject
            .notify(&RepositoryEvent::Loaded { count: 0 })
            .unwrap_err();

        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].observer, "b");
    }

    #[test]
    fn isolated_delivery_reaches_everyone() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut subject = Subject::with_policy(DeliveryPolicy::Isolated);
        subject.attach(recorder("a", true, &log));
        subject.attach(recorder("b", false, &log));
        subject.attach(recorder("c", true, &log));

        let err = subject
            .notify(&RepositoryEvent::Deleted { employee_id: 1 })
            .unwrap_err();

        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(err.event, "employee_deleted");
        assert_eq!(err.failures.len(), 2);
    }

    #[test]
    fn logging_observer_never_fails() {
        let observer = LoggingObserver;
        assert!(observer
            .on_event(&RepositoryEvent::Loaded { count: 3 })
            .is_ok());
    }
}
