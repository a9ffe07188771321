//! Repository change notification.
//!
//! # Responsibility
//! - Define the event catalogue emitted by observable repositories.
//! - Keep an ordered observer registry with an explicit delivery policy.
//! - Wrap any repository so its state changes are announced.
//!
//! # Invariants
//! - Delivery is synchronous and follows attach order.
//! - An observer is registered at most once (pointer identity).
//! - Observer failures never undo or fail a completed storage mutation.

pub mod event;
pub mod observable;
pub mod subject;

pub use event::RepositoryEvent;
pub use observable::ObservableRepository;
pub use subject::{
    DeliveryError, DeliveryPolicy, LoggingObserver, ObserverError, RepositoryObserver, Subject,
};
