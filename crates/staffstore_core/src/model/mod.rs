//! Employee domain model.
//!
//! # Responsibility
//! - Define the validated `Employee` value and its input/wire shapes.
//! - Keep every validation rule in one place, ahead of any persistence.
//!
//! # Invariants
//! - Every employee is identified by a repository-assigned positive id.
//! - Employee equality is passport-based only.

pub mod employee;
pub mod passport;
pub mod person;
pub mod update;
pub mod validation;
