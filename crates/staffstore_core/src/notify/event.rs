//! Event catalogue.

use crate::model::employee::{EmployeeId, EmployeeRecord};
use serde::Serialize;

/// One externally visible repository occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum RepositoryEvent {
    #[serde(rename = "employees_loaded")]
    Loaded { count: usize },
    #[serde(rename = "employee_viewed")]
    Viewed {
        employee_id: EmployeeId,
        full_name: String,
    },
    #[serde(rename = "employee_added")]
    Added(EmployeeRecord),
    #[serde(rename = "employee_updated")]
    Updated {
        employee: EmployeeRecord,
        updated_fields: Vec<&'static str>,
    },
    #[serde(rename = "employee_deleted")]
    Deleted { employee_id: EmployeeId },
}

impl RepositoryEvent {
    /// Stable event name, identical to the serialized `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loaded { .. } => "employees_loaded",
            Self::Viewed { .. } => "employee_viewed",
            Self::Added(_) => "employee_added",
            Self::Updated { .. } => "employee_updated",
            Self::Deleted { .. } => "employee_deleted",
        }
    }

    /// The employee this event concerns, when it concerns exactly one.
    pub fn employee_id(&self) -> Option<EmployeeId> {
        match self {
            Self::Loaded { .. } => None,
            Self::Viewed { employee_id, .. } | Self::Deleted { employee_id } => Some(*employee_id),
            Self::Added(record) => Some(record.employee_id),
            Self::Updated { employee, .. } => Some(employee.employee_id),
        }
    }
}
