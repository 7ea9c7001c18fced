//! Command inputs for the work item handlers
//!
//! One struct per creation command; mutating commands take their few
//! arguments directly. Tenant and actor never appear here - they are
//! threaded explicitly as [`Actor`](crate::Actor) parameters.

use crate::status::{ChangeType, Priority, RiskLevel};
use serde::{Deserialize, Serialize};

/// Input for creating a generic request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    /// Title; at least three characters
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Initial priority
    pub priority: Priority,
}

/// Input for creating a project request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    /// Title; at least three characters
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Initial priority
    pub priority: Priority,
}

/// Input for creating a project directly (not via conversion)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Name; at least three characters
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Initial priority
    pub priority: Priority,
}

/// Input for creating a change request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChangeRequest {
    /// Title; at least three characters
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Initial priority
    pub priority: Priority,
    /// Risk assessment
    pub risk_level: RiskLevel,
    /// Change classification
    pub change_type: ChangeType,
    /// Expected impact
    pub impact_assessment: String,
    /// How to undo the change
    pub rollback_plan: String,
    /// Systems this change touches
    pub affected_systems: Vec<String>,
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Title; at least three characters
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Initial priority
    pub priority: Priority,
    /// Estimated effort in hours, if known
    pub estimated_hours: Option<f32>,
}
