//! User and role types.
//!
//! Campus registry numbers are tagged by kind ([`CampusId`]) so a user
//! record can never carry the wrong sort of identifier for its role.

// Several enums intentionally use `from_str() -> Option<Self>` instead of
// `FromStr` because they return None for unknown values rather than an error.
#![allow(clippy::should_implement_trait)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actor role in the grievance system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Staff,
    Hod,
    Principal,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Staff => "staff",
            Self::Hod => "hod",
            Self::Principal => "principal",
            Self::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Self::Student),
            "staff" => Some(Self::Staff),
            "hod" => Some(Self::Hod),
            "principal" => Some(Self::Principal),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fine-grained operational tag carried only by Staff users. Categories are
/// routed to one of these; the front-line academic role is the only one a
/// HOD may hand departmental complaints to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalRole {
    ClassAdvisor,
    Warden,
    Librarian,
    ExamCellCoordinator,
    TransportIncharge,
}

impl OperationalRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClassAdvisor => "class_advisor",
            Self::Warden => "warden",
            Self::Librarian => "librarian",
            Self::ExamCellCoordinator => "exam_cell_coordinator",
            Self::TransportIncharge => "transport_incharge",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "class_advisor" => Some(Self::ClassAdvisor),
            "warden" => Some(Self::Warden),
            "librarian" => Some(Self::Librarian),
            "exam_cell_coordinator" => Some(Self::ExamCellCoordinator),
            "transport_incharge" => Some(Self::TransportIncharge),
            _ => None,
        }
    }
}

impl std::fmt::Display for OperationalRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Campus registry identifier, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum CampusId {
    Student(String),
    Staff(String),
}

impl CampusId {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Student(id) | Self::Staff(id) => id,
        }
    }
}

/// A user record as read from the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
    /// Only meaningful for Staff users.
    #[serde(default)]
    pub operational_role: Option<OperationalRole>,
    #[serde(default)]
    pub campus_id: Option<CampusId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: name.into(),
            role,
            department: None,
            operational_role: None,
            campus_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_operational_role(mut self, operational_role: OperationalRole) -> Self {
        self.operational_role = Some(operational_role);
        self
    }

    pub fn with_campus_id(mut self, campus_id: CampusId) -> Self {
        self.campus_id = Some(campus_id);
        self
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }
}
