//! Storage and collaborator ports.
//!
//! The engine is a pure decision layer: durable state lives behind these
//! traits, implemented by the persistence collaborator (or by the in-memory
//! store in `memory.rs` for tests and single-process callers).
//!
//! Isolation contract: every mutating service operation is one
//! read-modify-write cycle against a single complaint row. Timeline,
//! response and support appends are not commutative, so implementations
//! MUST provide per-row transactional isolation (row lock or
//! optimistic-concurrency retry); a naive read-then-write loses updates
//! under concurrent callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use campus_voice_types::{Complaint, OperationalRole, User};

use crate::error::EngineError;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Durable complaint storage.
#[async_trait]
pub trait ComplaintStore: Send + Sync {
    /// Fetch a complaint; None when absent.
    async fn fetch(&self, id: Uuid) -> Result<Option<Complaint>>;

    /// Insert a newly created complaint.
    async fn insert(&self, complaint: &Complaint) -> Result<()>;

    /// Write back a modified complaint (see isolation contract above).
    async fn save(&self, complaint: &Complaint) -> Result<()>;

    /// Remove a complaint.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// All complaints, newest first.
    async fn list_all(&self) -> Result<Vec<Complaint>>;

    /// Complaints filed by a student, newest first.
    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Complaint>>;

    /// Complaints assigned to a user, newest first.
    async fn list_by_assignee(&self, user_id: Uuid) -> Result<Vec<Complaint>>;

    /// Count of complaints assigned to a user whose status is not Resolved
    /// or Rejected. A live aggregate — may be stale under concurrent
    /// assignment, which the load balancer tolerates.
    async fn active_load(&self, user_id: Uuid) -> Result<u32>;

    /// Complaints filed by a student since a cutoff (duplicate window).
    async fn recent_by_student(
        &self,
        student_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Complaint>>;
}

/// Read-only view of the user registry.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Option<User>>;

    /// HOD users of a department.
    async fn hods_in_department(&self, department: &str) -> Result<Vec<User>>;

    /// Staff users carrying an operational role.
    async fn staff_with_role(&self, role: OperationalRole) -> Result<Vec<User>>;

    /// Staff users of a department.
    async fn staff_in_department(&self, department: &str) -> Result<Vec<User>>;

    /// All staff users.
    async fn all_staff(&self) -> Result<Vec<User>>;
}

/// External text-analysis collaborator supplying a fallback category when
/// intake omits one. Best-effort: the engine treats any failure as None.
#[async_trait]
pub trait CategoryClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Option<String>>;
}

/// Classifier used when no external collaborator is wired.
pub struct NullClassifier;

#[async_trait]
impl CategoryClassifier for NullClassifier {
    async fn classify(&self, _text: &str) -> Result<Option<String>> {
        Ok(None)
    }
}
