//! Auto-assignment engine.
//!
//! Routes a freshly created complaint to a handler: the student's
//! department HOD for HOD-authority categories, otherwise the least-loaded
//! staff member carrying the category's operational role. Strictly
//! best-effort — every internal failure is downgraded to `None` with a log
//! diagnostic, because assignment must never block complaint creation.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use campus_voice_types::{Complaint, User};

use crate::conflict;
use crate::error::EngineError;
use crate::ports::{ComplaintStore, Result, UserDirectory};
use crate::routing::{Authority, RoutingConfig};

/// Chosen handler for a complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDecision {
    pub user_id: Uuid,
    pub user_name: String,
}

pub struct AssignmentEngine {
    config: Arc<RoutingConfig>,
    users: Arc<dyn UserDirectory>,
    complaints: Arc<dyn ComplaintStore>,
}

impl AssignmentEngine {
    pub fn new(
        config: Arc<RoutingConfig>,
        users: Arc<dyn UserDirectory>,
        complaints: Arc<dyn ComplaintStore>,
    ) -> Self {
        Self {
            config,
            users,
            complaints,
        }
    }

    /// Pick a handler for the complaint, or `None` when nobody is routable.
    /// Never fails: storage errors and empty pools log and return `None`.
    pub async fn assign_for(&self, complaint: &Complaint) -> Option<AssignmentDecision> {
        match self.try_assign(complaint).await {
            Ok(decision) => Some(decision),
            Err(EngineError::AssignmentUnavailable(reason)) => {
                debug!(complaint_id = %complaint.id, %reason, "no auto-assignment");
                None
            }
            Err(e) => {
                warn!(complaint_id = %complaint.id, error = %e, "auto-assignment failed");
                None
            }
        }
    }

    async fn try_assign(&self, complaint: &Complaint) -> Result<AssignmentDecision> {
        match self.config.resolve(&complaint.category) {
            Authority::DepartmentHod => self.assign_department_hod(complaint).await,
            Authority::OperationalRole(role) => {
                let pool = self.users.staff_with_role(role).await?;
                self.assign_least_loaded(complaint, pool).await
            }
            Authority::Unmapped => Err(EngineError::AssignmentUnavailable(format!(
                "category {:?} has no routing target",
                complaint.category
            ))),
        }
    }

    async fn assign_department_hod(&self, complaint: &Complaint) -> Result<AssignmentDecision> {
        let department = match complaint.student_department.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => {
                return Err(EngineError::AssignmentUnavailable(
                    "complaint has no student department".into(),
                ))
            }
        };

        let pool = self.users.hods_in_department(department).await?;
        if pool.is_empty() {
            // Missing-coverage condition: a routable category with no HOD.
            warn!(%department, category = %complaint.category, "no HOD covers department");
            return Err(EngineError::AssignmentUnavailable(format!(
                "no HOD for department {department}"
            )));
        }

        let (eligible, _excluded) = conflict::filter_eligible(complaint, pool);
        // Departments with more than one HOD pick the lowest id so repeated
        // runs land on the same person.
        eligible
            .into_iter()
            .min_by_key(|u| u.id)
            .map(|u| AssignmentDecision {
                user_id: u.id,
                user_name: u.name,
            })
            .ok_or_else(|| {
                EngineError::AssignmentUnavailable(
                    "every department HOD is mentioned in the complaint".into(),
                )
            })
    }

    /// Least active load wins; ties break to the lowest id.
    async fn assign_least_loaded(
        &self,
        complaint: &Complaint,
        pool: Vec<User>,
    ) -> Result<AssignmentDecision> {
        if pool.is_empty() {
            return Err(EngineError::AssignmentUnavailable(format!(
                "no staff carry the role for category {:?}",
                complaint.category
            )));
        }

        let (eligible, _excluded) = conflict::filter_eligible(complaint, pool);
        if eligible.is_empty() {
            return Err(EngineError::AssignmentUnavailable(
                "every candidate is mentioned in the complaint".into(),
            ));
        }

        let mut scored = Vec::with_capacity(eligible.len());
        for candidate in eligible {
            let load = self.complaints.active_load(candidate.id).await?;
            scored.push((load, candidate));
        }

        // Ties on load break to the lowest id.
        let (load, user) = scored
            .into_iter()
            .min_by(|(la, ua), (lb, ub)| la.cmp(lb).then(ua.id.cmp(&ub.id)))
            .ok_or_else(|| {
                EngineError::AssignmentUnavailable("no eligible candidates".into())
            })?;
        debug!(handler = %user.name, %load, "least-loaded handler selected");
        Ok(AssignmentDecision {
            user_id: user.id,
            user_name: user.name,
        })
    }
}
