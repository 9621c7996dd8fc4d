//! GrievanceService — the central domain service.
//!
//! Every operation takes the acting user explicitly — no implicit identity,
//! no thread-local context. Storage is reached only through the port traits,
//! so the same logic works against a database or the in-memory test double.
//!
//! Mutating operations are all-or-nothing: every guard runs before the
//! loaded complaint is touched, so a rejection writes nothing and appends
//! no timeline entry.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use campus_voice_types::{
    Complaint, ComplaintIntake, ComplaintStatus, EligibleStaff, Overview, Role, StaffPerformance,
    SupportTally, User, VerifyDecision,
};

use crate::assignment::AssignmentEngine;
use crate::conflict;
use crate::error::EngineError;
use crate::ports::{CategoryClassifier, ComplaintStore, Result, UserDirectory};
use crate::routing::RoutingConfig;

/// Window within which a same-student complaint with matching text is
/// treated as a duplicate.
const DUPLICATE_WINDOW_DAYS: i64 = 30;

/// Category used when intake omits one and the classifier has no opinion.
const FALLBACK_CATEGORY: &str = "Academic Issues";

pub struct GrievanceService {
    config: Arc<RoutingConfig>,
    complaints: Arc<dyn ComplaintStore>,
    users: Arc<dyn UserDirectory>,
    classifier: Arc<dyn CategoryClassifier>,
    assignment: AssignmentEngine,
}

impl GrievanceService {
    pub fn new(
        config: Arc<RoutingConfig>,
        complaints: Arc<dyn ComplaintStore>,
        users: Arc<dyn UserDirectory>,
        classifier: Arc<dyn CategoryClassifier>,
    ) -> Self {
        let assignment =
            AssignmentEngine::new(config.clone(), users.clone(), complaints.clone());
        Self {
            config,
            complaints,
            users,
            classifier,
            assignment,
        }
    }

    async fn load_complaint(&self, id: Uuid) -> Result<Complaint> {
        self.complaints
            .fetch(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("complaint {id}")))
    }

    // ── Intake ───────────────────────────────────────────────────

    /// File a new complaint. Auto-assignment runs once, best-effort: the
    /// complaint is created even when nobody could be routed.
    pub async fn create_complaint(
        &self,
        intake: ComplaintIntake,
        actor: &User,
    ) -> Result<Complaint> {
        if actor.role != Role::Student {
            return Err(EngineError::PermissionDenied(
                "only students may file complaints".into(),
            ));
        }

        self.check_duplicate(&intake, actor.id).await?;

        let category = self.resolve_category(&intake).await;
        let mut complaint = Complaint::new(
            intake,
            category,
            actor.id,
            Some(actor.name.clone()),
            actor.department.clone(),
        );
        self.complaints.insert(&complaint).await?;
        info!(complaint_id = %complaint.id, category = %complaint.category, "complaint created");

        if let Some(decision) = self.assignment.assign_for(&complaint).await {
            complaint.record_assignment(decision.user_id, decision.user_name, true, None);
            self.complaints.save(&complaint).await?;
            info!(
                complaint_id = %complaint.id,
                handler = complaint.assigned_to_name.as_deref().unwrap_or(""),
                "complaint auto-assigned"
            );
        } else {
            debug!(complaint_id = %complaint.id, "complaint left unassigned");
        }

        Ok(complaint)
    }

    /// Reject re-submission of near-identical text by the same student
    /// within the duplicate window.
    async fn check_duplicate(&self, intake: &ComplaintIntake, student_id: Uuid) -> Result<()> {
        let since = Utc::now() - Duration::days(DUPLICATE_WINDOW_DAYS);
        let recent = self.complaints.recent_by_student(student_id, since).await?;

        let title = intake.title.to_lowercase();
        let description = intake.description.to_lowercase();
        for existing in recent {
            let other_title = existing.title.to_lowercase();
            let other_desc = existing.description.to_lowercase();
            // Both fields must overlap to call it a duplicate.
            let title_match =
                other_title.contains(&title) || title.contains(&other_title);
            let desc_match =
                other_desc.contains(&description) || description.contains(&other_desc);
            if title_match && desc_match {
                warn!(existing_id = %existing.id, "duplicate complaint rejected");
                return Err(EngineError::ValidationFailed(format!(
                    "similar complaint already exists: {}",
                    existing.id
                )));
            }
        }
        Ok(())
    }

    /// Intake category wins; otherwise ask the external classifier, falling
    /// back to the default when it fails or abstains.
    async fn resolve_category(&self, intake: &ComplaintIntake) -> String {
        if let Some(category) = intake.category.as_deref() {
            let category = category.trim();
            if !category.is_empty() {
                return category.to_string();
            }
        }

        let text = format!("{}. {}", intake.title, intake.description);
        match self.classifier.classify(&text).await {
            Ok(Some(category)) => category,
            Ok(None) => FALLBACK_CATEGORY.to_string(),
            Err(e) => {
                warn!(error = %e, "category classification failed");
                FALLBACK_CATEGORY.to_string()
            }
        }
    }

    // ── Assignment ───────────────────────────────────────────────

    /// Manually assign or reassign a complaint. Forces `InProgress`.
    pub async fn assign_complaint(
        &self,
        complaint_id: Uuid,
        target_user_id: Uuid,
        actor: &User,
    ) -> Result<Complaint> {
        if actor.role == Role::Student {
            return Err(EngineError::PermissionDenied(
                "students cannot assign complaints".into(),
            ));
        }

        let mut complaint = self.load_complaint(complaint_id).await?;
        let target = self
            .users
            .fetch(target_user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {target_user_id}")))?;

        if self.config.hod_categories.contains(&complaint.category) {
            self.check_hod_assignment(&complaint, &target, actor)?;
        }

        if conflict::is_mentioned(&target.name, &complaint.title, &complaint.description) {
            return Err(EngineError::ConflictOfInterest {
                reason: format!(
                    "{} is mentioned in this complaint and cannot handle it",
                    target.name
                ),
                escalate_to: None,
            });
        }

        complaint.record_assignment(target.id, target.name, false, Some(actor.name.clone()));
        self.complaints.save(&complaint).await?;
        info!(
            complaint_id = %complaint.id,
            handler = complaint.assigned_to_name.as_deref().unwrap_or(""),
            assigned_by = %actor.name,
            "complaint assigned"
        );
        Ok(complaint)
    }

    /// Guards for HOD-authority categories: only the matching department's
    /// HOD may assign, only inside the department, and only to the
    /// front-line academic role.
    fn check_hod_assignment(
        &self,
        complaint: &Complaint,
        target: &User,
        actor: &User,
    ) -> Result<()> {
        let department = complaint.student_department.as_deref();

        if actor.role != Role::Hod {
            return Err(EngineError::PermissionDenied(format!(
                "only the department HOD may assign {} complaints",
                complaint.category
            )));
        }
        if department.is_none() || actor.department.as_deref() != department {
            return Err(EngineError::PermissionDenied(
                "you may only assign complaints from your own department".into(),
            ));
        }
        if target.department.as_deref() != department {
            return Err(EngineError::ValidationFailed(format!(
                "{} is not in the student's department",
                target.name
            )));
        }
        if target.operational_role != Some(self.config.front_line_role) {
            return Err(EngineError::ValidationFailed(format!(
                "departmental complaints can only be assigned to {} staff",
                self.config.front_line_role
            )));
        }
        Ok(())
    }

    /// Staff who may be handed this complaint, with conflict-of-interest
    /// exclusions surfaced for auditors. Read-only and idempotent.
    pub async fn get_eligible_staff(
        &self,
        complaint_id: Uuid,
        actor: &User,
    ) -> Result<EligibleStaff> {
        let complaint = self.load_complaint(complaint_id).await?;

        let pool = if self.config.hod_categories.contains(&complaint.category) {
            let department = complaint
                .student_department
                .as_deref()
                .ok_or_else(|| {
                    EngineError::ValidationFailed(
                        "complaint has no student department".into(),
                    )
                })?;
            if actor.role != Role::Hod || actor.department.as_deref() != Some(department) {
                return Err(EngineError::PermissionDenied(format!(
                    "only the {department} HOD may list handlers for this complaint"
                )));
            }
            self.users.staff_in_department(department).await?
        } else {
            self.users.all_staff().await?
        };

        let (mut eligible, excluded) = conflict::filter_eligible(&complaint, pool);
        eligible.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        let mut excluded_names: Vec<String> = excluded.into_iter().map(|u| u.name).collect();
        excluded_names.sort();

        Ok(EligibleStaff {
            eligible,
            excluded_names,
        })
    }

    // ── Status & verification ────────────────────────────────────

    /// Move a complaint to a new status. Admin, Staff and Principal only —
    /// HODs are limited to viewing and assigning within their department.
    /// Adjudicating moves (Reviewed/Resolved/Rejected) run the
    /// conflict-of-interest gate first.
    pub async fn set_status(
        &self,
        complaint_id: Uuid,
        new_status: ComplaintStatus,
        remarks: &str,
        actor: &User,
    ) -> Result<Complaint> {
        match actor.role {
            Role::Admin | Role::Staff | Role::Principal => {}
            Role::Hod => {
                return Err(EngineError::PermissionDenied(
                    "HODs may only view and assign complaints within their department".into(),
                ))
            }
            Role::Student => {
                return Err(EngineError::PermissionDenied(
                    "students cannot change complaint status".into(),
                ))
            }
        }

        let mut complaint = self.load_complaint(complaint_id).await?;

        let adjudicating = matches!(
            new_status,
            ComplaintStatus::Reviewed | ComplaintStatus::Resolved | ComplaintStatus::Rejected
        );
        if adjudicating {
            let (allowed, reason) = conflict::can_verify(
                &actor.name,
                actor.role,
                &complaint.title,
                &complaint.description,
            );
            if !allowed {
                return Err(EngineError::ConflictOfInterest {
                    reason,
                    escalate_to: self.config.escalate(actor.role),
                });
            }
        }

        let note = if remarks.trim().is_empty() {
            format!("Status updated to {new_status}")
        } else {
            remarks.to_string()
        };
        complaint.record_status(new_status, note, Some(actor.name.clone()));
        self.complaints.save(&complaint).await?;
        info!(
            complaint_id = %complaint.id,
            status = %new_status,
            updated_by = %actor.name,
            "status updated"
        );
        Ok(complaint)
    }

    /// May this actor verify/approve the complaint? Surfaces the next
    /// escalation authority when they are disqualified.
    pub fn can_verify(&self, actor: &User, complaint: &Complaint) -> VerifyDecision {
        let (allowed, reason) = conflict::can_verify(
            &actor.name,
            actor.role,
            &complaint.title,
            &complaint.description,
        );
        VerifyDecision {
            allowed,
            reason,
            escalate_to: if allowed {
                None
            } else {
                self.config.escalate(actor.role)
            },
        }
    }

    // ── Deletion ─────────────────────────────────────────────────

    /// Delete ("complete") a complaint. Admin: unconditional. Staff: only
    /// their own resolved assignments. Requires explicit confirmation.
    pub async fn delete_complaint(
        &self,
        complaint_id: Uuid,
        actor: &User,
        confirm: bool,
    ) -> Result<()> {
        let complaint = self.load_complaint(complaint_id).await?;

        if !confirm {
            return Err(EngineError::ValidationFailed(
                "confirmation required: pass confirm=true to delete".into(),
            ));
        }

        match actor.role {
            Role::Admin => {}
            Role::Staff => {
                if complaint.assigned_to != Some(actor.id) {
                    return Err(EngineError::PermissionDenied(
                        "you can only complete complaints assigned to you".into(),
                    ));
                }
                if complaint.status != ComplaintStatus::Resolved {
                    return Err(EngineError::ValidationFailed(
                        "complaint must be resolved before completing".into(),
                    ));
                }
            }
            _ => {
                return Err(EngineError::PermissionDenied(
                    "you do not have permission to delete complaints".into(),
                ))
            }
        }

        self.complaints.delete(complaint.id).await?;
        info!(complaint_id = %complaint.id, deleted_by = %actor.name, "complaint deleted");
        Ok(())
    }

    // ── Responses & support ──────────────────────────────────────

    /// Append a response to the complaint thread.
    pub async fn add_response(
        &self,
        complaint_id: Uuid,
        text: &str,
        actor: &User,
    ) -> Result<Complaint> {
        if actor.role == Role::Student {
            return Err(EngineError::PermissionDenied(
                "students cannot respond to complaints".into(),
            ));
        }
        let mut complaint = self.load_complaint(complaint_id).await?;
        complaint.add_response(text, actor.name.clone(), actor.role);
        self.complaints.save(&complaint).await?;
        Ok(complaint)
    }

    /// Toggle the acting student's support vote.
    pub async fn toggle_support(
        &self,
        complaint_id: Uuid,
        actor: &User,
    ) -> Result<SupportTally> {
        if actor.role != Role::Student {
            return Err(EngineError::PermissionDenied(
                "only students may support complaints".into(),
            ));
        }
        let mut complaint = self.load_complaint(complaint_id).await?;
        let user_supported = complaint.toggle_support(actor.id);
        self.complaints.save(&complaint).await?;
        Ok(SupportTally {
            support_count: complaint.support_count,
            user_supported,
        })
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Role-scoped listing: students see their own, staff see their
    /// assignments, everyone above sees everything.
    pub async fn list_complaints(&self, actor: &User) -> Result<Vec<Complaint>> {
        match actor.role {
            Role::Student => self.complaints.list_by_student(actor.id).await,
            Role::Staff => self.complaints.list_by_assignee(actor.id).await,
            Role::Hod | Role::Principal | Role::Admin => self.complaints.list_all().await,
        }
    }

    fn require_oversight(actor: &User) -> Result<()> {
        match actor.role {
            Role::Admin | Role::Principal | Role::Hod => Ok(()),
            _ => Err(EngineError::PermissionDenied(
                "insufficient privileges for analytics".into(),
            )),
        }
    }

    /// Per-staff workload summary.
    pub async fn staff_performance(&self, actor: &User) -> Result<Vec<StaffPerformance>> {
        Self::require_oversight(actor)?;

        let mut report = Vec::new();
        for staff in self.users.all_staff().await? {
            let assigned = self.complaints.list_by_assignee(staff.id).await?;
            let total = assigned.len() as u32;
            let resolved = assigned
                .iter()
                .filter(|c| c.status == ComplaintStatus::Resolved)
                .count() as u32;
            report.push(StaffPerformance {
                staff_id: staff.id,
                staff_name: staff.name,
                total_complaints: total,
                resolved_complaints: resolved,
                pending_complaints: total - resolved,
                resolution_rate: percentage(resolved, total),
            });
        }
        report.sort_by(|a, b| a.staff_name.cmp(&b.staff_name));
        Ok(report)
    }

    /// System-wide totals and breakdowns.
    pub async fn overview(&self, actor: &User) -> Result<Overview> {
        Self::require_oversight(actor)?;

        let complaints = self.complaints.list_all().await?;
        let total = complaints.len() as u32;
        let resolved = complaints
            .iter()
            .filter(|c| c.status == ComplaintStatus::Resolved)
            .count() as u32;
        let pending = complaints.iter().filter(|c| c.status.is_open()).count() as u32;

        let mut by_category = std::collections::BTreeMap::new();
        let mut by_status = std::collections::BTreeMap::new();
        for c in &complaints {
            *by_category.entry(c.category.clone()).or_insert(0u32) += 1;
            *by_status.entry(c.status).or_insert(0u32) += 1;
        }

        Ok(Overview {
            total_complaints: total,
            resolved_complaints: resolved,
            pending_complaints: pending,
            resolution_rate: percentage(resolved, total),
            by_category,
            by_status,
        })
    }
}

fn percentage(part: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        (f64::from(part) / f64::from(total) * 100.0 * 100.0).round() / 100.0
    }
}
