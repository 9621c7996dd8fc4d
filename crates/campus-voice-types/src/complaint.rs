//! Complaint state types.
//!
//! A complaint carries an append-only timeline (the audit trail) and an
//! append-only response thread. Mutators here only ever push entries —
//! nothing edits or removes history.

// `from_str() -> Option<Self>` instead of `FromStr` — unknown values are
// None rather than an error.
#![allow(clippy::should_implement_trait)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::Role;

/// Complaint lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Submitted,
    Reviewed,
    InProgress,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Reviewed => "reviewed",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(Self::Submitted),
            "reviewed" => Some(Self::Reviewed),
            "in_progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// A complaint still counts against its assignee's active load until it
    /// is resolved or rejected.
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Resolved | Self::Rejected)
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a timeline entry records: a status move, or a named assignment
/// action. Tagged so the two shapes stay distinct on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event", content = "status")]
pub enum TimelineEvent {
    Status(ComplaintStatus),
    AutoAssigned,
    Assigned,
    Reassigned,
}

/// One immutable audit-trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    #[serde(flatten)]
    pub event: TimelineEvent,
    pub timestamp: DateTime<Utc>,
    pub note: String,
    /// Display name of the human (or None for system) who caused the entry.
    #[serde(default)]
    pub actor: Option<String>,
}

/// One immutable entry in the response thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEntry {
    pub text: String,
    pub responder_name: String,
    pub responder_role: Role,
    pub timestamp: DateTime<Utc>,
}

/// Intake payload supplied by the transport collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintIntake {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    /// Transcription attached by the media collaborator, if any.
    #[serde(default)]
    pub voice_text: Option<String>,
}

/// A grievance filed by a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: ComplaintStatus,

    pub student_id: Uuid,
    /// None when the complaint was filed anonymously.
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_department: Option<String>,
    pub is_anonymous: bool,
    #[serde(default)]
    pub voice_text: Option<String>,

    #[serde(default)]
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub assigned_to_name: Option<String>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,

    /// Append-only audit trail, chronologically ordered.
    pub timeline: Vec<TimelineEntry>,
    /// Append-only response thread.
    pub responses: Vec<ResponseEntry>,

    pub supported_by: Vec<Uuid>,
    /// Derived; always equals `supported_by.len()`.
    pub support_count: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// Create a new complaint in `Submitted` with its opening timeline entry.
    pub fn new(
        intake: ComplaintIntake,
        category: String,
        student_id: Uuid,
        student_name: Option<String>,
        student_department: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: intake.title,
            description: intake.description,
            category,
            status: ComplaintStatus::Submitted,
            student_id,
            student_name: if intake.is_anonymous {
                None
            } else {
                student_name
            },
            student_department,
            is_anonymous: intake.is_anonymous,
            voice_text: intake.voice_text,
            assigned_to: None,
            assigned_to_name: None,
            assigned_at: None,
            timeline: vec![TimelineEntry {
                event: TimelineEvent::Status(ComplaintStatus::Submitted),
                timestamp: now,
                note: "Complaint submitted".to_string(),
                actor: None,
            }],
            responses: Vec::new(),
            supported_by: Vec::new(),
            support_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to a new status and append the matching timeline entry.
    pub fn record_status(
        &mut self,
        status: ComplaintStatus,
        note: impl Into<String>,
        actor: Option<String>,
    ) {
        let now = Utc::now();
        self.status = status;
        self.timeline.push(TimelineEntry {
            event: TimelineEvent::Status(status),
            timestamp: now,
            note: note.into(),
            actor,
        });
        self.updated_at = now;
    }

    /// Record a (re)assignment. Forces `InProgress` and stamps `assigned_at`;
    /// the timeline entry distinguishes auto, first, and repeat assignment.
    pub fn record_assignment(
        &mut self,
        user_id: Uuid,
        user_name: impl Into<String>,
        auto: bool,
        actor: Option<String>,
    ) {
        let now = Utc::now();
        let user_name = user_name.into();
        let (event, note) = if auto {
            (
                TimelineEvent::AutoAssigned,
                format!("Auto-assigned to {user_name}"),
            )
        } else if self.assigned_to.is_some() {
            (
                TimelineEvent::Reassigned,
                format!("Reassigned to {user_name}"),
            )
        } else {
            (TimelineEvent::Assigned, format!("Assigned to {user_name}"))
        };

        self.assigned_to = Some(user_id);
        self.assigned_to_name = Some(user_name);
        self.assigned_at = Some(now);
        self.status = ComplaintStatus::InProgress;
        self.timeline.push(TimelineEntry {
            event,
            timestamp: now,
            note,
            actor,
        });
        self.updated_at = now;
    }

    /// Append a response to the thread.
    pub fn add_response(
        &mut self,
        text: impl Into<String>,
        responder_name: impl Into<String>,
        responder_role: Role,
    ) {
        let now = Utc::now();
        self.responses.push(ResponseEntry {
            text: text.into(),
            responder_name: responder_name.into(),
            responder_role,
            timestamp: now,
        });
        self.updated_at = now;
    }

    /// Toggle a support vote. Returns true when the user now supports the
    /// complaint. Keeps `support_count` equal to `supported_by.len()`.
    pub fn toggle_support(&mut self, user_id: Uuid) -> bool {
        let supporting = if let Some(pos) = self.supported_by.iter().position(|u| *u == user_id) {
            self.supported_by.remove(pos);
            false
        } else {
            self.supported_by.push(user_id);
            true
        };
        self.support_count = self.supported_by.len() as u32;
        self.updated_at = Utc::now();
        supporting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake(title: &str, description: &str) -> ComplaintIntake {
        ComplaintIntake {
            title: title.into(),
            description: description.into(),
            category: None,
            is_anonymous: false,
            voice_text: None,
        }
    }

    fn sample() -> Complaint {
        Complaint::new(
            intake("Broken fan", "The fan in room 12 is broken"),
            "Hostel".into(),
            Uuid::new_v4(),
            Some("Asha".into()),
            Some("CS".into()),
        )
    }

    #[test]
    fn new_complaint_opens_submitted_with_timeline() {
        let c = sample();
        assert_eq!(c.status, ComplaintStatus::Submitted);
        assert_eq!(c.timeline.len(), 1);
        assert_eq!(
            c.timeline[0].event,
            TimelineEvent::Status(ComplaintStatus::Submitted)
        );
        assert!(c.assigned_to.is_none());
        assert!(c.assigned_at.is_none());
    }

    #[test]
    fn anonymous_intake_drops_student_name() {
        let mut i = intake("t", "d");
        i.is_anonymous = true;
        let c = Complaint::new(i, "Hostel".into(), Uuid::new_v4(), Some("Asha".into()), None);
        assert!(c.student_name.is_none());
        assert!(c.is_anonymous);
    }

    #[test]
    fn record_assignment_forces_in_progress() {
        let mut c = sample();
        let staff = Uuid::new_v4();
        c.record_assignment(staff, "Ravi", false, Some("Dr. Mohan".into()));
        assert_eq!(c.status, ComplaintStatus::InProgress);
        assert_eq!(c.assigned_to, Some(staff));
        assert!(c.assigned_at.is_some());
        assert_eq!(c.timeline.last().unwrap().event, TimelineEvent::Assigned);
        assert_eq!(c.timeline.last().unwrap().note, "Assigned to Ravi");
    }

    #[test]
    fn second_assignment_is_a_reassignment() {
        let mut c = sample();
        c.record_assignment(Uuid::new_v4(), "Ravi", false, None);
        c.record_assignment(Uuid::new_v4(), "Meena", false, None);
        assert_eq!(c.timeline.last().unwrap().event, TimelineEvent::Reassigned);
        assert_eq!(c.timeline.last().unwrap().note, "Reassigned to Meena");
        assert_eq!(c.assigned_to_name.as_deref(), Some("Meena"));
    }

    #[test]
    fn auto_assignment_notes_the_machine() {
        let mut c = sample();
        c.record_assignment(Uuid::new_v4(), "Ravi", true, None);
        assert_eq!(c.timeline.last().unwrap().event, TimelineEvent::AutoAssigned);
        assert_eq!(c.timeline.last().unwrap().note, "Auto-assigned to Ravi");
    }

    #[test]
    fn timeline_only_grows() {
        let mut c = sample();
        c.record_status(ComplaintStatus::Reviewed, "Looks genuine", Some("Admin".into()));
        c.record_assignment(Uuid::new_v4(), "Ravi", false, None);
        c.record_status(ComplaintStatus::Resolved, "Fan replaced", Some("Ravi".into()));
        assert_eq!(c.timeline.len(), 4);
        // Chronological order is preserved.
        for pair in c.timeline.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn support_toggle_keeps_count_in_sync() {
        let mut c = sample();
        let voter = Uuid::new_v4();
        assert!(c.toggle_support(voter));
        assert_eq!(c.support_count, 1);
        assert_eq!(c.supported_by.len(), 1);
        assert!(!c.toggle_support(voter));
        assert_eq!(c.support_count, 0);
        assert!(c.supported_by.is_empty());
    }

    #[test]
    fn status_is_open() {
        assert!(ComplaintStatus::Submitted.is_open());
        assert!(ComplaintStatus::Reviewed.is_open());
        assert!(ComplaintStatus::InProgress.is_open());
        assert!(!ComplaintStatus::Resolved.is_open());
        assert!(!ComplaintStatus::Rejected.is_open());
    }

    #[test]
    fn timeline_event_serde_shape() {
        let e = TimelineEvent::Status(ComplaintStatus::InProgress);
        let json = serde_json::to_value(e).unwrap();
        assert_eq!(json["event"], "status");
        assert_eq!(json["status"], "in_progress");

        let e = TimelineEvent::AutoAssigned;
        let json = serde_json::to_value(e).unwrap();
        assert_eq!(json["event"], "auto_assigned");
    }

    #[test]
    fn complaint_serde_round_trip() {
        let mut c = sample();
        c.record_assignment(Uuid::new_v4(), "Ravi", true, None);
        c.add_response("On it", "Ravi", Role::Staff);
        let json = serde_json::to_value(&c).unwrap();
        let back: Complaint = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(serde_json::to_value(&back).unwrap(), json);
    }
}
