//! Read-model shapes returned by the engine's query operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::complaint::ComplaintStatus;
use crate::user::{Role, User};

/// Result of the eligible-staff query: candidates cleared by the conflict
/// detector, plus the names it excluded so auditors can see who was pruned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibleStaff {
    pub eligible: Vec<User>,
    pub excluded_names: Vec<String>,
}

/// Outcome of a verification check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyDecision {
    pub allowed: bool,
    pub reason: String,
    /// Next authority in the hierarchy when the actor is disqualified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalate_to: Option<Role>,
}

/// Support tally after a vote toggle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SupportTally {
    pub support_count: u32,
    pub user_supported: bool,
}

/// Per-staff workload summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffPerformance {
    pub staff_id: Uuid,
    pub staff_name: String,
    pub total_complaints: u32,
    pub resolved_complaints: u32,
    pub pending_complaints: u32,
    /// Percentage, two decimal places.
    pub resolution_rate: f64,
}

/// System-wide complaint totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overview {
    pub total_complaints: u32,
    pub resolved_complaints: u32,
    pub pending_complaints: u32,
    /// Percentage, two decimal places.
    pub resolution_rate: f64,
    pub by_category: BTreeMap<String, u32>,
    pub by_status: BTreeMap<ComplaintStatus, u32>,
}
