//! Routing configuration: category→authority resolution and the escalation
//! hierarchy.
//!
//! The tables are process-wide and read-only — constructed once at startup
//! (from YAML or the compiled-in default) and injected by reference into the
//! engine. They are configured, never generated.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use campus_voice_types::{OperationalRole, Role};

/// Who has authority over a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// The Head of Department matching the student's department.
    DepartmentHod,
    /// Staff carrying a specific operational role.
    OperationalRole(OperationalRole),
    /// No routing configured; auto-assignment is not possible.
    Unmapped,
}

/// Immutable routing tables.
///
/// `Default` carries the standard campus table; deployments with other
/// category sets load their own via [`RoutingConfig::from_yaml`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Category → operational role of the staff who handle it.
    pub category_roles: BTreeMap<String, OperationalRole>,
    /// Categories whose handler must be the student's department HOD.
    pub hod_categories: BTreeSet<String>,
    /// Escalation hierarchy consulted when an approver is disqualified.
    pub escalation: BTreeMap<Role, Role>,
    /// The one operational role a HOD may hand departmental complaints to.
    pub front_line_role: OperationalRole,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            category_roles: BTreeMap::from([
                ("Hostel".to_string(), OperationalRole::Warden),
                ("Library".to_string(), OperationalRole::Librarian),
                (
                    "Exam Cell".to_string(),
                    OperationalRole::ExamCellCoordinator,
                ),
                (
                    "Transport".to_string(),
                    OperationalRole::TransportIncharge,
                ),
            ]),
            hod_categories: BTreeSet::from([
                "Staff Behavior".to_string(),
                "Academic Issues".to_string(),
            ]),
            escalation: BTreeMap::from([
                (Role::Hod, Role::Principal),
                (Role::Principal, Role::Admin),
                (Role::Staff, Role::Hod),
            ]),
            front_line_role: OperationalRole::ClassAdvisor,
        }
    }
}

impl RoutingConfig {
    /// Load routing tables from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Resolve a category to its authority. Total — an unknown category is
    /// `Unmapped`, which callers treat as "no auto-assignment possible",
    /// never as an error.
    pub fn resolve(&self, category: &str) -> Authority {
        if self.hod_categories.contains(category) {
            return Authority::DepartmentHod;
        }
        match self.category_roles.get(category) {
            Some(role) => Authority::OperationalRole(*role),
            None => Authority::Unmapped,
        }
    }

    /// Next authority in the hierarchy for a disqualified approver. `None`
    /// for Admin and for roles outside the map (Student) — no further
    /// escalation available, not an error.
    pub fn escalate(&self, blocked_role: Role) -> Option<Role> {
        self.escalation.get(&blocked_role).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_routes_operational_categories() {
        let cfg = RoutingConfig::default();
        assert_eq!(
            cfg.resolve("Hostel"),
            Authority::OperationalRole(OperationalRole::Warden)
        );
        assert_eq!(
            cfg.resolve("Library"),
            Authority::OperationalRole(OperationalRole::Librarian)
        );
        assert_eq!(
            cfg.resolve("Exam Cell"),
            Authority::OperationalRole(OperationalRole::ExamCellCoordinator)
        );
        assert_eq!(
            cfg.resolve("Transport"),
            Authority::OperationalRole(OperationalRole::TransportIncharge)
        );
    }

    #[test]
    fn hod_categories_win_over_role_table() {
        let cfg = RoutingConfig::default();
        assert_eq!(cfg.resolve("Staff Behavior"), Authority::DepartmentHod);
        assert_eq!(cfg.resolve("Academic Issues"), Authority::DepartmentHod);
    }

    #[test]
    fn unknown_category_is_unmapped_not_an_error() {
        let cfg = RoutingConfig::default();
        assert_eq!(cfg.resolve("Parking"), Authority::Unmapped);
        assert_eq!(cfg.resolve(""), Authority::Unmapped);
    }

    #[test]
    fn escalation_chain() {
        let cfg = RoutingConfig::default();
        assert_eq!(cfg.escalate(Role::Staff), Some(Role::Hod));
        assert_eq!(cfg.escalate(Role::Hod), Some(Role::Principal));
        assert_eq!(cfg.escalate(Role::Principal), Some(Role::Admin));
        assert_eq!(cfg.escalate(Role::Admin), None);
        assert_eq!(cfg.escalate(Role::Student), None);
    }

    #[test]
    fn loads_from_yaml() {
        let yaml = r#"
category_roles:
  Mess: warden
  Library: librarian
hod_categories:
  - Ragging
escalation:
  hod: principal
  principal: admin
front_line_role: class_advisor
"#;
        let cfg = RoutingConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            cfg.resolve("Mess"),
            Authority::OperationalRole(OperationalRole::Warden)
        );
        assert_eq!(cfg.resolve("Ragging"), Authority::DepartmentHod);
        assert_eq!(cfg.resolve("Hostel"), Authority::Unmapped);
        assert_eq!(cfg.escalate(Role::Staff), None);
        assert_eq!(cfg.front_line_role, OperationalRole::ClassAdvisor);
    }
}
