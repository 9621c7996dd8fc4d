//! Conflict-of-interest detection.
//!
//! Stateless text matching: a person is in conflict with a complaint when
//! their name appears in its title or description. Used to prune
//! auto-assignment candidates, to build the eligible-staff view, and to
//! block a mentioned approver from adjudicating.

use campus_voice_types::{Complaint, Role, User};
use regex::Regex;

/// Name tokens this short ("Dr", "Jr", initials) are skipped for whole-word
/// matching to avoid false positives.
const MIN_TOKEN_CHARS: usize = 3;

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// True when the person's name is mentioned in the complaint text.
///
/// The full normalized name matches as a substring; individual name tokens
/// of at least three characters match as case-insensitive whole words, so
/// "John" does not fire on "Johnson".
pub fn is_mentioned(person_name: &str, title: &str, description: &str) -> bool {
    let name = normalize_name(person_name);
    if name.is_empty() {
        return false;
    }

    let text = format!("{title} {description}").to_lowercase();
    // The substring check is gated by the same minimum length, otherwise a
    // two-letter name like "Al" would fire inside "Alfred".
    if name.chars().count() >= MIN_TOKEN_CHARS && text.contains(&name) {
        return true;
    }

    for token in name.split_whitespace() {
        if token.chars().count() < MIN_TOKEN_CHARS {
            continue;
        }
        let pattern = format!(r"\b{}\b", regex::escape(token));
        if let Ok(re) = Regex::new(&pattern) {
            if re.is_match(&text) {
                return true;
            }
        }
    }

    false
}

/// Partition candidates into (eligible, excluded) against the complaint's
/// text. `excluded` is kept for auditor visibility, not discarded.
pub fn filter_eligible(complaint: &Complaint, candidates: Vec<User>) -> (Vec<User>, Vec<User>) {
    candidates
        .into_iter()
        .partition(|u| !is_mentioned(&u.name, &complaint.title, &complaint.description))
}

/// May this actor verify/approve the complaint?
///
/// Mentioned HODs are blocked with escalation wording; mentioned Staff and
/// Principals get a flat denial. Everyone else — including a mentioned
/// Admin — passes.
pub fn can_verify(
    actor_name: &str,
    actor_role: Role,
    title: &str,
    description: &str,
) -> (bool, String) {
    if is_mentioned(actor_name, title, description) {
        match actor_role {
            Role::Hod => {
                return (
                    false,
                    format!(
                        "You cannot verify this complaint as you ({actor_name}) are mentioned \
                         in it. This complaint will be escalated to a higher authority for review."
                    ),
                );
            }
            Role::Staff | Role::Principal => {
                return (
                    false,
                    format!(
                        "You cannot handle this complaint as you ({actor_name}) are mentioned in it."
                    ),
                );
            }
            Role::Admin | Role::Student => {}
        }
    }
    (true, String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_voice_types::{ComplaintIntake, ComplaintStatus};
    use uuid::Uuid;

    fn complaint(title: &str, description: &str) -> Complaint {
        Complaint::new(
            ComplaintIntake {
                title: title.into(),
                description: description.into(),
                category: None,
                is_anonymous: false,
                voice_text: None,
            },
            "Hostel".into(),
            Uuid::new_v4(),
            Some("Asha".into()),
            Some("CS".into()),
        )
    }

    fn staff(name: &str) -> User {
        User::new(name, format!("{}@campus.edu", name.to_lowercase()), Role::Staff)
    }

    #[test]
    fn full_name_substring_matches() {
        assert!(is_mentioned("Ann Lee", "Issue with Ann Lee", "nothing else"));
    }

    #[test]
    fn two_char_tokens_are_excluded() {
        assert!(!is_mentioned("Al", "Alfred's class", "chaos in Alfred's class"));
    }

    #[test]
    fn long_token_matches_as_whole_word() {
        assert!(is_mentioned("Dr. Rao", "title", "Professor Rao is unfair"));
    }

    #[test]
    fn token_does_not_match_inside_longer_word() {
        assert!(!is_mentioned("John Smith", "About Johnson", "Johnson was there"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(is_mentioned("ravi KUMAR", "RAVI did not respond", ""));
    }

    #[test]
    fn empty_name_never_matches() {
        assert!(!is_mentioned("", "anything", "at all"));
        assert!(!is_mentioned("   ", "anything", "at all"));
    }

    #[test]
    fn filter_partitions_and_keeps_excluded() {
        let c = complaint("Warden Ravi ignored us", "The hostel mess is bad");
        let pool = vec![staff("Ravi Kumar"), staff("Meena Pillai")];
        let (eligible, excluded) = filter_eligible(&c, pool);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].name, "Meena Pillai");
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].name, "Ravi Kumar");
    }

    #[test]
    fn filter_is_idempotent() {
        let c = complaint("Warden Ravi ignored us", "mess");
        let pool = vec![staff("Ravi Kumar"), staff("Meena Pillai")];
        let (e1, x1) = filter_eligible(&c, pool.clone());
        let (e2, x2) = filter_eligible(&c, pool);
        let names = |v: &[User]| v.iter().map(|u| u.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&e1), names(&e2));
        assert_eq!(names(&x1), names(&x2));
    }

    #[test]
    fn mentioned_hod_gets_escalation_wording() {
        let (ok, reason) = can_verify("Dr. Mohan", Role::Hod, "Mohan is biased", "");
        assert!(!ok);
        assert!(reason.contains("escalated to a higher authority"));
    }

    #[test]
    fn mentioned_staff_gets_flat_denial() {
        let (ok, reason) = can_verify("Ravi Kumar", Role::Staff, "Ravi shouted", "");
        assert!(!ok);
        assert!(reason.contains("cannot handle"));
        assert!(!reason.contains("escalated"));
    }

    #[test]
    fn mentioned_principal_gets_flat_denial() {
        let (ok, _) = can_verify("Suresh Iyer", Role::Principal, "", "Suresh ignored the issue");
        assert!(!ok);
    }

    #[test]
    fn unmentioned_actor_passes() {
        let (ok, reason) = can_verify("Meena Pillai", Role::Staff, "Ravi shouted", "at us");
        assert!(ok);
        assert!(reason.is_empty());
    }

    #[test]
    fn mentioned_admin_is_not_blocked() {
        let (ok, _) = can_verify("Admin Kumar", Role::Admin, "Kumar broke it", "");
        assert!(ok);
    }

    #[test]
    fn complaint_status_untouched_by_detection() {
        let c = complaint("Ravi", "Ravi");
        let _ = is_mentioned("Ravi", &c.title, &c.description);
        assert_eq!(c.status, ComplaintStatus::Submitted);
    }
}
