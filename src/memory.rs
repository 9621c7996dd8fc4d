//! In-memory store.
//!
//! Implements both ports over mutex-guarded maps. All access serializes
//! through one lock per map, which satisfies the per-row isolation contract
//! for tests and single-process callers; production deployments put a real
//! database behind the same traits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use campus_voice_types::{Complaint, OperationalRole, Role, User};

use crate::ports::{ComplaintStore, Result, UserDirectory};

fn newest_first(mut items: Vec<Complaint>) -> Vec<Complaint> {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items
}

#[derive(Default)]
pub struct MemoryStore {
    complaints: Mutex<HashMap<Uuid, Complaint>>,
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user in the directory. Returns the id for convenience.
    pub async fn add_user(&self, user: User) -> Uuid {
        let id = user.id;
        self.users.lock().await.insert(id, user);
        id
    }
}

#[async_trait]
impl ComplaintStore for MemoryStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<Complaint>> {
        Ok(self.complaints.lock().await.get(&id).cloned())
    }

    async fn insert(&self, complaint: &Complaint) -> Result<()> {
        self.complaints
            .lock()
            .await
            .insert(complaint.id, complaint.clone());
        Ok(())
    }

    async fn save(&self, complaint: &Complaint) -> Result<()> {
        self.complaints
            .lock()
            .await
            .insert(complaint.id, complaint.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.complaints.lock().await.remove(&id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Complaint>> {
        let items: Vec<_> = self.complaints.lock().await.values().cloned().collect();
        Ok(newest_first(items))
    }

    async fn list_by_student(&self, student_id: Uuid) -> Result<Vec<Complaint>> {
        let items: Vec<_> = self
            .complaints
            .lock()
            .await
            .values()
            .filter(|c| c.student_id == student_id)
            .cloned()
            .collect();
        Ok(newest_first(items))
    }

    async fn list_by_assignee(&self, user_id: Uuid) -> Result<Vec<Complaint>> {
        let items: Vec<_> = self
            .complaints
            .lock()
            .await
            .values()
            .filter(|c| c.assigned_to == Some(user_id))
            .cloned()
            .collect();
        Ok(newest_first(items))
    }

    async fn active_load(&self, user_id: Uuid) -> Result<u32> {
        Ok(self
            .complaints
            .lock()
            .await
            .values()
            .filter(|c| c.assigned_to == Some(user_id) && c.status.is_open())
            .count() as u32)
    }

    async fn recent_by_student(
        &self,
        student_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Complaint>> {
        let items: Vec<_> = self
            .complaints
            .lock()
            .await
            .values()
            .filter(|c| c.student_id == student_id && c.created_at >= since)
            .cloned()
            .collect();
        Ok(newest_first(items))
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn hods_in_department(&self, department: &str) -> Result<Vec<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .filter(|u| u.role == Role::Hod && u.department.as_deref() == Some(department))
            .cloned()
            .collect())
    }

    async fn staff_with_role(&self, role: OperationalRole) -> Result<Vec<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .filter(|u| u.role == Role::Staff && u.operational_role == Some(role))
            .cloned()
            .collect())
    }

    async fn staff_in_department(&self, department: &str) -> Result<Vec<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .filter(|u| u.role == Role::Staff && u.department.as_deref() == Some(department))
            .cloned()
            .collect())
    }

    async fn all_staff(&self) -> Result<Vec<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .filter(|u| u.role == Role::Staff)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_voice_types::{ComplaintIntake, ComplaintStatus};

    fn complaint_for(student_id: Uuid) -> Complaint {
        Complaint::new(
            ComplaintIntake {
                title: "t".into(),
                description: "d".into(),
                category: None,
                is_anonymous: false,
                voice_text: None,
            },
            "Hostel".into(),
            student_id,
            Some("s".into()),
            Some("CS".into()),
        )
    }

    #[tokio::test]
    async fn insert_fetch_delete_round_trip() {
        let store = MemoryStore::new();
        let c = complaint_for(Uuid::new_v4());
        store.insert(&c).await.unwrap();
        assert!(ComplaintStore::fetch(&store, c.id).await.unwrap().is_some());
        store.delete(c.id).await.unwrap();
        assert!(ComplaintStore::fetch(&store, c.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn active_load_counts_only_open_complaints() {
        let store = MemoryStore::new();
        let staff = Uuid::new_v4();

        let mut a = complaint_for(Uuid::new_v4());
        a.record_assignment(staff, "Ravi", false, None);
        store.insert(&a).await.unwrap();

        let mut b = complaint_for(Uuid::new_v4());
        b.record_assignment(staff, "Ravi", false, None);
        b.record_status(ComplaintStatus::Resolved, "done", None);
        store.insert(&b).await.unwrap();

        let mut c = complaint_for(Uuid::new_v4());
        c.record_assignment(staff, "Ravi", false, None);
        c.record_status(ComplaintStatus::Rejected, "invalid", None);
        store.insert(&c).await.unwrap();

        assert_eq!(store.active_load(staff).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn directory_filters_by_role_and_department() {
        let store = MemoryStore::new();
        store
            .add_user(
                User::new("Dr. Mohan", "mohan@campus.edu", Role::Hod).with_department("CS"),
            )
            .await;
        store
            .add_user(
                User::new("Ravi", "ravi@campus.edu", Role::Staff)
                    .with_department("CS")
                    .with_operational_role(OperationalRole::Warden),
            )
            .await;
        store
            .add_user(
                User::new("Meena", "meena@campus.edu", Role::Staff)
                    .with_department("EE")
                    .with_operational_role(OperationalRole::Warden),
            )
            .await;

        assert_eq!(store.hods_in_department("CS").await.unwrap().len(), 1);
        assert_eq!(store.hods_in_department("EE").await.unwrap().len(), 0);
        assert_eq!(
            store
                .staff_with_role(OperationalRole::Warden)
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(store.staff_in_department("CS").await.unwrap().len(), 1);
        assert_eq!(store.all_staff().await.unwrap().len(), 2);
    }
}
