use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, from_document, to_bson, to_document};
use std::sync::Arc;

use crate::database::manager::DatastoreError;
use crate::database::models::{Membership, Role};
use crate::database::store::{collections, DocumentStore};

/// Membership rows live in the `team` collection, one per (project, user)
/// pair. Absence of a row is the normal "no access" state, not an error.
#[derive(Clone)]
pub struct MembershipRepository {
    store: Arc<dyn DocumentStore>,
}

impl MembershipRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn role_of(
        &self,
        user_id: &str,
        project_id: &ObjectId,
    ) -> Result<Option<Role>, DatastoreError> {
        let document = self
            .store
            .find_one(
                collections::TEAM,
                doc! { "projectID": *project_id, "userID": user_id },
            )
            .await?;
        let membership: Option<Membership> = document.map(from_document).transpose()?;
        Ok(membership.map(|m| m.role))
    }

    pub async fn all_roles_of(&self, user_id: &str) -> Result<Vec<Membership>, DatastoreError> {
        let documents = self
            .store
            .find(collections::TEAM, doc! { "userID": user_id })
            .await?;
        documents
            .into_iter()
            .map(|d| from_document(d).map_err(Into::into))
            .collect()
    }

    pub async fn members_of(
        &self,
        project_id: &ObjectId,
    ) -> Result<Vec<Membership>, DatastoreError> {
        let documents = self
            .store
            .find(collections::TEAM, doc! { "projectID": *project_id })
            .await?;
        documents
            .into_iter()
            .map(|d| from_document(d).map_err(Into::into))
            .collect()
    }

    /// Fails with Conflict when a membership already exists for the pair.
    /// Idempotent callers treat Conflict as success.
    pub async fn add(
        &self,
        project_id: ObjectId,
        user_id: &str,
        role: Role,
    ) -> Result<Membership, DatastoreError> {
        let existing = self
            .store
            .find_one(
                collections::TEAM,
                doc! { "projectID": project_id, "userID": user_id },
            )
            .await?;
        if existing.is_some() {
            return Err(DatastoreError::Conflict(format!(
                "user {} is already a member of project {}",
                user_id, project_id
            )));
        }

        let membership = Membership {
            project_id,
            user_id: user_id.to_string(),
            role,
        };
        self.store
            .insert_one(collections::TEAM, to_document(&membership)?)
            .await?;
        Ok(membership)
    }

    pub async fn set_role(
        &self,
        user_id: &str,
        project_id: &ObjectId,
        role: Role,
    ) -> Result<(), DatastoreError> {
        let matched = self
            .store
            .update_one(
                collections::TEAM,
                doc! { "projectID": *project_id, "userID": user_id },
                doc! { "role": to_bson(&role)? },
            )
            .await?;
        if matched == 0 {
            return Err(DatastoreError::NotFound(format!(
                "membership for user {} on project {}",
                user_id, project_id
            )));
        }
        Ok(())
    }

    pub async fn remove(&self, user_id: &str, project_id: &ObjectId) -> Result<(), DatastoreError> {
        let deleted = self
            .store
            .delete_one(
                collections::TEAM,
                doc! { "projectID": *project_id, "userID": user_id },
            )
            .await?;
        if deleted == 0 {
            return Err(DatastoreError::NotFound(format!(
                "membership for user {} on project {}",
                user_id, project_id
            )));
        }
        Ok(())
    }

    /// Bulk removal used by the project-delete cascade
    pub async fn remove_all(&self, project_id: &ObjectId) -> Result<u64, DatastoreError> {
        self.store
            .delete_many(collections::TEAM, doc! { "projectID": *project_id })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;

    fn repo() -> MembershipRepository {
        MembershipRepository::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn role_of_missing_pair_is_none() {
        let memberships = repo();
        let role = memberships
            .role_of("nobody", &ObjectId::new())
            .await
            .unwrap();
        assert_eq!(role, None);
    }

    #[tokio::test]
    async fn duplicate_add_conflicts() {
        let memberships = repo();
        let project = ObjectId::new();

        memberships
            .add(project, "alice", Role::ProjectLead)
            .await
            .unwrap();
        let err = memberships
            .add(project, "alice", Role::Developer)
            .await
            .unwrap_err();
        assert!(matches!(err, DatastoreError::Conflict(_)));

        // The original row is untouched
        let role = memberships.role_of("alice", &project).await.unwrap();
        assert_eq!(role, Some(Role::ProjectLead));
    }

    #[tokio::test]
    async fn set_role_updates_existing_row() {
        let memberships = repo();
        let project = ObjectId::new();

        memberships
            .add(project, "bob", Role::Developer)
            .await
            .unwrap();
        memberships
            .set_role("bob", &project, Role::Manager)
            .await
            .unwrap();
        assert_eq!(
            memberships.role_of("bob", &project).await.unwrap(),
            Some(Role::Manager)
        );

        let err = memberships
            .set_role("bob", &ObjectId::new(), Role::Manager)
            .await
            .unwrap_err();
        assert!(matches!(err, DatastoreError::NotFound(_)));
    }
}
