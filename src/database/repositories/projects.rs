use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, from_document, to_document};
use std::sync::Arc;
use tracing::info;

use crate::database::manager::DatastoreError;
use crate::database::models::{Project, Role};
use crate::database::repositories::MembershipRepository;
use crate::database::store::{collections, DocumentStore};

#[derive(Clone)]
pub struct ProjectRepository {
    store: Arc<dyn DocumentStore>,
    memberships: MembershipRepository,
}

impl ProjectRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let memberships = MembershipRepository::new(store.clone());
        Self { store, memberships }
    }

    /// Create a project and its creator's ProjectLead membership. The
    /// membership insert follows the project insert so a project is never
    /// observable without its creator on the team for longer than the gap
    /// between the two writes.
    pub async fn create(
        &self,
        name: &str,
        description: &str,
        creator_id: &str,
    ) -> Result<Project, DatastoreError> {
        let project = Project {
            id: ObjectId::new(),
            name: name.to_string(),
            description: description.to_string(),
        };
        self.store
            .insert_one(collections::PROJECTS, to_document(&project)?)
            .await?;
        self.memberships
            .add(project.id, creator_id, Role::ProjectLead)
            .await?;
        Ok(project)
    }

    pub async fn get(&self, id: &ObjectId) -> Result<Project, DatastoreError> {
        let document = self
            .store
            .find_one(collections::PROJECTS, doc! { "_id": *id })
            .await?;
        match document {
            Some(d) => Ok(from_document(d)?),
            None => Err(DatastoreError::NotFound(format!("project {}", id))),
        }
    }

    /// Projects the user is a member of: membership scan, then one `$in`
    /// fetch over the collected project ids.
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<Project>, DatastoreError> {
        let memberships = self.memberships.all_roles_of(user_id).await?;
        let ids: Vec<ObjectId> = memberships.iter().map(|m| m.project_id).collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let documents = self
            .store
            .find(collections::PROJECTS, doc! { "_id": { "$in": ids } })
            .await?;
        documents
            .into_iter()
            .map(|d| from_document(d).map_err(Into::into))
            .collect()
    }

    /// Full replace of the two mutable fields
    pub async fn update(
        &self,
        id: &ObjectId,
        name: &str,
        description: &str,
    ) -> Result<Project, DatastoreError> {
        let matched = self
            .store
            .update_one(
                collections::PROJECTS,
                doc! { "_id": *id },
                doc! { "name": name, "description": description },
            )
            .await?;
        if matched == 0 {
            return Err(DatastoreError::NotFound(format!("project {}", id)));
        }
        self.get(id).await
    }

    /// Ordered cascade: memberships first, then the project document. The
    /// two steps are not atomic; a failure in between leaves a project with
    /// zero members, which reads as a safe degraded state. The reverse order
    /// could leave access-control rows pointing at a live project nobody can
    /// read.
    pub async fn delete(&self, id: &ObjectId) -> Result<(), DatastoreError> {
        let removed = self.memberships.remove_all(id).await?;
        let deleted = self
            .store
            .delete_one(collections::PROJECTS, doc! { "_id": *id })
            .await?;
        if deleted == 0 {
            return Err(DatastoreError::NotFound(format!("project {}", id)));
        }
        info!("Deleted project {} ({} membership rows)", id, removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::models::Role;

    fn repos() -> (ProjectRepository, MembershipRepository) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        (
            ProjectRepository::new(store.clone()),
            MembershipRepository::new(store),
        )
    }

    #[tokio::test]
    async fn creator_becomes_project_lead() {
        let (projects, memberships) = repos();
        let project = projects.create("Website Revamp", "q3 push", "alice").await.unwrap();

        let role = memberships.role_of("alice", &project.id).await.unwrap();
        assert_eq!(role, Some(Role::ProjectLead));
    }

    #[tokio::test]
    async fn delete_cascades_memberships_before_project() {
        let (projects, memberships) = repos();
        let project = projects.create("Doomed", "", "alice").await.unwrap();
        memberships
            .add(project.id, "bob", Role::Developer)
            .await
            .unwrap();

        projects.delete(&project.id).await.unwrap();

        assert!(matches!(
            projects.get(&project.id).await,
            Err(DatastoreError::NotFound(_))
        ));
        assert!(memberships.all_roles_of("alice").await.unwrap().is_empty());
        assert!(memberships.all_roles_of("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn for_user_only_lists_member_projects() {
        let (projects, _) = repos();
        let mine = projects.create("Mine", "", "alice").await.unwrap();
        projects.create("Theirs", "", "bob").await.unwrap();

        let listed = projects.for_user("alice").await.unwrap();
        assert_eq!(listed, vec![mine]);

        assert!(projects.for_user("carol").await.unwrap().is_empty());
    }
}
