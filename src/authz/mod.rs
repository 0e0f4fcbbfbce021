use mongodb::bson::oid::ObjectId;
use thiserror::Error;
use tracing::debug;

use crate::database::manager::DatastoreError;
use crate::database::models::Role;
use crate::database::repositories::{MembershipRepository, SprintRepository, TaskRepository};

/// Why an authorization check refused the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeniedReason {
    NotSignedIn,
    NoMembership,
    InsufficientRole,
}

impl std::fmt::Display for DeniedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            DeniedReason::NotSignedIn => "not_signed_in",
            DeniedReason::NoMembership => "no_membership",
            DeniedReason::InsufficientRole => "insufficient_role",
        };
        write!(f, "{}", code)
    }
}

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("Access denied: {0}")]
    Denied(DeniedReason),

    #[error(transparent)]
    Store(#[from] DatastoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

/// Target of an authorization check. Sprints and tasks have no permissions
/// of their own; the check always walks up to the owning project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRef {
    Project(ObjectId),
    Sprint(ObjectId),
    Task(ObjectId),
}

/// Stateless per-call authorization engine. Each call independently resolves
/// the owning project, looks up the caller's membership there, and applies
/// the action's required privilege level. A refusal is returned before any
/// mutation is attempted; callers must treat it as a gate, not an
/// annotation.
#[derive(Clone)]
pub struct Authorizer {
    memberships: MembershipRepository,
    sprints: SprintRepository,
    tasks: TaskRepository,
}

impl Authorizer {
    pub fn new(
        memberships: MembershipRepository,
        sprints: SprintRepository,
        tasks: TaskRepository,
    ) -> Self {
        Self {
            memberships,
            sprints,
            tasks,
        }
    }

    /// Grants by returning the caller's role on the owning project.
    ///
    /// Privilege levels:
    /// - Read: any membership.
    /// - Write on Project or Sprint: any role except Developer.
    /// - Write on Task: any membership (every team member manages tasks).
    pub async fn authorize(
        &self,
        principal: Option<&str>,
        action: Action,
        resource: ResourceRef,
    ) -> Result<Role, AuthzError> {
        let Some(user_id) = principal else {
            return Err(AuthzError::Denied(DeniedReason::NotSignedIn));
        };

        let project_id = self.owning_project(&resource).await?;
        let Some(role) = self.memberships.role_of(user_id, &project_id).await? else {
            debug!("Denied {:?} on {:?}: {} has no membership", action, resource, user_id);
            return Err(AuthzError::Denied(DeniedReason::NoMembership));
        };

        match action {
            Action::Read => Ok(role),
            Action::Write => {
                if matches!(resource, ResourceRef::Task(_)) || role.can_manage() {
                    Ok(role)
                } else {
                    debug!("Denied {:?} on {:?}: {} is {:?}", action, resource, user_id, role);
                    Err(AuthzError::Denied(DeniedReason::InsufficientRole))
                }
            }
        }
    }

    /// Task creation has no task to point at yet; it targets the parent
    /// sprint but carries task-level privilege, so any member of the owning
    /// project qualifies.
    pub async fn authorize_task_create(
        &self,
        principal: Option<&str>,
        sprint_id: &ObjectId,
    ) -> Result<Role, AuthzError> {
        let Some(user_id) = principal else {
            return Err(AuthzError::Denied(DeniedReason::NotSignedIn));
        };

        let project_id = self
            .owning_project(&ResourceRef::Sprint(*sprint_id))
            .await?;
        match self.memberships.role_of(user_id, &project_id).await? {
            Some(role) => Ok(role),
            None => Err(AuthzError::Denied(DeniedReason::NoMembership)),
        }
    }

    /// Resolve a resource to the project that owns it: direct for projects,
    /// one hop for sprints, two hops for tasks. A broken link surfaces as
    /// NotFound.
    async fn owning_project(&self, resource: &ResourceRef) -> Result<ObjectId, AuthzError> {
        match resource {
            ResourceRef::Project(id) => Ok(*id),
            ResourceRef::Sprint(id) => Ok(self.sprints.get(id).await?.project_id),
            ResourceRef::Task(id) => {
                let task = self.tasks.get(id).await?;
                Ok(self.sprints.get(&task.sprint_id).await?.project_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::repositories::ProjectRepository;
    use crate::database::store::DocumentStore;
    use mongodb::bson::DateTime;
    use std::sync::Arc;

    struct Fixture {
        projects: ProjectRepository,
        memberships: MembershipRepository,
        sprints: SprintRepository,
        tasks: TaskRepository,
        authz: Authorizer,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let memberships = MembershipRepository::new(store.clone());
        let sprints = SprintRepository::new(store.clone());
        let tasks = TaskRepository::new(store.clone());
        Fixture {
            projects: ProjectRepository::new(store.clone()),
            memberships: memberships.clone(),
            sprints: sprints.clone(),
            tasks: tasks.clone(),
            authz: Authorizer::new(memberships, sprints, tasks),
        }
    }

    #[tokio::test]
    async fn anonymous_caller_is_not_signed_in() {
        let f = fixture();
        let project = f.projects.create("P", "", "alice").await.unwrap();

        let err = f
            .authz
            .authorize(None, Action::Read, ResourceRef::Project(project.id))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthzError::Denied(DeniedReason::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn non_member_is_denied_reads_and_writes() {
        let f = fixture();
        let project = f.projects.create("P", "", "alice").await.unwrap();

        for action in [Action::Read, Action::Write] {
            let err = f
                .authz
                .authorize(Some("stranger"), action, ResourceRef::Project(project.id))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                AuthzError::Denied(DeniedReason::NoMembership)
            ));
        }
    }

    #[tokio::test]
    async fn developer_writes_tasks_but_not_projects_or_sprints() {
        let f = fixture();
        let project = f.projects.create("P", "", "alice").await.unwrap();
        f.memberships
            .add(project.id, "bob", Role::Developer)
            .await
            .unwrap();
        let sprint = f
            .sprints
            .create(project.id, "s1", DateTime::now(), "")
            .await
            .unwrap();
        let task = f
            .tasks
            .create(sprint.id, "t1", "", DateTime::now(), vec![], vec![])
            .await
            .unwrap();

        let err = f
            .authz
            .authorize(Some("bob"), Action::Write, ResourceRef::Project(project.id))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthzError::Denied(DeniedReason::InsufficientRole)
        ));

        let err = f
            .authz
            .authorize(Some("bob"), Action::Write, ResourceRef::Sprint(sprint.id))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthzError::Denied(DeniedReason::InsufficientRole)
        ));

        // Task writes only require membership
        let role = f
            .authz
            .authorize(Some("bob"), Action::Write, ResourceRef::Task(task.id))
            .await
            .unwrap();
        assert_eq!(role, Role::Developer);

        // Reads are open to any member
        f.authz
            .authorize(Some("bob"), Action::Read, ResourceRef::Sprint(sprint.id))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn manager_is_as_privileged_as_lead() {
        let f = fixture();
        let project = f.projects.create("P", "", "alice").await.unwrap();
        f.memberships
            .add(project.id, "mia", Role::Manager)
            .await
            .unwrap();

        let role = f
            .authz
            .authorize(Some("mia"), Action::Write, ResourceRef::Project(project.id))
            .await
            .unwrap();
        assert_eq!(role, Role::Manager);
    }

    #[tokio::test]
    async fn broken_ancestor_chain_is_not_found() {
        let f = fixture();
        let project = f.projects.create("P", "", "alice").await.unwrap();
        let sprint = f
            .sprints
            .create(project.id, "s1", DateTime::now(), "")
            .await
            .unwrap();
        let task = f
            .tasks
            .create(sprint.id, "t1", "", DateTime::now(), vec![], vec![])
            .await
            .unwrap();

        // Deleting the sprint orphans the task: the two-hop resolution dies
        // at the missing middle link.
        f.sprints.delete(&sprint.id).await.unwrap();
        let err = f
            .authz
            .authorize(Some("alice"), Action::Read, ResourceRef::Task(task.id))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthzError::Store(DatastoreError::NotFound(_))
        ));
    }
}
