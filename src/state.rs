use std::sync::Arc;

use crate::authz::Authorizer;
use crate::database::repositories::{
    MembershipRepository, ProjectRepository, SprintRepository, TaskRepository, UserRepository,
};
use crate::database::store::DocumentStore;
use crate::identity::{IdentityResolver, TokenVerifier};

/// Shared per-process state handed to every handler. Repositories are thin
/// clones over the same store handle; nothing here holds request-scoped
/// mutable state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub identity: IdentityResolver,
    pub users: UserRepository,
    pub projects: ProjectRepository,
    pub memberships: MembershipRepository,
    pub sprints: SprintRepository,
    pub tasks: TaskRepository,
    pub authz: Authorizer,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        let users = UserRepository::new(store.clone());
        let projects = ProjectRepository::new(store.clone());
        let memberships = MembershipRepository::new(store.clone());
        let sprints = SprintRepository::new(store.clone());
        let tasks = TaskRepository::new(store.clone());

        Self {
            identity: IdentityResolver::new(verifier, users.clone()),
            authz: Authorizer::new(memberships.clone(), sprints.clone(), tasks.clone()),
            users,
            projects,
            memberships,
            sprints,
            tasks,
            store,
        }
    }
}
