use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Team role within a project. The closed set is extendable, but every
/// authorization decision collapses it to `can_manage()`: Developer is the
/// only restricted tier, ProjectLead and Manager are equally privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    ProjectLead,
    Manager,
    Developer,
}

impl Default for Role {
    fn default() -> Self {
        Role::Developer
    }
}

impl Role {
    /// Whether this role may mutate project-level resources (the project
    /// itself, its team, its sprints). Task-level writes are open to any
    /// member and never consult this.
    pub fn can_manage(self) -> bool {
        self != Role::Developer
    }
}

/// The (user, project, role) association that is the sole unit of
/// authorization. Unique per (projectID, userID) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    #[serde(rename = "projectID")]
    pub project_id: ObjectId,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub role: Role,
}
