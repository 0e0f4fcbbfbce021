pub mod memberships;
pub mod projects;
pub mod sprints;
pub mod tasks;
pub mod users;

pub use memberships::MembershipRepository;
pub use projects::ProjectRepository;
pub use sprints::SprintRepository;
pub use tasks::TaskRepository;
pub use users::UserRepository;
