pub mod membership;
pub mod project;
pub mod sprint;
pub mod task;
pub mod user;

pub use membership::{Membership, Role};
pub use project::Project;
pub use sprint::Sprint;
pub use task::Task;
pub use user::User;
