// Request façade. Handlers stay thin: parse identifiers, ask the
// authorization engine, call the repository, wrap the result. Authorization
// always runs before the repository call; a refusal short-circuits the
// mutation entirely.
pub mod projects;
pub mod sprints;
pub mod tasks;
pub mod team;
pub mod users;
