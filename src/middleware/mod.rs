pub mod auth;
pub mod response;

pub use auth::{identity_middleware, Principal};
pub use response::{ApiResponse, ApiResult};
