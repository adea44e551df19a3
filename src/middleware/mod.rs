pub mod auth;
pub mod response;

pub use auth::{requester_middleware, AuthUser, Requester};
pub use response::{ApiResponse, ApiResult};
