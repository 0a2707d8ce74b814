pub mod auth;
pub mod layout;
pub mod response;

pub use auth::{require_user_middleware, AuthUser};
pub use layout::{auth_layout_middleware, read_cookie};
pub use response::{ApiResponse, ApiResult};
