// Utility modules

pub mod api_error;
pub mod messages;
pub mod password;

pub use api_error::{ApiError, ApiResult};
pub use password::{hash_password, verify_password, PasswordError};
