// Authentication models
// JWT claims carried by every authenticated request

use serde::{Deserialize, Serialize};

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// User ID (subject)
    pub sub: String,

    /// User email address
    pub email: String,

    /// User role (BUYER, SELLER, AGENT, ADMIN)
    pub role: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: u64,

    /// Expires at timestamp (Unix epoch seconds)
    pub exp: u64,
}

/// Registration request body
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    pub role: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub license_number: Option<String>,
}

/// Login request body
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token + profile payload returned by register/login
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: crate::models::user::UserProfile,
}
