//! Request DTOs for Web API.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::validation::{validate_email, validate_name, validate_password};

use super::validation::{from_field_error, not_empty_trimmed};

/// Account registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "valid_name"))]
    pub name: String,
    #[validate(custom(function = "valid_email"))]
    pub email: String,
    #[validate(custom(function = "valid_password"))]
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Profile update request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "valid_name"))]
    pub name: String,
    #[validate(custom(function = "valid_email"))]
    pub email: String,
}

/// Password change request.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(custom(function = "valid_password"))]
    pub new_password: String,
}

/// Administrative lock request. Without `minutes` the configured lockout
/// duration applies.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LockRequest {
    #[validate(range(min = 1, max = 525_600, message = "Minutes must be 1-525600"))]
    pub minutes: Option<u32>,
}

/// New game request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGameRequest {
    #[validate(
        custom(function = "not_empty_trimmed"),
        length(max = 200, message = "Title is too long")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Description is too long"))]
    pub description: String,
    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price_cents: i64,
}

/// Partial game update; absent fields keep their value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateGameRequest {
    #[validate(length(max = 200, message = "Title is too long"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price_cents: Option<i64>,
}

/// Query parameters selecting whose library to act on.
#[derive(Debug, Default, Deserialize)]
pub struct LibraryQuery {
    /// Another account (administrators only).
    pub user_id: Option<Uuid>,
}

fn valid_name(name: &str) -> Result<(), validator::ValidationError> {
    validate_name(name).map_err(from_field_error)
}

fn valid_email(email: &str) -> Result<(), validator::ValidationError> {
    validate_email(email).map_err(from_field_error)
}

fn valid_password(password: &str) -> Result<(), validator::ValidationError> {
    validate_password(password).map_err(from_field_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_valid() {
        let req = RegisterRequest {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password: "Secur3!pass".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_request_reports_each_field() {
        let req = RegisterRequest {
            name: "A".into(),
            email: "nope".into(),
            password: "short".into(),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_create_game_request_rules() {
        let req = CreateGameRequest {
            title: "  ".into(),
            description: String::new(),
            price_cents: -1,
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("price_cents"));
        assert!(!fields.contains_key("description"));
    }

    #[test]
    fn test_update_game_request_empty_is_valid() {
        assert!(UpdateGameRequest::default().validate().is_ok());
    }

    #[test]
    fn test_lock_request_range() {
        assert!(LockRequest { minutes: Some(10) }.validate().is_ok());
        assert!(LockRequest { minutes: Some(0) }.validate().is_err());
        assert!(LockRequest::default().validate().is_ok());
    }
}
